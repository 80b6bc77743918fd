//! Admin approval code rules.
//!
//! A signed-in user who wants back-office access asks for a code. The code
//! goes to a fixed approver inbox, not to the requester; the approver passes
//! it on out of band. Codes are six digits, live for ten minutes, and are
//! invalidated after too many wrong guesses.

use chrono::{DateTime, Duration, Utc};

/// How long a code stays valid after it is issued.
pub const OTP_TTL: Duration = Duration::minutes(10);

/// Number of digits in a code.
pub const OTP_LENGTH: usize = 6;

/// Wrong guesses allowed before the code is burned.
pub const OTP_MAX_ATTEMPTS: i32 = 5;

/// Returns true if `code` is exactly [`OTP_LENGTH`] ASCII digits.
#[must_use]
pub fn is_well_formed(code: &str) -> bool {
    code.len() == OTP_LENGTH && code.bytes().all(|b| b.is_ascii_digit())
}

/// Expiry timestamp for a code issued at `issued_at`.
#[must_use]
pub fn expires_at(issued_at: DateTime<Utc>) -> DateTime<Utc> {
    issued_at + OTP_TTL
}

/// Outcome of checking a submitted code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpCheck {
    /// The code matches and is still live.
    Valid,
    /// The code is past its expiry.
    Expired,
    /// The code does not match.
    Mismatch,
    /// Too many wrong guesses were made; the code is dead.
    TooManyAttempts,
}

/// The stored fields needed to check a code.
#[derive(Debug, Clone)]
pub struct OtpRecord<'a> {
    pub code: &'a str,
    /// Wrong guesses made so far.
    pub attempts: i32,
    pub expires_at: DateTime<Utc>,
}

impl OtpRecord<'_> {
    /// Check `submitted` at time `now`.
    ///
    /// Expiry is checked first, then the attempt budget, then the code.
    #[must_use]
    pub fn check(&self, submitted: &str, now: DateTime<Utc>) -> OtpCheck {
        if now > self.expires_at {
            return OtpCheck::Expired;
        }
        if self.attempts >= OTP_MAX_ATTEMPTS {
            return OtpCheck::TooManyAttempts;
        }
        if constant_time_eq(self.code.as_bytes(), submitted.trim().as_bytes()) {
            OtpCheck::Valid
        } else {
            OtpCheck::Mismatch
        }
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(issued_at: DateTime<Utc>, attempts: i32) -> OtpRecord<'static> {
        OtpRecord {
            code: "482913",
            attempts,
            expires_at: expires_at(issued_at),
        }
    }

    #[test]
    fn test_well_formed() {
        assert!(is_well_formed("000123"));
        assert!(!is_well_formed("12345"));
        assert!(!is_well_formed("1234567"));
        assert!(!is_well_formed("12a456"));
    }

    #[test]
    fn test_valid_within_ttl() {
        let issued = Utc::now();
        let r = record(issued, 0);
        assert_eq!(r.check("482913", issued + Duration::minutes(9)), OtpCheck::Valid);
        assert_eq!(r.check(" 482913 ", issued), OtpCheck::Valid);
    }

    #[test]
    fn test_code_older_than_ten_minutes_is_rejected() {
        let issued = Utc::now();
        let r = record(issued, 0);
        assert_eq!(
            r.check("482913", issued + Duration::minutes(10) + Duration::seconds(1)),
            OtpCheck::Expired
        );
    }

    #[test]
    fn test_mismatch_and_attempt_budget() {
        let issued = Utc::now();
        assert_eq!(record(issued, 0).check("000000", issued), OtpCheck::Mismatch);
        assert_eq!(
            record(issued, OTP_MAX_ATTEMPTS).check("482913", issued),
            OtpCheck::TooManyAttempts
        );
    }
}
