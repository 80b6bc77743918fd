//! Indian mobile phone number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`PhoneNumber`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneNumberError {
    /// The input string is empty.
    #[error("phone number cannot be empty")]
    Empty,
    /// The input contains characters other than digits, spaces, dashes, or a leading +.
    #[error("phone number may only contain digits")]
    InvalidCharacter,
    /// The number does not have ten digits after removing the country prefix.
    #[error("phone number must have 10 digits")]
    WrongLength,
    /// Indian mobile numbers start with 6, 7, 8, or 9.
    #[error("phone number must start with 6, 7, 8, or 9")]
    InvalidPrefix,
}

/// A ten-digit Indian mobile number.
///
/// Accepts common ways shop owners type their number (`+91 98765 43210`,
/// `098765-43210`, `9876543210`) and stores the bare ten digits.
///
/// ```
/// use xstore_core::PhoneNumber;
///
/// let phone = PhoneNumber::parse("+91 98765-43210").unwrap();
/// assert_eq!(phone.as_str(), "9876543210");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Parse and normalise a phone number.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, contains unexpected
    /// characters, or does not reduce to a valid ten-digit mobile number.
    pub fn parse(s: &str) -> Result<Self, PhoneNumberError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PhoneNumberError::Empty);
        }

        let rest = s.strip_prefix('+').unwrap_or(s);
        if !rest
            .chars()
            .all(|c| c.is_ascii_digit() || c == ' ' || c == '-')
        {
            return Err(PhoneNumberError::InvalidCharacter);
        }

        let digits: String = rest.chars().filter(char::is_ascii_digit).collect();
        let national = match digits.len() {
            10 => Some(digits.as_str()),
            11 => digits.strip_prefix('0'),
            12 => digits.strip_prefix("91"),
            _ => None,
        }
        .ok_or(PhoneNumberError::WrongLength)?;

        if !national.starts_with(['6', '7', '8', '9']) {
            return Err(PhoneNumberError::InvalidPrefix);
        }

        Ok(Self(national.to_owned()))
    }

    /// Returns the ten digits.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = PhoneNumberError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PhoneNumber> for String {
    fn from(phone: PhoneNumber) -> Self {
        phone.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_common_formats() {
        for input in [
            "9876543210",
            "98765 43210",
            "+91 98765 43210",
            "+91-9876543210",
            "09876543210",
            "919876543210",
        ] {
            assert_eq!(PhoneNumber::parse(input).unwrap().as_str(), "9876543210");
        }
    }

    #[test]
    fn test_parse_rejects_invalid() {
        assert_eq!(PhoneNumber::parse(""), Err(PhoneNumberError::Empty));
        assert_eq!(
            PhoneNumber::parse("98765x3210"),
            Err(PhoneNumberError::InvalidCharacter)
        );
        assert_eq!(
            PhoneNumber::parse("987654321"),
            Err(PhoneNumberError::WrongLength)
        );
        assert_eq!(
            PhoneNumber::parse("1234567890"),
            Err(PhoneNumberError::InvalidPrefix)
        );
    }
}
