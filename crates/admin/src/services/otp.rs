//! Admin approval codes.
//!
//! A signed-in account that is not yet an admin asks for a code. The code is
//! stored against the account's email and sent to the approver inbox, never
//! to the requester. The approver hands it over out of band; entering it
//! creates the admin row.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use thiserror::Error;

use xstore_core::otp::{self, OTP_MAX_ATTEMPTS, OTP_TTL, OtpCheck};
use xstore_core::Email;

use super::email::{EmailError, EmailService, generate_verification_code};
use crate::db::{AdminOtpRepository, AdminUserRepository, RepositoryError};
use crate::models::{AdminRole, AdminUser, CurrentUser};

/// Errors from issuing or verifying an approval code.
#[derive(Debug, Error)]
pub enum OtpError {
    /// The account already has back-office access.
    #[error("this account is already an admin")]
    AlreadyAdmin,

    /// No code has been requested for this account.
    #[error("no approval code has been requested")]
    NoPendingCode,

    /// The submitted value is not six digits.
    #[error("the code must be 6 digits")]
    Malformed,

    /// The code is past its ten-minute lifetime.
    #[error("the code has expired; request a new one")]
    Expired,

    /// The code does not match.
    #[error("incorrect code; {remaining} attempt(s) left")]
    Mismatch { remaining: i32 },

    /// Too many wrong guesses; the code was discarded.
    #[error("too many incorrect attempts; request a new code")]
    TooManyAttempts,

    /// The approver e-mail could not be sent.
    #[error("failed to send approval email: {0}")]
    Email(#[from] EmailError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Result of issuing a code.
#[derive(Debug, Clone, Serialize)]
pub struct OtpSent {
    /// Where the code went.
    pub sent_to: Email,
    pub expires_at: DateTime<Utc>,
    /// False when SMTP is not configured and the code was only logged.
    pub emailed: bool,
}

/// Approval code service.
pub struct OtpService<'a> {
    pool: &'a PgPool,
    codes: AdminOtpRepository<'a>,
    admins: AdminUserRepository<'a>,
}

impl<'a> OtpService<'a> {
    /// Create a new approval code service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            pool,
            codes: AdminOtpRepository::new(pool),
            admins: AdminUserRepository::new(pool),
        }
    }

    /// Issue a code for `user` and send it to `approver`.
    ///
    /// Earlier codes for the same account are discarded. Without an
    /// [`EmailService`] the code is written to the log (development mode).
    ///
    /// # Errors
    ///
    /// Returns `OtpError::AlreadyAdmin` if the account is already an admin,
    /// `OtpError::Email` if sending fails.
    pub async fn send(
        &self,
        user: &CurrentUser,
        approver: &Email,
        mailer: Option<&EmailService>,
        now: DateTime<Utc>,
    ) -> Result<OtpSent, OtpError> {
        if self.admins.get_by_user_id(user.id).await?.is_some() {
            return Err(OtpError::AlreadyAdmin);
        }

        let code = generate_verification_code();
        let stored = self
            .codes
            .replace(&user.email, &code, otp::expires_at(now))
            .await?;

        let emailed = if let Some(mailer) = mailer {
            mailer
                .send_admin_otp(
                    approver.as_str(),
                    user.email.as_str(),
                    &code,
                    OTP_TTL.num_minutes(),
                )
                .await?;
            true
        } else {
            tracing::warn!(
                requester = %user.email,
                code = %code,
                "SMTP not configured - approval code logged (dev mode)"
            );
            false
        };

        tracing::info!(requester = %user.email, "Admin approval code issued");

        Ok(OtpSent {
            sent_to: approver.clone(),
            expires_at: stored.expires_at,
            emailed,
        })
    }

    /// Check `submitted` against the latest code for `user`.
    ///
    /// Each call spends one guess from the code's budget before comparing,
    /// so parallel requests share the same five guesses. On success the code
    /// is deleted and the admin row created in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `OtpError::Expired`, `OtpError::Mismatch` or
    /// `OtpError::TooManyAttempts` when the code is rejected.
    pub async fn verify(
        &self,
        user: &CurrentUser,
        submitted: &str,
        now: DateTime<Utc>,
    ) -> Result<AdminUser, OtpError> {
        let submitted = submitted.trim();
        if !otp::is_well_formed(submitted) {
            return Err(OtpError::Malformed);
        }

        let pending = self
            .codes
            .latest_for(&user.email)
            .await?
            .ok_or(OtpError::NoPendingCode)?;

        let Some(stored) = self
            .codes
            .claim_attempt(pending.id, OTP_MAX_ATTEMPTS, now)
            .await?
        else {
            self.codes.delete(pending.id).await?;
            return Err(if now > pending.expires_at {
                OtpError::Expired
            } else {
                OtpError::TooManyAttempts
            });
        };

        match stored.claimed_record().check(submitted, now) {
            OtpCheck::Valid => {}
            OtpCheck::Expired => {
                self.codes.delete(stored.id).await?;
                return Err(OtpError::Expired);
            }
            OtpCheck::TooManyAttempts => {
                self.codes.delete(stored.id).await?;
                return Err(OtpError::TooManyAttempts);
            }
            OtpCheck::Mismatch => {
                let remaining = OTP_MAX_ATTEMPTS - stored.attempts;
                tracing::warn!(requester = %user.email, remaining, "Incorrect approval code");
                if remaining <= 0 {
                    self.codes.delete(stored.id).await?;
                    return Err(OtpError::TooManyAttempts);
                }
                return Err(OtpError::Mismatch { remaining });
            }
        }

        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;
        AdminOtpRepository::delete_on(&mut tx, stored.id).await?;
        let admin = AdminUserRepository::insert(&mut tx, user.id, &user.email, AdminRole::Admin)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => OtpError::AlreadyAdmin,
                other => OtpError::Repository(other),
            })?;
        tx.commit().await.map_err(RepositoryError::from)?;

        tracing::info!(admin_id = %admin.id, email = %admin.email, "Admin approved");
        Ok(admin)
    }
}
