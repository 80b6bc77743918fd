//! Pending admin approval codes.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use xstore_core::otp::OtpRecord;
use xstore_core::{Email, OtpId};

use super::RepositoryError;

/// A stored approval code.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoredOtp {
    pub id: OtpId,
    pub email: String,
    pub code: String,
    /// Guesses claimed so far, including one being checked right now.
    pub attempts: i32,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl StoredOtp {
    /// The fields needed to check a submitted code.
    #[must_use]
    pub fn record(&self) -> OtpRecord<'_> {
        OtpRecord {
            code: &self.code,
            attempts: self.attempts,
            expires_at: self.expires_at,
        }
    }

    /// The record as it stood before the guess that [`claim_attempt`]
    /// just counted.
    ///
    /// [`claim_attempt`]: AdminOtpRepository::claim_attempt
    #[must_use]
    pub fn claimed_record(&self) -> OtpRecord<'_> {
        OtpRecord {
            attempts: self.attempts.saturating_sub(1),
            ..self.record()
        }
    }
}

/// Repository for `admin_otp` rows.
pub struct AdminOtpRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AdminOtpRepository<'a> {
    /// Create a new approval code repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Store a fresh code for `email`, deleting any earlier ones.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if either statement fails.
    pub async fn replace(
        &self,
        email: &Email,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<StoredOtp, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM xstore.admin_otp WHERE email = $1")
            .bind(email)
            .execute(&mut *tx)
            .await?;

        let otp = sqlx::query_as::<_, StoredOtp>(
            r"
            INSERT INTO xstore.admin_otp (email, code, attempts, expires_at)
            VALUES ($1, $2, 0, $3)
            RETURNING id, email, code, attempts, expires_at, created_at
            ",
        )
        .bind(email)
        .bind(code)
        .bind(expires_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(otp)
    }

    /// The most recent code for `email`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn latest_for(&self, email: &Email) -> Result<Option<StoredOtp>, RepositoryError> {
        let otp = sqlx::query_as::<_, StoredOtp>(
            r"
            SELECT id, email, code, attempts, expires_at, created_at
            FROM xstore.admin_otp
            WHERE email = $1
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            ",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(otp)
    }

    /// Spend one guess on a code before it is compared.
    ///
    /// The increment and the budget check are one statement, so concurrent
    /// guesses can never claim more than `max_attempts` between them.
    /// Returns the row with the new count, or `None` when the code is gone,
    /// expired at `now`, or has no guesses left.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn claim_attempt(
        &self,
        id: OtpId,
        max_attempts: i32,
        now: DateTime<Utc>,
    ) -> Result<Option<StoredOtp>, RepositoryError> {
        let otp = sqlx::query_as::<_, StoredOtp>(
            r"
            UPDATE xstore.admin_otp
            SET attempts = attempts + 1
            WHERE id = $1 AND attempts < $2 AND expires_at >= $3
            RETURNING id, email, code, attempts, expires_at, created_at
            ",
        )
        .bind(id)
        .bind(max_attempts)
        .bind(now)
        .fetch_optional(self.pool)
        .await?;

        Ok(otp)
    }

    /// Delete a code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: OtpId) -> Result<(), RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        Self::delete_on(&mut conn, id).await
    }

    /// Delete a code on an existing connection or transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete_on(conn: &mut PgConnection, id: OtpId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM xstore.admin_otp WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(())
    }

    /// Delete every code that expired before `now`. Returns how many went.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM xstore.admin_otp WHERE expires_at < $1")
            .bind(now)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use xstore_core::otp::{OTP_MAX_ATTEMPTS, OtpCheck};

    use super::*;

    fn stored(attempts: i32) -> StoredOtp {
        let now = Utc::now();
        StoredOtp {
            id: OtpId::new(1),
            email: "buyer@kirana.in".to_string(),
            code: "482913".to_string(),
            attempts,
            expires_at: now + Duration::minutes(10),
            created_at: now,
        }
    }

    #[test]
    fn test_last_claimed_guess_is_still_compared() {
        let otp = stored(OTP_MAX_ATTEMPTS);
        assert_eq!(otp.record().check("482913", Utc::now()), OtpCheck::TooManyAttempts);
        assert_eq!(otp.claimed_record().check("482913", Utc::now()), OtpCheck::Valid);
        assert_eq!(otp.claimed_record().check("000000", Utc::now()), OtpCheck::Mismatch);
    }
}
