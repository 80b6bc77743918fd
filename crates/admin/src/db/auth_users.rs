//! Password accounts.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use xstore_core::{Email, UserId};

use super::RepositoryError;
use crate::models::AuthUser;

#[derive(Debug, sqlx::FromRow)]
struct AuthUserRow {
    id: i32,
    email: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<AuthUserRow> for AuthUser {
    type Error = RepositoryError;

    fn try_from(row: AuthUserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            email,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PasswordRow {
    id: i32,
    email: String,
    created_at: DateTime<Utc>,
    password_hash: String,
}

/// Repository for `auth_user` rows.
pub struct AuthUserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AuthUserRepository<'a> {
    /// Create a new auth user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create an account with an already hashed password.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is already registered.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        email: &Email,
        password_hash: &str,
    ) -> Result<AuthUser, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        Self::insert(&mut conn, email, password_hash).await
    }

    /// Insert an account on an existing connection or transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is already registered.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn insert(
        conn: &mut PgConnection,
        email: &Email,
        password_hash: &str,
    ) -> Result<AuthUser, RepositoryError> {
        let row = sqlx::query_as::<_, AuthUserRow>(
            r"
            INSERT INTO xstore.auth_user (email, password_hash)
            VALUES ($1, $2)
            RETURNING id, email, created_at
            ",
        )
        .bind(email)
        .bind(password_hash)
        .fetch_one(conn)
        .await
        .map_err(|e| RepositoryError::unique(e, "email already registered"))?;

        row.try_into()
    }

    /// Get an account by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<AuthUser>, RepositoryError> {
        let row = sqlx::query_as::<_, AuthUserRow>(
            r"
            SELECT id, email, created_at
            FROM xstore.auth_user
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get an account and its password hash by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(AuthUser, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, PasswordRow>(
            r"
            SELECT id, email, created_at, password_hash
            FROM xstore.auth_user
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        row.map(|r| {
            let user = AuthUser::try_from(AuthUserRow {
                id: r.id,
                email: r.email,
                created_at: r.created_at,
            })?;
            Ok((user, r.password_hash))
        })
        .transpose()
    }
}
