//! Admin user repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use xstore_core::{AdminUserId, Email, UserId};

use super::RepositoryError;
use crate::models::admin_user::{AdminRole, AdminUser};

const ADMIN_COLUMNS: &str = "id, user_id, email, role, created_at";

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` admin user queries.
#[derive(Debug, sqlx::FromRow)]
struct AdminUserRow {
    id: i32,
    user_id: i32,
    email: String,
    role: AdminRole,
    created_at: DateTime<Utc>,
}

impl TryFrom<AdminUserRow> for AdminUser {
    type Error = RepositoryError;

    fn try_from(row: AdminUserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: AdminUserId::new(row.id),
            user_id: UserId::new(row.user_id),
            email,
            role: row.role,
            created_at: row.created_at,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for admin user database operations.
pub struct AdminUserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AdminUserRepository<'a> {
    /// Create a new admin user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all admin users, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn list_all(&self) -> Result<Vec<AdminUser>, RepositoryError> {
        let rows = sqlx::query_as::<_, AdminUserRow>(&format!(
            "SELECT {ADMIN_COLUMNS} FROM xstore.admin_user ORDER BY created_at, id"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get an admin user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: AdminUserId) -> Result<Option<AdminUser>, RepositoryError> {
        let row = sqlx::query_as::<_, AdminUserRow>(&format!(
            "SELECT {ADMIN_COLUMNS} FROM xstore.admin_user WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get the admin row belonging to an account, if it has one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_user_id(
        &self,
        user_id: UserId,
    ) -> Result<Option<AdminUser>, RepositoryError> {
        let row = sqlx::query_as::<_, AdminUserRow>(&format!(
            "SELECT {ADMIN_COLUMNS} FROM xstore.admin_user WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Create an admin user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the account is already an admin.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        user_id: UserId,
        email: &Email,
        role: AdminRole,
    ) -> Result<AdminUser, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        Self::insert(&mut conn, user_id, email, role).await
    }

    /// Insert an admin user on an existing connection or transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the account is already an admin.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn insert(
        conn: &mut PgConnection,
        user_id: UserId,
        email: &Email,
        role: AdminRole,
    ) -> Result<AdminUser, RepositoryError> {
        let row = sqlx::query_as::<_, AdminUserRow>(&format!(
            r"
            INSERT INTO xstore.admin_user (user_id, email, role)
            VALUES ($1, $2, $3)
            RETURNING {ADMIN_COLUMNS}
            "
        ))
        .bind(user_id)
        .bind(email)
        .bind(role)
        .fetch_one(conn)
        .await
        .map_err(|e| RepositoryError::unique(e, "account is already an admin"))?;

        row.try_into()
    }

    /// Delete an admin user. The password account is kept.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such admin exists.
    pub async fn delete(&self, id: AdminUserId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM xstore.admin_user WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
