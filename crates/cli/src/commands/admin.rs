//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! # Bootstrap the first super admin
//! xstore-cli admin create -e owner@xstore.in -p 'long passphrase' -r super_admin
//! ```
//!
//! Later admins normally come through the approval-code flow in the back
//! office; this command is for the first one, or for recovery.

use thiserror::Error;

use xstore_admin::db::{AdminUserRepository, AuthUserRepository, RepositoryError};
use xstore_admin::services::{AuthError, hash_password};
use xstore_core::{AdminRole, Email};

use super::{ConnectError, connect};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// Invalid role.
    #[error("Invalid role: {0}. Valid roles: super_admin, admin")]
    InvalidRole(String),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// Password rejected or could not be hashed.
    #[error("{0}")]
    Password(#[from] AuthError),

    /// Account already exists.
    #[error("An account already exists with email: {0}")]
    UserExists(String),

    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Parsed and checked arguments for `admin create`.
#[derive(Debug)]
pub struct NewAdmin {
    pub email: Email,
    pub password_hash: String,
    pub role: AdminRole,
}

/// Validate `admin create` arguments without touching the database.
///
/// # Errors
///
/// Returns an error for an unknown role, a malformed email or a weak password.
pub fn prepare(email: &str, password: &str, role: &str) -> Result<NewAdmin, AdminError> {
    let role: AdminRole = role
        .parse()
        .map_err(|_| AdminError::InvalidRole(role.to_owned()))?;
    let email = Email::parse(email).map_err(|_| AdminError::InvalidEmail(email.to_owned()))?;
    let password_hash = hash_password(password)?;

    Ok(NewAdmin {
        email,
        password_hash,
        role,
    })
}

/// Create an account and its admin row in one transaction.
///
/// # Errors
///
/// Returns an error if validation fails, the email is taken, or the database
/// is unreachable.
pub async fn create_user(email: &str, password: &str, role: &str) -> Result<i32, AdminError> {
    let new_admin = prepare(email, password, role)?;
    let pool = connect().await?;

    tracing::info!("Creating admin user: {} ({})", new_admin.email, new_admin.role);

    let mut tx = pool.begin().await?;
    let user = AuthUserRepository::insert(&mut tx, &new_admin.email, &new_admin.password_hash)
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => AdminError::UserExists(new_admin.email.to_string()),
            other => AdminError::Repository(other),
        })?;
    let admin =
        AdminUserRepository::insert(&mut tx, user.id, &new_admin.email, new_admin.role).await?;
    tx.commit().await?;

    tracing::info!(
        "Admin user created successfully! ID: {}, Email: {}, Role: {}",
        admin.id,
        admin.email,
        admin.role
    );

    Ok(admin.id.as_i32())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_accepts_valid_arguments() {
        let new_admin = prepare("Owner@Xstore.in", "long passphrase", "super_admin").unwrap();
        assert_eq!(new_admin.role, AdminRole::SuperAdmin);
        assert!(new_admin.password_hash.starts_with("$argon2id$"));
    }

    #[test]
    fn test_prepare_rejects_bad_role() {
        assert!(matches!(
            prepare("owner@xstore.in", "long passphrase", "viewer"),
            Err(AdminError::InvalidRole(_))
        ));
    }

    #[test]
    fn test_prepare_rejects_bad_email_and_password() {
        assert!(matches!(
            prepare("not-an-email", "long passphrase", "admin"),
            Err(AdminError::InvalidEmail(_))
        ));
        assert!(matches!(
            prepare("owner@xstore.in", "short", "admin"),
            Err(AdminError::Password(AuthError::WeakPassword(_)))
        ));
    }
}
