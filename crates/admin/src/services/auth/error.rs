//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during sign-up and sign-in.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] xstore_core::EmailError),

    /// Password does not meet requirements.
    #[error("{0}")]
    WeakPassword(String),

    /// An account already exists for this email.
    #[error("an account already exists for this email")]
    UserAlreadyExists,

    /// Email or password is wrong.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Password hashing failed.
    #[error("password hashing error")]
    PasswordHash,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
