//! Approval code maintenance.

use chrono::Utc;

use xstore_admin::db::{AdminOtpRepository, RepositoryError};

use super::{ConnectError, connect};

/// Errors from approval code commands.
#[derive(Debug, thiserror::Error)]
pub enum OtpCommandError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Delete every approval code past its expiry.
///
/// # Errors
///
/// Returns an error if the database is unreachable or the delete fails.
pub async fn purge() -> Result<u64, OtpCommandError> {
    let pool = connect().await?;
    let removed = AdminOtpRepository::new(&pool).purge_expired(Utc::now()).await?;
    tracing::info!(removed, "Expired approval codes purged");
    Ok(removed)
}
