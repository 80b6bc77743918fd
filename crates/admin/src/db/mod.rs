//! Database operations for the back office.
//!
//! # Schema: `xstore`
//!
//! - `auth_user` - password accounts
//! - `admin_user` - accounts with back-office access
//! - `admin_otp` - pending admin approval codes
//! - `city`, `product`, `product_city` - catalogue (read/write)
//! - `order`, `order_item` - placed orders (read, status updates, delete)
//! - `admin_session` - tower-sessions storage
//!
//! # Migrations
//!
//! Migrations live in the workspace `migrations/` directory and run via:
//! ```bash
//! cargo run -p xstore-cli -- migrate
//! ```

pub mod admin_otps;
pub mod admin_users;
pub mod auth_users;
pub mod cities;
pub mod dashboard;
pub mod orders;
pub mod products;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use admin_otps::{AdminOtpRepository, StoredOtp};
pub use admin_users::AdminUserRepository;
pub use auth_users::AuthUserRepository;
pub use cities::CityRepository;
pub use dashboard::DashboardRepository;
pub use orders::{OrderFilter, OrderRepository};
pub use products::ProductRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Write rejected by a uniqueness or reference constraint.
    #[error("conflict: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map unique violations to `Conflict` with `message`.
    pub(crate) fn unique(e: sqlx::Error, message: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return Self::Conflict(message.to_owned());
        }
        Self::Database(e)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(5)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
