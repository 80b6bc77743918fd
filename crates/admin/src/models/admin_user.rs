//! Account and admin user domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use xstore_core::{AdminUserId, Email, UserId};

pub use xstore_core::AdminRole;

/// A password account. Anyone can sign up; back-office access needs an
/// [`AdminUser`] row on top.
#[derive(Debug, Clone, Serialize)]
pub struct AuthUser {
    pub id: UserId,
    pub email: Email,
    pub created_at: DateTime<Utc>,
}

/// An account with back-office access.
#[derive(Debug, Clone, Serialize)]
pub struct AdminUser {
    /// Unique admin user ID.
    pub id: AdminUserId,
    /// The password account this admin signs in with.
    pub user_id: UserId,
    /// Admin's email address.
    pub email: Email,
    /// Admin's role/permission level.
    pub role: AdminRole,
    /// When the admin was approved.
    pub created_at: DateTime<Utc>,
}
