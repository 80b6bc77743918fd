//! Session-related types for back-office authentication.
//!
//! Types stored in the session for authentication state. A signed-in
//! account always has a [`CurrentUser`]; it additionally has a
//! [`CurrentAdmin`] once an admin row exists for it.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use xstore_core::{AdminUserId, Email, UserId};

use super::admin_user::{AdminRole, AdminUser, AuthUser};

/// Session-stored account identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Account database ID.
    pub id: UserId,
    /// Account email address.
    pub email: Email,
}

impl From<&AuthUser> for CurrentUser {
    fn from(user: &AuthUser) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
        }
    }
}

/// Session-stored admin identity.
///
/// Minimal data stored in the session to identify the logged-in admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentAdmin {
    /// Admin's database ID.
    pub id: AdminUserId,
    /// The account the admin signed in with.
    pub user_id: UserId,
    /// Admin's email address.
    pub email: Email,
    /// Admin's role/permission level.
    pub role: AdminRole,
}

impl From<&AdminUser> for CurrentAdmin {
    fn from(admin: &AdminUser) -> Self {
        Self {
            id: admin.id,
            user_id: admin.user_id,
            email: admin.email.clone(),
            role: admin.role,
        }
    }
}

/// Session keys for authentication data.
pub mod session_keys {
    /// Key for storing the signed-in account.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for storing the current admin, present only for approved accounts.
    pub const CURRENT_ADMIN: &str = "current_admin";
}

/// Store a signed-in account, and its admin identity if it has one.
///
/// The session ID is cycled first so a pre-login session cannot be fixed.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn sign_in(
    session: &Session,
    user: &CurrentUser,
    admin: Option<&CurrentAdmin>,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await?;
    match admin {
        Some(admin) => set_current_admin(session, admin).await,
        None => {
            session
                .remove::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
                .await?;
            Ok(())
        }
    }
}

/// Mark the session as an admin session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_admin(
    session: &Session,
    admin: &CurrentAdmin,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_ADMIN, admin).await
}

/// Load the signed-in account, if any.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn current_user(
    session: &Session,
) -> Result<Option<CurrentUser>, tower_sessions::session::Error> {
    session.get(session_keys::CURRENT_USER).await
}

/// Load the admin identity, if any.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn current_admin(
    session: &Session,
) -> Result<Option<CurrentAdmin>, tower_sessions::session::Error> {
    session.get(session_keys::CURRENT_ADMIN).await
}

/// Sign out: drop everything in the session and delete it from the store.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn sign_out(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
