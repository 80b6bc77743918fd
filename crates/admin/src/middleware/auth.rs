//! Authentication extractors for admin route handlers.
//!
//! - [`RequireSignedIn`]: any signed-in account (used by the approval flow)
//! - [`RequireAdminAuth`]: an account with a live admin row
//! - [`RequireSuperAdmin`]: an admin with the `super_admin` role
//!
//! The admin extractors re-read the admin row on every request, so removing
//! an admin takes effect immediately rather than when their session expires.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::db::AdminUserRepository;
use crate::error::AppError;
use crate::models::session::{self as auth_session, set_current_admin};
use crate::models::{AdminRole, CurrentAdmin, CurrentUser, session_keys};
use crate::state::AppState;

fn session_of(parts: &Parts) -> Result<Session, AppError> {
    // Set by SessionManagerLayer
    parts
        .extensions
        .get::<Session>()
        .cloned()
        .ok_or_else(|| AppError::Internal("session layer missing".to_string()))
}

/// Extractor that requires a signed-in account.
///
/// Rejects with 401 when nobody is signed in.
pub struct RequireSignedIn(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireSignedIn
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = session_of(parts)?;
        let user = auth_session::current_user(&session)
            .await?
            .ok_or_else(|| AppError::Unauthorized("sign in first".to_string()))?;
        Ok(Self(user))
    }
}

/// Extractor that requires an approved admin.
///
/// Rejects with 401 when nobody is signed in and 403 when the account has
/// no admin row (never approved, or since removed).
pub struct RequireAdminAuth(pub CurrentAdmin);

impl FromRequestParts<AppState> for RequireAdminAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = session_of(parts)?;
        let user = auth_session::current_user(&session)
            .await?
            .ok_or_else(|| AppError::Unauthorized("sign in first".to_string()))?;

        let Some(row) = AdminUserRepository::new(state.pool())
            .get_by_user_id(user.id)
            .await?
        else {
            if auth_session::current_admin(&session).await?.is_some() {
                tracing::warn!(user_id = %user.id, "Admin access revoked; clearing session");
                session
                    .remove::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
                    .await?;
            }
            return Err(AppError::Forbidden("admin approval required".to_string()));
        };

        let admin = CurrentAdmin::from(&row);
        if auth_session::current_admin(&session).await?.as_ref() != Some(&admin) {
            set_current_admin(&session, &admin).await?;
        }
        Ok(Self(admin))
    }
}

/// Extractor that requires a super admin.
///
/// Same checks as [`RequireAdminAuth`], then 403 for plain admins.
pub struct RequireSuperAdmin(pub CurrentAdmin);

impl FromRequestParts<AppState> for RequireSuperAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireAdminAuth(admin) = RequireAdminAuth::from_request_parts(parts, state).await?;
        if admin.role != AdminRole::SuperAdmin {
            return Err(AppError::Forbidden(
                "only super admins can manage admin users".to_string(),
            ));
        }
        Ok(Self(admin))
    }
}
