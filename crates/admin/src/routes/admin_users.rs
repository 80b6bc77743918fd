//! Admin user management.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use xstore_core::AdminUserId;

use crate::db::AdminUserRepository;
use crate::error::{AppError, Result};
use crate::middleware::{RequireAdminAuth, RequireSuperAdmin};
use crate::models::AdminUser;
use crate::state::AppState;

/// All admins, oldest first.
#[instrument(skip(state, _admin))]
pub async fn index(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<AdminUser>>> {
    Ok(Json(AdminUserRepository::new(state.pool()).list_all().await?))
}

/// Revoke an admin (`super_admin` only). The account itself is kept and
/// can ask for a new approval code.
#[instrument(skip(state, admin), fields(admin = %admin.email))]
pub async fn delete(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Path(id): Path<AdminUserId>,
) -> Result<StatusCode> {
    if id == admin.id {
        return Err(AppError::BadRequest(
            "you cannot remove your own admin access".to_string(),
        ));
    }

    AdminUserRepository::new(state.pool()).delete(id).await?;
    tracing::warn!(removed_admin_id = %id, "Admin access revoked");
    Ok(StatusCode::NO_CONTENT)
}
