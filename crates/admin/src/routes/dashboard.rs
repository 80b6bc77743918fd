//! Dashboard counters.

use axum::{Json, extract::State};
use tracing::instrument;

use crate::db::{DashboardRepository, dashboard::DashboardStats};
use crate::error::Result;
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

/// Headline numbers for the back-office home page.
#[instrument(skip(state, _admin))]
pub async fn show(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<DashboardStats>> {
    let stats = DashboardRepository::new(state.pool()).stats().await?;
    Ok(Json(stats))
}
