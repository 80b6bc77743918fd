//! Admin approval by one-time code.

use axum::{Json, extract::State};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, add_breadcrumb, set_sentry_user};
use crate::middleware::RequireSignedIn;
use crate::models::CurrentAdmin;
use crate::models::session::set_current_admin;
use crate::services::{OtpService, OtpSent};
use crate::state::AppState;

/// Body for `POST /api/auth/otp/verify`.
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub code: String,
}

/// Response after a successful verification.
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub admin: CurrentAdmin,
}

/// Ask for admin access: a code goes to the approver inbox.
#[instrument(skip(state, user), fields(email = %user.email))]
pub async fn send(
    State(state): State<AppState>,
    RequireSignedIn(user): RequireSignedIn,
) -> Result<Json<OtpSent>> {
    let sent = OtpService::new(state.pool())
        .send(
            &user,
            &state.config().approver_email,
            state.email(),
            Utc::now(),
        )
        .await?;

    add_breadcrumb("otp", "Approval code requested", Some(&[("email", user.email.as_str())]));
    Ok(Json(sent))
}

/// Redeem a code and promote the session to admin.
#[instrument(skip(state, session, user, body), fields(email = %user.email))]
pub async fn verify(
    State(state): State<AppState>,
    session: Session,
    RequireSignedIn(user): RequireSignedIn,
    Json(body): Json<VerifyRequest>,
) -> Result<Json<VerifyResponse>> {
    let admin = OtpService::new(state.pool())
        .verify(&user, &body.code, Utc::now())
        .await?;

    let current = CurrentAdmin::from(&admin);
    session.cycle_id().await?;
    set_current_admin(&session, &current).await?;
    set_sentry_user(&current);

    Ok(Json(VerifyResponse { admin: current }))
}
