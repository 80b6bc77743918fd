//! Password sign-up, sign-in and sign-out.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::db::AdminUserRepository;
use crate::error::{Result, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::models::session::{self as auth_session, sign_in as start_session};
use crate::models::{AdminRole, CurrentAdmin, CurrentUser};
use crate::services::AuthService;
use crate::state::AppState;

/// Body for sign-up and sign-in.
#[derive(Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// What the session currently grants.
#[derive(Debug, Serialize)]
pub struct SessionInfo {
    pub user: Option<CurrentUser>,
    pub is_admin: bool,
    pub role: Option<AdminRole>,
}

impl SessionInfo {
    fn new(user: Option<CurrentUser>, admin: Option<&CurrentAdmin>) -> Self {
        Self {
            user,
            is_admin: admin.is_some(),
            role: admin.map(|a| a.role),
        }
    }
}

/// Create an account and sign it in.
///
/// A new account is never an admin; it must go through the approval code.
#[instrument(skip(state, session, body), fields(email = %body.email))]
pub async fn sign_up(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<Credentials>,
) -> Result<(StatusCode, Json<SessionInfo>)> {
    let user = AuthService::new(state.pool())
        .sign_up(&body.email, &body.password)
        .await?;

    let current = CurrentUser::from(&user);
    start_session(&session, &current, None).await?;
    add_breadcrumb("auth", "Signed up", Some(&[("email", current.email.as_str())]));

    Ok((StatusCode::CREATED, Json(SessionInfo::new(Some(current), None))))
}

/// Sign in with email and password.
#[instrument(skip(state, session, body), fields(email = %body.email))]
pub async fn sign_in(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<Credentials>,
) -> Result<Json<SessionInfo>> {
    let (user, admin) = AuthService::new(state.pool())
        .sign_in(&body.email, &body.password)
        .await
        .inspect_err(|e| tracing::info!(error = %e, "Sign-in rejected"))?;

    let current = CurrentUser::from(&user);
    let admin = admin.as_ref().map(CurrentAdmin::from);
    start_session(&session, &current, admin.as_ref()).await?;

    if let Some(admin) = &admin {
        set_sentry_user(admin);
    }
    tracing::info!(user_id = %current.id, is_admin = admin.is_some(), "Signed in");

    Ok(Json(SessionInfo::new(Some(current), admin.as_ref())))
}

/// Drop the session.
#[instrument(skip(session))]
pub async fn sign_out(session: Session) -> Result<StatusCode> {
    auth_session::sign_out(&session).await?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}

/// Current account and admin status.
///
/// Admin status is read from the database, so a revoked admin sees
/// `is_admin: false` straight away.
#[instrument(skip(state, session))]
pub async fn session_info(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<SessionInfo>> {
    let Some(user) = auth_session::current_user(&session).await? else {
        return Ok(Json(SessionInfo::new(None, None)));
    };

    let admin = AdminUserRepository::new(state.pool())
        .get_by_user_id(user.id)
        .await?
        .as_ref()
        .map(CurrentAdmin::from);

    Ok(Json(SessionInfo::new(Some(user), admin.as_ref())))
}
