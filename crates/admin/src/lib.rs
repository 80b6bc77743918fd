//! Xstore Admin library.
//!
//! The back-office API as a library, so the binary, the CLI and the
//! integration tests share the same router, repositories and services.
//!
//! # Security
//!
//! This crate can edit the catalogue, change and delete orders, and grant
//! admin access. Every back-office route re-checks the admin row on each
//! request.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Router, routing::get};

use crate::state::AppState;

/// Build the full application router (without the session or Sentry layers).
pub fn app(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .layer(axum::middleware::from_fn(
            middleware::admin_context_middleware,
        ))
        .layer(axum::middleware::from_fn_with_state(
            state.config().is_secure(),
            middleware::security_headers_middleware,
        ))
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
