//! Admin context middleware.
//!
//! Records the signed-in admin on the request span and the Sentry scope so
//! errors and logs can be traced back to who triggered them.

use axum::{extract::Request, middleware::Next, response::Response};
use tower_sessions::Session;
use tracing::Span;

use crate::error::set_sentry_user;
use crate::models::session::current_admin;

/// Attach the session's admin, if any, to tracing and Sentry.
pub async fn admin_context_middleware(request: Request, next: Next) -> Response {
    if let Some(session) = request.extensions().get::<Session>() {
        // A session store failure here is reported by the handler that
        // actually needs the session.
        if let Ok(Some(admin)) = current_admin(session).await {
            Span::current().record("admin", admin.email.as_str());
            set_sentry_user(&admin);
        }
    }

    next.run(request).await
}
