//! HTTP middleware stack for admin.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions with `PostgreSQL` store)
//! 5. Admin context (signed-in admin on the tracing span and Sentry scope)
//! 6. Security headers (no framing, no caching)
//! 7. Rate limiting (governor) on sign-in, sign-up and approval codes
//!
//! Route-level guards are extractors, see [`auth`].

pub mod admin_context;
pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use admin_context::admin_context_middleware;
pub use auth::{RequireAdminAuth, RequireSignedIn, RequireSuperAdmin};
pub use rate_limit::{auth_rate_limiter, otp_rate_limiter};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
