//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                       - Liveness check
//! GET    /health/ready                 - Database readiness check
//!
//! # Auth (no admin needed)
//! POST   /api/auth/sign-up             - Create an account and sign in
//! POST   /api/auth/sign-in             - Password sign-in
//! POST   /api/auth/sign-out            - Drop the session
//! GET    /api/auth/session             - Current account and admin status
//! POST   /api/auth/otp/send            - Request admin approval (code to approver)
//! POST   /api/auth/otp/verify          - Redeem the approval code
//!
//! # Back office (admin session)
//! GET    /api/dashboard                - Counters and revenue
//! GET    /api/products                 - All products
//! POST   /api/products                 - Create product
//! GET    /api/products/{id}            - Product detail
//! PUT    /api/products/{id}            - Update product and cities
//! DELETE /api/products/{id}            - Delete product
//! GET    /api/images                   - Uploaded images
//! POST   /api/images                   - Upload image (multipart `file`)
//! GET    /api/cities                   - All cities with usage
//! POST   /api/cities                   - Create city
//! PUT    /api/cities/{id}              - Rename / (de)activate city
//! DELETE /api/cities/{id}              - Delete unused city
//! GET    /api/orders?status=&city=     - Order list
//! GET    /api/orders/{id}              - Order with items
//! PUT    /api/orders/{id}/status       - Change status
//! DELETE /api/orders/{id}              - Delete order
//! GET    /api/admin-users              - List admins
//! DELETE /api/admin-users/{id}         - Revoke admin (super admin)
//! ```

pub mod admin_users;
pub mod auth;
pub mod cities;
pub mod dashboard;
pub mod images;
pub mod orders;
pub mod otp;
pub mod products;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post, put},
};

use crate::middleware::{auth_rate_limiter, otp_rate_limiter};
use crate::services::storage::MAX_IMAGE_BYTES;
use crate::state::AppState;

/// Multipart framing on top of the largest accepted image.
const UPLOAD_BODY_LIMIT: usize = MAX_IMAGE_BYTES + 64 * 1024;

/// Create the password auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/sign-up", post(auth::sign_up))
        .route("/sign-in", post(auth::sign_in))
        .layer(auth_rate_limiter())
        .route("/sign-out", post(auth::sign_out))
        .route("/session", get(auth::session_info))
        .nest("/otp", otp_routes())
}

/// Create the approval code routes router.
pub fn otp_routes() -> Router<AppState> {
    Router::new()
        .route("/send", post(otp::send))
        .route("/verify", post(otp::verify))
        .layer(otp_rate_limiter())
}

/// Create the back-office routes router.
pub fn back_office_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard::show))
        .route("/products", get(products::index).post(products::create))
        .route(
            "/products/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::delete),
        )
        .route(
            "/images",
            get(images::index)
                .post(images::upload)
                .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/cities", get(cities::index).post(cities::create))
        .route("/cities/{id}", put(cities::update).delete(cities::delete))
        .route("/orders", get(orders::index))
        .route("/orders/{id}", get(orders::show).delete(orders::delete))
        .route("/orders/{id}/status", put(orders::update_status))
        .route("/admin-users", get(admin_users::index))
        .route("/admin-users/{id}", axum::routing::delete(admin_users::delete))
}

/// Create all API routes for admin.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/auth", auth_routes())
        .nest("/api", back_office_routes())
}
