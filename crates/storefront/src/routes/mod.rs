//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                       - Liveness check
//! GET    /health/ready                 - Database readiness check
//!
//! # Cities
//! GET    /api/cities                   - Active delivery cities
//! GET    /api/city                     - City selected in this session
//! PUT    /api/city                     - Select a city
//!
//! # Catalogue
//! GET    /api/products                 - Products orderable in the selected city
//! GET    /api/products/{id}            - Product detail
//! GET    /api/categories               - Categories of visible products
//!
//! # Cart (session)
//! GET    /api/cart                     - Cart with totals and minimum-order shortfall
//! DELETE /api/cart                     - Empty the cart
//! POST   /api/cart/items               - Add a product
//! PUT    /api/cart/items/{product_id}  - Set quantity (0 removes)
//! DELETE /api/cart/items/{product_id}  - Remove a line
//!
//! # Checkout
//! POST   /api/checkout                 - Place a cash-on-delivery order
//!
//! # Images
//! GET    /uploads/*                    - Product images
//! ```

pub mod cart;
pub mod checkout;
pub mod cities;
pub mod products;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::middleware::{api_rate_limiter, checkout_rate_limiter};
use crate::state::AppState;

/// Create the catalogue routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/cities", get(cities::index))
        .route("/city", get(cities::current).put(cities::select))
        .route("/products", get(products::index))
        .route("/products/{id}", get(products::show))
        .route("/categories", get(products::categories_index))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/items", post(cart::add))
        .route(
            "/items/{product_id}",
            put(cart::update).delete(cart::remove),
        )
        .layer(api_rate_limiter())
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(checkout::place_order))
        .layer(checkout_rate_limiter())
}

/// Create all API routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api", catalog_routes())
        .nest("/api/cart", cart_routes())
        .nest("/api/checkout", checkout_routes())
}
