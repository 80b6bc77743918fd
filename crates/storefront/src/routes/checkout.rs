//! Checkout route handler.

use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use serde::Serialize;
use tower_sessions::Session;
use tracing::instrument;

use xstore_core::CheckoutDetails;

use crate::error::{Result, add_breadcrumb};
use crate::models::session::{load_cart, load_city, save_cart};
use crate::services::{CheckoutService, PlacedOrder};
use crate::state::AppState;

/// Response for a placed order.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    #[serde(flatten)]
    pub order: PlacedOrder,
    /// Total formatted for display.
    pub total_display: String,
    pub payment: &'static str,
}

/// Place a cash-on-delivery order from the session cart.
///
/// The cart is cleared only after the order has been written.
#[instrument(skip(state, session, details))]
pub async fn place_order(
    State(state): State<AppState>,
    session: Session,
    Json(details): Json<CheckoutDetails>,
) -> Result<(StatusCode, Json<CheckoutResponse>)> {
    let mut cart = load_cart(&session).await?;
    let city = load_city(&session).await?;

    let placed = CheckoutService::new(state.pool())
        .place_order(&cart, city.as_ref(), &details, Utc::now().date_naive())
        .await?;

    cart.clear();
    save_cart(&session, &cart).await?;

    let order_id = placed.order_id.to_string();
    add_breadcrumb("checkout", "Order placed", Some(&[("order_id", order_id.as_str())]));

    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse {
            total_display: placed.total.to_string(),
            order: placed,
            payment: "cash_on_delivery",
        }),
    ))
}
