//! Order list, detail, status changes and deletion.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use xstore_core::{OrderId, OrderStatus};

use crate::db::{OrderFilter, OrderRepository};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::RequireAdminAuth;
use crate::models::{Order, OrderSummary};
use crate::state::AppState;

/// Body for `PUT /api/orders/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: OrderStatus,
}

/// Result of a status change.
#[derive(Debug, Serialize)]
pub struct StatusChanged {
    pub id: OrderId,
    pub previous: OrderStatus,
    pub status: OrderStatus,
}

/// Orders, newest first, optionally filtered by status and city.
#[instrument(skip(state, _admin))]
pub async fn index(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(filter): Query<OrderFilter>,
) -> Result<Json<Vec<OrderSummary>>> {
    Ok(Json(OrderRepository::new(state.pool()).list(&filter).await?))
}

/// One order with its lines.
#[instrument(skip(state, _admin))]
pub async fn show(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    OrderRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Order".to_string()))
}

/// Move an order along its lifecycle. Disallowed moves answer 409.
#[instrument(skip(state, admin), fields(admin = %admin.email))]
pub async fn update_status(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(body): Json<StatusRequest>,
) -> Result<Json<StatusChanged>> {
    let previous = OrderRepository::new(state.pool())
        .set_status(id, body.status)
        .await?;

    tracing::info!(order_id = %id, from = %previous, to = %body.status, "Order status changed");
    add_breadcrumb(
        "order",
        "Status changed",
        Some(&[("order_id", &id.to_string()), ("status", &body.status.to_string())]),
    );

    Ok(Json(StatusChanged {
        id,
        previous,
        status: body.status,
    }))
}

/// Delete an order and its lines.
#[instrument(skip(state, admin), fields(admin = %admin.email))]
pub async fn delete(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<StatusCode> {
    OrderRepository::new(state.pool()).delete(id).await?;
    tracing::warn!(order_id = %id, "Order deleted");
    Ok(StatusCode::NO_CONTENT)
}
