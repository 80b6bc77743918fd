//! Order types as the back office sees them.

use chrono::{DateTime, Utc};
use serde::Serialize;

use xstore_core::{Money, OrderId, OrderItemId, OrderStatus, ProductId};

/// One row of the order list.
#[derive(Debug, Clone, Serialize)]
pub struct OrderSummary {
    pub id: OrderId,
    pub shop_name: String,
    pub phone_number: String,
    pub city: String,
    pub total: Money,
    pub status: OrderStatus,
    /// Number of lines on the order.
    pub item_count: i64,
    pub created_at: DateTime<Utc>,
}

/// A full order with its delivery details and lines.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub shop_name: String,
    pub phone_number: String,
    pub address: String,
    pub landmark: Option<String>,
    pub city: String,
    pub total: Money,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

/// A line of an order. Product details are copied at checkout, so the line
/// survives the product being edited or deleted.
#[derive(Debug, Clone, Serialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    /// `None` once the product has been deleted.
    pub product_id: Option<ProductId>,
    pub product_name: String,
    pub category: String,
    pub image_url: Option<String>,
    pub mrp: Money,
    pub quantity: i32,
    /// Unit price charged.
    pub price: Money,
}

impl OrderItem {
    /// Price of the whole line.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.price.times(self.quantity.unsigned_abs())
    }
}
