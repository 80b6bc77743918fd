//! An order priced against current product data, ready to be written.

use serde::Serialize;

use xstore_core::{Money, ProductId};

/// One line of a priced order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PricedLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub category: String,
    pub image_url: Option<String>,
    pub mrp: Money,
    /// Unit selling price at checkout.
    pub price: Money,
    pub quantity: u32,
}

impl PricedLine {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.price.times(self.quantity)
    }
}

/// Lines plus their total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PricedOrder {
    pub lines: Vec<PricedLine>,
    pub total: Money,
}
