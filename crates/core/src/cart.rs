//! Shopping cart and the minimum order value.
//!
//! The cart lives in the shopper's session. Each line keeps a snapshot of the
//! product as it was when added; checkout re-reads current prices before the
//! order is written.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::Product;
use crate::money::Money;
use crate::types::ProductId;

/// Orders below this value cannot be placed.
pub const MINIMUM_ORDER_VALUE: Money = Money::new(rust_decimal::Decimal::from_parts(
    3000, 0, 0, false, 0,
));

/// Errors from cart operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// The product is not in the cart.
    #[error("product {0} is not in the cart")]
    NotInCart(ProductId),
    /// A quantity of zero was given where at least one unit is needed.
    #[error("quantity must be at least 1")]
    ZeroQuantity,
}

/// The product fields a cart line needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartProduct {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub image_url: Option<String>,
    pub mrp: Money,
    pub selling_price: Money,
}

impl From<&Product> for CartProduct {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            category: product.category.clone(),
            image_url: product.image_url.clone(),
            mrp: product.mrp,
            selling_price: product.selling_price,
        }
    }
}

/// One cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product: CartProduct,
    pub quantity: u32,
}

impl CartItem {
    /// Selling price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.product.selling_price.times(self.quantity)
    }
}

/// A shopper's cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Cart lines in the order they were first added.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Quantity of `id` currently in the cart (0 if absent).
    #[must_use]
    pub fn quantity_of(&self, id: ProductId) -> u32 {
        self.items
            .iter()
            .find(|item| item.product.id == id)
            .map_or(0, |item| item.quantity)
    }

    /// Add `quantity` units of a product.
    ///
    /// If the product is already in the cart its quantity is increased and
    /// the snapshot refreshed; no second line is created.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ZeroQuantity` if `quantity` is 0.
    pub fn add(&mut self, product: CartProduct, quantity: u32) -> Result<&CartItem, CartError> {
        if quantity == 0 {
            return Err(CartError::ZeroQuantity);
        }

        let id = product.id;
        if let Some(item) = self.items.iter_mut().find(|i| i.product.id == id) {
            item.quantity = item.quantity.saturating_add(quantity);
            item.product = product;
        } else {
            self.items.push(CartItem { product, quantity });
        }

        self.items
            .iter()
            .find(|i| i.product.id == id)
            .ok_or(CartError::NotInCart(id))
    }

    /// Set the quantity of a line; 0 removes it.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NotInCart` if the product is not in the cart.
    pub fn set_quantity(&mut self, id: ProductId, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return self.remove(id);
        }

        let item = self
            .items
            .iter_mut()
            .find(|item| item.product.id == id)
            .ok_or(CartError::NotInCart(id))?;
        item.quantity = quantity;
        Ok(())
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NotInCart` if the product is not in the cart.
    pub fn remove(&mut self, id: ProductId) -> Result<(), CartError> {
        let before = self.items.len();
        self.items.retain(|item| item.product.id != id);
        if self.items.len() == before {
            return Err(CartError::NotInCart(id));
        }
        Ok(())
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Returns true if the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of selling price times quantity over all lines.
    #[must_use]
    pub fn total(&self) -> Money {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Total number of units.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Amount still needed to reach [`MINIMUM_ORDER_VALUE`].
    #[must_use]
    pub fn shortfall(&self) -> Money {
        self.total().shortfall_to(MINIMUM_ORDER_VALUE)
    }

    /// Returns true if the cart total reaches [`MINIMUM_ORDER_VALUE`].
    #[must_use]
    pub fn meets_minimum(&self) -> bool {
        self.total() >= MINIMUM_ORDER_VALUE
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::product;

    fn snapshot(id: i32, price: i64) -> CartProduct {
        CartProduct::from(&product(id, "Item", "Staples", price))
    }

    #[test]
    fn test_minimum_order_value_is_three_thousand() {
        assert_eq!(MINIMUM_ORDER_VALUE, Money::from_rupees(3000));
    }

    #[test]
    fn test_total_is_sum_of_price_times_quantity() {
        let mut cart = Cart::new();
        cart.add(snapshot(1, 120), 5).unwrap();
        cart.add(snapshot(2, 45), 4).unwrap();
        assert_eq!(cart.total(), Money::from_rupees(120 * 5 + 45 * 4));
        assert_eq!(cart.item_count(), 9);
    }

    #[test]
    fn test_adding_existing_product_increments_quantity() {
        let mut cart = Cart::new();
        cart.add(snapshot(1, 100), 2).unwrap();
        let line = cart.add(snapshot(1, 100), 3).unwrap();
        assert_eq!(line.quantity, 5);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.quantity_of(ProductId::new(1)), 5);
    }

    #[test]
    fn test_add_refreshes_snapshot() {
        let mut cart = Cart::new();
        cart.add(snapshot(1, 100), 1).unwrap();
        cart.add(snapshot(1, 90), 1).unwrap();
        assert_eq!(cart.total(), Money::from_rupees(180));
    }

    #[test]
    fn test_add_zero_is_rejected() {
        let mut cart = Cart::new();
        assert_eq!(cart.add(snapshot(1, 100), 0), Err(CartError::ZeroQuantity));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_and_remove() {
        let mut cart = Cart::new();
        cart.add(snapshot(1, 100), 2).unwrap();
        cart.add(snapshot(2, 100), 2).unwrap();

        cart.set_quantity(ProductId::new(1), 7).unwrap();
        assert_eq!(cart.quantity_of(ProductId::new(1)), 7);

        cart.set_quantity(ProductId::new(2), 0).unwrap();
        assert_eq!(cart.items().len(), 1);

        assert_eq!(
            cart.remove(ProductId::new(2)),
            Err(CartError::NotInCart(ProductId::new(2)))
        );
        assert_eq!(
            cart.set_quantity(ProductId::new(9), 1),
            Err(CartError::NotInCart(ProductId::new(9)))
        );
    }

    #[test]
    fn test_minimum_order_shortfall() {
        let mut cart = Cart::new();
        cart.add(snapshot(1, 1000), 2).unwrap();
        assert!(!cart.meets_minimum());
        assert_eq!(cart.shortfall(), Money::from_rupees(1000));

        cart.add(snapshot(1, 1000), 1).unwrap();
        assert!(cart.meets_minimum());
        assert_eq!(cart.shortfall(), Money::zero());
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add(snapshot(1, 10), 1).unwrap();
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Money::zero());
    }
}
