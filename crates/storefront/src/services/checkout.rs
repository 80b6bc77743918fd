//! Checkout: validate, re-price, and persist an order.
//!
//! The cart in the session holds product snapshots that may be stale. Before
//! an order is written every line is checked against the current product row:
//! it must still exist, be offered in the shopper's city, be unexpired, and
//! have enough stock. Lines are charged at today's selling price, and the
//! re-priced total must still reach the minimum order value.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::PgPool;
use thiserror::Error;

use xstore_core::{
    Cart, CheckoutDetails, CheckoutError, CityId, MINIMUM_ORDER_VALUE, Money, OrderId, Product,
    ProductId,
};

use crate::db::{CatalogRepository, OrderRepository, RepositoryError};
use crate::models::{PricedLine, PricedOrder, SelectedCity};

/// Reasons an order cannot be placed.
#[derive(Debug, Error)]
pub enum PlaceOrderError {
    /// No delivery city has been chosen.
    #[error("select a delivery city before checking out")]
    NoCitySelected,

    /// The selected city was deactivated or removed since it was chosen.
    #[error("deliveries to {0} are no longer available; choose another city")]
    CityUnavailable(String),

    /// The cart has no lines.
    #[error("your cart is empty")]
    EmptyCart,

    /// Delivery details failed validation.
    #[error(transparent)]
    InvalidDetails(#[from] CheckoutError),

    /// Products that no longer exist, expired, or are not offered in the city.
    #[error("no longer available: {}", .0.join(", "))]
    Unavailable(Vec<String>),

    /// Products whose stock is below the quantity in the cart.
    #[error("not enough stock for: {}", .0.join(", "))]
    InsufficientStock(Vec<String>),

    /// The re-priced total is under the minimum order value.
    #[error("minimum order value is {minimum}; add {shortfall} more")]
    BelowMinimum {
        minimum: Money,
        total: Money,
        shortfall: Money,
    },

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Result of a successful checkout.
#[derive(Debug, Clone, Serialize)]
pub struct PlacedOrder {
    pub order_id: OrderId,
    pub total: Money,
    pub item_count: u32,
}

/// Checks a cart against current product data and prices it.
///
/// `current` holds the latest rows for the products in the cart; products
/// missing from it are treated as deleted.
///
/// # Errors
///
/// Returns `PlaceOrderError::EmptyCart`, `Unavailable`, `InsufficientStock`,
/// or `BelowMinimum`. Unavailable products are reported before stock
/// problems, and both before the minimum check.
pub fn price_cart(
    cart: &Cart,
    current: &[Product],
    city: CityId,
    today: NaiveDate,
) -> Result<PricedOrder, PlaceOrderError> {
    if cart.is_empty() {
        return Err(PlaceOrderError::EmptyCart);
    }

    let by_id: HashMap<ProductId, &Product> = current.iter().map(|p| (p.id, p)).collect();

    let mut unavailable = Vec::new();
    let mut short = Vec::new();
    let mut lines = Vec::with_capacity(cart.items().len());

    for item in cart.items() {
        let Some(product) = by_id.get(&item.product.id) else {
            unavailable.push(item.product.name.clone());
            continue;
        };

        if !product.is_available_in(city) || product.is_expired(today) || !product.in_stock() {
            unavailable.push(product.name.clone());
            continue;
        }

        if i64::from(item.quantity) > i64::from(product.quantity) {
            short.push(product.name.clone());
            continue;
        }

        lines.push(PricedLine {
            product_id: product.id,
            product_name: product.name.clone(),
            category: product.category.clone(),
            image_url: product.image_url.clone(),
            mrp: product.mrp,
            price: product.selling_price,
            quantity: item.quantity,
        });
    }

    if !unavailable.is_empty() {
        return Err(PlaceOrderError::Unavailable(unavailable));
    }
    if !short.is_empty() {
        return Err(PlaceOrderError::InsufficientStock(short));
    }

    let total: Money = lines.iter().map(PricedLine::line_total).sum();
    if total < MINIMUM_ORDER_VALUE {
        return Err(PlaceOrderError::BelowMinimum {
            minimum: MINIMUM_ORDER_VALUE,
            total,
            shortfall: total.shortfall_to(MINIMUM_ORDER_VALUE),
        });
    }

    Ok(PricedOrder { lines, total })
}

/// Places orders from session carts.
pub struct CheckoutService<'a> {
    pool: &'a PgPool,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Validate details, re-price the cart, and write the order.
    ///
    /// The cart is not modified; the caller clears it once this succeeds.
    ///
    /// # Errors
    ///
    /// Returns a `PlaceOrderError` describing the first blocking problem.
    #[tracing::instrument(skip(self, cart, details), fields(city = ?city.map(|c| c.id)))]
    pub async fn place_order(
        &self,
        cart: &Cart,
        city: Option<&SelectedCity>,
        details: &CheckoutDetails,
        today: NaiveDate,
    ) -> Result<PlacedOrder, PlaceOrderError> {
        let selected = city.ok_or(PlaceOrderError::NoCitySelected)?;
        if cart.is_empty() {
            return Err(PlaceOrderError::EmptyCart);
        }
        let details = details.validate()?;

        let catalog = CatalogRepository::new(self.pool);
        let city = catalog
            .get_active_city(selected.id)
            .await?
            .ok_or_else(|| PlaceOrderError::CityUnavailable(selected.name.clone()))?;

        let ids: Vec<ProductId> = cart.items().iter().map(|i| i.product.id).collect();
        let current = catalog.get_products(&ids).await?;
        let priced = price_cart(cart, &current, city.id, today)?;

        let order_id = OrderRepository::new(self.pool)
            .create(&details, &city.name, &priced)
            .await?;

        let item_count = priced.lines.iter().map(|l| l.quantity).sum();
        tracing::info!(
            order_id = %order_id,
            total = %priced.total,
            lines = priced.lines.len(),
            "Order placed"
        );

        Ok(PlacedOrder {
            order_id,
            total: priced.total,
            item_count,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Days, Utc};
    use xstore_core::CartProduct;

    use super::*;

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    fn product(id: i32, name: &str, price: i64, stock: i32) -> Product {
        let now = Utc::now();
        Product {
            id: ProductId::new(id),
            name: name.to_owned(),
            category: "Staples".to_owned(),
            mrp: Money::from_rupees(price + price / 2),
            selling_price: Money::from_rupees(price),
            image_url: None,
            expiry_date: today() + Days::new(20),
            quantity: stock,
            is_hot_deal: false,
            cities: vec![CityId::new(1)],
            created_at: now,
            updated_at: now,
        }
    }

    fn cart_with(lines: &[(&Product, u32)]) -> Cart {
        let mut cart = Cart::new();
        for (p, qty) in lines {
            cart.add(CartProduct::from(*p), *qty).unwrap();
        }
        cart
    }

    #[test]
    fn test_prices_at_current_selling_price() {
        let rice = product(1, "Rice 25kg", 1200, 10);
        let cart = cart_with(&[(&rice, 3)]);

        let mut repriced = rice.clone();
        repriced.selling_price = Money::from_rupees(1100);

        let priced = price_cart(&cart, &[repriced], CityId::new(1), today()).unwrap();
        assert_eq!(priced.total, Money::from_rupees(3300));
        assert_eq!(priced.lines[0].price, Money::from_rupees(1100));
        assert_eq!(priced.lines[0].mrp, rice.mrp);
    }

    #[test]
    fn test_blocks_totals_below_minimum() {
        let oil = product(1, "Mustard Oil 5L", 900, 10);
        let cart = cart_with(&[(&oil, 3)]);

        let err = price_cart(&cart, &[oil], CityId::new(1), today()).unwrap_err();
        match err {
            PlaceOrderError::BelowMinimum {
                total, shortfall, ..
            } => {
                assert_eq!(total, Money::from_rupees(2700));
                assert_eq!(shortfall, Money::from_rupees(300));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_exact_minimum_is_accepted() {
        let sugar = product(1, "Sugar 50kg", 1500, 5);
        let cart = cart_with(&[(&sugar, 2)]);
        assert!(price_cart(&cart, &[sugar], CityId::new(1), today()).is_ok());
    }

    #[test]
    fn test_rejects_deleted_expired_and_other_city_products() {
        let kept = product(1, "Atta", 1000, 50);
        let deleted = product(2, "Besan", 1000, 50);
        let mut expired = product(3, "Curd", 1000, 50);
        expired.expiry_date = today() - Days::new(1);
        let mut elsewhere = product(4, "Ghee", 1000, 50);
        elsewhere.cities = vec![CityId::new(2)];

        let cart = cart_with(&[(&kept, 1), (&deleted, 1), (&expired, 1), (&elsewhere, 1)]);
        let err = price_cart(&cart, &[kept, expired, elsewhere], CityId::new(1), today())
            .unwrap_err();

        match err {
            PlaceOrderError::Unavailable(names) => {
                assert_eq!(names, ["Besan", "Curd", "Ghee"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_rejects_quantity_above_stock() {
        let dal = product(1, "Toor Dal", 1000, 2);
        let cart = cart_with(&[(&dal, 4)]);
        let err = price_cart(&cart, &[dal], CityId::new(1), today()).unwrap_err();
        assert!(matches!(err, PlaceOrderError::InsufficientStock(ref names) if names == &["Toor Dal"]));
    }

    #[test]
    fn test_empty_cart() {
        let err = price_cart(&Cart::new(), &[], CityId::new(1), today()).unwrap_err();
        assert!(matches!(err, PlaceOrderError::EmptyCart));
    }

    #[test]
    fn test_error_messages_name_products() {
        let err = PlaceOrderError::Unavailable(vec!["Atta".into(), "Besan".into()]);
        assert_eq!(err.to_string(), "no longer available: Atta, Besan");

        let err = PlaceOrderError::BelowMinimum {
            minimum: MINIMUM_ORDER_VALUE,
            total: Money::from_rupees(2500),
            shortfall: Money::from_rupees(500),
        };
        assert_eq!(err.to_string(), "minimum order value is ₹3,000.00; add ₹500.00 more");

        let err = PlaceOrderError::CityUnavailable("Nagpur".into());
        assert_eq!(
            err.to_string(),
            "deliveries to Nagpur are no longer available; choose another city"
        );
    }
}
