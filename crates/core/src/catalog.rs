//! Products, cities, and catalogue filtering.
//!
//! The storefront loads the products offered in the shopper's city from the
//! database and then narrows them in memory with [`ProductFilter`]. Lists are
//! small (tens to hundreds of items), so filtering is a single linear pass.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::{CityId, ProductId};

/// A delivery city.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub id: CityId,
    pub name: String,
    /// Inactive cities are hidden from shoppers but kept for existing orders.
    pub is_active: bool,
}

/// A product offered to shops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    /// Maximum retail price printed on the pack.
    pub mrp: Money,
    /// Wholesale price charged to shops.
    pub selling_price: Money,
    pub image_url: Option<String>,
    pub expiry_date: NaiveDate,
    /// Units in stock.
    pub quantity: i32,
    pub is_hot_deal: bool,
    /// Cities the product can be delivered to.
    pub cities: Vec<CityId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Whole-percent saving of the selling price against MRP.
    ///
    /// Returns 0 when MRP is zero or the selling price is not lower.
    #[must_use]
    pub fn discount_percent(&self) -> u8 {
        let mrp = self.mrp.amount();
        let price = self.selling_price.amount();
        if mrp <= Decimal::ZERO || price >= mrp {
            return 0;
        }
        ((mrp - price) * Decimal::ONE_HUNDRED / mrp)
            .floor()
            .to_u8()
            .unwrap_or(0)
    }

    /// Days from `today` until the expiry date (negative once expired).
    #[must_use]
    pub fn days_until_expiry(&self, today: NaiveDate) -> i64 {
        (self.expiry_date - today).num_days()
    }

    /// Returns true if the product expired before `today`.
    #[must_use]
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expiry_date < today
    }

    /// Returns true if the product is offered in `city`.
    #[must_use]
    pub fn is_available_in(&self, city: CityId) -> bool {
        self.cities.contains(&city)
    }

    /// Returns true if at least one unit is in stock.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.quantity > 0
    }
}

/// Shopper-facing catalogue filter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
    /// Exact category name (case-insensitive).
    pub category: Option<String>,
    /// Substring matched against product name and category (case-insensitive).
    #[serde(rename = "q")]
    pub search: Option<String>,
    /// Only hot deals.
    #[serde(default, rename = "hot_deals")]
    pub hot_deals_only: bool,
}

impl ProductFilter {
    /// Returns true if `product` passes every active criterion.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        if self.hot_deals_only && !product.is_hot_deal {
            return false;
        }

        if let Some(category) = non_blank(self.category.as_deref())
            && !product.category.eq_ignore_ascii_case(category)
        {
            return false;
        }

        if let Some(search) = non_blank(self.search.as_deref()) {
            let needle = search.to_lowercase();
            if !product.name.to_lowercase().contains(&needle)
                && !product.category.to_lowercase().contains(&needle)
            {
                return false;
            }
        }

        true
    }

    /// Keep only the products that match, preserving order.
    #[must_use]
    pub fn apply<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        products.iter().filter(|p| self.matches(p)).collect()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Sorted, de-duplicated category names.
#[must_use]
pub fn categories(products: &[Product]) -> Vec<String> {
    let mut names: Vec<String> = products.iter().map(|p| p.category.clone()).collect();
    names.sort_by_key(|name| name.to_lowercase());
    names.dedup_by(|a, b| a.eq_ignore_ascii_case(b));
    names
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn product(id: i32, name: &str, category: &str, price: i64) -> Product {
        let now = Utc::now();
        Product {
            id: ProductId::new(id),
            name: name.to_owned(),
            category: category.to_owned(),
            mrp: Money::from_rupees(price * 2),
            selling_price: Money::from_rupees(price),
            image_url: None,
            expiry_date: now.date_naive() + chrono::Days::new(30),
            quantity: 100,
            is_hot_deal: false,
            cities: vec![CityId::new(1)],
            created_at: now,
            updated_at: now,
        }
    }
}
