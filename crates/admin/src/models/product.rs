//! Product and city input validation.
//!
//! Handlers deserialize these inputs straight from JSON; nothing reaches
//! the database until [`ProductInput::validate`] has passed.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

use xstore_core::{CityId, Money};

/// Longest product name, category, or city name accepted.
pub const MAX_NAME_LENGTH: usize = 200;

/// Problems with a product or city submitted by an admin.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProductInputError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("{0} is too long")]
    TooLong(&'static str),
    #[error("{0} must be greater than zero")]
    NonPositivePrice(&'static str),
    #[error("selling price {selling_price} is above MRP {mrp}")]
    PriceAboveMrp { mrp: Money, selling_price: Money },
    #[error("stock cannot be negative")]
    NegativeStock,
    #[error("unknown city ids: {0:?}")]
    UnknownCities(Vec<CityId>),
}

/// Product fields as submitted by the back office.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub category: String,
    pub mrp: Money,
    pub selling_price: Money,
    #[serde(default)]
    pub image_url: Option<String>,
    pub expiry_date: NaiveDate,
    pub quantity: i32,
    #[serde(default)]
    pub is_hot_deal: bool,
    #[serde(default)]
    pub cities: Vec<CityId>,
}

/// A product that passed validation, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    pub name: String,
    pub category: String,
    pub mrp: Money,
    pub selling_price: Money,
    pub image_url: Option<String>,
    pub expiry_date: NaiveDate,
    pub quantity: i32,
    pub is_hot_deal: bool,
    /// Sorted, without duplicates.
    pub cities: Vec<CityId>,
}

impl ProductInput {
    /// Trim text fields and check prices, stock, and names.
    ///
    /// Whether the city ids exist is checked by the repository.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(self) -> Result<ProductDraft, ProductInputError> {
        let name = required_name(&self.name, "name")?;
        let category = required_name(&self.category, "category")?;

        if !self.mrp.is_positive() {
            return Err(ProductInputError::NonPositivePrice("MRP"));
        }
        if !self.selling_price.is_positive() {
            return Err(ProductInputError::NonPositivePrice("selling price"));
        }
        if self.selling_price > self.mrp {
            return Err(ProductInputError::PriceAboveMrp {
                mrp: self.mrp,
                selling_price: self.selling_price,
            });
        }
        if self.quantity < 0 {
            return Err(ProductInputError::NegativeStock);
        }

        let image_url = self
            .image_url
            .map(|url| url.trim().to_owned())
            .filter(|url| !url.is_empty());

        let cities: Vec<CityId> = self
            .cities
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        Ok(ProductDraft {
            name,
            category,
            mrp: self.mrp,
            selling_price: self.selling_price,
            image_url,
            expiry_date: self.expiry_date,
            quantity: self.quantity,
            is_hot_deal: self.is_hot_deal,
            cities,
        })
    }
}

/// City fields as submitted by the back office.
#[derive(Debug, Clone, Deserialize)]
pub struct CityInput {
    pub name: String,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
}

const fn active_by_default() -> bool {
    true
}

impl CityInput {
    /// The trimmed city name.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank or too long.
    pub fn validated_name(&self) -> Result<String, ProductInputError> {
        required_name(&self.name, "city name")
    }
}

fn required_name(value: &str, field: &'static str) -> Result<String, ProductInputError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ProductInputError::MissingField(field));
    }
    if value.chars().count() > MAX_NAME_LENGTH {
        return Err(ProductInputError::TooLong(field));
    }
    Ok(value.to_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn input() -> ProductInput {
        ProductInput {
            name: "  Amul Butter 500g ".into(),
            category: "Dairy".into(),
            mrp: Money::from_rupees(285),
            selling_price: Money::from_rupees(240),
            image_url: Some("  ".into()),
            expiry_date: NaiveDate::from_ymd_opt(2026, 11, 30).unwrap(),
            quantity: 40,
            is_hot_deal: false,
            cities: vec![CityId::new(3), CityId::new(1), CityId::new(3)],
        }
    }

    #[test]
    fn test_valid_input_is_normalised() {
        let draft = input().validate().unwrap();
        assert_eq!(draft.name, "Amul Butter 500g");
        assert_eq!(draft.image_url, None);
        assert_eq!(draft.cities, vec![CityId::new(1), CityId::new(3)]);
    }

    #[test]
    fn test_selling_price_may_equal_mrp() {
        let mut i = input();
        i.selling_price = i.mrp;
        assert!(i.validate().is_ok());
    }

    #[test]
    fn test_price_rules() {
        let mut i = input();
        i.selling_price = Money::from_rupees(300);
        assert!(matches!(
            i.validate(),
            Err(ProductInputError::PriceAboveMrp { .. })
        ));

        let mut i = input();
        i.mrp = Money::zero();
        assert_eq!(
            i.validate(),
            Err(ProductInputError::NonPositivePrice("MRP"))
        );

        let mut i = input();
        i.selling_price = Money::zero();
        assert_eq!(
            i.validate(),
            Err(ProductInputError::NonPositivePrice("selling price"))
        );
    }

    #[test]
    fn test_stock_and_names() {
        let mut i = input();
        i.quantity = -1;
        assert_eq!(i.validate(), Err(ProductInputError::NegativeStock));

        let mut i = input();
        i.category = " ".into();
        assert_eq!(i.validate(), Err(ProductInputError::MissingField("category")));

        let mut i = input();
        i.name = "x".repeat(MAX_NAME_LENGTH + 1);
        assert_eq!(i.validate(), Err(ProductInputError::TooLong("name")));
    }

    #[test]
    fn test_input_deserializes_with_defaults() {
        let i: ProductInput = serde_json::from_str(
            r#"{"name":"Poha","category":"Staples","mrp":"80.00","selling_price":"55",
                "expiry_date":"2026-12-01","quantity":10}"#,
        )
        .unwrap();
        assert!(!i.is_hot_deal);
        assert!(i.cities.is_empty());
        assert_eq!(i.selling_price, Money::from_rupees(55));
    }

    #[test]
    fn test_city_input() {
        let c: CityInput = serde_json::from_str(r#"{"name":" Pune "}"#).unwrap();
        assert!(c.is_active);
        assert_eq!(c.validated_name().unwrap(), "Pune");

        let c = CityInput {
            name: String::new(),
            is_active: true,
        };
        assert!(c.validated_name().is_err());
    }
}
