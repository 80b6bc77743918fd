//! Checkout details validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{PhoneNumber, PhoneNumberError};

/// Maximum length of free-text checkout fields.
pub const MAX_FIELD_LENGTH: usize = 500;

/// Errors found while validating checkout details.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    /// A required field is blank.
    #[error("{0} is required")]
    MissingField(&'static str),
    /// A field exceeds [`MAX_FIELD_LENGTH`].
    #[error("{0} is too long")]
    FieldTooLong(&'static str),
    /// The phone number is invalid.
    #[error("invalid phone number: {0}")]
    InvalidPhone(#[from] PhoneNumberError),
}

/// Delivery details entered by the shop at checkout.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutDetails {
    pub shop_name: String,
    pub phone_number: String,
    pub address: String,
    #[serde(default)]
    pub landmark: Option<String>,
}

/// Checkout details after validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidCheckout {
    pub shop_name: String,
    pub phone_number: PhoneNumber,
    pub address: String,
    pub landmark: Option<String>,
}

impl CheckoutDetails {
    /// Trim and validate every field.
    ///
    /// # Errors
    ///
    /// Returns the first problem found, naming the field.
    pub fn validate(&self) -> Result<ValidCheckout, CheckoutError> {
        let shop_name = required(&self.shop_name, "shop name")?;
        let phone_number = PhoneNumber::parse(&self.phone_number).map_err(|e| match e {
            PhoneNumberError::Empty => CheckoutError::MissingField("phone number"),
            other => CheckoutError::InvalidPhone(other),
        })?;
        let address = required(&self.address, "address")?;
        let landmark = match self.landmark.as_deref().map(str::trim) {
            Some(l) if !l.is_empty() => Some(bounded(l, "landmark")?.to_owned()),
            _ => None,
        };

        Ok(ValidCheckout {
            shop_name: shop_name.to_owned(),
            phone_number,
            address: address.to_owned(),
            landmark,
        })
    }
}

fn required<'a>(value: &'a str, field: &'static str) -> Result<&'a str, CheckoutError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(CheckoutError::MissingField(field));
    }
    bounded(value, field)
}

fn bounded<'a>(value: &'a str, field: &'static str) -> Result<&'a str, CheckoutError> {
    if value.chars().count() > MAX_FIELD_LENGTH {
        return Err(CheckoutError::FieldTooLong(field));
    }
    Ok(value)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn details() -> CheckoutDetails {
        CheckoutDetails {
            shop_name: "  Sharma General Store ".to_owned(),
            phone_number: "+91 98765 43210".to_owned(),
            address: "12 Market Road".to_owned(),
            landmark: Some("   ".to_owned()),
        }
    }

    #[test]
    fn test_validate_trims_and_normalises() {
        let valid = details().validate().unwrap();
        assert_eq!(valid.shop_name, "Sharma General Store");
        assert_eq!(valid.phone_number.as_str(), "9876543210");
        assert_eq!(valid.landmark, None);
    }

    #[test]
    fn test_validate_reports_missing_fields() {
        let mut d = details();
        d.shop_name = " ".to_owned();
        assert_eq!(d.validate(), Err(CheckoutError::MissingField("shop name")));

        let mut d = details();
        d.phone_number = String::new();
        assert_eq!(d.validate(), Err(CheckoutError::MissingField("phone number")));

        let mut d = details();
        d.address = String::new();
        assert_eq!(d.validate(), Err(CheckoutError::MissingField("address")));
    }

    #[test]
    fn test_validate_rejects_bad_phone_and_long_fields() {
        let mut d = details();
        d.phone_number = "12345".to_owned();
        assert!(matches!(d.validate(), Err(CheckoutError::InvalidPhone(_))));

        let mut d = details();
        d.landmark = Some("x".repeat(MAX_FIELD_LENGTH + 1));
        assert_eq!(d.validate(), Err(CheckoutError::FieldTooLong("landmark")));
    }
}
