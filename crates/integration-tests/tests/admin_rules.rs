//! Back-office rules: product forms, approval codes, order status changes
//! and admin roles.

#![allow(clippy::unwrap_used)]

use chrono::{Duration, NaiveDate, Utc};

use xstore_admin::models::{CityInput, ProductInput, ProductInputError};
use xstore_core::otp::{self, OTP_MAX_ATTEMPTS, OTP_TTL, OtpCheck, OtpRecord};
use xstore_core::{AdminRole, CityId, Money, OrderStatus};

fn input() -> ProductInput {
    ProductInput {
        name: "  Parle-G 800g ".to_owned(),
        category: "Biscuits".to_owned(),
        mrp: Money::from_rupees(100),
        selling_price: Money::from_rupees(65),
        image_url: Some("   ".to_owned()),
        expiry_date: NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
        quantity: 48,
        is_hot_deal: true,
        cities: vec![CityId::new(3), CityId::new(1), CityId::new(3)],
    }
}

#[test]
fn test_product_input_is_normalised() {
    let draft = input().validate().unwrap();
    assert_eq!(draft.name, "Parle-G 800g");
    assert_eq!(draft.image_url, None);
    assert_eq!(draft.cities, vec![CityId::new(1), CityId::new(3)]);
}

#[test]
fn test_selling_price_above_mrp_is_rejected() {
    let err = ProductInput {
        selling_price: Money::from_rupees(120),
        ..input()
    }
    .validate()
    .unwrap_err();
    assert!(matches!(err, ProductInputError::PriceAboveMrp { .. }));
}

#[test]
fn test_selling_price_equal_to_mrp_is_allowed() {
    let draft = ProductInput {
        selling_price: Money::from_rupees(100),
        ..input()
    }
    .validate()
    .unwrap();
    assert_eq!(draft.selling_price, draft.mrp);
}

#[test]
fn test_product_input_rejects_bad_fields() {
    let blank = ProductInput {
        category: " ".to_owned(),
        ..input()
    };
    assert!(matches!(
        blank.validate(),
        Err(ProductInputError::MissingField(_))
    ));

    let free = ProductInput {
        selling_price: Money::zero(),
        ..input()
    };
    assert!(matches!(
        free.validate(),
        Err(ProductInputError::NonPositivePrice(_))
    ));

    let negative = ProductInput {
        quantity: -1,
        ..input()
    };
    assert_eq!(negative.validate(), Err(ProductInputError::NegativeStock));
}

#[test]
fn test_zero_stock_is_allowed() {
    let draft = ProductInput {
        quantity: 0,
        ..input()
    }
    .validate()
    .unwrap();
    assert_eq!(draft.quantity, 0);
}

#[test]
fn test_city_input_defaults_to_active() {
    let city: CityInput = serde_json::from_str(r#"{"name":" Indore "}"#).unwrap();
    assert!(city.is_active);
    assert_eq!(city.validated_name().unwrap(), "Indore");
}

#[test]
fn test_approval_code_valid_until_ten_minutes() {
    let issued = Utc::now();
    let record = OtpRecord {
        code: "482913",
        attempts: 0,
        expires_at: otp::expires_at(issued),
    };

    assert_eq!(OTP_TTL, Duration::minutes(10));
    assert_eq!(record.check("482913", issued + OTP_TTL), OtpCheck::Valid);
    assert_eq!(
        record.check("482913", issued + OTP_TTL + Duration::seconds(1)),
        OtpCheck::Expired
    );
}

#[test]
fn test_approval_code_mismatch_and_attempt_budget() {
    let now = Utc::now();
    let mut record = OtpRecord {
        code: "482913",
        attempts: 0,
        expires_at: otp::expires_at(now),
    };

    assert_eq!(record.check("000000", now), OtpCheck::Mismatch);
    assert_eq!(record.check(" 482913 ", now), OtpCheck::Valid);

    record.attempts = OTP_MAX_ATTEMPTS;
    assert_eq!(record.check("482913", now), OtpCheck::TooManyAttempts);
}

#[test]
fn test_approval_code_shape() {
    assert!(otp::is_well_formed("012345"));
    assert!(!otp::is_well_formed("12345"));
    assert!(!otp::is_well_formed("12a456"));
}

#[test]
fn test_order_status_flow() {
    use OrderStatus::{Cancelled, Confirmed, Delivered, Dispatched, Pending};

    assert!(Pending.can_transition_to(Confirmed));
    assert!(Confirmed.can_transition_to(Dispatched));
    assert!(Dispatched.can_transition_to(Delivered));
    assert!(Pending.can_transition_to(Cancelled));

    assert!(!Delivered.can_transition_to(Pending));
    assert!(!Cancelled.can_transition_to(Confirmed));
    assert!(Delivered.is_terminal());
    assert!(Cancelled.is_terminal());

    assert_eq!("dispatched".parse::<OrderStatus>().unwrap(), Dispatched);
    assert!("shipped".parse::<OrderStatus>().is_err());
}

#[test]
fn test_admin_role_parsing() {
    assert_eq!("super_admin".parse::<AdminRole>().unwrap(), AdminRole::SuperAdmin);
    assert_eq!("admin".parse::<AdminRole>().unwrap(), AdminRole::Admin);
    assert!("owner".parse::<AdminRole>().is_err());
    assert_eq!(AdminRole::SuperAdmin.to_string(), "super_admin");
}
