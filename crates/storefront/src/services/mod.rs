//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `checkout` - Turn a session cart into a cash-on-delivery order

pub mod checkout;

pub use checkout::{CheckoutService, PlaceOrderError, PlacedOrder};
