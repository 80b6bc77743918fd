//! Xstore Core - Shared types and ordering rules.
//!
//! This crate provides the types and rules used across all Xstore components:
//! - `storefront` - Public ordering API for shops
//! - `admin` - Back-office API for products, cities, and orders
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. Cart arithmetic, product filtering, checkout
//! validation, and one-time-code checks all live here so both binaries apply
//! exactly the same rules.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, emails, phone numbers, and statuses
//! - [`money`] - Rupee amounts with Indian digit grouping
//! - [`catalog`] - Products, cities, and catalogue filtering
//! - [`cart`] - Shopping cart and the minimum order value
//! - [`order`] - Checkout details validation
//! - [`otp`] - Admin approval code rules

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod money;
pub mod order;
pub mod otp;
pub mod types;

pub use cart::{Cart, CartError, CartItem, CartProduct, MINIMUM_ORDER_VALUE};
pub use catalog::{City, Product, ProductFilter};
pub use money::Money;
pub use order::{CheckoutDetails, CheckoutError, ValidCheckout};
pub use types::*;
