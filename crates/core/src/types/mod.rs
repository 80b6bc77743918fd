//! Core types for Xstore.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod phone;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use phone::{PhoneNumber, PhoneNumberError};
pub use status::*;
