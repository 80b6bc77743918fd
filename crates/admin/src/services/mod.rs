//! Business logic services for the back office.
//!
//! # Services
//!
//! - `auth` - Password sign-up and sign-in (Argon2id hashes)
//! - `otp` - Admin approval codes: issue, e-mail, verify, promote
//! - `email` - Email delivery via SMTP
//! - `storage` - Product image uploads on the local filesystem

pub mod auth;
pub mod email;
pub mod otp;
pub mod storage;

pub use auth::{AuthError, AuthService, hash_password};
pub use email::{EmailError, EmailService, generate_verification_code};
pub use otp::{OtpError, OtpService, OtpSent};
pub use storage::{ImageStorage, StorageError, StoredImage};
