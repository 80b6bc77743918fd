//! Domain models for the back office.

pub mod admin_user;
pub mod order;
pub mod product;
pub mod session;

pub use admin_user::{AdminRole, AdminUser, AuthUser};
pub use order::{Order, OrderItem, OrderSummary};
pub use product::{CityInput, ProductDraft, ProductInput, ProductInputError};
pub use session::{CurrentAdmin, CurrentUser, session_keys};
