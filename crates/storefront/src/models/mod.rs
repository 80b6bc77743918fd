//! Types the storefront keeps in the session or writes as orders.

pub mod order;
pub mod session;

pub use order::{PricedLine, PricedOrder};
pub use session::{SelectedCity, session_keys};
