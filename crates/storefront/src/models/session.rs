//! Session-stored shopper state.
//!
//! Shops do not sign in. Their selected city and cart live in the
//! server-side session so a browser keeps its cart across visits.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use xstore_core::{Cart, City, CityId};

/// The city the shopper is ordering for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedCity {
    pub id: CityId,
    pub name: String,
}

impl From<&City> for SelectedCity {
    fn from(city: &City) -> Self {
        Self {
            id: city.id,
            name: city.name.clone(),
        }
    }
}

/// Session keys for shopper data.
pub mod session_keys {
    /// Key for the shopper's cart.
    pub const CART: &str = "cart";

    /// Key for the selected delivery city.
    pub const CITY: &str = "city";
}

/// Load the cart from the session, or an empty one.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn load_cart(session: &Session) -> Result<Cart, tower_sessions::session::Error> {
    Ok(session
        .get::<Cart>(session_keys::CART)
        .await?
        .unwrap_or_default())
}

/// Persist the cart in the session.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn save_cart(session: &Session, cart: &Cart) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CART, cart).await
}

/// Load the selected city, if any.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn load_city(
    session: &Session,
) -> Result<Option<SelectedCity>, tower_sessions::session::Error> {
    session.get::<SelectedCity>(session_keys::CITY).await
}

/// Persist the selected city.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn save_city(
    session: &Session,
    city: &SelectedCity,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CITY, city).await
}
