//! Delivery city selection.

use axum::{Json, extract::State};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use xstore_core::{City, CityId};

use crate::db::CatalogRepository;
use crate::error::{AppError, Result};
use crate::models::SelectedCity;
use crate::models::session::{load_city, save_city};
use crate::state::AppState;

/// Body for `PUT /api/city`.
#[derive(Debug, Deserialize)]
pub struct SelectCityRequest {
    pub city_id: CityId,
}

/// List active cities, sorted by name.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<City>>> {
    let cities = CatalogRepository::new(state.pool())
        .list_active_cities()
        .await?;
    Ok(Json(cities))
}

/// The city selected in this session, or `null`.
#[instrument(skip(session))]
pub async fn current(session: Session) -> Result<Json<Option<SelectedCity>>> {
    Ok(Json(load_city(&session).await?))
}

/// Select a delivery city.
///
/// The cart is kept; lines not offered in the new city are rejected at
/// checkout.
#[instrument(skip(state, session))]
pub async fn select(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<SelectCityRequest>,
) -> Result<Json<SelectedCity>> {
    let city = CatalogRepository::new(state.pool())
        .get_active_city(request.city_id)
        .await?
        .ok_or_else(|| AppError::NotFound("City".to_string()))?;

    let selected = SelectedCity::from(&city);
    save_city(&session, &selected).await?;

    tracing::debug!(city_id = %selected.id, city = %selected.name, "City selected");
    Ok(Json(selected))
}
