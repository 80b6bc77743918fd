//! Delivery city management.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use xstore_core::{City, CityId};

use crate::db::{CityRepository, cities::CityWithUsage};
use crate::error::{Result, add_breadcrumb};
use crate::middleware::RequireAdminAuth;
use crate::models::CityInput;
use crate::state::AppState;

/// All cities, active or not, with how many products use each.
#[instrument(skip(state, _admin))]
pub async fn index(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<CityWithUsage>>> {
    Ok(Json(CityRepository::new(state.pool()).list().await?))
}

/// Add a city.
#[instrument(skip(state, admin, input), fields(admin = %admin.email))]
pub async fn create(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Json(input): Json<CityInput>,
) -> Result<(StatusCode, Json<City>)> {
    let name = input.validated_name()?;
    let city = CityRepository::new(state.pool())
        .create(&name, input.is_active)
        .await?;

    tracing::info!(city_id = %city.id, name = %city.name, "City created");
    add_breadcrumb("city", "Created city", Some(&[("name", &city.name)]));
    Ok((StatusCode::CREATED, Json(city)))
}

/// Rename or (de)activate a city.
#[instrument(skip(state, admin, input), fields(admin = %admin.email))]
pub async fn update(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<CityId>,
    Json(input): Json<CityInput>,
) -> Result<Json<City>> {
    let name = input.validated_name()?;
    let city = CityRepository::new(state.pool())
        .update(id, &name, input.is_active)
        .await?;

    tracing::info!(city_id = %id, is_active = city.is_active, "City updated");
    Ok(Json(city))
}

/// Remove a city. Refused with 409 while any product is offered there.
#[instrument(skip(state, admin), fields(admin = %admin.email))]
pub async fn delete(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<CityId>,
) -> Result<StatusCode> {
    CityRepository::new(state.pool()).delete(id).await?;
    tracing::info!(city_id = %id, "City deleted");
    Ok(StatusCode::NO_CONTENT)
}
