//! Product management.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use xstore_core::{Product, ProductId};

use crate::db::{CityRepository, ProductRepository};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::RequireAdminAuth;
use crate::models::{ProductDraft, ProductInput, ProductInputError};
use crate::state::AppState;

/// Validate the form and make sure every city id exists.
async fn draft_from(state: &AppState, input: ProductInput) -> Result<ProductDraft> {
    let draft = input.validate()?;
    let missing = CityRepository::new(state.pool())
        .missing(&draft.cities)
        .await?;
    if !missing.is_empty() {
        return Err(ProductInputError::UnknownCities(missing).into());
    }
    Ok(draft)
}

async fn load(state: &AppState, id: ProductId) -> Result<Product> {
    ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))
}

/// All products, newest first, including expired and sold-out ones.
#[instrument(skip(state, _admin))]
pub async fn index(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.pool()).list().await?;
    Ok(Json(products))
}

/// One product with its cities.
#[instrument(skip(state, _admin))]
pub async fn show(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    Ok(Json(load(&state, id).await?))
}

/// Create a product and assign its cities.
#[instrument(skip(state, admin, input), fields(admin = %admin.email))]
pub async fn create(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Json(input): Json<ProductInput>,
) -> Result<(StatusCode, Json<Product>)> {
    let draft = draft_from(&state, input).await?;
    let id = ProductRepository::new(state.pool()).create(&draft).await?;

    tracing::info!(product_id = %id, name = %draft.name, "Product created");
    add_breadcrumb("product", "Created product", Some(&[("name", &draft.name)]));

    Ok((StatusCode::CREATED, Json(load(&state, id).await?)))
}

/// Replace a product's fields and city assignment.
#[instrument(skip(state, admin, input), fields(admin = %admin.email))]
pub async fn update(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(input): Json<ProductInput>,
) -> Result<Json<Product>> {
    let draft = draft_from(&state, input).await?;
    ProductRepository::new(state.pool())
        .update(id, &draft)
        .await?;

    tracing::info!(product_id = %id, "Product updated");
    Ok(Json(load(&state, id).await?))
}

/// Delete a product. Past order lines keep their copied name and price.
#[instrument(skip(state, admin), fields(admin = %admin.email))]
pub async fn delete(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<StatusCode> {
    ProductRepository::new(state.pool()).delete(id).await?;
    tracing::info!(product_id = %id, "Product deleted");
    Ok(StatusCode::NO_CONTENT)
}
