//! Product image uploads.

use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::RequireAdminAuth;
use crate::services::StoredImage;
use crate::state::AppState;

/// Stored images, newest first.
#[instrument(skip(state, _admin))]
pub async fn index(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<StoredImage>>> {
    Ok(Json(state.images().list().await?))
}

/// Upload one image from the `file` field of a multipart form.
///
/// The returned `url` is what goes into a product's `image_url`.
#[instrument(skip(state, admin, multipart), fields(admin = %admin.email))]
pub async fn upload(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<StoredImage>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        let stored = state.images().save(&bytes).await?;
        return Ok((StatusCode::CREATED, Json(stored)));
    }

    Err(AppError::BadRequest("missing `file` field".to_string()))
}
