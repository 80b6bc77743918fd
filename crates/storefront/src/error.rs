//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client. All route handlers return
//! `Result<T, AppError>`; the body is always `{"error": "..."}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use xstore_core::CartError;

use crate::db::RepositoryError;
use crate::services::PlaceOrderError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Cart operation rejected.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Checkout rejected or failed.
    #[error(transparent)]
    Checkout(#[from] PlaceOrderError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Request is well-formed but cannot be honoured in the current state.
    #[error("{0}")]
    Unprocessable(String),

    /// Rate limited.
    #[error("Rate limited")]
    RateLimited,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl AppError {
    const fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Database(_)
                | Self::Session(_)
                | Self::Internal(_)
                | Self::Checkout(PlaceOrderError::Repository(_))
        )
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Session(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Cart(CartError::NotInCart(_)) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Cart(CartError::ZeroQuantity) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Checkout(err) => match err {
                PlaceOrderError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
                PlaceOrderError::InvalidDetails(_) => StatusCode::BAD_REQUEST,
                PlaceOrderError::NoCitySelected
                | PlaceOrderError::CityUnavailable(_)
                | PlaceOrderError::EmptyCart
                | PlaceOrderError::Unavailable(_)
                | PlaceOrderError::InsufficientStock(_)
                | PlaceOrderError::BelowMinimum { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            },
            Self::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    /// Message safe to show to the client.
    fn public_message(&self) -> String {
        match self {
            Self::Database(_)
            | Self::Session(_)
            | Self::Internal(_)
            | Self::Checkout(PlaceOrderError::Repository(_)) => {
                "Internal server error".to_string()
            }
            Self::NotFound(what) => format!("{what} not found"),
            Self::BadRequest(msg) | Self::Unprocessable(msg) => msg.clone(),
            Self::RateLimited => "Too many requests, please slow down".to_string(),
            Self::Cart(err) => err.to_string(),
            Self::Checkout(err) => err.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();
        let body = ErrorBody {
            error: self.public_message(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for shopper actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use xstore_core::{CheckoutError, MINIMUM_ORDER_VALUE, Money, ProductId};

    use super::*;

    async fn body_of(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::NotFound("Product".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Cart(CartError::NotInCart(ProductId::new(3)))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Cart(CartError::ZeroQuantity)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Checkout(PlaceOrderError::EmptyCart)),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            get_status(AppError::Checkout(PlaceOrderError::CityUnavailable(
                "Nagpur".to_string()
            ))),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            get_status(AppError::Checkout(PlaceOrderError::InvalidDetails(
                CheckoutError::MissingField("address")
            ))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::RateLimited),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            get_status(AppError::Internal("boom".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_body_is_json_error() {
        let (status, body) = body_of(AppError::Checkout(PlaceOrderError::BelowMinimum {
            minimum: MINIMUM_ORDER_VALUE,
            total: Money::from_rupees(1000),
            shortfall: Money::from_rupees(2000),
        }))
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body["error"],
            "minimum order value is ₹3,000.00; add ₹2,000.00 more"
        );
    }

    #[tokio::test]
    async fn test_internal_details_are_hidden() {
        let (_, body) = body_of(AppError::Internal("connection refused at 10.0.0.3".into())).await;
        assert_eq!(body["error"], "Internal server error");
    }
}
