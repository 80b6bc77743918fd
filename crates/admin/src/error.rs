//! Unified error handling with Sentry integration.
//!
//! Every back-office handler returns `Result<T, AppError>`. Server errors are
//! captured to Sentry before responding; the body is always
//! `{"error": "..."}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::models::{CurrentAdmin, ProductInputError};
use crate::services::{AuthError, OtpError, StorageError};

/// Application-level error type for the back office.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Sign-up or sign-in failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Approval code flow failed.
    #[error(transparent)]
    Otp(#[from] OtpError),

    /// Image upload rejected or failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Product form rejected.
    #[error(transparent)]
    ProductInput(#[from] ProductInputError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// No signed-in account.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Signed in but not allowed.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The change clashes with existing data.
    #[error("{0}")]
    Conflict(String),

    /// Well-formed request that cannot be honoured.
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
    fn is_server_error(&self) -> bool {
        self.status().is_server_error()
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Database(err) => repository_status(err),
            Self::Session(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(err) => match err {
                AuthError::InvalidEmail(_) | AuthError::WeakPassword(_) => StatusCode::BAD_REQUEST,
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::PasswordHash => StatusCode::INTERNAL_SERVER_ERROR,
                AuthError::Repository(err) => repository_status(err),
            },
            Self::Otp(err) => match err {
                OtpError::AlreadyAdmin => StatusCode::CONFLICT,
                OtpError::NoPendingCode
                | OtpError::Malformed
                | OtpError::Expired
                | OtpError::Mismatch { .. } => StatusCode::BAD_REQUEST,
                OtpError::TooManyAttempts => StatusCode::TOO_MANY_REQUESTS,
                OtpError::Email(_) => StatusCode::BAD_GATEWAY,
                OtpError::Repository(err) => repository_status(err),
            },
            Self::Storage(err) => match err {
                StorageError::Empty | StorageError::UnsupportedType => StatusCode::BAD_REQUEST,
                StorageError::TooLarge => StatusCode::PAYLOAD_TOO_LARGE,
                StorageError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::ProductInput(_) | Self::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    /// Message safe to show to the client.
    fn public_message(&self) -> String {
        if self.is_server_error() {
            return match self {
                Self::Otp(OtpError::Email(_)) => {
                    "Could not send the approval email, try again later".to_string()
                }
                _ => "Internal server error".to_string(),
            };
        }
        match self {
            Self::Database(RepositoryError::NotFound) => "Not found".to_string(),
            Self::Database(RepositoryError::Conflict(msg)) | Self::Conflict(msg) => msg.clone(),
            Self::NotFound(what) => format!("{what} not found"),
            Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::BadRequest(msg)
            | Self::Unprocessable(msg) => msg.clone(),
            Self::RateLimited => "Too many requests, please slow down".to_string(),
            other => other.to_string(),
        }
    }
}

const fn repository_status(err: &RepositoryError) -> StatusCode {
    match err {
        RepositoryError::NotFound => StatusCode::NOT_FOUND,
        RepositoryError::Conflict(_) => StatusCode::CONFLICT,
        RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
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

/// Attach the signed-in admin to Sentry events.
pub fn set_sentry_user(admin: &CurrentAdmin) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(admin.id.to_string()),
            email: Some(admin.email.to_string()),
            ..Default::default()
        }));
        scope.set_tag("admin_role", admin.role.to_string());
    });
}

/// Drop user context from Sentry (on sign-out).
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
        scope.remove_tag("admin_role");
    });
}

/// Add a breadcrumb for admin actions.
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
    use xstore_core::{CityId, Money};

    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    async fn body_of(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_repository_errors_map_to_http() {
        assert_eq!(
            get_status(AppError::Database(RepositoryError::NotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::Conflict("taken".into()))),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::DataCorruption("x".into()))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_auth_and_otp_status_codes() {
        assert_eq!(
            get_status(AppError::Auth(AuthError::InvalidCredentials)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::UserAlreadyExists)),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Otp(OtpError::Expired)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Otp(OtpError::Mismatch { remaining: 2 })),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Otp(OtpError::TooManyAttempts)),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            get_status(AppError::Otp(OtpError::AlreadyAdmin)),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_upload_and_form_status_codes() {
        assert_eq!(
            get_status(AppError::Storage(StorageError::TooLarge)),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            get_status(AppError::Storage(StorageError::UnsupportedType)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::ProductInput(ProductInputError::UnknownCities(vec![
                CityId::new(9)
            ]))),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            get_status(AppError::Forbidden("no".into())),
            StatusCode::FORBIDDEN
        );
    }

    #[tokio::test]
    async fn test_conflict_message_is_shown() {
        let (status, body) = body_of(AppError::Database(RepositoryError::Conflict(
            "city is assigned to 2 product(s)".into(),
        )))
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "city is assigned to 2 product(s)");
    }

    #[tokio::test]
    async fn test_validation_message_is_shown() {
        let (_, body) = body_of(AppError::ProductInput(ProductInputError::PriceAboveMrp {
            mrp: Money::from_rupees(100),
            selling_price: Money::from_rupees(120),
        }))
        .await;
        assert_eq!(
            body["error"],
            ProductInputError::PriceAboveMrp {
                mrp: Money::from_rupees(100),
                selling_price: Money::from_rupees(120),
            }
            .to_string()
        );
    }

    #[tokio::test]
    async fn test_internal_details_are_hidden() {
        let (status, body) = body_of(AppError::Internal("pool timed out".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
    }
}
