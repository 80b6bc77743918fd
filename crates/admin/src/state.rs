//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AdminConfig;
use crate::services::{EmailService, ImageStorage};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    email: Option<EmailService>,
    images: ImageStorage,
}

impl AppState {
    /// Create a new application state.
    ///
    /// `email` is `None` when SMTP is not configured.
    #[must_use]
    pub fn new(config: AdminConfig, pool: PgPool, email: Option<EmailService>) -> Self {
        let images = config.image_storage();
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                email,
                images,
            }),
        }
    }

    /// Get a reference to the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get the email service, if SMTP is configured.
    #[must_use]
    pub fn email(&self) -> Option<&EmailService> {
        self.inner.email.as_ref()
    }

    /// Get the product image store.
    #[must_use]
    pub fn images(&self) -> &ImageStorage {
        &self.inner.images
    }
}
