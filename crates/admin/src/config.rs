//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `ADMIN_BASE_URL` - Public URL for the back office
//! - `ADMIN_APPROVER_EMAIL` - Inbox that receives admin approval codes
//!
//! ## Optional
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3001)
//! - `XSTORE_UPLOAD_DIR` - Directory product images are written to (default: uploads/product-images)
//! - `XSTORE_IMAGE_BASE_URL` - URL prefix stored for uploaded images (default: /uploads)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Traces sample rate (default: 1.0)
//!
//! ## Optional (SMTP - without it approval codes are only logged)
//! - `SMTP_HOST` - SMTP server hostname
//! - `SMTP_PORT` - SMTP port (default: 587)
//! - `SMTP_USERNAME` - SMTP authentication username
//! - `SMTP_PASSWORD` - SMTP authentication password
//! - `SMTP_FROM` - Email sender address

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use secrecy::SecretString;
use thiserror::Error;

use xstore_core::Email;

use crate::services::ImageStorage;

/// Default directory for uploaded product images.
pub const DEFAULT_UPLOAD_DIR: &str = "uploads/product-images";

/// Default URL prefix under which the storefront serves uploaded images.
pub const DEFAULT_IMAGE_BASE_URL: &str = "/uploads";

/// Values copied from a template `.env` and never filled in.
const PLACEHOLDER_PATTERNS: &[&str] = &["changeme", "placeholder", "your-", "xxx", "todo"];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the back office
    pub base_url: String,
    /// Inbox that receives admin approval codes
    pub approver_email: Email,
    /// Directory product images are written to
    pub upload_dir: PathBuf,
    /// URL prefix stored in `product.image_url` for uploaded files
    pub image_base_url: String,
    /// SMTP configuration; `None` logs approval codes instead of sending them
    pub email: Option<EmailConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Email (SMTP) configuration.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct EmailConfig {
    /// SMTP server hostname
    pub smtp_host: String,
    /// SMTP server port
    pub smtp_port: u16,
    /// SMTP authentication username
    pub smtp_username: String,
    /// SMTP authentication password
    pub smtp_password: SecretString,
    /// Email sender address (From header)
    pub from_address: String,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &"[REDACTED]")
            .field("from_address", &self.from_address)
            .finish()
    }
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing, a value does
    /// not parse, or the SMTP password is a leftover placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let approver_email = Email::parse(&required_env("ADMIN_APPROVER_EMAIL")?)
            .map_err(|e| {
                ConfigError::InvalidEnvVar("ADMIN_APPROVER_EMAIL".to_string(), e.to_string())
            })?;

        Ok(Self {
            database_url: database_url("ADMIN_DATABASE_URL")?,
            host: parse_env_or("ADMIN_HOST", IpAddr::V4(Ipv4Addr::LOCALHOST))?,
            port: parse_env_or("ADMIN_PORT", 3001)?,
            base_url: required_env("ADMIN_BASE_URL")?,
            approver_email,
            upload_dir: optional_env("XSTORE_UPLOAD_DIR")
                .map_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR), PathBuf::from),
            image_base_url: normalize_base_url(
                &optional_env("XSTORE_IMAGE_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_IMAGE_BASE_URL.to_string()),
            ),
            email: EmailConfig::from_env()?,
            sentry_dsn: optional_env("SENTRY_DSN"),
            sentry_environment: optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env_or("SENTRY_SAMPLE_RATE", 1.0)?,
            sentry_traces_sample_rate: parse_env_or("SENTRY_TRACES_SAMPLE_RATE", 1.0)?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Returns true when the back office is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }

    /// Image store backed by the configured upload directory.
    #[must_use]
    pub fn image_storage(&self) -> ImageStorage {
        ImageStorage::new(self.upload_dir.clone(), self.image_base_url.clone())
    }
}

impl EmailConfig {
    /// Load SMTP settings. All of `SMTP_HOST`, `SMTP_USERNAME`,
    /// `SMTP_PASSWORD` and `SMTP_FROM` must be set, or none of them.
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let host = optional_env("SMTP_HOST");
        let username = optional_env("SMTP_USERNAME");
        let password = optional_env("SMTP_PASSWORD");
        let from = optional_env("SMTP_FROM");

        match (host, username, password, from) {
            (Some(smtp_host), Some(smtp_username), Some(password), Some(from_address)) => {
                reject_placeholder(&password, "SMTP_PASSWORD")?;
                Ok(Some(Self {
                    smtp_host,
                    smtp_port: parse_env_or("SMTP_PORT", 587)?,
                    smtp_username,
                    smtp_password: SecretString::from(password),
                    from_address,
                }))
            }
            (None, None, None, None) => Ok(None),
            _ => Err(ConfigError::InvalidEnvVar(
                "SMTP_*".to_string(),
                "SMTP_HOST, SMTP_USERNAME, SMTP_PASSWORD and SMTP_FROM must be set together"
                    .to_string(),
            )),
        }
    }
}

fn required_env(key: &str) -> Result<String, ConfigError> {
    optional_env(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Unset and empty are treated the same.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    optional_env(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// `primary_key`, or the generic `DATABASE_URL` set by `fly postgres attach`.
fn database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    optional_env(primary_key)
        .or_else(|| optional_env("DATABASE_URL"))
        .map(SecretString::from)
        .ok_or_else(|| ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Strip trailing slashes so file names can be appended with a single `/`.
fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn reject_placeholder(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();
    match PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        Some(pattern) => Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("looks like a placeholder (contains '{pattern}')"),
        )),
        None => Ok(()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_config() -> AdminConfig {
        AdminConfig {
            database_url: SecretString::from("postgres://localhost/xstore"),
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3001,
            base_url: "http://localhost:3001".to_string(),
            approver_email: Email::parse("approvals@xstore.in").unwrap(),
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
            email: None,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
        }
    }

    #[test]
    fn test_placeholder_smtp_password_is_rejected() {
        let result = reject_placeholder("ChangeMe-please", "SMTP_PASSWORD");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
        assert!(reject_placeholder("q8Lr2vXw9Tn4", "SMTP_PASSWORD").is_ok());
    }

    #[test]
    fn test_parse_env_default_when_unset() {
        let port: u16 = parse_env_or("XSTORE_TEST_SURELY_UNSET_PORT", 587).unwrap();
        assert_eq!(port, 587);
    }

    #[test]
    fn test_socket_addr() {
        let addr = test_config().socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3001);
    }

    #[test]
    fn test_image_url_joins_without_double_slash() {
        let mut config = test_config();
        assert_eq!(config.image_storage().url_for("a.png"), "/uploads/a.png");

        config.image_base_url = normalize_base_url("https://cdn.xstore.in/img/");
        assert_eq!(
            config.image_storage().url_for("a.png"),
            "https://cdn.xstore.in/img/a.png"
        );
    }

    #[test]
    fn test_email_config_debug_redacts_secrets() {
        let config = EmailConfig {
            smtp_host: "smtp.xstore.in".to_string(),
            smtp_port: 587,
            smtp_username: "mailer@xstore.in".to_string(),
            smtp_password: SecretString::from("super_secret_smtp_password"),
            from_address: "noreply@xstore.in".to_string(),
        };

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("smtp.xstore.in"));
        assert!(debug_output.contains("587"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_smtp_password"));
    }
}
