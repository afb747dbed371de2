//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `MAILMIRROR_DATABASE_URL` - `PostgreSQL` connection string (falls back
//!   to the generic `DATABASE_URL`)
//! - `MAILCHIMP_API_KEY` - MailChimp Marketing API key (`<key>-<dc>` form)
//!
//! ## Optional
//! - `MAILMIRROR_HOST` - Bind address (default: 127.0.0.1)
//! - `MAILMIRROR_PORT` - Listen port (default: 3000)
//! - `MAILCHIMP_BASE_URL` - Override for the MailChimp API base URL
//!   (normally derived from the API key's datacenter suffix)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// MailChimp API configuration
    pub mailchimp: MailchimpConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// MailChimp API configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct MailchimpConfig {
    /// MailChimp API key, `<key>-<dc>` form (e.g. `abc123-us14`)
    pub api_key: SecretString,
    /// Explicit base URL; when unset the datacenter suffix of the key is used
    pub base_url: Option<String>,
}

impl std::fmt::Debug for MailchimpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailchimpConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("MAILMIRROR_DATABASE_URL")?;
        let host = get_env_or_default("MAILMIRROR_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("MAILMIRROR_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("MAILMIRROR_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("MAILMIRROR_PORT".to_string(), e.to_string()))?;

        let mailchimp = MailchimpConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            database_url,
            host,
            port,
            mailchimp,
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl MailchimpConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: get_required_secret("MAILCHIMP_API_KEY")?,
            base_url: get_optional_env("MAILCHIMP_BASE_URL"),
        })
    }

    /// Resolve the API base URL.
    ///
    /// MailChimp keys carry their datacenter as a suffix (`-us14`); the API
    /// lives at `https://<dc>.api.mailchimp.com/3.0`. An explicit
    /// `base_url` takes precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the key has no datacenter
    /// suffix and no base URL was configured.
    pub fn resolve_base_url(&self) -> Result<String, ConfigError> {
        if let Some(url) = &self.base_url {
            return Ok(url.trim_end_matches('/').to_string());
        }

        let key = self.api_key.expose_secret();
        let datacenter = key.rsplit('-').next().filter(|dc| !dc.is_empty() && *dc != key);

        datacenter.map_or_else(
            || {
                Err(ConfigError::InvalidEnvVar(
                    "MAILCHIMP_API_KEY".to_string(),
                    "expected a datacenter suffix (e.g. `-us14`)".to_string(),
                ))
            },
            |dc| Ok(format!("https://{dc}.api.mailchimp.com/3.0")),
        )
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
