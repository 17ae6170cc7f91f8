//! Store configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STORE_DATABASE_URL` - `SQLite` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `STORE_DB_MAX_CONNECTIONS` - Pool size for file databases (default: 5)
//! - `STORE_DB_ACQUIRE_TIMEOUT_SECS` - Wait for a pooled connection (default: 10)
//! - `STORE_DB_BUSY_TIMEOUT_SECS` - Wait for the database write lock (default: 5)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::str::FromStr;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 10;
const DEFAULT_BUSY_TIMEOUT_SECS: u64 = 5;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Store configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Database pool configuration
    pub database: DatabaseConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag (e.g. `production`)
    pub sentry_environment: Option<String>,
}

/// Database connection and pool settings.
///
/// Implements `Debug` manually to redact the URL, which may carry a path or
/// credentials that should not reach logs.
#[derive(Clone)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL (e.g. `sqlite://data/shop.db`)
    pub url: SecretString,
    /// Maximum pooled connections for file databases
    pub max_connections: u32,
    /// How long to wait for a pooled connection
    pub acquire_timeout: Duration,
    /// How long a writer waits for the database lock before failing
    pub busy_timeout: Duration,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &"[REDACTED]")
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout", &self.acquire_timeout)
            .field("busy_timeout", &self.busy_timeout)
            .finish()
    }
}

impl DatabaseConfig {
    /// Settings for `url` with default pool limits and timeouts.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: SecretString::from(url.into()),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout: Duration::from_secs(DEFAULT_ACQUIRE_TIMEOUT_SECS),
            busy_timeout: Duration::from_secs(DEFAULT_BUSY_TIMEOUT_SECS),
        }
    }

    /// Whether the URL names an in-memory database.
    #[must_use]
    pub fn is_in_memory(&self) -> bool {
        let url = self.url.expose_secret();
        url.contains(":memory:") || url.contains("mode=memory")
    }

    fn from_env() -> Result<Self, ConfigError> {
        let url = get_database_url("STORE_DATABASE_URL")?;
        let max_connections = parse_env_or_default(
            "STORE_DB_MAX_CONNECTIONS",
            DEFAULT_MAX_CONNECTIONS,
        )?;
        if max_connections == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "STORE_DB_MAX_CONNECTIONS".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        let acquire_timeout = Duration::from_secs(parse_env_or_default(
            "STORE_DB_ACQUIRE_TIMEOUT_SECS",
            DEFAULT_ACQUIRE_TIMEOUT_SECS,
        )?);
        let busy_timeout = Duration::from_secs(parse_env_or_default(
            "STORE_DB_BUSY_TIMEOUT_SECS",
            DEFAULT_BUSY_TIMEOUT_SECS,
        )?);

        Ok(Self {
            url,
            max_connections,
            acquire_timeout,
            busy_timeout,
        })
    }
}

impl StoreConfig {
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

        Ok(Self {
            database: DatabaseConfig::from_env()?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Configuration for an explicit database URL, without reading the environment.
    #[must_use]
    pub fn for_database(url: impl Into<String>) -> Self {
        Self {
            database: DatabaseConfig::new(url),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

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

/// Get an optional environment variable, treating empty as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parse an optional environment variable, falling back to `default`.
fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |raw| parse_value(key, &raw))
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_database_config_defaults() {
        let config = DatabaseConfig::new("sqlite://shop.db");
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.acquire_timeout, Duration::from_secs(10));
        assert_eq!(config.busy_timeout, Duration::from_secs(5));
        assert!(!config.is_in_memory());
    }

    #[test]
    fn test_in_memory_detection() {
        assert!(DatabaseConfig::new("sqlite::memory:").is_in_memory());
        assert!(DatabaseConfig::new("sqlite:file:shop?mode=memory").is_in_memory());
    }

    #[test]
    fn test_database_config_debug_redacts_url() {
        let config = DatabaseConfig::new("sqlite:///srv/private/customers.db");
        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("customers.db"));
        assert!(debug_output.contains("max_connections"));
    }

    #[test]
    fn test_parse_value_trims() {
        let value: u32 = parse_value("STORE_DB_MAX_CONNECTIONS", " 8 ").unwrap();
        assert_eq!(value, 8);
    }

    #[test]
    fn test_parse_value_invalid() {
        let result = parse_value::<u64>("STORE_DB_BUSY_TIMEOUT_SECS", "soon");
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "STORE_DB_BUSY_TIMEOUT_SECS"));
    }

    #[test]
    fn test_for_database_has_no_sentry() {
        let config = StoreConfig::for_database("sqlite::memory:");
        assert!(config.sentry_dsn.is_none());
        assert!(config.database.is_in_memory());
    }
}
