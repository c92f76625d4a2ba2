//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3001)
//! - `ADMIN_STATS_TTL_SECS` - Dashboard statistics cache lifetime (default: 60)
//! - `ADMIN_STATS_BACKGROUND_WARM` - Recompute statistics in the background after
//!   writes (default: true)
//! - `SENTRY_DSN`, `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`,
//!   `SENTRY_TRACES_SAMPLE_RATE` - Error tracking

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use distrimart_storefront::config::SentryConfig;
use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_STATS_TTL_SECS: u64 = 60;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Sentry configuration: {0}")]
    Sentry(#[from] distrimart_storefront::config::ConfigError),
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
    /// Statistics cache settings
    pub stats: StatsConfig,
    /// Error tracking configuration
    pub sentry: SentryConfig,
}

/// Dashboard statistics cache settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsConfig {
    pub ttl: Duration,
    pub background_warm: bool,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(DEFAULT_STATS_TTL_SECS),
            background_warm: true,
        }
    }
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let database_url = std::env::var("ADMIN_DATABASE_URL")
            .or_else(|_| std::env::var("DATABASE_URL"))
            .map(SecretString::from)
            .map_err(|_| ConfigError::MissingEnvVar("ADMIN_DATABASE_URL".to_owned()))?;

        let ttl_secs: u64 = parse_env_or_default("ADMIN_STATS_TTL_SECS", DEFAULT_STATS_TTL_SECS)?;
        if ttl_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "ADMIN_STATS_TTL_SECS".to_owned(),
                "must be at least 1".to_owned(),
            ));
        }

        let background_warm = match get_optional_env("ADMIN_STATS_BACKGROUND_WARM") {
            Some(raw) => parse_bool("ADMIN_STATS_BACKGROUND_WARM", &raw)?,
            None => true,
        };

        Ok(Self {
            database_url,
            host: parse_env_or_default("ADMIN_HOST", IpAddr::from([127, 0, 0, 1]))?,
            port: parse_env_or_default("ADMIN_PORT", 3001)?,
            stats: StatsConfig {
                ttl: Duration::from_secs(ttl_secs),
                background_warm,
            },
            sentry: SentryConfig::from_env()?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get_optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_owned(), e.to_string())),
        None => Ok(default),
    }
}

/// Accepts `true`/`false`, `1`/`0`, `yes`/`no` and `on`/`off`.
fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_owned(),
            format!("expected a boolean, got {other:?}"),
        )),
    }
}
