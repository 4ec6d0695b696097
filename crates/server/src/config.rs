//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `QUINCE_HOST` - Bind address (default: 127.0.0.1)
//! - `QUINCE_PORT` - Listen port (default: 8080)
//! - `QUINCE_LOCKOUT_THRESHOLD` - Failed logins before lockout (default: 5)
//! - `QUINCE_DEFAULT_MIN_STOCK` - Default minimum stock level (default: 10)
//! - `QUINCE_MIN_PASSWORD_LENGTH` - Minimum password length (default: 8)

use std::net::{IpAddr, SocketAddr};

use thiserror::Error;

use quince_commerce::CommerceConfig;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Server application configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// IP address to bind the server to.
    pub host: IpAddr,
    /// Port to listen on.
    pub port: u16,
    /// Commerce thresholds handed to the domain services.
    pub commerce: CommerceConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but unparsable.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env_or("QUINCE_HOST", "127.0.0.1")?;
        let port = parse_env_or("QUINCE_PORT", "8080")?;

        let defaults = CommerceConfig::default();
        let commerce = CommerceConfig {
            lockout_threshold: parse_env_or(
                "QUINCE_LOCKOUT_THRESHOLD",
                &defaults.lockout_threshold.to_string(),
            )?,
            default_minimum_stock_level: parse_env_or(
                "QUINCE_DEFAULT_MIN_STOCK",
                &defaults.default_minimum_stock_level.to_string(),
            )?,
            min_password_length: parse_env_or(
                "QUINCE_MIN_PASSWORD_LENGTH",
                &defaults.min_password_length.to_string(),
            )?,
        };

        Ok(Self {
            host,
            port,
            commerce,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Read and parse an environment variable, falling back to a default.
fn parse_env_or<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_owned());
    raw.parse()
        .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_owned(), e.to_string()))
}
