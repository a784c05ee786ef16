//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `API_HOST` - Bind address (default: 0.0.0.0)
//! - `PORT` - Listen port (default: 5000)
//! - `DATABASE_URL` - `PostgreSQL` connection string; without it products are
//!   kept in memory and lost on restart
//! - `DATABASE_MAX_CONNECTIONS` - Pool size (default: 10)
//! - `APP_ENV` - `development` or `production` (default: development). Store
//!   error details are only returned to clients outside production.
//! - `LOG_FORMAT` - `json` or `pretty` (default: json)
//! - `RUST_LOG` - tracing filter (default: info)

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use catalog_observability::LogFormat;
use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppEnvironment {
    #[default]
    Development,
    Production,
}

impl AppEnvironment {
    pub fn is_production(self) -> bool {
        self == Self::Production
    }
}

/// API application configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: Option<SecretString>,
    pub database_max_connections: u32,
    pub environment: AppEnvironment,
    pub log_format: LogFormat,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = parse_or(&get, "API_HOST", IpAddr::V4(Ipv4Addr::UNSPECIFIED))?;
        let port = parse_or(&get, "PORT", 5000u16)?;
        let database_url = get("DATABASE_URL").map(SecretString::from);
        let database_max_connections = parse_or(&get, "DATABASE_MAX_CONNECTIONS", 10u32)?;
        if database_max_connections == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "DATABASE_MAX_CONNECTIONS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let environment = match get("APP_ENV").as_deref().map(str::trim) {
            None => AppEnvironment::default(),
            Some(v) if v.eq_ignore_ascii_case("production") || v.eq_ignore_ascii_case("prod") => {
                AppEnvironment::Production
            }
            Some(v) if v.eq_ignore_ascii_case("development") || v.eq_ignore_ascii_case("dev") => {
                AppEnvironment::Development
            }
            Some(other) => {
                return Err(ConfigError::InvalidEnvVar(
                    "APP_ENV".to_string(),
                    format!("unknown environment `{other}`"),
                ));
            }
        };

        let log_format = parse_or(&get, "LOG_FORMAT", LogFormat::default())?;

        Ok(Self {
            host,
            port,
            database_url,
            database_max_connections,
            environment,
            log_format,
        })
    }

    /// Returns the socket address for binding the server.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
    }
}
