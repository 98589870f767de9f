//! Environment-driven configuration.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use axum::http::HeaderValue;
use sqlx::postgres::{PgConnectOptions, PgSslMode};

use crate::error::ConfigError;
use crate::import::DEFAULT_CSV_PATH;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost/healthcare";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
/// Request bodies above this size are rejected.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Deployment mode from `NODE_ENV`. Only affects database TLS.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Production,
    Development,
}

impl Environment {
    fn from_value(v: Option<&str>) -> Self {
        match v {
            Some(s) if s.eq_ignore_ascii_case("production") => Environment::Production,
            _ => Environment::Development,
        }
    }

    /// Production requires TLS but does not verify the server certificate.
    pub fn ssl_mode(self) -> PgSslMode {
        match self {
            Environment::Production => PgSslMode::Require,
            Environment::Development => PgSslMode::Disable,
        }
    }
}

/// Allowed CORS origins from `CORS_ORIGIN`: `*` or a comma-separated list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CorsOrigins {
    Any,
    List(Vec<HeaderValue>),
}

impl CorsOrigins {
    /// Every listed origin must be a valid header value.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let list: Vec<&str> = s.split(',').map(str::trim).filter(|o| !o.is_empty()).collect();
        if list.is_empty() || list.contains(&"*") {
            return Ok(CorsOrigins::Any);
        }
        list.into_iter()
            .map(|o| {
                HeaderValue::from_str(o).map_err(|_| ConfigError::Invalid {
                    key: "CORS_ORIGIN",
                    value: o.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(CorsOrigins::List)
    }
}

/// Fixed-window limit applied per client address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        RateLimitConfig {
            max_requests: 100,
            window: Duration::from_secs(15 * 60),
        }
    }
}

/// Settings for the router's middleware stack.
#[derive(Clone, Debug)]
pub struct HttpConfig {
    pub cors_origins: CorsOrigins,
    pub rate_limit: RateLimitConfig,
    pub max_body_bytes: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig {
            cors_origins: CorsOrigins::Any,
            rate_limit: RateLimitConfig::default(),
            max_body_bytes: MAX_BODY_BYTES,
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub environment: Environment,
    pub max_connections: u32,
    pub csv_path: PathBuf,
    pub http: HttpConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset and empty values take defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = parse_or(get("API_PORT"), "API_PORT", DEFAULT_PORT)?;
        let max_connections = parse_or(
            get("DATABASE_MAX_CONNECTIONS"),
            "DATABASE_MAX_CONNECTIONS",
            DEFAULT_MAX_CONNECTIONS,
        )?;
        let cors_origins = match get("CORS_ORIGIN") {
            Some(s) => CorsOrigins::parse(&s)?,
            None => CorsOrigins::Any,
        };

        Ok(AppConfig {
            port,
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.into()),
            environment: Environment::from_value(get("NODE_ENV").as_deref()),
            max_connections,
            csv_path: get("CSV_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CSV_PATH)),
            http: HttpConfig {
                cors_origins,
                ..HttpConfig::default()
            },
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }

    pub fn connect_options(&self) -> Result<PgConnectOptions, ConfigError> {
        let opts = PgConnectOptions::from_str(&self.database_url).map_err(ConfigError::DatabaseUrl)?;
        Ok(opts.ssl_mode(self.environment.ssl_mode()))
    }
}

fn parse_or<T: FromStr>(value: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid { key, value: v }),
    }
}
