//! Configuration loading and representation.
//!
//! Everything comes from environment variables; missing optional values fall
//! back to development defaults. Loading happens before logging is set up, so
//! this module does not log.

use std::net::SocketAddr;

use thiserror::Error;

pub use couponapi_observability::LogFormat;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Which coupon store to wire up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    InMemory,
    Postgres {
        database_url: String,
        max_connections: u32,
    },
}

/// Process configuration for the coupon service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub storage: StorageConfig,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            storage: StorageConfig::InMemory,
            log_format: LogFormat::Json,
        }
    }
}

impl AppConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup (tests pass a map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_raw = lookup("COUPONS_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.parse::<SocketAddr>().map_err(|e| ConfigError::Invalid {
            var: "COUPONS_BIND_ADDR",
            reason: format!("'{bind_raw}': {e}"),
        })?;

        let storage = match lookup("DATABASE_URL").filter(|v| !v.trim().is_empty()) {
            Some(database_url) => {
                let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
                    Some(raw) => raw.trim().parse::<u32>().map_err(|e| ConfigError::Invalid {
                        var: "DATABASE_MAX_CONNECTIONS",
                        reason: format!("'{raw}': {e}"),
                    })?,
                    None => DEFAULT_MAX_CONNECTIONS,
                };
                StorageConfig::Postgres {
                    database_url,
                    max_connections,
                }
            }
            None => StorageConfig::InMemory,
        };

        let log_format = match lookup("LOG_FORMAT") {
            Some(raw) => raw.parse::<LogFormat>().map_err(|e| ConfigError::Invalid {
                var: "LOG_FORMAT",
                reason: format!("{e}"),
            })?,
            None => LogFormat::default(),
        };

        Ok(Self {
            bind_addr,
            storage,
            log_format,
        })
    }
}
