//! Process configuration
//!
//! Read from environment variables at startup:
//!
//! | Variable                       | Default        |
//! |--------------------------------|----------------|
//! | `TELEMETRY_BIND_ADDR`          | `0.0.0.0:3001` |
//! | `TELEMETRY_LOG_DIR`            | `logs`         |
//! | `TELEMETRY_MAX_BUFFER_SIZE`    | `100`          |
//! | `TELEMETRY_FLUSH_INTERVAL_MS`  | `5000`         |
//! | `TELEMETRY_LOG_LEVEL`          | `info`         |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::ingest::IngestConfig;

pub const ENV_BIND_ADDR: &str = "TELEMETRY_BIND_ADDR";
pub const ENV_LOG_DIR: &str = "TELEMETRY_LOG_DIR";
pub const ENV_MAX_BUFFER_SIZE: &str = "TELEMETRY_MAX_BUFFER_SIZE";
pub const ENV_FLUSH_INTERVAL_MS: &str = "TELEMETRY_FLUSH_INTERVAL_MS";
pub const ENV_LOG_LEVEL: &str = "TELEMETRY_LOG_LEVEL";

/// Errors raised while reading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} has invalid value '{value}': {reason}")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Filter directive for process logging (e.g. `info`, `telemetry_ingest=debug`)
    pub log_level: String,
    pub ingest: IngestConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3001)),
            log_level: "info".to_string(),
            ingest: IngestConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load using an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_BIND_ADDR) {
            config.bind_addr = parse_var(ENV_BIND_ADDR, &value)?;
        }
        if let Some(value) = lookup(ENV_LOG_LEVEL) {
            config.log_level = value;
        }
        if let Some(value) = lookup(ENV_LOG_DIR) {
            config.ingest.log_dir = PathBuf::from(value);
        }
        if let Some(value) = lookup(ENV_MAX_BUFFER_SIZE) {
            let size: usize = parse_var(ENV_MAX_BUFFER_SIZE, &value)?;
            if size == 0 {
                return Err(ConfigError::InvalidValue {
                    var: ENV_MAX_BUFFER_SIZE,
                    value,
                    reason: "must be at least 1".to_string(),
                });
            }
            config.ingest.max_buffer_size = size;
        }
        if let Some(value) = lookup(ENV_FLUSH_INTERVAL_MS) {
            let millis: u64 = parse_var(ENV_FLUSH_INTERVAL_MS, &value)?;
            if millis == 0 {
                return Err(ConfigError::InvalidValue {
                    var: ENV_FLUSH_INTERVAL_MS,
                    value,
                    reason: "must be at least 1".to_string(),
                });
            }
            config.ingest.flush_interval = Duration::from_millis(millis);
        }

        Ok(config)
    }
}

fn parse_var<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidValue {
            var,
            value: value.to_string(),
            reason: e.to_string(),
        })
}
