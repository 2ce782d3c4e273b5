//! Configuration Module
//!
//! Handles loading cache configuration from environment variables.

use std::env;
use std::time::Duration;

use tracing::warn;

use crate::error::{CacheError, Result};

const DEFAULT_TTL_MS: u64 = 300_000;
const DEFAULT_DRAIN_TIMEOUT_MS: u64 = 5_000;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// TTL applied by `Cache::set`
    pub default_ttl: Duration,
    /// How long a shutting-down process waits for the cache to drain
    pub drain_timeout: Duration,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// Unparsable values fall back to their defaults with a warning.
    ///
    /// # Environment Variables
    /// - `DEFAULT_TTL_MS` - Default TTL in milliseconds (default: 300000)
    /// - `DRAIN_TIMEOUT_MS` - Drain wait in milliseconds (default: 5000)
    pub fn from_env() -> Self {
        Self {
            default_ttl: lenient_ms("DEFAULT_TTL_MS", DEFAULT_TTL_MS),
            drain_timeout: lenient_ms("DRAIN_TIMEOUT_MS", DEFAULT_DRAIN_TIMEOUT_MS),
        }
    }

    /// Like [`Config::from_env`], but rejects unparsable values.
    pub fn try_from_env() -> Result<Self> {
        Ok(Self {
            default_ttl: strict_ms("DEFAULT_TTL_MS", DEFAULT_TTL_MS)?,
            drain_timeout: strict_ms("DRAIN_TIMEOUT_MS", DEFAULT_DRAIN_TIMEOUT_MS)?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_ttl: Duration::from_millis(DEFAULT_TTL_MS),
            drain_timeout: Duration::from_millis(DEFAULT_DRAIN_TIMEOUT_MS),
        }
    }
}

fn strict_ms(name: &'static str, default: u64) -> Result<Duration> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Duration::from_millis)
            .map_err(|_| CacheError::InvalidConfig { name, value: raw }),
        Err(_) => Ok(Duration::from_millis(default)),
    }
}

fn lenient_ms(name: &'static str, default: u64) -> Duration {
    strict_ms(name, default).unwrap_or_else(|err| {
        warn!("{}, using default of {}ms", err, default);
        Duration::from_millis(default)
    })
}
