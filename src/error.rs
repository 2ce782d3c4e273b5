//! Error types for the expiry cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the expiry cache.
///
/// Lookups and deletions of absent keys are not errors; the only failures
/// are configuration mistakes caught before a cache exists.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// The cache was built without an expire callback
    #[error("expire callback is required")]
    MissingExpireCallback,

    /// A configuration value could not be parsed
    #[error("Invalid config value for {name}: {value:?}")]
    InvalidConfig { name: &'static str, value: String },
}

// == Result Type Alias ==
/// Convenience Result type for the expiry cache.
pub type Result<T> = std::result::Result<T, CacheError>;
