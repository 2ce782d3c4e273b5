//! Expiry Cache - An in-memory TTL cache with exactly-once expire callbacks
//!
//! Every entry is reported to a user-supplied callback exactly once when it
//! leaves the cache, whether it expired, was deleted, or was evicted by a
//! shutdown signal. `Cache::done` resolves once a shut-down cache has
//! reported everything.

pub mod cache;
pub mod config;
pub mod error;
pub mod expire;
pub mod shutdown;
pub mod tasks;

pub use cache::{Cache, CacheBuilder, CacheStats};
pub use config::Config;
pub use error::{CacheError, Result};
pub use shutdown::{Shutdown, ShutdownSignal};
pub use tasks::Drained;
