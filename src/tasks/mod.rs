//! Background Tasks Module
//!
//! Contains the tasks the cache runs alongside its callers.
//!
//! # Tasks
//! - Janitor: one per live entry, removes it when its TTL elapses or shutdown fires
//! - Drain watch: resolves `Cache::done` once shutdown has fully drained

mod drain;
mod janitor;

pub use drain::Drained;
pub(crate) use drain::spawn_drain_watch;
pub(crate) use janitor::spawn_janitor;
