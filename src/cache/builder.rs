//! Cache Builder
//!
//! Collects construction-time options and rejects incomplete configurations.

use std::time::Duration;

use tracing::debug;

use crate::cache::{Cache, Combinator};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::expire::ExpireCallback;
use crate::shutdown::ShutdownSignal;

// == Cache Builder ==
/// Builder for [`Cache`].
///
/// The expire callback is mandatory; everything else has a default. The
/// combinator can only be chosen here, so it never changes while the cache
/// is in use.
pub struct CacheBuilder<V> {
    default_ttl: Duration,
    on_expire: Option<Box<dyn ExpireCallback<V>>>,
    combinator: Option<Combinator<V>>,
    shutdown: ShutdownSignal,
}

impl<V> CacheBuilder<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Starts from [`Config::default`] with a shutdown signal that never fires.
    pub fn new() -> Self {
        Self::from_config(&Config::default())
    }

    /// Starts from the values in `config`.
    pub fn from_config(config: &Config) -> Self {
        Self {
            default_ttl: config.default_ttl,
            on_expire: None,
            combinator: None,
            shutdown: ShutdownSignal::never(),
        }
    }

    /// Sets the TTL used by `Cache::set`.
    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Sets the callback invoked once for every removed entry.
    pub fn on_expire(mut self, on_expire: impl ExpireCallback<V>) -> Self {
        self.on_expire = Some(Box::new(on_expire));
        self
    }

    /// Sets the merge applied when an existing key is written: `(old, new) -> merged`.
    pub fn combinator<F>(mut self, combine: F) -> Self
    where
        F: Fn(&V, V) -> V + Send + Sync + 'static,
    {
        self.combinator = Some(Box::new(combine));
        self
    }

    /// Sets the signal that expires every entry early.
    pub fn shutdown(mut self, signal: ShutdownSignal) -> Self {
        self.shutdown = signal;
        self
    }

    /// Builds the cache.
    ///
    /// # Errors
    /// [`CacheError::MissingExpireCallback`] if no callback was set.
    pub fn build(self) -> Result<Cache<V>> {
        let on_expire = self.on_expire.ok_or(CacheError::MissingExpireCallback)?;
        debug!(
            default_ttl_ms = self.default_ttl.as_millis() as u64,
            combinator = self.combinator.is_some(),
            "building cache"
        );
        Ok(Cache::from_parts(
            self.shutdown,
            self.default_ttl,
            on_expire,
            self.combinator,
        ))
    }
}

impl<V> Default for CacheBuilder<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
