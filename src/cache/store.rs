//! Cache Store Module
//!
//! Main cache engine: a HashMap behind an async RwLock, one janitor task per
//! live entry, and the single removal path that invokes the expire callback.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, RwLock};
use tracing::debug;

use crate::cache::entry::{CacheEntry, EntryCancel};
use crate::cache::{CacheBuilder, CacheStats, Combinator, RemovalCause, StatsRecorder};
use crate::expire::ExpireCallback;
use crate::shutdown::ShutdownSignal;
use crate::tasks::{spawn_drain_watch, spawn_janitor, Drained};

// == Cache ==
/// Concurrency-safe TTL cache that reports every removed entry exactly once.
///
/// Cloning is cheap and yields a handle to the same cache. All methods that
/// create entries spawn tokio tasks and must run inside a tokio runtime.
///
/// # Example
/// ```no_run
/// use std::time::Duration;
/// use expiry_cache::{expire::println_on_expire, Cache, Shutdown};
///
/// #[tokio::main]
/// async fn main() {
///     let shutdown = Shutdown::new();
///     let cache = Cache::new(shutdown.signal(), Duration::from_secs(60), println_on_expire());
///
///     cache.set("1", "my value").await;
///     shutdown.trigger();
///     cache.done().await; // prints "1: my value"
/// }
/// ```
pub struct Cache<V> {
    inner: Arc<CacheInner<V>>,
}

impl<V> Clone for Cache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// State shared between cache handles and janitor tasks.
pub(crate) struct CacheInner<V> {
    table: RwLock<HashMap<String, CacheEntry<V>>>,
    default_ttl: Duration,
    on_expire: Box<dyn ExpireCallback<V>>,
    combinator: Option<Combinator<V>>,
    shutdown: ShutdownSignal,
    /// Number of janitor tasks that have not exited yet
    live: watch::Sender<usize>,
    next_generation: AtomicU64,
    stats: StatsRecorder,
}

impl<V> Cache<V>
where
    V: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates a cache that expires everything once `shutdown` fires.
    ///
    /// # Arguments
    /// * `shutdown` - Observed, never fired, by the cache
    /// * `default_ttl` - TTL used by [`Cache::set`]
    /// * `on_expire` - Called once for every entry that leaves the cache
    pub fn new(
        shutdown: ShutdownSignal,
        default_ttl: Duration,
        on_expire: impl ExpireCallback<V>,
    ) -> Self {
        Self::from_parts(shutdown, default_ttl, Box::new(on_expire), None)
    }

    /// Starts a [`CacheBuilder`].
    pub fn builder() -> CacheBuilder<V> {
        CacheBuilder::new()
    }

    pub(crate) fn from_parts(
        shutdown: ShutdownSignal,
        default_ttl: Duration,
        on_expire: Box<dyn ExpireCallback<V>>,
        combinator: Option<Combinator<V>>,
    ) -> Self {
        let (live, _) = watch::channel(0);
        Self {
            inner: Arc::new(CacheInner {
                table: RwLock::new(HashMap::new()),
                default_ttl,
                on_expire,
                combinator,
                shutdown,
                live,
                next_generation: AtomicU64::new(0),
                stats: StatsRecorder::default(),
            }),
        }
    }

    // == Set ==
    /// Stores a value with the default TTL.
    pub async fn set(&self, key: impl Into<String>, value: V) {
        self.set_with_ttl(key, value, self.inner.default_ttl).await
    }

    /// Stores a value for a key.
    ///
    /// A new key gets its own janitor that removes it after `ttl`. Writing an
    /// existing key replaces (or combines) the value but keeps the original
    /// expiry; `ttl` is ignored in that case.
    pub async fn set_with_ttl(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let key = key.into();
        let mut table = self.inner.table.write().await;

        if let Some(entry) = table.get_mut(&key) {
            entry.value = match &self.inner.combinator {
                Some(combine) => combine(&entry.value, value),
                None => value,
            };
            self.inner.stats.record_update();
            debug!(key = %key, "updated entry");
            return;
        }

        let generation = self.inner.next_generation.fetch_add(1, Ordering::Relaxed);
        let (entry, cancelled) = CacheEntry::new(value, generation, ttl);
        table.insert(key.clone(), entry);
        self.inner.live.send_modify(|live| *live += 1);
        self.inner.stats.record_insert();
        debug!(key = %key, ttl_ms = ttl.as_millis() as u64, "inserted entry");

        spawn_janitor(Arc::clone(&self.inner), key, generation, ttl, cancelled);
    }

    // == Get ==
    /// Returns a copy of the value stored for `key`, if any.
    pub async fn get(&self, key: &str) -> Option<V> {
        let value = {
            let table = self.inner.table.read().await;
            table.get(key).map(|entry| entry.value.clone())
        };
        self.inner.stats.record_lookup(value.is_some());
        value
    }

    // == Delete ==
    /// Removes `key`, invoking the expire callback if it was present.
    ///
    /// Returns true if an entry was removed. Deleting an absent key is a no-op.
    pub async fn delete(&self, key: &str) -> bool {
        match self.inner.remove(key, None, RemovalCause::Deleted).await {
            Some(cancel) => {
                cancel.cancel();
                true
            }
            None => false,
        }
    }

    // == Done ==
    /// Returns a handle that completes once the shutdown signal has fired and
    /// every janitor has exited, i.e. the expire callback ran for every entry.
    ///
    /// Without a shutdown the handle never completes, even if every entry
    /// expired on its own.
    pub fn done(&self) -> Drained {
        spawn_drain_watch(self.inner.shutdown.clone(), self.inner.live.subscribe())
    }

    // == Introspection ==
    /// Returns true if `key` is currently stored.
    pub async fn contains_key(&self, key: &str) -> bool {
        self.inner.table.read().await.contains_key(key)
    }

    /// Remaining time before `key` expires, if it is stored.
    pub async fn ttl_remaining(&self, key: &str) -> Option<Duration> {
        let table = self.inner.table.read().await;
        table.get(key).map(|entry| entry.ttl_remaining())
    }

    /// Returns the current number of entries in the cache.
    pub async fn len(&self) -> usize {
        self.inner.table.read().await.len()
    }

    /// Returns true if the cache is empty.
    pub async fn is_empty(&self) -> bool {
        self.inner.table.read().await.is_empty()
    }

    /// TTL applied by [`Cache::set`].
    pub fn default_ttl(&self) -> Duration {
        self.inner.default_ttl
    }

    /// Returns current cache statistics.
    pub async fn stats(&self) -> CacheStats {
        let total_entries = self.len().await;
        let live_janitors = *self.inner.live.borrow();
        self.inner.stats.snapshot(live_janitors, total_entries)
    }
}

impl<V> CacheInner<V>
where
    V: Clone + Send + Sync + 'static,
{
    // == Removal Path ==
    /// Removes `key` and hands its value to the expire callback.
    ///
    /// This is the only caller of the expire callback. With `generation` set,
    /// only that particular insertion of the key is removed, so a janitor
    /// cannot evict an entry that replaced its own. Returns `None` if nothing
    /// was removed.
    pub(crate) async fn remove(
        &self,
        key: &str,
        generation: Option<u64>,
        cause: RemovalCause,
    ) -> Option<EntryCancel> {
        let entry = {
            let mut table = self.table.write().await;
            let owned = table
                .get(key)
                .is_some_and(|entry| generation.map_or(true, |g| g == entry.generation));
            if !owned {
                return None;
            }
            table.remove(key)?
        };

        self.stats.record_removal(cause);
        debug!(key, %cause, "removed entry");

        // Outside the lock: a slow callback must not stall the cache.
        let (value, cancel) = entry.into_parts();
        self.on_expire.on_expire(key, value);
        Some(cancel)
    }

    pub(crate) fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    pub(crate) fn janitor_exited(&self) {
        self.live.send_modify(|live| *live -= 1);
        if self.shutdown.is_fired() {
            debug!(remaining = *self.live.borrow(), "janitor exited during shutdown");
        }
    }
}
