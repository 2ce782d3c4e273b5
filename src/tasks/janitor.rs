//! Janitor Task
//!
//! One task per live entry. It races the entry's TTL timer against the global
//! shutdown signal and the entry's own cancel signal, and runs the removal
//! path for whichever of the first two wins.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tracing::trace;

use crate::cache::{CacheInner, RemovalCause};

/// Decrements the live janitor count when the task ends, even by panic or
/// by being dropped before its first poll.
struct LiveGuard<V>(Arc<CacheInner<V>>)
where
    V: Clone + Send + Sync + 'static;

impl<V> Drop for LiveGuard<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn drop(&mut self) {
        self.0.janitor_exited();
    }
}

/// Spawns the janitor for one insertion of `key`.
///
/// The caller must already have counted the janitor as live.
///
/// # Arguments
/// * `cache` - Shared cache state
/// * `key` - Key the janitor is responsible for
/// * `generation` - Insertion the janitor is responsible for
/// * `ttl` - Time until the entry expires
/// * `cancelled` - Fires (or closes) once the entry left the table by other means
pub(crate) fn spawn_janitor<V>(
    cache: Arc<CacheInner<V>>,
    key: String,
    generation: u64,
    ttl: Duration,
    cancelled: oneshot::Receiver<()>,
)
where
    V: Clone + Send + Sync + 'static,
{
    let mut shutdown = cache.shutdown_signal();
    let live = LiveGuard(cache);

    tokio::spawn(async move {
        let cache = &live.0;

        tokio::select! {
            _ = tokio::time::sleep(ttl) => {
                cache.remove(&key, Some(generation), RemovalCause::Expired).await;
            }
            _ = shutdown.recv() => {
                cache.remove(&key, Some(generation), RemovalCause::Shutdown).await;
            }
            _ = cancelled => {
                // Already removed and reported by delete.
                trace!(key = %key, "janitor cancelled");
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use crate::cache::test_support::Recorder;
    use crate::cache::Cache;
    use crate::shutdown::{Shutdown, ShutdownSignal};
    use std::time::Duration;
    use tokio::time::sleep;

    #[tokio::test(start_paused = true)]
    async fn test_timer_branch_expires_entry() {
        let recorder = Recorder::new();
        let cache = Cache::new(ShutdownSignal::never(), Duration::from_secs(5), recorder.clone());

        cache.set("k", 1u8).await;
        assert_eq!(cache.stats().await.live_janitors, 1);

        sleep(Duration::from_secs(6)).await;
        assert_eq!(recorder.calls(), vec![("k".to_string(), 1)]);

        let stats = cache.stats().await;
        assert_eq!(stats.live_janitors, 0);
        assert_eq!(stats.expirations, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_branch_beats_timer() {
        let shutdown = Shutdown::new();
        let recorder = Recorder::new();
        let cache = Cache::new(shutdown.signal(), Duration::from_secs(3600), recorder.clone());

        cache.set("k", 1u8).await;
        shutdown.trigger();
        sleep(Duration::from_millis(1)).await;

        assert_eq!(recorder.count("k"), 1);
        let stats = cache.stats().await;
        assert_eq!(stats.shutdown_evictions, 1);
        assert_eq!(stats.expirations, 0);
        assert_eq!(stats.live_janitors, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_branch_skips_removal() {
        let recorder = Recorder::new();
        let cache = Cache::new(
            ShutdownSignal::never(),
            Duration::from_secs(3600),
            recorder.clone(),
        );

        cache.set("k", 1u8).await;
        cache.delete("k").await;
        sleep(Duration::from_millis(1)).await;

        let stats = cache.stats().await;
        assert_eq!(stats.live_janitors, 0);
        assert_eq!(stats.deletions, 1);
        assert_eq!(stats.removals(), 1);
        assert_eq!(recorder.count("k"), 1);
    }

    #[tokio::test]
    async fn test_panicking_callback_still_releases_janitor() {
        let shutdown = Shutdown::new();
        let callback = |_key: &str, _value: u8| panic!("callback failure");
        let cache = Cache::new(shutdown.signal(), Duration::from_secs(3600), callback);

        cache.set("k", 1).await;
        shutdown.trigger();

        tokio::time::timeout(Duration::from_secs(1), cache.done().wait())
            .await
            .expect("a panicking callback must not block drain");
        assert!(cache.is_empty().await);
    }
}
