//! Cache Entry Module
//!
//! Defines the per-key value holder and the signal that stops its janitor.

use std::fmt;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::Instant;

// == Removal Cause ==
/// Why an entry left the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalCause {
    /// The entry's TTL elapsed
    Expired,
    /// The entry was removed by `Cache::delete`
    Deleted,
    /// The shutdown signal fired while the entry was live
    Shutdown,
}

impl fmt::Display for RemovalCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemovalCause::Expired => write!(f, "expired"),
            RemovalCause::Deleted => write!(f, "deleted"),
            RemovalCause::Shutdown => write!(f, "shutdown"),
        }
    }
}

// == Cache Entry ==
/// A stored value plus the one-shot signal used to stop its janitor early.
#[derive(Debug)]
pub(crate) struct CacheEntry<V> {
    /// The stored value
    pub(crate) value: V,
    /// Distinguishes this insertion from later insertions of the same key
    pub(crate) generation: u64,
    inserted_at: Instant,
    ttl: Duration,
    cancel: oneshot::Sender<()>,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates an entry and the receiver its janitor listens on.
    pub(crate) fn new(value: V, generation: u64, ttl: Duration) -> (Self, oneshot::Receiver<()>) {
        let (cancel, cancelled) = oneshot::channel();
        let entry = Self {
            value,
            generation,
            inserted_at: Instant::now(),
            ttl,
            cancel,
        };
        (entry, cancelled)
    }

    // == Time To Live ==
    /// Remaining time until the janitor's timer fires.
    ///
    /// Updates never reset this; it always counts from insertion.
    pub(crate) fn ttl_remaining(&self) -> Duration {
        self.ttl.saturating_sub(self.inserted_at.elapsed())
    }

    /// Splits the entry into its value and cancel handle.
    pub(crate) fn into_parts(self) -> (V, EntryCancel) {
        (self.value, EntryCancel(self.cancel))
    }
}

// == Entry Cancel ==
/// Stops the janitor of an entry that has already left the table.
///
/// Dropping it without calling [`EntryCancel::cancel`] also releases the
/// janitor, so only the delete path needs to fire it explicitly.
#[derive(Debug)]
pub(crate) struct EntryCancel(oneshot::Sender<()>);

impl EntryCancel {
    pub(crate) fn cancel(self) {
        // The janitor may already be gone if its timer raced the delete.
        let _ = self.0.send(());
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removal_cause_display() {
        assert_eq!(RemovalCause::Expired.to_string(), "expired");
        assert_eq!(RemovalCause::Deleted.to_string(), "deleted");
        assert_eq!(RemovalCause::Shutdown.to_string(), "shutdown");
    }

    #[tokio::test]
    async fn test_cancel_reaches_receiver() {
        let (entry, cancelled) = CacheEntry::new("value", 7, Duration::from_secs(60));
        assert_eq!(entry.generation, 7);

        let (value, cancel) = entry.into_parts();
        assert_eq!(value, "value");

        cancel.cancel();
        assert!(cancelled.await.is_ok());
    }

    #[tokio::test]
    async fn test_dropped_entry_releases_receiver() {
        let (entry, cancelled) = CacheEntry::new(1u8, 0, Duration::from_secs(60));
        drop(entry);
        assert!(cancelled.await.is_err());
    }

    #[tokio::test]
    async fn test_cancel_after_receiver_dropped() {
        let (entry, cancelled) = CacheEntry::new(1u8, 0, Duration::from_secs(60));
        drop(cancelled);
        let (_, cancel) = entry.into_parts();
        cancel.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_remaining_counts_down() {
        let (entry, _cancelled) = CacheEntry::new((), 0, Duration::from_secs(10));
        assert_eq!(entry.ttl_remaining(), Duration::from_secs(10));

        tokio::time::advance(Duration::from_secs(4)).await;
        assert_eq!(entry.ttl_remaining(), Duration::from_secs(6));

        tokio::time::advance(Duration::from_secs(20)).await;
        assert_eq!(entry.ttl_remaining(), Duration::ZERO);
    }
}
