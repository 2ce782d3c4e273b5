//! Cache Statistics Module
//!
//! Tracks lookups and entry lifecycle events.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::cache::RemovalCause;

// == Cache Stats ==
/// Point-in-time snapshot of cache counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of lookups that found a value
    pub hits: u64,
    /// Number of lookups for absent keys
    pub misses: u64,
    /// Number of entries created
    pub inserts: u64,
    /// Number of writes to an existing key
    pub updates: u64,
    /// Number of entries removed because their TTL elapsed
    pub expirations: u64,
    /// Number of entries removed by delete
    pub deletions: u64,
    /// Number of entries removed because shutdown fired
    pub shutdown_evictions: u64,
    /// Number of janitor tasks still running
    pub live_janitors: usize,
    /// Current number of entries in the cache
    pub total_entries: usize,
}

impl CacheStats {
    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Total number of expire callback invocations so far.
    pub fn removals(&self) -> u64 {
        self.expirations + self.deletions + self.shutdown_evictions
    }
}

// == Stats Recorder ==
/// Lock-free counters shared by the cache and its janitors.
#[derive(Debug, Default)]
pub(crate) struct StatsRecorder {
    hits: AtomicU64,
    misses: AtomicU64,
    inserts: AtomicU64,
    updates: AtomicU64,
    expirations: AtomicU64,
    deletions: AtomicU64,
    shutdown_evictions: AtomicU64,
}

impl StatsRecorder {
    pub(crate) fn record_lookup(&self, hit: bool) {
        let counter = if hit { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_insert(&self) {
        self.inserts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_update(&self) {
        self.updates.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_removal(&self, cause: RemovalCause) {
        let counter = match cause {
            RemovalCause::Expired => &self.expirations,
            RemovalCause::Deleted => &self.deletions,
            RemovalCause::Shutdown => &self.shutdown_evictions,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, live_janitors: usize, total_entries: usize) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            inserts: self.inserts.load(Ordering::Relaxed),
            updates: self.updates.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            deletions: self.deletions.load(Ordering::Relaxed),
            shutdown_evictions: self.shutdown_evictions.load(Ordering::Relaxed),
            live_janitors,
            total_entries,
        }
    }
}
