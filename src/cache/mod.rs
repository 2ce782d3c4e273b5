//! Cache Module
//!
//! Provides the in-memory TTL cache with exactly-once expire notification.

mod builder;
mod combine;
mod entry;
mod stats;
mod store;


// Re-export public types
pub use builder::CacheBuilder;
pub use combine::{keep_max, keep_min, Combinator};
pub use entry::RemovalCause;
pub use stats::CacheStats;
pub use store::Cache;

pub(crate) use stats::StatsRecorder;
pub(crate) use store::CacheInner;

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::{Arc, Mutex};

    use crate::expire::ExpireCallback;

    /// Records every expire callback invocation in order.
    pub(crate) struct Recorder<V> {
        calls: Arc<Mutex<Vec<(String, V)>>>,
    }

    impl<V> Clone for Recorder<V> {
        fn clone(&self) -> Self {
            Self {
                calls: Arc::clone(&self.calls),
            }
        }
    }

    impl<V: Clone> Recorder<V> {
        pub(crate) fn new() -> Self {
            Self {
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub(crate) fn calls(&self) -> Vec<(String, V)> {
            self.calls.lock().unwrap().clone()
        }

        pub(crate) fn count(&self, key: &str) -> usize {
            self.calls.lock().unwrap().iter().filter(|(k, _)| k == key).count()
        }
    }

    impl<V: Send + 'static> ExpireCallback<V> for Recorder<V> {
        fn on_expire(&self, key: &str, value: V) {
            self.calls.lock().unwrap().push((key.to_string(), value));
        }
    }
}
