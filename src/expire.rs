//! Expire Callbacks
//!
//! The callback contract invoked once per removed entry, plus a few ready-made
//! adapters.

use std::fmt::Display;
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

use tokio::sync::mpsc;
use tracing::{debug, warn};

// == Callback Trait ==
/// Receives every entry as it leaves the cache.
///
/// Called exactly once per inserted entry, outside the cache lock. It must not
/// block for long inside an async runtime, and panics are not caught.
///
/// Any `Fn(&str, V)` closure implements this trait.
pub trait ExpireCallback<V>: Send + Sync + 'static {
    fn on_expire(&self, key: &str, value: V);
}

impl<V, F> ExpireCallback<V> for F
where
    F: Fn(&str, V) + Send + Sync + 'static,
{
    fn on_expire(&self, key: &str, value: V) {
        self(key, value)
    }
}

// == Noop ==
/// Discards expired entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopExpire;

impl<V> ExpireCallback<V> for NoopExpire {
    fn on_expire(&self, _key: &str, _value: V) {}
}

// == Writer ==
/// Writes a `key: value` line per expired entry.
#[derive(Debug)]
pub struct WriterExpire<W> {
    out: Mutex<W>,
}

impl<W> WriterExpire<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Returns the wrapped writer.
    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<V, W> ExpireCallback<V> for WriterExpire<W>
where
    V: Display,
    W: Write + Send + 'static,
{
    fn on_expire(&self, key: &str, value: V) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(err) = writeln!(out, "{}: {}", key, value) {
            warn!(key, error = %err, "failed to write expired entry");
        }
    }
}

/// Prints `key: value` to stdout for every expired entry.
pub fn println_on_expire() -> WriterExpire<io::Stdout> {
    WriterExpire::new(io::stdout())
}

// == Channel ==
/// A removed entry, as forwarded by [`ChannelExpire`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue<V> {
    pub key: String,
    pub value: V,
}

/// Forwards expired entries onto an unbounded channel.
///
/// Entries expiring after the receiver is dropped are discarded.
#[derive(Debug, Clone)]
pub struct ChannelExpire<V> {
    tx: mpsc::UnboundedSender<KeyValue<V>>,
}

impl<V> ChannelExpire<V> {
    pub fn new(tx: mpsc::UnboundedSender<KeyValue<V>>) -> Self {
        Self { tx }
    }

    /// Creates the callback together with the receiving end.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<KeyValue<V>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl<V> ExpireCallback<V> for ChannelExpire<V>
where
    V: Send + 'static,
{
    fn on_expire(&self, key: &str, value: V) {
        let kv = KeyValue {
            key: key.to_string(),
            value,
        };
        if self.tx.send(kv).is_err() {
            debug!(key, "expire receiver closed, dropping entry");
        }
    }
}
