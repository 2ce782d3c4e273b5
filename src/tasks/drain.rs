//! Drain Watch
//!
//! Background task behind `Cache::done`: waits for the shutdown signal, then
//! for the live janitor count to reach zero.

use std::future::{Future, IntoFuture};
use std::pin::Pin;

use tokio::sync::watch;
use tracing::info;

use crate::shutdown::ShutdownSignal;

// == Drained Handle ==
/// Completes once a shut-down cache has reported every entry.
///
/// Await it directly, or call [`Drained::wait`].
#[derive(Debug, Clone)]
pub struct Drained {
    rx: watch::Receiver<bool>,
}

impl Drained {
    /// Returns true if the cache has drained.
    pub fn is_drained(&self) -> bool {
        *self.rx.borrow()
    }

    /// Waits until the cache has drained.
    pub async fn wait(mut self) {
        let drained = self.rx.wait_for(|drained| *drained).await.is_ok();
        if !drained {
            // The runtime dropped the watch task before it finished.
            std::future::pending::<()>().await
        }
    }
}

impl IntoFuture for Drained {
    type Output = ();
    type IntoFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.wait())
    }
}

/// Spawns the task that resolves a [`Drained`] handle.
///
/// `live` tracks running janitors. If its sender is gone the cache and all of
/// its janitors are gone too, which counts as drained. The task exits early
/// once every clone of the returned handle has been dropped.
pub(crate) fn spawn_drain_watch(
    shutdown: ShutdownSignal,
    live: watch::Receiver<usize>,
) -> Drained {
    let (tx, rx) = watch::channel(false);

    tokio::spawn(async move {
        let drained = tokio::select! {
            _ = tx.closed() => false,
            _ = wait_for_drain(shutdown, live) => true,
        };
        if drained {
            info!("cache drained");
            let _ = tx.send(true);
        }
    });

    Drained { rx }
}

async fn wait_for_drain(mut shutdown: ShutdownSignal, mut live: watch::Receiver<usize>) {
    shutdown.recv().await;
    let remaining = *live.borrow();
    info!(remaining, "shutdown observed, waiting for janitors");

    let _ = live.wait_for(|live| *live == 0).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shutdown::Shutdown;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_waits_for_shutdown_then_janitors() {
        let shutdown = Shutdown::new();
        let (live_tx, live_rx) = watch::channel(2usize);
        let drained = spawn_drain_watch(shutdown.signal(), live_rx);

        shutdown.trigger();
        live_tx.send_modify(|live| *live -= 1);
        assert!(timeout(Duration::from_millis(50), drained.clone().wait()).await.is_err());

        live_tx.send_modify(|live| *live -= 1);
        timeout(Duration::from_secs(1), drained.clone())
            .await
            .expect("drained after last janitor");
        assert!(drained.is_drained());
    }

    #[tokio::test]
    async fn test_idle_without_shutdown() {
        let (_live_tx, live_rx) = watch::channel(0usize);
        let drained = spawn_drain_watch(ShutdownSignal::never(), live_rx);

        assert!(timeout(Duration::from_millis(50), drained.clone().wait()).await.is_err());
        assert!(!drained.is_drained());
    }

    #[tokio::test]
    async fn test_dropped_handles_release_watch_tasks() {
        let metrics = tokio::runtime::Handle::current().metrics();
        let before = metrics.num_alive_tasks();

        let (_live_tx, live_rx) = watch::channel(0usize);
        for _ in 0..100 {
            let drained = spawn_drain_watch(ShutdownSignal::never(), live_rx.clone());
            assert!(!drained.is_drained());
        }

        timeout(Duration::from_secs(1), async {
            while metrics.num_alive_tasks() > before {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("watch tasks should exit once their handles are dropped");
    }

    #[tokio::test]
    async fn test_dropped_counter_counts_as_drained() {
        let shutdown = Shutdown::new();
        let (live_tx, live_rx) = watch::channel(3usize);
        let drained = spawn_drain_watch(shutdown.signal(), live_rx);

        shutdown.trigger();
        drop(live_tx);
        timeout(Duration::from_secs(1), drained)
            .await
            .expect("closed counter should resolve");
    }
}
