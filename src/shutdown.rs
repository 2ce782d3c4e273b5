//! Shutdown Signal Module
//!
//! A one-shot, broadcast shutdown trigger. The owner holds a [`Shutdown`] and
//! hands [`ShutdownSignal`] observers to caches; a cache never fires the
//! signal itself.

use tokio::sync::watch;

// == Shutdown Trigger ==
/// Owning side of the shutdown broadcast.
///
/// Dropping a `Shutdown` without calling [`Shutdown::trigger`] leaves every
/// observer waiting forever.
#[derive(Debug)]
pub struct Shutdown {
    tx: watch::Sender<bool>,
}

impl Shutdown {
    /// Creates a trigger that has not fired yet.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// Returns a new observer of this trigger.
    pub fn signal(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: Some(self.tx.subscribe()),
        }
    }

    /// Fires the signal. Firing twice is a no-op.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    /// Returns true once [`Shutdown::trigger`] has been called.
    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

// == Shutdown Signal ==
/// Read-only, cloneable observer of a [`Shutdown`].
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: Option<watch::Receiver<bool>>,
}

impl ShutdownSignal {
    /// A signal that never fires.
    pub fn never() -> Self {
        Self { rx: None }
    }

    /// Returns true if the trigger has fired.
    pub fn is_fired(&self) -> bool {
        self.rx.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Completes once the trigger fires.
    ///
    /// If the trigger is dropped without firing this never completes.
    pub async fn recv(&mut self) {
        if let Some(rx) = self.rx.as_mut() {
            let fired = rx.wait_for(|fired| *fired).await.is_ok();
            if fired {
                return;
            }
        }
        std::future::pending::<()>().await
    }
}
