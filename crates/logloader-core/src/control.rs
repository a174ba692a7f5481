//! Process-wide shutdown signal shared by the download and upload loops.
//!
//! The signal is set once (Ctrl-C, SIGTERM, or a test) and never cleared.
//! Every interruptible wait in the loops goes through [`Shutdown::sleep`] so a
//! request wakes it immediately instead of after the full interval.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Cloneable handle to the shutdown flag. All clones observe the same flag.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Request shutdown. Idempotent; wakes every pending [`Shutdown::triggered`] and [`Shutdown::sleep`].
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once shutdown has been requested (immediately if it already was).
    pub async fn triggered(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let _ = rx.wait_for(|stop| *stop).await;
    }

    /// Sleep for `duration` unless shutdown is requested first.
    /// Returns true if the sleep was cut short by shutdown.
    pub async fn sleep(&self, duration: Duration) -> bool {
        tokio::select! {
            _ = self.triggered() => true,
            _ = tokio::time::sleep(duration) => self.is_triggered(),
        }
    }
}
