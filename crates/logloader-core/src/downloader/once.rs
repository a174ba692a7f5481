//! Set-once result slot for callback-driven transfers.

use std::sync::{Mutex, PoisonError};
use tokio::sync::oneshot;

/// Holds the sending half of a oneshot channel. The first `resolve` delivers
/// the value; every later `resolve` (or one after `close`) is a no-op.
#[derive(Debug)]
pub(crate) struct OnceResult<T> {
    slot: Mutex<Option<oneshot::Sender<T>>>,
}

impl<T> OnceResult<T> {
    pub(crate) fn new() -> (Self, oneshot::Receiver<T>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                slot: Mutex::new(Some(tx)),
            },
            rx,
        )
    }

    /// Deliver `value` if nothing was delivered yet. Returns whether this call won.
    pub(crate) fn resolve(&self, value: T) -> bool {
        let tx = self.slot.lock().unwrap_or_else(PoisonError::into_inner).take();
        match tx {
            // A dropped receiver still counts as resolved: the waiter already moved on.
            Some(tx) => {
                let _ = tx.send(value);
                true
            }
            None => false,
        }
    }

    /// Resolve with nothing; later `resolve` calls are ignored.
    pub(crate) fn close(&self) {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).take();
    }

    pub(crate) fn is_resolved(&self) -> bool {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_resolution_wins() {
        let (cell, rx) = OnceResult::new();
        assert!(!cell.is_resolved());
        assert!(cell.resolve(1));
        assert!(!cell.resolve(2));
        assert!(cell.is_resolved());
        assert_eq!(rx.await.unwrap(), 1);
    }

    #[tokio::test]
    async fn resolve_after_close_is_ignored() {
        let (cell, rx) = OnceResult::<u8>::new();
        cell.close();
        assert!(!cell.resolve(9));
        assert!(rx.await.is_err());
    }

    #[test]
    fn resolve_with_dropped_receiver_is_not_a_fault() {
        let (cell, rx) = OnceResult::new();
        drop(rx);
        assert!(cell.resolve("late"));
        assert!(!cell.resolve("later"));
    }
}
