//! Armed-state gate shared by both loops.

use std::sync::Arc;
use std::time::Duration;

use crate::control::Shutdown;
use crate::vehicle::VehicleLink;

/// Read `link.armed()` on a blocking thread. A failed read counts as armed.
pub(crate) async fn is_armed(link: &Arc<dyn VehicleLink>) -> bool {
    let link = Arc::clone(link);
    match tokio::task::spawn_blocking(move || link.armed()).await {
        Ok(armed) => armed,
        Err(e) => {
            tracing::warn!("armed check task join: {}", e);
            true
        }
    }
}

/// Poll the armed signal every `poll` until the vehicle is disarmed.
///
/// Returns `Some(was_armed)` once disarmed, or None if shutdown was requested
/// first. Reaction to a disarm is bounded by `poll`.
pub(crate) async fn wait_while_armed(
    link: &Arc<dyn VehicleLink>,
    shutdown: &Shutdown,
    poll: Duration,
    activity: &'static str,
) -> Option<bool> {
    let mut was_armed = false;
    loop {
        if shutdown.is_triggered() {
            return None;
        }
        if !is_armed(link).await {
            return Some(was_armed);
        }
        if !was_armed {
            tracing::info!(activity, "vehicle armed; pausing");
            was_armed = true;
        }
        if shutdown.sleep(poll).await {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::{CatalogEntry, LinkError, ProgressCallback};
    use std::path::Path;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct FlagLink {
        armed: AtomicBool,
        /// Time each armed read takes, like a stat on a slow mount.
        read_delay: Duration,
    }

    impl VehicleLink for FlagLink {
        fn armed(&self) -> bool {
            std::thread::sleep(self.read_delay);
            self.armed.load(Ordering::SeqCst)
        }

        fn list_log_entries(&self) -> Result<Vec<CatalogEntry>, LinkError> {
            Ok(Vec::new())
        }

        fn transfer(&self, _: &CatalogEntry, _: &Path, _: ProgressCallback) {}
    }

    fn link(armed: bool, read_delay: Duration) -> Arc<FlagLink> {
        Arc::new(FlagLink {
            armed: AtomicBool::new(armed),
            read_delay,
        })
    }

    #[tokio::test]
    async fn slow_armed_read_leaves_the_runtime_free() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);
        let ticker = tokio::spawn(async move {
            loop {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        });

        let slow: Arc<dyn VehicleLink> = link(false, Duration::from_millis(200));
        assert!(!is_armed(&slow).await);
        ticker.abort();
        // Single-threaded runtime: the ticker only ran if the read was off-thread.
        assert!(ticks.load(Ordering::SeqCst) >= 5);
    }

    #[tokio::test]
    async fn gate_reports_that_it_waited() {
        let fake = link(true, Duration::ZERO);
        let dyn_link: Arc<dyn VehicleLink> = fake.clone();
        let shutdown = Shutdown::new();

        let disarm = Arc::clone(&fake);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            disarm.armed.store(false, Ordering::SeqCst);
        });
        let waited =
            wait_while_armed(&dyn_link, &shutdown, Duration::from_millis(10), "test").await;
        assert_eq!(waited, Some(true));

        let waited =
            wait_while_armed(&dyn_link, &shutdown, Duration::from_millis(10), "test").await;
        assert_eq!(waited, Some(false));
    }

    #[tokio::test]
    async fn gate_gives_up_on_shutdown() {
        let dyn_link: Arc<dyn VehicleLink> = link(true, Duration::ZERO);
        let shutdown = Shutdown::new();
        let trigger = shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            trigger.trigger();
        });
        let waited =
            wait_while_armed(&dyn_link, &shutdown, Duration::from_millis(10), "test").await;
        assert_eq!(waited, None);
    }
}
