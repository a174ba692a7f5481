//! Vehicle link: the collaborator that owns the connection to the vehicle.
//!
//! The core only needs four things from a vehicle: connect, read the armed
//! state, list the onboard logs, and start a transfer of one log into a local
//! file. Transport details (MAVLink, a mounted SD card, ...) stay behind
//! [`VehicleLink`]. `file://` endpoints are served by [`DirectoryLink`].

mod directory;
mod entry;
mod error;

pub use directory::DirectoryLink;
pub use entry::CatalogEntry;
pub use error::{LinkError, TransferError};

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::control::Shutdown;
use crate::retry::RetryPolicy;

/// Status passed to a transfer's progress callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferStatus {
    /// More data follows.
    InProgress,
    Success,
    Failed(TransferError),
}

impl TransferStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransferStatus::InProgress)
    }
}

/// Progress callback: `(status, fraction)` with `fraction` in `[0, 1]` and non-decreasing.
///
/// Called any number of times with [`TransferStatus::InProgress`], then once with
/// a terminal status. Implementations may keep calling it after the consumer has
/// stopped caring; consumers must tolerate that.
pub type ProgressCallback = Box<dyn FnMut(TransferStatus, f32) + Send + 'static>;

/// Connection to one vehicle. Methods may block; async callers use `spawn_blocking`.
pub trait VehicleLink: Send + Sync {
    /// Whether the vehicle is armed. Polled about once per second, always from
    /// a blocking thread, so it may touch the filesystem or the wire.
    fn armed(&self) -> bool;

    /// Current catalog of onboard logs, oldest first.
    fn list_log_entries(&self) -> Result<Vec<CatalogEntry>, LinkError>;

    /// Start copying `entry` into `destination` and return without waiting.
    /// Every outcome, including immediate failure, is reported through `on_progress`.
    fn transfer(&self, entry: &CatalogEntry, destination: &Path, on_progress: ProgressCallback);
}

/// Open a link for `endpoint`, waiting up to `timeout` for the vehicle to appear.
pub fn connect(endpoint: &str, timeout: Duration) -> Result<Arc<dyn VehicleLink>, LinkError> {
    let parsed = url::Url::parse(endpoint)
        .map_err(|_| LinkError::UnsupportedEndpoint(endpoint.to_string()))?;
    match parsed.scheme() {
        "file" => {
            let root = parsed
                .to_file_path()
                .map_err(|_| LinkError::UnsupportedEndpoint(endpoint.to_string()))?;
            let link = DirectoryLink::connect(&root, timeout)?;
            Ok(Arc::new(link))
        }
        _ => Err(LinkError::UnsupportedEndpoint(endpoint.to_string())),
    }
}

/// Keep calling [`connect`] with backoff until it succeeds. Returns None if shutdown comes first.
pub async fn connect_until_ready(
    endpoint: &str,
    timeout: Duration,
    backoff: &RetryPolicy,
    shutdown: &Shutdown,
) -> Option<Arc<dyn VehicleLink>> {
    let mut attempt = 1u32;
    loop {
        if shutdown.is_triggered() {
            return None;
        }
        tracing::info!(endpoint, "connecting to vehicle");
        let ep = endpoint.to_string();
        let result = tokio::task::spawn_blocking(move || connect(&ep, timeout)).await;
        match result {
            Ok(Ok(link)) => {
                tracing::info!(endpoint, "connected to vehicle");
                return Some(link);
            }
            Ok(Err(LinkError::UnsupportedEndpoint(e))) => {
                tracing::error!("unsupported vehicle endpoint {}; not retrying", e);
                return None;
            }
            Ok(Err(e)) => tracing::warn!(attempt, "connection failed: {}", e),
            Err(e) => tracing::warn!(attempt, "connect task join: {}", e),
        }
        if shutdown.sleep(backoff.delay_for(attempt)).await {
            return None;
        }
        attempt = attempt.saturating_add(1);
    }
}
