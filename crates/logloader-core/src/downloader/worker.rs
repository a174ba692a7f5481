//! One log download: publish the active path, run the link's transfer, and
//! resolve to exactly one outcome.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

use super::once::OnceResult;
use super::progress::ProgressStats;
use super::state::DownloadState;
use crate::control::Shutdown;
use crate::vehicle::{CatalogEntry, ProgressCallback, TransferError, TransferStatus, VehicleLink};

/// Terminal result of one download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Success,
    /// Shutdown was requested mid-transfer. Not a failure.
    Cancelled,
    Failed(TransferError),
}

/// Runs single downloads against a link. Cheap to build per download.
pub struct DownloadWorker<'a> {
    link: &'a Arc<dyn VehicleLink>,
    state: &'a DownloadState,
    shutdown: &'a Shutdown,
    progress_tx: Option<&'a mpsc::Sender<ProgressStats>>,
}

impl<'a> DownloadWorker<'a> {
    pub fn new(link: &'a Arc<dyn VehicleLink>, state: &'a DownloadState, shutdown: &'a Shutdown) -> Self {
        Self {
            link,
            state,
            shutdown,
            progress_tx: None,
        }
    }

    pub fn with_progress(mut self, tx: Option<&'a mpsc::Sender<ProgressStats>>) -> Self {
        self.progress_tx = tx;
        self
    }

    /// Download `entry` into `destination`.
    ///
    /// `destination` is the active path for the whole call. It is created
    /// empty (or truncated) before the link is asked for the log, and marked
    /// complete only on success. On shutdown this returns `Cancelled` at once,
    /// without waiting for the transfer to wind down.
    pub async fn download(&self, entry: &CatalogEntry, destination: &Path) -> DownloadOutcome {
        self.state.begin(destination);

        // The file exists from here on, so a transfer that fails before writing
        // anything leaves a short file that the next pass re-downloads.
        if let Err(e) = tokio::fs::File::create(destination).await {
            tracing::warn!(path = %destination.display(), "cannot create log file: {}", e);
            return DownloadOutcome::Failed(TransferError::Io(e.to_string()));
        }

        let (cell, rx) = OnceResult::<Result<(), TransferError>>::new();
        let cell = Arc::new(cell);
        let started = Instant::now();

        let on_progress: ProgressCallback = {
            let cell = Arc::clone(&cell);
            let progress_tx = self.progress_tx.cloned();
            let date = entry.date.clone();
            let total = entry.size_bytes;
            Box::new(move |status, fraction| {
                if cell.is_resolved() {
                    return;
                }
                match status {
                    TransferStatus::InProgress => {
                        if let Some(tx) = &progress_tx {
                            let elapsed = started.elapsed().as_secs_f64();
                            let _ = tx.try_send(ProgressStats::from_fraction(
                                &date, fraction, total, elapsed,
                            ));
                        }
                    }
                    TransferStatus::Success => {
                        cell.resolve(Ok(()));
                    }
                    TransferStatus::Failed(e) => {
                        cell.resolve(Err(e));
                    }
                }
            })
        };

        tracing::info!(
            date = %entry.date,
            size_mb = entry.size_mb(),
            path = %destination.display(),
            "downloading log"
        );
        self.link.transfer(entry, destination, on_progress);

        let outcome = tokio::select! {
            res = rx => match res {
                Ok(Ok(())) => DownloadOutcome::Success,
                Ok(Err(e)) => DownloadOutcome::Failed(e),
                // The link dropped the callback without a terminal status.
                Err(_) => DownloadOutcome::Failed(TransferError::Abandoned),
            },
            _ = self.shutdown.triggered() => {
                cell.close();
                DownloadOutcome::Cancelled
            }
        };

        let elapsed = started.elapsed().as_secs_f64();
        match &outcome {
            DownloadOutcome::Success => {
                self.state.mark_completed();
                let done = ProgressStats::from_fraction(&entry.date, 1.0, entry.size_bytes, elapsed);
                if let Some(tx) = self.progress_tx {
                    let _ = tx.try_send(done.clone());
                }
                tracing::info!(
                    date = %entry.date,
                    elapsed_secs = elapsed,
                    kbps = done.kbps(),
                    "download complete"
                );
            }
            DownloadOutcome::Cancelled => {
                tracing::info!(date = %entry.date, "download cancelled, exiting");
            }
            DownloadOutcome::Failed(e) => {
                tracing::warn!(date = %entry.date, "download failed: {}", e);
            }
        }
        outcome
    }
}
