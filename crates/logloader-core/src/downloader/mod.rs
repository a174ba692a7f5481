//! Download loop: mirror the vehicle's log catalog into the logging directory.
//!
//! Each cycle waits for the vehicle to be disarmed, fetches the catalog,
//! reconciles it against the local `<date>.ulg` files, and downloads what is
//! missing or short, one log at a time. Failures are logged and left for the
//! next cycle; only shutdown ends the loop.

mod once;
mod progress;
mod reconcile;
mod state;
mod worker;

pub use progress::ProgressStats;
pub use reconcile::{decide, first_run_entry, Action, PassSummary};
pub use state::DownloadState;
pub use worker::{DownloadOutcome, DownloadWorker};

use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::config::TimingConfig;
use crate::control::Shutdown;
use crate::local_logs;
use crate::retry::RetryPolicy;
use crate::scheduler::gate;
use crate::vehicle::{CatalogEntry, VehicleLink};

/// Result of fetching the catalog for one cycle.
enum Catalog {
    Entries(Vec<CatalogEntry>),
    Unavailable,
}

pub struct DownloadScheduler {
    link: Arc<dyn VehicleLink>,
    logging_dir: PathBuf,
    state: Arc<DownloadState>,
    shutdown: Shutdown,
    timing: TimingConfig,
    backoff: RetryPolicy,
    progress_tx: Option<mpsc::Sender<ProgressStats>>,
}

impl DownloadScheduler {
    pub fn new(
        link: Arc<dyn VehicleLink>,
        logging_dir: PathBuf,
        state: Arc<DownloadState>,
        shutdown: Shutdown,
        timing: TimingConfig,
    ) -> Self {
        Self {
            link,
            logging_dir,
            state,
            shutdown,
            timing,
            backoff: RetryPolicy::default(),
            progress_tx: None,
        }
    }

    pub fn with_backoff(mut self, backoff: RetryPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_progress(mut self, tx: Option<mpsc::Sender<ProgressStats>>) -> Self {
        self.progress_tx = tx;
        self
    }

    /// Run until shutdown.
    pub async fn run(self) {
        let mut catalog_failures = 0u32;
        while !self.shutdown.is_triggered() {
            let poll = self.timing.armed_poll();
            let Some(was_armed) =
                gate::wait_while_armed(&self.link, &self.shutdown, poll, "download").await
            else {
                break;
            };
            if was_armed {
                tracing::info!("vehicle disarmed; waiting for its logger to finish");
                if self.shutdown.sleep(self.timing.disarm_grace()).await {
                    break;
                }
            }

            let entries = match self.fetch_catalog().await {
                Catalog::Entries(entries) => {
                    catalog_failures = 0;
                    entries
                }
                Catalog::Unavailable => {
                    catalog_failures = catalog_failures.saturating_add(1);
                    if self.shutdown.sleep(self.backoff.delay_for(catalog_failures)).await {
                        break;
                    }
                    continue;
                }
            };

            let summary = self.reconcile(&entries).await;
            if summary.downloaded + summary.failed + summary.cancelled > 0 || summary.interrupted {
                tracing::info!(
                    downloaded = summary.downloaded,
                    failed = summary.failed,
                    skipped = summary.skipped,
                    interrupted = summary.interrupted,
                    "reconciliation pass finished"
                );
            }

            if self.shutdown.sleep(self.timing.catalog_interval()).await {
                break;
            }
        }
        tracing::info!("download loop stopped");
    }

    async fn fetch_catalog(&self) -> Catalog {
        tracing::debug!("requesting log list");
        let link = Arc::clone(&self.link);
        match tokio::task::spawn_blocking(move || link.list_log_entries()).await {
            Ok(Ok(entries)) => {
                tracing::info!("found {} logs on vehicle", entries.len());
                for e in &entries {
                    tracing::debug!("{}", e);
                }
                Catalog::Entries(entries)
            }
            Ok(Err(e)) => {
                tracing::warn!("failed to get logs: {}", e);
                Catalog::Unavailable
            }
            Err(e) => {
                tracing::warn!("log list task join: {}", e);
                Catalog::Unavailable
            }
        }
    }

    /// One reconciliation pass over `catalog`. Stops between entries if the
    /// vehicle arms or shutdown is requested; unvisited entries wait for the next pass.
    pub async fn reconcile(&self, catalog: &[CatalogEntry]) -> PassSummary {
        let mut summary = PassSummary::default();
        if let Err(e) = local_logs::ensure_dir(&self.logging_dir) {
            tracing::warn!(dir = %self.logging_dir.display(), "cannot create logging directory: {}", e);
            return summary;
        }

        let most_recent = match local_logs::most_recent_log(&self.logging_dir) {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(dir = %self.logging_dir.display(), "cannot scan logging directory: {}", e);
                return summary;
            }
        };

        let Some(most_recent) = most_recent else {
            if let Some(entry) = first_run_entry(catalog) {
                tracing::info!("no local logs found, downloading latest");
                if self.should_stop().await {
                    summary.interrupted = true;
                    return summary;
                }
                self.fetch(entry, &mut summary).await;
                summary.skipped = catalog.len() - 1;
            }
            return summary;
        };

        for entry in catalog {
            if self.should_stop().await {
                summary.interrupted = true;
                break;
            }
            let path = entry.local_path(&self.logging_dir);
            let local_size = match local_logs::local_size(&path).await {
                Ok(s) => s,
                Err(e) => {
                    tracing::warn!(path = %path.display(), "cannot stat local log: {}", e);
                    summary.skipped += 1;
                    continue;
                }
            };
            match decide(entry, local_size, &most_recent) {
                Action::Skip => summary.skipped += 1,
                Action::Download => self.fetch(entry, &mut summary).await,
                Action::Redownload { local_size } => {
                    tracing::info!(
                        date = %entry.date,
                        local_size,
                        size_bytes = entry.size_bytes,
                        "incomplete log, re-downloading"
                    );
                    if let Err(e) = tokio::fs::remove_file(&path).await {
                        tracing::warn!(path = %path.display(), "cannot remove incomplete log: {}", e);
                        summary.failed += 1;
                        continue;
                    }
                    self.fetch(entry, &mut summary).await;
                }
            }
        }
        summary
    }

    async fn should_stop(&self) -> bool {
        self.shutdown.is_triggered() || gate::is_armed(&self.link).await
    }

    async fn fetch(&self, entry: &CatalogEntry, summary: &mut PassSummary) {
        let path = entry.local_path(&self.logging_dir);
        let worker = DownloadWorker::new(&self.link, &self.state, &self.shutdown)
            .with_progress(self.progress_tx.as_ref());
        match worker.download(entry, &path).await {
            DownloadOutcome::Success => summary.downloaded += 1,
            DownloadOutcome::Cancelled => summary.cancelled += 1,
            DownloadOutcome::Failed(_) => summary.failed += 1,
        }
    }
}
