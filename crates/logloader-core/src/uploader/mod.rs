//! Upload loop: relay completed local logs to the archive exactly once.
//!
//! Each cycle waits for the vehicle to be disarmed, lists the logging
//! directory, drops files already in the ledger and the file the download
//! loop is still writing, and uploads the rest in listing order. A failed
//! file stays eligible for the next cycle.

mod ledger;

pub use ledger::UploadLedger;

use std::path::PathBuf;
use std::sync::Arc;

use crate::archive::Archive;
use crate::config::TimingConfig;
use crate::control::Shutdown;
use crate::downloader::DownloadState;
use crate::local_logs;
use crate::retry::RetryPolicy;
use crate::scheduler::gate;
use crate::vehicle::VehicleLink;

/// Counts for one upload pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadPassSummary {
    pub uploaded: usize,
    pub failed: usize,
    /// Files passed over because the archive did not answer the probe.
    pub unreachable: usize,
    /// The batch was cut short by arming or shutdown.
    pub interrupted: bool,
    /// The batch was cut short by a throttled, timed-out or dropped upload.
    pub backed_off: bool,
}

pub struct UploadScheduler {
    link: Arc<dyn VehicleLink>,
    archive: Arc<dyn Archive>,
    logging_dir: PathBuf,
    state: Arc<DownloadState>,
    ledger: UploadLedger,
    shutdown: Shutdown,
    timing: TimingConfig,
    backoff: RetryPolicy,
}

impl UploadScheduler {
    pub fn new(
        link: Arc<dyn VehicleLink>,
        archive: Arc<dyn Archive>,
        logging_dir: PathBuf,
        state: Arc<DownloadState>,
        ledger: UploadLedger,
        shutdown: Shutdown,
        timing: TimingConfig,
    ) -> Self {
        Self {
            link,
            archive,
            logging_dir,
            state,
            ledger,
            shutdown,
            timing,
            backoff: RetryPolicy::default(),
        }
    }

    pub fn with_backoff(mut self, backoff: RetryPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn ledger(&self) -> &UploadLedger {
        &self.ledger
    }

    /// Run until shutdown.
    pub async fn run(mut self) {
        // Give the download loop time to publish the file it resumes, if any.
        if !self.shutdown.sleep(self.timing.upload_startup_delay()).await {
            let mut strained = 0u32;
            loop {
                let poll = self.timing.armed_poll();
                if gate::wait_while_armed(&self.link, &self.shutdown, poll, "upload")
                    .await
                    .is_none()
                {
                    break;
                }
                let summary = self.run_pass().await;
                if summary.uploaded + summary.failed > 0 {
                    tracing::info!(
                        uploaded = summary.uploaded,
                        failed = summary.failed,
                        unreachable = summary.unreachable,
                        interrupted = summary.interrupted,
                        backed_off = summary.backed_off,
                        "upload pass finished"
                    );
                }
                let pause = if summary.backed_off {
                    strained = strained.saturating_add(1);
                    self.backoff.delay_for(strained).max(self.timing.upload_interval())
                } else {
                    strained = 0;
                    self.timing.upload_interval()
                };
                if self.shutdown.sleep(pause).await {
                    break;
                }
            }
        }
        tracing::info!("upload loop stopped");
    }

    /// Logs in the directory that are neither recorded nor being written, in listing order.
    pub fn eligible_files(&self) -> std::io::Result<Vec<PathBuf>> {
        let files = local_logs::list_log_files(&self.logging_dir)?;
        Ok(files
            .into_iter()
            .filter(|p| !self.ledger.contains(p) && self.state.is_complete(p))
            .collect())
    }

    /// One scan of the logging directory.
    pub async fn run_pass(&mut self) -> UploadPassSummary {
        let mut summary = UploadPassSummary::default();
        if let Err(e) = self.ledger.reload().await {
            tracing::warn!("keeping previous ledger contents: {:#}", e);
        }
        let files = match self.eligible_files() {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(dir = %self.logging_dir.display(), "cannot list logging directory: {}", e);
                return summary;
            }
        };

        for path in files {
            if self.shutdown.is_triggered() || gate::is_armed(&self.link).await {
                summary.interrupted = true;
                break;
            }

            let archive = Arc::clone(&self.archive);
            let reachable = tokio::task::spawn_blocking(move || archive.probe())
                .await
                .unwrap_or(false);
            if !reachable {
                tracing::warn!(path = %path.display(), "archive not reachable; will retry");
                summary.unreachable += 1;
                continue;
            }

            tracing::info!(path = %path.display(), "uploading log");
            let archive = Arc::clone(&self.archive);
            let target = path.clone();
            let upload = tokio::task::spawn_blocking(move || archive.upload(&target));
            let joined = tokio::select! {
                joined = upload => joined,
                _ = self.shutdown.triggered() => {
                    // Not recorded; the file stays eligible for the next run.
                    tracing::info!(path = %path.display(), "upload abandoned on shutdown");
                    summary.interrupted = true;
                    break;
                }
            };
            match joined {
                Ok(Ok(receipt)) => {
                    tracing::info!(
                        path = %path.display(),
                        url = %receipt.url,
                        bytes = receipt.bytes,
                        sha256 = %receipt.sha256,
                        "uploaded log"
                    );
                    summary.uploaded += 1;
                    if let Err(e) = self.ledger.record(&path).await {
                        tracing::error!(path = %path.display(), "uploaded but not recorded: {:#}", e);
                    }
                }
                Ok(Err(e)) => {
                    let kind = e.kind();
                    tracing::warn!(path = %path.display(), %kind, "upload failed: {}", e);
                    summary.failed += 1;
                    if kind.is_transient() {
                        // The archive itself is struggling; leave the rest for a later pass.
                        summary.backed_off = true;
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), "upload task join: {}", e);
                    summary.failed += 1;
                }
            }
        }
        summary
    }
}
