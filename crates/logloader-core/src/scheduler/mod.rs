//! Process-level orchestration.
//!
//! Runs the download and upload loops side by side over one link, one shared
//! [`DownloadState`] and one shutdown handle, and returns once both have stopped.

pub(crate) mod gate;

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::archive::Archive;
use crate::config::Settings;
use crate::control::Shutdown;
use crate::downloader::{DownloadScheduler, DownloadState, ProgressStats};
use crate::local_logs;
use crate::retry::RetryPolicy;
use crate::uploader::{UploadLedger, UploadScheduler};
use crate::vehicle::VehicleLink;

/// Run both loops until `shutdown` is triggered.
///
/// The upload loop is skipped when uploads are disabled. Progress of the
/// active download is published on `progress_tx` if given.
pub async fn run(
    link: Arc<dyn VehicleLink>,
    archive: Arc<dyn Archive>,
    settings: &Settings,
    shutdown: Shutdown,
    progress_tx: Option<mpsc::Sender<ProgressStats>>,
) -> Result<()> {
    let logging_dir = settings.logging_directory.clone();
    local_logs::ensure_dir(&logging_dir)
        .with_context(|| format!("create logging directory {}", logging_dir.display()))?;

    let timing = settings.timing();
    let state = Arc::new(DownloadState::new());
    let backoff = RetryPolicy::from_config(settings.retry.as_ref());

    let downloads = DownloadScheduler::new(
        Arc::clone(&link),
        logging_dir.clone(),
        Arc::clone(&state),
        shutdown.clone(),
        timing.clone(),
    )
    .with_backoff(backoff)
    .with_progress(progress_tx);

    let uploads = if settings.upload_enabled {
        let ledger_path = settings.ledger_path()?;
        let ledger = UploadLedger::open(&ledger_path).await?;
        tracing::info!(
            ledger = %ledger_path.display(),
            recorded = ledger.len(),
            "uploads enabled"
        );
        Some(UploadScheduler::new(
            link,
            archive,
            logging_dir,
            state,
            ledger,
            shutdown.clone(),
            timing,
        )
        .with_backoff(backoff))
    } else {
        tracing::info!("uploads disabled");
        None
    };

    let mut loops = JoinSet::new();
    loops.spawn(downloads.run());
    if let Some(uploads) = uploads {
        loops.spawn(uploads.run());
    }

    // A loop only ends on shutdown or by panicking; a panic stops the other one too.
    let mut result = Ok(());
    while let Some(joined) = loops.join_next().await {
        if let Err(e) = joined {
            tracing::error!("loop ended abnormally: {}", e);
            shutdown.trigger();
            if result.is_ok() {
                result = Err(anyhow::anyhow!("loop task: {}", e));
            }
        }
    }
    tracing::info!("all loops stopped");
    result
}
