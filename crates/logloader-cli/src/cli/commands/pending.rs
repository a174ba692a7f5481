//! `logloader pending` – local logs not yet in the upload ledger.

use anyhow::{Context, Result};
use logloader_core::config::Settings;
use logloader_core::local_logs;
use logloader_core::uploader::UploadLedger;

pub async fn run_pending(cfg: &Settings) -> Result<()> {
    let ledger = UploadLedger::open(cfg.ledger_path()?).await?;
    let dir = &cfg.logging_directory;
    let files = if dir.is_dir() {
        local_logs::list_log_files(dir).with_context(|| format!("list {}", dir.display()))?
    } else {
        Vec::new()
    };

    let pending: Vec<_> = files.into_iter().filter(|p| !ledger.contains(p)).collect();
    if pending.is_empty() {
        println!("Nothing to upload ({} recorded in {}).", ledger.len(), ledger.path().display());
    } else {
        for p in &pending {
            println!("{}", p.display());
        }
        tracing::debug!(count = pending.len(), "pending uploads");
    }
    Ok(())
}
