//! `logloader entries` – show the vehicle's log catalog against the local mirror.

use anyhow::{Context, Result};
use logloader_core::config::Settings;
use logloader_core::downloader::{decide, first_run_entry, Action};
use logloader_core::{local_logs, vehicle};

pub async fn run_entries(cfg: &Settings) -> Result<()> {
    let url = cfg.connection_url.clone();
    let timeout = cfg.connect_timeout();
    let entries = tokio::task::spawn_blocking(move || {
        let link = vehicle::connect(&url, timeout)?;
        link.list_log_entries()
    })
    .await
    .context("catalog task join")?
    .with_context(|| format!("list logs at {}", cfg.connection_url))?;

    if entries.is_empty() {
        println!("No logs on vehicle.");
        return Ok(());
    }

    let dir = &cfg.logging_directory;
    let most_recent = if dir.is_dir() {
        local_logs::most_recent_log(dir)
            .with_context(|| format!("scan {}", dir.display()))?
    } else {
        None
    };
    let first_run_date = first_run_entry(&entries).map(|e| e.date.clone());

    println!("{:<4} {:<22} {:>10}  {}", "ID", "DATE", "SIZE", "ACTION");
    for entry in &entries {
        let action = match &most_recent {
            Some(recent) => {
                let local = local_logs::local_size(&entry.local_path(dir)).await?;
                match decide(entry, local, recent) {
                    Action::Skip => "skip".to_string(),
                    Action::Download => "download".to_string(),
                    Action::Redownload { local_size } => format!("redownload ({} bytes local)", local_size),
                }
            }
            None if first_run_date.as_deref() == Some(entry.date.as_str()) => "download".to_string(),
            None => "skip".to_string(),
        };
        println!(
            "{:<4} {:<22} {:>8.2}MB  {}",
            entry.id,
            entry.date,
            entry.size_mb(),
            action
        );
    }
    Ok(())
}
