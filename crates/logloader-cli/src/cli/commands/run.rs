//! `logloader run` – connect to the vehicle and run both loops until interrupted.

use anyhow::{Context, Result};
use logloader_core::archive::{Archive, CurlArchive};
use logloader_core::config::Settings;
use logloader_core::control::Shutdown;
use logloader_core::downloader::ProgressStats;
use logloader_core::retry::RetryPolicy;
use logloader_core::{scheduler, vehicle};
use std::sync::Arc;
use std::time::Instant;

const PROGRESS_INTERVAL_MS: u64 = 500;

pub async fn run_service(cfg: &Settings) -> Result<()> {
    let shutdown = Shutdown::new();
    spawn_signal_listener(shutdown.clone());

    let archive: Arc<dyn Archive> = Arc::new(
        CurlArchive::from_settings(cfg)
            .context("archive server")?
            .with_shutdown(shutdown.clone()),
    );

    let backoff = RetryPolicy::from_config(cfg.retry.as_ref());
    let Some(link) = vehicle::connect_until_ready(
        &cfg.connection_url,
        cfg.connect_timeout(),
        &backoff,
        &shutdown,
    )
    .await
    else {
        if shutdown.is_triggered() {
            tracing::info!("interrupted before the vehicle connected");
            return Ok(());
        }
        anyhow::bail!("cannot connect to vehicle at {}", cfg.connection_url);
    };

    let (progress_tx, mut progress_rx) = tokio::sync::mpsc::channel::<ProgressStats>(16);
    let progress_handle = tokio::spawn(async move {
        let mut last_print: Option<Instant> = None;
        while let Some(stats) = progress_rx.recv().await {
            let now = Instant::now();
            let due = last_print
                .map(|t| now.duration_since(t).as_millis() as u64 >= PROGRESS_INTERVAL_MS)
                .unwrap_or(true);
            if due || stats.is_done() {
                let eta = stats
                    .eta_secs()
                    .map(|s| format!("{:.0}s", s))
                    .unwrap_or_else(|| "?".to_string());
                println!(
                    "  {}  {:.1}%  {:.0} kbit/s  ETA {}",
                    stats.date,
                    stats.fraction() * 100.0,
                    stats.kbps(),
                    eta
                );
                last_print = Some(now);
            }
        }
    });

    let result = scheduler::run(link, archive, cfg, shutdown, Some(progress_tx)).await;
    let _ = progress_handle.await;
    result
}

/// Trigger `shutdown` on Ctrl-C, or SIGTERM on unix.
fn spawn_signal_listener(shutdown: Shutdown) {
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            match signal(SignalKind::terminate()) {
                Ok(mut term) => {
                    tokio::select! {
                        _ = tokio::signal::ctrl_c() => {}
                        _ = term.recv() => {}
                    }
                }
                Err(e) => {
                    tracing::warn!("cannot listen for SIGTERM: {}", e);
                    let _ = tokio::signal::ctrl_c().await;
                }
            }
        }
        #[cfg(not(unix))]
        {
            let _ = tokio::signal::ctrl_c().await;
        }
        tracing::info!("shutdown requested");
        shutdown.trigger();
    });
}
