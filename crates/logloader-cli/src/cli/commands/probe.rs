//! `logloader probe` – is the archive reachable?

use anyhow::{Context, Result};
use logloader_core::archive::{Archive, CurlArchive};
use logloader_core::config::Settings;

pub async fn run_probe(cfg: &Settings) -> Result<()> {
    let archive = CurlArchive::from_settings(cfg).context("archive server")?;
    let url = archive.endpoint().root_url().clone();
    let reachable = tokio::task::spawn_blocking(move || archive.probe())
        .await
        .context("probe task join")?;
    if reachable {
        println!("{} reachable", url);
        Ok(())
    } else {
        anyhow::bail!("{} not reachable", url)
    }
}
