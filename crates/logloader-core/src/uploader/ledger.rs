//! Append-only record of logs the archive has accepted.
//!
//! One path per line, exactly as it was uploaded. A crash between the archive
//! accepting a log and the append below can send that log twice; nothing
//! guards against that.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

#[derive(Debug)]
pub struct UploadLedger {
    path: PathBuf,
    uploaded: HashSet<PathBuf>,
}

impl UploadLedger {
    /// Open the ledger at `path`, creating its parent directory. A missing file is an empty ledger.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("create ledger directory {}", parent.display()))?;
        }
        let uploaded = read_entries(&path).await?;
        tracing::debug!(path = %path.display(), entries = uploaded.len(), "opened upload ledger");
        Ok(Self { path, uploaded })
    }

    pub fn contains(&self, log: &Path) -> bool {
        self.uploaded.contains(log)
    }

    /// Durably append `log`. Membership changes only after the write is synced.
    pub async fn record(&mut self, log: &Path) -> Result<()> {
        let mut line = log.to_string_lossy().into_owned();
        line.push('\n');
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("open ledger {}", self.path.display()))?;
        file.write_all(line.as_bytes())
            .await
            .with_context(|| format!("append to ledger {}", self.path.display()))?;
        file.sync_all()
            .await
            .with_context(|| format!("sync ledger {}", self.path.display()))?;
        self.uploaded.insert(log.to_path_buf());
        Ok(())
    }

    /// Re-read the file, picking up edits made while running.
    pub async fn reload(&mut self) -> Result<()> {
        self.uploaded = read_entries(&self.path).await?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.uploaded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uploaded.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

async fn read_entries(path: &Path) -> Result<HashSet<PathBuf>> {
    let data = match fs::read_to_string(path).await {
        Ok(d) => d,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashSet::new()),
        Err(e) => return Err(e).with_context(|| format!("read ledger {}", path.display())),
    };
    Ok(data
        .lines()
        .map(str::trim_end)
        .filter(|l| !l.is_empty())
        .map(PathBuf::from)
        .collect())
}
