//! Vehicle whose onboard log storage is reachable as a directory
//! (mounted SD card, network share, companion computer mirror).
//!
//! Logs are the `<date>.ulg` files in the directory. The vehicle counts as
//! armed while a file named `ARMED` exists there.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use super::{CatalogEntry, LinkError, ProgressCallback, TransferError, TransferStatus, VehicleLink};
use crate::local_logs;

/// Marker file whose presence means the vehicle is armed.
pub const ARMED_MARKER: &str = "ARMED";

const CHUNK_SIZE: usize = 64 * 1024;
const CONNECT_POLL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct DirectoryLink {
    root: PathBuf,
}

impl DirectoryLink {
    /// Wait up to `timeout` for `root` to exist as a directory.
    pub fn connect(root: &Path, timeout: Duration) -> Result<Self, LinkError> {
        let deadline = Instant::now() + timeout;
        loop {
            if root.is_dir() {
                return Ok(Self {
                    root: root.to_path_buf(),
                });
            }
            if Instant::now() >= deadline {
                return Err(LinkError::ConnectTimeout {
                    endpoint: root.display().to_string(),
                    timeout_secs: timeout.as_secs_f64(),
                });
            }
            std::thread::sleep(CONNECT_POLL);
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl VehicleLink for DirectoryLink {
    fn armed(&self) -> bool {
        self.root.join(ARMED_MARKER).exists()
    }

    fn list_log_entries(&self) -> Result<Vec<CatalogEntry>, LinkError> {
        let catalog_err = |source| LinkError::Catalog {
            path: self.root.clone(),
            source,
        };
        let mut found = Vec::new();
        for dirent in std::fs::read_dir(&self.root).map_err(catalog_err)? {
            let dirent = dirent.map_err(catalog_err)?;
            let name = dirent.file_name();
            let Some(date) = name.to_str().and_then(local_logs::parse_log_file_name) else {
                continue;
            };
            let meta = dirent.metadata().map_err(catalog_err)?;
            if meta.is_file() {
                found.push((date.to_string(), meta.len()));
            }
        }
        found.sort();
        Ok(found
            .into_iter()
            .enumerate()
            .map(|(i, (date, size))| CatalogEntry::new(i as u32, date, size))
            .collect())
    }

    fn transfer(&self, entry: &CatalogEntry, destination: &Path, mut on_progress: ProgressCallback) {
        let source = local_logs::log_path(&self.root, &entry.date);
        let destination = destination.to_path_buf();
        let expected = entry.size_bytes;
        std::thread::spawn(move || {
            let status = match copy_with_progress(&source, &destination, expected, &mut on_progress) {
                Ok(()) => TransferStatus::Success,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    TransferStatus::Failed(TransferError::NotFound)
                }
                Err(e) => TransferStatus::Failed(TransferError::Io(e.to_string())),
            };
            let fraction = if status == TransferStatus::Success { 1.0 } else { 0.0 };
            on_progress(status, fraction);
        });
    }
}

fn copy_with_progress(
    source: &Path,
    destination: &Path,
    expected: u64,
    on_progress: &mut ProgressCallback,
) -> io::Result<()> {
    let mut src = File::open(source)?;
    let mut dst = File::create(destination)?;
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut copied = 0u64;
    loop {
        let n = src.read(&mut buf)?;
        if n == 0 {
            break;
        }
        dst.write_all(&buf[..n])?;
        copied += n as u64;
        let fraction = if expected == 0 {
            1.0
        } else {
            (copied as f64 / expected as f64).min(1.0) as f32
        };
        on_progress(TransferStatus::InProgress, fraction);
    }
    dst.sync_all()?;
    if copied < expected {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("short copy: {} of {} bytes", copied, expected),
        ));
    }
    Ok(())
}
