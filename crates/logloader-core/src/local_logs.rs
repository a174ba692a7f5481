//! Local log directory layout.
//!
//! Every mirrored log lives directly in the logging directory as `<date>.ulg`,
//! where `<date>` is the vehicle's `YYYY-MM-DDTHH:MM:SSZ` timestamp. Dates are
//! compared as plain strings; the fixed-width format makes that chronological.

use regex::Regex;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Extension of mirrored log files.
pub const LOG_EXTENSION: &str = "ulg";

fn log_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}Z)\.ulg$").expect("static log name pattern")
    })
}

/// `2024-05-01T00:00:00Z` → `2024-05-01T00:00:00Z.ulg`
pub fn log_file_name(date: &str) -> String {
    format!("{}.{}", date, LOG_EXTENSION)
}

pub fn log_path(dir: &Path, date: &str) -> PathBuf {
    dir.join(log_file_name(date))
}

/// Returns the date part of a file name in `<date>.ulg` form, or None for anything else.
pub fn parse_log_file_name(name: &str) -> Option<&str> {
    log_name_pattern()
        .captures(name)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Create the logging directory (and parents) if absent.
pub fn ensure_dir(dir: &Path) -> io::Result<()> {
    std::fs::create_dir_all(dir)
}

/// Lexicographically greatest date among `<date>.ulg` files in `dir`, or None when there are none.
pub fn most_recent_log(dir: &Path) -> io::Result<Option<String>> {
    let mut latest: Option<String> = None;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(date) = name.to_str().and_then(parse_log_file_name) else {
            continue;
        };
        if latest.as_deref().map_or(true, |l| date > l) {
            latest = Some(date.to_string());
        }
    }
    Ok(latest)
}

/// Paths of all regular `<date>.ulg` files in `dir`, in directory-listing order.
pub fn list_log_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        if name.to_str().and_then(parse_log_file_name).is_some() {
            out.push(dir.join(name));
        }
    }
    Ok(out)
}

/// On-disk size of `path`, or None if it does not exist.
pub async fn local_size(path: &Path) -> io::Result<Option<u64>> {
    match tokio::fs::metadata(path).await {
        Ok(meta) => Ok(Some(meta.len())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}
