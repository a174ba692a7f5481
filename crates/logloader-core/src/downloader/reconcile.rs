//! Catalog vs. local directory: what to fetch.
//!
//! Pure decisions; the scheduler stats files and acts on them one entry at a
//! time so a pass can stop between entries.

use crate::vehicle::CatalogEntry;

/// What to do with one catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Local copy is complete, or the log predates what we mirror.
    Skip,
    /// No local copy and newer than the newest local log.
    Download,
    /// Local copy is shorter than the vehicle's: delete it and fetch again.
    Redownload { local_size: u64 },
}

/// Decide for `entry` given the size of its local file (None if absent) and the
/// newest local log date. Dates compare as strings.
pub fn decide(entry: &CatalogEntry, local_size: Option<u64>, most_recent: &str) -> Action {
    match local_size {
        Some(size) if size < entry.size_bytes => Action::Redownload { local_size: size },
        Some(_) => Action::Skip,
        None if entry.date.as_str() > most_recent => Action::Download,
        None => Action::Skip,
    }
}

/// With no local logs at all only the newest entry (the catalog's tail) is fetched.
pub fn first_run_entry(catalog: &[CatalogEntry]) -> Option<&CatalogEntry> {
    catalog.last()
}

/// Counts for one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub downloaded: usize,
    pub failed: usize,
    pub cancelled: usize,
    pub skipped: usize,
    /// The pass stopped early because the vehicle armed or shutdown was requested.
    pub interrupted: bool,
}
