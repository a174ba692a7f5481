use crate::local_logs;
use std::fmt;
use std::path::{Path, PathBuf};

/// One log as listed by the vehicle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Vehicle-assigned id. Not stable across reboots; display only.
    pub id: u32,
    /// `YYYY-MM-DDTHH:MM:SSZ`. The log's identity and the stem of its local file name.
    pub date: String,
    /// Final size of the log as known to the vehicle.
    pub size_bytes: u64,
}

impl CatalogEntry {
    pub fn new(id: u32, date: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            id,
            date: date.into(),
            size_bytes,
        }
    }

    pub fn file_name(&self) -> String {
        local_logs::log_file_name(&self.date)
    }

    /// Where this entry is mirrored inside `logging_dir`.
    pub fn local_path(&self, logging_dir: &Path) -> PathBuf {
        local_logs::log_path(logging_dir, &self.date)
    }

    pub fn size_mb(&self) -> f64 {
        self.size_bytes as f64 / 1e6
    }
}

impl fmt::Display for CatalogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t{:.2}MB", self.id, self.date, self.size_mb())
    }
}
