//! Scriptable in-memory vehicle.

use logloader_core::vehicle::{
    CatalogEntry, LinkError, ProgressCallback, TransferError, TransferStatus, VehicleLink,
};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// How `transfer` behaves.
#[derive(Debug, Clone)]
pub enum TransferMode {
    /// Write the full log and report success before returning.
    Complete,
    /// Write half the log, report some progress, and keep the callback without finishing.
    Hang,
    /// Report the given failure without writing anything.
    Fail(TransferError),
}

pub struct FakeLink {
    armed: AtomicBool,
    catalog: Mutex<Vec<CatalogEntry>>,
    mode: Mutex<TransferMode>,
    /// Arm the vehicle once this many transfers have started.
    arm_after: Mutex<Option<usize>>,
    transfers: Mutex<Vec<(String, PathBuf)>>,
    /// Dates whose transfer fails with `NotFound`, whatever the mode.
    failing: Mutex<HashSet<String>>,
    list_calls: AtomicUsize,
    hung: Mutex<Vec<ProgressCallback>>,
}

impl FakeLink {
    pub fn new(catalog: Vec<CatalogEntry>) -> Self {
        Self {
            armed: AtomicBool::new(false),
            catalog: Mutex::new(catalog),
            mode: Mutex::new(TransferMode::Complete),
            arm_after: Mutex::new(None),
            transfers: Mutex::new(Vec::new()),
            failing: Mutex::new(HashSet::new()),
            list_calls: AtomicUsize::new(0),
            hung: Mutex::new(Vec::new()),
        }
    }

    pub fn set_armed(&self, armed: bool) {
        self.armed.store(armed, Ordering::SeqCst);
    }

    pub fn set_catalog(&self, catalog: Vec<CatalogEntry>) {
        *self.catalog.lock().unwrap() = catalog;
    }

    pub fn set_mode(&self, mode: TransferMode) {
        *self.mode.lock().unwrap() = mode;
    }

    pub fn arm_after(&self, transfers: usize) {
        *self.arm_after.lock().unwrap() = Some(transfers);
    }

    pub fn fail_date(&self, date: &str) {
        self.failing.lock().unwrap().insert(date.to_string());
    }

    pub fn clear_failures(&self) {
        self.failing.lock().unwrap().clear();
    }

    /// Dates transferred, in order.
    pub fn transferred(&self) -> Vec<String> {
        self.transfers
            .lock()
            .unwrap()
            .iter()
            .map(|(d, _)| d.clone())
            .collect()
    }

    pub fn transfer_count(&self) -> usize {
        self.transfers.lock().unwrap().len()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Deliver `status` to every hung transfer, as a late callback would.
    pub fn finish_hung(&self, status: TransferStatus) {
        for mut cb in self.hung.lock().unwrap().drain(..) {
            cb(status.clone(), 1.0);
        }
    }
}

impl VehicleLink for FakeLink {
    fn armed(&self) -> bool {
        self.armed.load(Ordering::SeqCst)
    }

    fn list_log_entries(&self) -> Result<Vec<CatalogEntry>, LinkError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.catalog.lock().unwrap().clone())
    }

    fn transfer(&self, entry: &CatalogEntry, destination: &Path, mut on_progress: ProgressCallback) {
        let started = {
            let mut t = self.transfers.lock().unwrap();
            t.push((entry.date.clone(), destination.to_path_buf()));
            t.len()
        };
        if let Some(n) = *self.arm_after.lock().unwrap() {
            if started >= n {
                self.set_armed(true);
            }
        }

        if self.failing.lock().unwrap().contains(&entry.date) {
            on_progress(TransferStatus::Failed(TransferError::NotFound), 0.0);
            return;
        }
        let mode = self.mode.lock().unwrap().clone();
        match mode {
            TransferMode::Complete => {
                std::fs::write(destination, vec![0u8; entry.size_bytes as usize]).unwrap();
                on_progress(TransferStatus::InProgress, 0.5);
                on_progress(TransferStatus::Success, 1.0);
                // Late duplicate terminal call; must be ignored.
                on_progress(TransferStatus::Failed(TransferError::Timeout), 1.0);
            }
            TransferMode::Hang => {
                std::fs::write(destination, vec![0u8; (entry.size_bytes / 2) as usize]).unwrap();
                on_progress(TransferStatus::InProgress, 0.5);
                self.hung.lock().unwrap().push(on_progress);
            }
            TransferMode::Fail(e) => on_progress(TransferStatus::Failed(e), 0.0),
        }
    }
}
