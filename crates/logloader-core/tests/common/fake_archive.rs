//! In-memory archive recording what it was sent.

use logloader_core::archive::{Archive, UploadError, UploadReceipt};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

pub struct FakeArchive {
    reachable: AtomicBool,
    probes: AtomicUsize,
    uploads: Mutex<Vec<PathBuf>>,
    /// File names whose upload is answered with HTTP 500.
    rejected: Mutex<HashSet<String>>,
    /// File names whose upload is answered with HTTP 503.
    throttled: Mutex<HashSet<String>>,
    /// Runs after every accepted upload.
    after_upload: Mutex<Option<Box<dyn Fn() + Send>>>,
}

impl Default for FakeArchive {
    fn default() -> Self {
        Self {
            reachable: AtomicBool::new(true),
            probes: AtomicUsize::new(0),
            uploads: Mutex::new(Vec::new()),
            rejected: Mutex::new(HashSet::new()),
            throttled: Mutex::new(HashSet::new()),
            after_upload: Mutex::new(None),
        }
    }
}

impl FakeArchive {
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    pub fn reject(&self, file_name: &str) {
        self.rejected.lock().unwrap().insert(file_name.to_string());
    }

    pub fn throttle(&self, file_name: &str) {
        self.throttled.lock().unwrap().insert(file_name.to_string());
    }

    pub fn accept_all(&self) {
        self.rejected.lock().unwrap().clear();
        self.throttled.lock().unwrap().clear();
    }

    pub fn after_upload(&self, hook: impl Fn() + Send + 'static) {
        *self.after_upload.lock().unwrap() = Some(Box::new(hook));
    }

    /// Paths successfully uploaded, in order.
    pub fn uploaded(&self) -> Vec<PathBuf> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn probes(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }
}

impl Archive for FakeArchive {
    fn probe(&self) -> bool {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.reachable.load(Ordering::SeqCst)
    }

    fn upload(&self, path: &Path) -> Result<UploadReceipt, UploadError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if self.rejected.lock().unwrap().contains(&name) {
            return Err(UploadError::UnexpectedStatus { status: 500 });
        }
        if self.throttled.lock().unwrap().contains(&name) {
            return Err(UploadError::UnexpectedStatus { status: 503 });
        }
        let data = std::fs::read(path).map_err(|source| UploadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.uploads.lock().unwrap().push(path.to_path_buf());
        if let Some(hook) = self.after_upload.lock().unwrap().as_ref() {
            hook();
        }
        let url = url::Url::parse(&format!("https://archive.test/plot_app?log={}", name)).unwrap();
        Ok(UploadReceipt {
            url,
            bytes: data.len() as u64,
            sha256: logloader_core::checksum::sha256_bytes(&data),
        })
    }
}
