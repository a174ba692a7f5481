//! The one piece of state shared between the download and upload loops.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct Current {
    active_path: Option<PathBuf>,
    completed: bool,
}

/// Which local file is being downloaded right now, and whether it finished.
///
/// Written only by the download loop, read only by the upload loop. Every
/// access is a short critical section; no I/O happens under the lock.
#[derive(Debug, Default)]
pub struct DownloadState {
    current: Mutex<Current>,
}

impl DownloadState {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Current> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mark `path` as the file being written; it is incomplete until [`DownloadState::mark_completed`].
    pub fn begin(&self, path: &Path) {
        let mut cur = self.lock();
        cur.active_path = Some(path.to_path_buf());
        cur.completed = false;
    }

    /// The active download finished successfully.
    pub fn mark_completed(&self) {
        self.lock().completed = true;
    }

    /// False only for the active path while its download is unfinished.
    /// Any other path was size-checked when it was scheduled and counts as complete.
    pub fn is_complete(&self, path: &Path) -> bool {
        let cur = self.lock();
        match &cur.active_path {
            Some(active) if active == path => cur.completed,
            _ => true,
        }
    }

    /// `(active_path, completed)` as one consistent read.
    pub fn snapshot(&self) -> (Option<PathBuf>, bool) {
        let cur = self.lock();
        (cur.active_path.clone(), cur.completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_state_treats_everything_as_complete() {
        let state = DownloadState::new();
        assert!(state.is_complete(Path::new("/logs/a.ulg")));
        assert_eq!(state.snapshot(), (None, false));
    }

    #[test]
    fn active_path_incomplete_until_marked() {
        let state = DownloadState::new();
        let active = Path::new("/logs/2024-05-02T00:00:00Z.ulg");
        let other = Path::new("/logs/2024-05-01T00:00:00Z.ulg");
        state.begin(active);
        assert!(!state.is_complete(active));
        assert!(state.is_complete(other));
        state.mark_completed();
        assert!(state.is_complete(active));
    }

    #[test]
    fn begin_resets_completion() {
        let state = DownloadState::new();
        let first = Path::new("/logs/2024-05-01T00:00:00Z.ulg");
        let second = Path::new("/logs/2024-05-02T00:00:00Z.ulg");
        state.begin(first);
        state.mark_completed();
        state.begin(second);
        assert!(state.is_complete(first));
        assert!(!state.is_complete(second));
        assert_eq!(state.snapshot(), (Some(second.to_path_buf()), false));
    }
}
