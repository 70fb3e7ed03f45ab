//! Per-file size bookkeeping

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Last observed size of every watched file.
///
/// Only the coordinator writes here, so a read followed by a later
/// `record` for the same path cannot interleave with another write. The
/// lock is only held for the lookup or the insert itself, never across the
/// hand-off to the engine, so queries do not wait on a full queue.
#[derive(Debug, Default)]
pub struct FileWatchState {
    sizes: Mutex<HashMap<PathBuf, u64>>,
}

impl FileWatchState {
    /// Seed every target with size 0
    pub fn new<'a>(files: impl IntoIterator<Item = &'a PathBuf>) -> Self {
        let sizes = files.into_iter().map(|f| (f.clone(), 0)).collect();
        Self {
            sizes: Mutex::new(sizes),
        }
    }

    /// Last size recorded for `path` (0 if never seen)
    pub(crate) fn last_known(&self, path: &Path) -> u64 {
        self.lock().get(path).copied().unwrap_or(0)
    }

    /// Copy of all entries
    pub fn snapshot(&self) -> HashMap<PathBuf, u64> {
        self.lock().clone()
    }

    /// Store the size a record was emitted for
    pub(crate) fn record(&self, path: &Path, size: u64) {
        self.lock().insert(path.to_path_buf(), size);
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PathBuf, u64>> {
        // A panic while holding the guard cannot leave a size half-written.
        self.sizes.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
