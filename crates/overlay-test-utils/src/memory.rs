//! [`MemoryFileSystem`] — an in-memory [`FileSystem`] with I/O counters.

use overlay_fs::{Error, FileSystem, Result};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, SystemTime};

#[derive(Debug, Clone)]
struct MemFile {
    content: String,
    modified: SystemTime,
}

/// In-memory files keyed by path.
///
/// Every [`write`](MemoryFileSystem::write) gives the file a fresh, strictly
/// increasing modification time, so content changes are always visible to
/// mtime-based change detection.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    files: Mutex<HashMap<PathBuf, MemFile>>,
    unreadable: Mutex<HashSet<PathBuf>>,
    tick: AtomicU64,
    probes: AtomicUsize,
    reads: AtomicUsize,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or replace a file, bumping its modification time.
    pub fn write(&self, path: impl AsRef<Path>, content: &str) {
        let tick = self.tick.fetch_add(1, Ordering::SeqCst) + 1;
        self.files.lock().insert(
            path.as_ref().to_path_buf(),
            MemFile {
                content: content.to_string(),
                modified: SystemTime::UNIX_EPOCH + Duration::from_secs(tick),
            },
        );
    }

    /// Replace a file's content without changing its modification time.
    ///
    /// # Panics
    /// Panics if the file does not exist.
    pub fn write_keep_mtime(&self, path: impl AsRef<Path>, content: &str) {
        let mut files = self.files.lock();
        let file = files
            .get_mut(path.as_ref())
            .unwrap_or_else(|| panic!("no such file: {}", path.as_ref().display()));
        file.content = content.to_string();
    }

    pub fn remove(&self, path: impl AsRef<Path>) {
        self.files.lock().remove(path.as_ref());
    }

    /// Make reads of `path` fail with a permission error while it still
    /// probes as existing.
    pub fn make_unreadable(&self, path: impl AsRef<Path>) {
        self.unreadable.lock().insert(path.as_ref().to_path_buf());
    }

    /// Number of `probe` calls so far.
    pub fn probes(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    /// Number of `read_to_string` calls so far.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Zero both counters.
    pub fn reset_counters(&self) {
        self.probes.store(0, Ordering::SeqCst);
        self.reads.store(0, Ordering::SeqCst);
    }
}

impl FileSystem for MemoryFileSystem {
    fn probe(&self, path: &Path) -> Option<SystemTime> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.files.lock().get(path).map(|f| f.modified)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.unreadable.lock().contains(path) {
            return Err(Error::io(
                path,
                std::io::Error::new(std::io::ErrorKind::PermissionDenied, "permission denied"),
            ));
        }
        self.files
            .lock()
            .get(path)
            .map(|f| f.content.clone())
            .ok_or_else(|| {
                Error::io(
                    path,
                    std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
                )
            })
    }
}
