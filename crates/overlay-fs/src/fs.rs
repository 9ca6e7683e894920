//! Filesystem probes and reads

use crate::{Error, Result};
use std::fs;
use std::path::Path;
use std::time::SystemTime;

/// The filesystem operations the engine performs.
///
/// Implementations must be cheap to share across threads; the engine holds
/// one behind an `Arc` and calls it from whichever thread asks for a
/// configuration.
pub trait FileSystem: Send + Sync {
    /// Modification time of the file at `path`, or `None` if it does not exist.
    ///
    /// A file that cannot be stat'ed (dangling symlink, permission denied on
    /// the parent) is reported as absent rather than as an error.
    fn probe(&self, path: &Path) -> Option<SystemTime>;

    /// Read the whole file as UTF-8 text.
    fn read_to_string(&self, path: &Path) -> Result<String>;
}

/// [`FileSystem`] backed by `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn probe(&self, path: &Path) -> Option<SystemTime> {
        let metadata = fs::metadata(path).ok()?;
        if !metadata.is_file() {
            return None;
        }
        // Platforms without mtime support still need a stable stamp for
        // existing files.
        Some(metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH))
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        tracing::trace!(?path, "Reading file");
        fs::read_to_string(path).map_err(|e| Error::io(path, e))
    }
}
