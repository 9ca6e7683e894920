//! [`TestConfigDir`] builder for on-disk configuration scenarios.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

/// A temporary directory of configuration files.
///
/// Every write stamps the file with a modification time strictly later than
/// any previous write through this fixture, so tests never depend on the
/// filesystem's timestamp granularity.
///
/// # Example
///
/// ```rust,no_run
/// use overlay_test_utils::TestConfigDir;
///
/// let mut dir = TestConfigDir::new();
/// dir.write("app.yml", "a: 1\n");
/// dir.write("app_local.yml", "b: 2\n");
/// dir.assert_file_exists("app_local.yml");
/// ```
pub struct TestConfigDir {
    temp_dir: TempDir,
    next_mtime: SystemTime,
}

impl Default for TestConfigDir {
    fn default() -> Self {
        Self::new()
    }
}

impl TestConfigDir {
    /// Create an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
            next_mtime: SystemTime::UNIX_EPOCH + Duration::from_secs(1_600_000_000),
        }
    }

    /// Return the root path of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Full path of `name` inside the directory.
    pub fn path(&self, name: &str) -> PathBuf {
        self.root().join(name)
    }

    /// Write `content` to `name` (creating parent directories) with a fresh
    /// modification time.
    pub fn write(&mut self, name: &str, content: &str) -> PathBuf {
        let path = self.path(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        self.touch(name);
        path
    }

    /// Give `name` a fresh modification time without changing its content.
    pub fn touch(&mut self, name: &str) {
        self.next_mtime += Duration::from_secs(1);
        File::options()
            .write(true)
            .open(self.path(name))
            .unwrap()
            .set_modified(self.next_mtime)
            .unwrap();
    }

    pub fn remove(&self, name: &str) {
        fs::remove_file(self.path(name)).unwrap();
    }

    /// Assert that `name` exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, name: &str) {
        let full_path = self.path(name);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }
}
