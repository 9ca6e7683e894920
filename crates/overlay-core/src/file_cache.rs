//! Per-path cache of parsed file contents
//!
//! Entries are keyed by full path and shared by every configuration name
//! that happens to list the same file.

use crate::format::Format;
use crate::resolver::{ConfigFileList, FileDescriptor};
use crate::template::{TemplateContext, TemplateEngine, wants_template};
use crate::value::ConfigValue;
use crate::{Error, Result};
use overlay_fs::FileSystem;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Instant, SystemTime};

/// What the cache remembers about one path.
#[derive(Debug, Clone)]
pub struct FileCacheEntry {
    /// Parsed content; `None` if the file did not exist.
    pub content: Option<Arc<ConfigValue>>,
    /// Modification time seen when the content was loaded.
    pub modified: Option<SystemTime>,
    /// When the load was attempted.
    pub loaded_at: Instant,
}

/// Loads, preprocesses and parses configuration files, caching by path.
pub struct FileCache {
    fs: Arc<dyn FileSystem>,
    format: Format,
    templates: Arc<dyn TemplateEngine>,
    entries: Mutex<HashMap<PathBuf, FileCacheEntry>>,
}

impl FileCache {
    pub fn new(fs: Arc<dyn FileSystem>, format: Format, templates: Arc<dyn TemplateEngine>) -> Self {
        Self {
            fs,
            format,
            templates,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Parsed content of `file`, reading it only when needed.
    ///
    /// The cached content is reused when an entry exists, its modification
    /// time matches the descriptor's, and `force` is false. How often this is
    /// asked is the caller's business (see the staleness controller).
    ///
    /// Missing files yield `Ok(None)`. Read, template and parse failures are
    /// returned with the offending path and are never cached, so the next
    /// call retries the file.
    pub fn ensure_loaded(
        &self,
        file: &FileDescriptor,
        files: &ConfigFileList,
        force: bool,
        now: Instant,
    ) -> Result<Option<Arc<ConfigValue>>> {
        if !force {
            let entries = self.entries.lock();
            if let Some(entry) = entries.get(&file.path) {
                if entry.modified == file.modified {
                    tracing::trace!(path = ?file.path, "File cache hit");
                    return Ok(entry.content.clone());
                }
            }
        }

        let content = match file.modified {
            Some(_) => Some(Arc::new(self.load(file, files)?)),
            None => None,
        };

        self.entries.lock().insert(
            file.path.clone(),
            FileCacheEntry {
                content: content.clone(),
                modified: file.modified,
                loaded_at: now,
            },
        );

        Ok(content)
    }

    fn load(&self, file: &FileDescriptor, files: &ConfigFileList) -> Result<ConfigValue> {
        tracing::debug!(path = ?file.path, name = %file.name, "Loading config file");

        let raw = self
            .fs
            .read_to_string(&file.path)
            .map_err(|source| Error::FileRead {
                path: file.path.clone(),
                source,
            })?;

        let text = if wants_template(&raw) {
            tracing::debug!(path = ?file.path, "Rendering config template");
            let ctx = TemplateContext::new(file, files);
            self.templates
                .render(&raw, &ctx)
                .map_err(|message| Error::TemplatePreprocess {
                    path: file.path.clone(),
                    message,
                })?
        } else {
            raw
        };

        self.format.parse(&text, &file.path)
    }

    /// Snapshot of the entry for `path`, if one exists.
    pub fn entry(&self, path: &Path) -> Option<FileCacheEntry> {
        self.entries.lock().get(path).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::MiniJinjaEngine;
    use overlay_test_utils::MemoryFileSystem;

    fn cache(fs: Arc<MemoryFileSystem>) -> FileCache {
        FileCache::new(fs, Format::Yaml, Arc::new(MiniJinjaEngine))
    }

    fn descriptor(fs: &MemoryFileSystem, path: &str) -> FileDescriptor {
        FileDescriptor {
            name: "app".into(),
            suffixed_name: "app".into(),
            path: PathBuf::from(path),
            modified: fs.probe(Path::new(path)),
        }
    }

    #[test]
    fn missing_file_is_absent_not_error() {
        let fs = Arc::new(MemoryFileSystem::new());
        let cache = cache(fs.clone());
        let file = descriptor(&fs, "/c/app.yml");

        let loaded = cache
            .ensure_loaded(&file, &ConfigFileList::default(), false, Instant::now())
            .unwrap();

        assert!(loaded.is_none());
        assert_eq!(fs.reads(), 0);
        assert!(cache.entry(&file.path).is_some());
    }

    #[test]
    fn unchanged_mtime_reuses_cached_content() {
        let fs = Arc::new(MemoryFileSystem::new());
        fs.write("/c/app.yml", "a: 1\n");
        let cache = cache(fs.clone());
        let file = descriptor(&fs, "/c/app.yml");
        let files = ConfigFileList::default();

        let first = cache.ensure_loaded(&file, &files, false, Instant::now()).unwrap();
        let second = cache.ensure_loaded(&file, &files, false, Instant::now()).unwrap();

        assert_eq!(fs.reads(), 1);
        assert!(Arc::ptr_eq(&first.unwrap(), &second.unwrap()));
    }

    #[test]
    fn changed_mtime_or_force_rereads() {
        let fs = Arc::new(MemoryFileSystem::new());
        fs.write("/c/app.yml", "a: 1\n");
        let cache = cache(fs.clone());
        let files = ConfigFileList::default();

        cache
            .ensure_loaded(&descriptor(&fs, "/c/app.yml"), &files, false, Instant::now())
            .unwrap();
        cache
            .ensure_loaded(&descriptor(&fs, "/c/app.yml"), &files, true, Instant::now())
            .unwrap();
        assert_eq!(fs.reads(), 2);

        fs.write("/c/app.yml", "a: 2\n");
        let reloaded = cache
            .ensure_loaded(&descriptor(&fs, "/c/app.yml"), &files, false, Instant::now())
            .unwrap()
            .unwrap();
        assert_eq!(fs.reads(), 3);
        assert_eq!(reloaded.as_map().unwrap().get("a"), Some(&ConfigValue::Integer(2)));
    }

    #[test]
    fn parse_failure_is_not_cached() {
        let fs = Arc::new(MemoryFileSystem::new());
        fs.write("/c/app.yml", "a: [broken\n");
        let cache = cache(fs.clone());
        let file = descriptor(&fs, "/c/app.yml");
        let files = ConfigFileList::default();

        let err = cache.ensure_loaded(&file, &files, false, Instant::now()).unwrap_err();
        assert_eq!(err.path(), Some(Path::new("/c/app.yml")));
        assert!(cache.entry(&file.path).is_none());

        assert!(cache.ensure_loaded(&file, &files, false, Instant::now()).is_err());
        assert_eq!(fs.reads(), 2);
    }

    #[test]
    fn template_marker_triggers_rendering() {
        let fs = Arc::new(MemoryFileSystem::new());
        fs.write(
            "/c/app.yml",
            "# OVERLAY_CONFIG: TEMPLATE\nname: \"{{ config_name }}\"\ndir: \"{{ config_directory }}\"\n",
        );
        let cache = cache(fs.clone());
        let file = descriptor(&fs, "/c/app.yml");

        let value = cache
            .ensure_loaded(&file, &ConfigFileList::default(), false, Instant::now())
            .unwrap()
            .unwrap();
        let map = value.as_map().unwrap();
        assert_eq!(map.get("name").and_then(ConfigValue::as_str), Some("app"));
        assert_eq!(map.get("dir").and_then(ConfigValue::as_str), Some("/c"));
    }

    #[test]
    fn template_failure_maps_to_template_error() {
        let fs = Arc::new(MemoryFileSystem::new());
        fs.write("/c/app.yml", "# OVERLAY_CONFIG: TEMPLATE\na: {{ nope(\n");
        let cache = cache(fs.clone());
        let file = descriptor(&fs, "/c/app.yml");

        let err = cache
            .ensure_loaded(&file, &ConfigFileList::default(), false, Instant::now())
            .unwrap_err();
        assert!(matches!(err, Error::TemplatePreprocess { .. }));
    }
}
