//! The configuration store: the engine's public face
//!
//! A [`ConfigStore`] owns every cache, the reload policy and the callback
//! registry. Build one per application (or per test) and share it by
//! reference or `Arc`.
//!
//! # Access flow
//!
//! ```text
//! get_configuration(name)
//!     -> staleness gate: checked within reload delay?  -- yes --> cached snapshot
//!     -> resolve candidate files, compare with fingerprint
//!         -> changed (and reload enabled): drop snapshot, fire on_load callbacks
//!     -> cached snapshot, or load files + merge + store
//! ```

use crate::file_cache::{FileCache, FileCacheEntry};
use crate::format::Format;
use crate::merge::{SequenceMerge, merge};
use crate::notify::{CallbackRegistry, LoadEvent, OnLoadCallback, callback};
use crate::policy::{DEFAULT_RELOAD_DELAY, ReloadGuard, ReloadPolicy};
use crate::resolver::{ConfigFileList, FileResolver};
use crate::snapshot::{PathSegment, Snapshot};
use crate::snapshot_cache::SnapshotCache;
use crate::staleness::StalenessController;
use crate::suffix::{StandardSuffixes, SuffixSource};
use crate::template::{MiniJinjaEngine, TemplateEngine};
use crate::value::ConfigValue;
use crate::{CallbackError, Result};
use overlay_fs::{Clock, FileSystem, OsFileSystem, SearchPath, SystemClock};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Name looked up by [`ConfigStore::root`] unless configured otherwise.
pub const DEFAULT_ROOT_NAME: &str = "global";

/// Default configuration file extension.
pub const DEFAULT_EXTENSION: &str = "yml";

/// Layered, cached, change-aware configuration.
pub struct ConfigStore {
    resolver: FileResolver,
    files: FileCache,
    snapshots: SnapshotCache,
    staleness: StalenessController,
    callbacks: CallbackRegistry,
    policy: ReloadPolicy,
    clock: Arc<dyn Clock>,
    sequence_merge: SequenceMerge,
    root_name: String,
}

impl std::fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigStore")
            .field("search_path", self.resolver.search_path())
            .field("extension", &self.resolver.extension())
            .field("policy", &self.policy)
            .field("root_name", &self.root_name)
            .finish_non_exhaustive()
    }
}

impl ConfigStore {
    pub fn builder() -> ConfigStoreBuilder {
        ConfigStoreBuilder::default()
    }

    /// Merged snapshot for `name`.
    ///
    /// Runs a freshness check first when the name has not been checked
    /// within the reload delay. Load errors and callback errors from that
    /// check are returned; a failed load caches nothing, so the next call
    /// tries again.
    pub fn get_configuration(&self, name: &str) -> Result<Snapshot> {
        let mut resolved = None;
        if self
            .staleness
            .take_due(name, self.clock.now(), self.policy.delay())
        {
            resolved = Some(self.check_name(name)?.0);
        }

        self.snapshots
            .get_or_build(name, || self.build(name, resolved, false))
    }

    /// Value at `path` inside configuration `name`.
    ///
    /// A missing key, out-of-range index or type mismatch along the path is
    /// `Ok(None)`; only load failures are errors.
    pub fn lookup<I, S>(&self, name: &str, path: I) -> Result<Option<ConfigValue>>
    where
        I: IntoIterator<Item = S>,
        S: Into<PathSegment>,
    {
        let snapshot = self.get_configuration(name)?;
        Ok(snapshot.lookup(path).cloned())
    }

    /// Top-level `key` of the root configuration (`global` by default).
    pub fn root(&self, key: &str) -> Result<Option<ConfigValue>> {
        self.lookup(&self.root_name, [key])
    }

    pub fn root_name(&self) -> &str {
        &self.root_name
    }

    /// Whether the candidate files for `name` differ from those its cached
    /// snapshot was built from. A name with no cached snapshot counts as
    /// changed. Probes the filesystem; invalidates nothing.
    pub fn has_changed(&self, name: &str) -> bool {
        let current = self.resolver.resolve(name);
        self.snapshots.fingerprint(name).as_ref() != Some(&current)
    }

    /// Check `name`, or every name with a cached snapshot when `None`.
    ///
    /// Returns the names whose snapshots were dropped (and whose callbacks
    /// fired). Ignores the staleness gate.
    pub fn check_config_changed(&self, name: Option<&str>) -> Result<Vec<String>> {
        let names = match name {
            Some(n) => vec![n.to_string()],
            None => self.snapshots.names(),
        };
        let mut changed = Vec::new();
        for name in names {
            if self.check_name(&name)?.1 {
                changed.push(name);
            }
        }
        Ok(changed)
    }

    /// Resolve `name`'s files and drop its snapshot if they changed.
    ///
    /// Returns the resolved list (for reuse by a rebuild) and whether the
    /// snapshot was dropped. Callbacks run after every engine lock is
    /// released.
    fn check_name(&self, name: &str) -> Result<(ConfigFileList, bool)> {
        let files = self.resolver.resolve(name);
        if self.policy.is_disabled() {
            tracing::trace!(name, "Reload disabled, skipping invalidation");
            return Ok((files, false));
        }

        let invalidated = self
            .snapshots
            .invalidate_if(name, |fingerprint| fingerprint != &files);
        if invalidated {
            tracing::info!(name, "Configuration changed on disk");
            self.callbacks.fire(name)?;
        }
        Ok((files, invalidated))
    }

    fn build(
        &self,
        name: &str,
        resolved: Option<ConfigFileList>,
        force: bool,
    ) -> Result<(Snapshot, ConfigFileList)> {
        let files = resolved.unwrap_or_else(|| self.resolver.resolve(name));
        let now = self.clock.now();

        let contents = files
            .files()
            .iter()
            .map(|file| self.files.ensure_loaded(file, &files, force, now))
            .collect::<Result<Vec<_>>>()?;

        let snapshot = merge(contents.iter().map(|c| c.as_deref()), self.sequence_merge);
        tracing::debug!(
            name,
            candidates = files.len(),
            existing = files.existing().count(),
            "Built configuration snapshot"
        );
        Ok((snapshot, files))
    }

    /// Re-read every file of `name` regardless of modification times and
    /// replace its snapshot. Fires callbacks when the content differs.
    pub fn refresh(&self, name: &str) -> Result<Snapshot> {
        let previous = self.snapshots.get(name);
        self.snapshots.invalidate(name);
        let snapshot = self
            .snapshots
            .get_or_build(name, || self.build(name, None, true))?;

        if previous.is_some_and(|p| p != snapshot) {
            self.callbacks.fire(name)?;
        }
        Ok(snapshot)
    }

    /// Flush every cache, unless reload is disabled and `force` is false.
    ///
    /// Meant for development; see [`ConfigStore::flush_cache`].
    pub fn reload(&self, force: bool) {
        if force || !self.policy.is_disabled() {
            self.flush_cache();
        }
    }

    /// Run `work` with reloading disabled, then restore the previous setting.
    ///
    /// Restoration happens on every exit path, panics included. When the
    /// restored setting re-enables reloading, every cached name is checked
    /// immediately and any error from that check is returned. If `work`
    /// panics the check still runs while unwinding; its errors are logged.
    pub fn disable_reload<T, F>(&self, work: F) -> Result<T>
    where
        F: FnOnce() -> T,
    {
        let unwind = RecheckOnUnwind { store: self };
        let result = {
            let _guard = self.reload_guard();
            work()
        };
        std::mem::forget(unwind);

        if !self.policy.is_disabled() {
            self.check_config_changed(None)?;
        }
        Ok(result)
    }

    /// Disable reloading until the guard is dropped.
    ///
    /// Unlike [`ConfigStore::disable_reload`], dropping the guard does not
    /// run a check; the next access past the reload delay will.
    pub fn reload_guard(&self) -> ReloadGuard<'_> {
        self.policy.disable()
    }

    /// Register `f` for changes to `names` (any name when empty).
    ///
    /// `f` runs once immediately with [`LoadEvent::Registered`]. The returned
    /// handle can be passed to [`ConfigStore::on_load_shared`] to subscribe
    /// the same callback to more names without duplicate invocations.
    pub fn on_load<F>(&self, names: &[&str], f: F) -> Result<OnLoadCallback>
    where
        F: Fn(&LoadEvent<'_>) -> std::result::Result<(), CallbackError> + Send + Sync + 'static,
    {
        let cb = callback(f);
        self.callbacks.subscribe(names, cb.clone())?;
        Ok(cb)
    }

    /// Register an existing callback handle.
    pub fn on_load_shared(&self, names: &[&str], cb: OnLoadCallback) -> Result<()> {
        self.callbacks.subscribe(names, cb)
    }

    pub fn set_reload_delay(&self, delay: Duration) {
        self.policy.set_delay(delay);
    }

    pub fn reload_delay(&self) -> Duration {
        self.policy.delay()
    }

    pub fn set_reload_disabled(&self, disabled: bool) {
        self.policy.set_disabled(disabled);
    }

    pub fn reload_disabled(&self) -> bool {
        self.policy.is_disabled()
    }

    /// Current candidate files for `name`.
    pub fn config_files(&self, name: &str) -> ConfigFileList {
        self.resolver.resolve(name)
    }

    /// Names with a cached snapshot.
    pub fn cached_names(&self) -> Vec<String> {
        self.snapshots.names()
    }

    /// What the file cache holds for `path`.
    pub fn cached_file(&self, path: &Path) -> Option<FileCacheEntry> {
        self.files.entry(path)
    }

    /// Drop every snapshot, fingerprint, file cache entry and check time.
    ///
    /// Every following access re-reads disk. Not for steady-state production
    /// use.
    pub fn flush_cache(&self) {
        tracing::info!("Flushing configuration caches");
        self.snapshots.clear();
        self.files.clear();
        self.staleness.clear();
    }
}

/// Runs the re-enable check if [`ConfigStore::disable_reload`] unwinds.
///
/// Declared before the reload guard so it drops after the flag is restored.
struct RecheckOnUnwind<'a> {
    store: &'a ConfigStore,
}

impl Drop for RecheckOnUnwind<'_> {
    fn drop(&mut self) {
        if self.store.policy.is_disabled() {
            return;
        }
        if let Err(e) = self.store.check_config_changed(None) {
            tracing::warn!(error = %e, "Change check after panicking reload scope failed");
        }
    }
}

/// Builder for [`ConfigStore`].
pub struct ConfigStoreBuilder {
    search_path: Option<SearchPath>,
    suffixes: Option<Arc<dyn SuffixSource>>,
    extension: String,
    fs: Arc<dyn FileSystem>,
    clock: Arc<dyn Clock>,
    templates: Arc<dyn TemplateEngine>,
    reload_delay: Duration,
    reload_disabled: bool,
    sequence_merge: SequenceMerge,
    root_name: String,
}

impl Default for ConfigStoreBuilder {
    fn default() -> Self {
        Self {
            search_path: None,
            suffixes: None,
            extension: DEFAULT_EXTENSION.to_string(),
            fs: Arc::new(OsFileSystem),
            clock: Arc::new(SystemClock),
            templates: Arc::new(MiniJinjaEngine),
            reload_delay: DEFAULT_RELOAD_DELAY,
            reload_disabled: false,
            sequence_merge: SequenceMerge::default(),
            root_name: DEFAULT_ROOT_NAME.to_string(),
        }
    }
}

impl ConfigStoreBuilder {
    /// Directories to search. Defaults to `OVERLAY_CONFIG_PATH`.
    pub fn search_path(mut self, search_path: SearchPath) -> Self {
        self.search_path = Some(search_path);
        self
    }

    /// Suffix generator. Defaults to [`StandardSuffixes::from_env`].
    pub fn suffixes(mut self, suffixes: impl SuffixSource + 'static) -> Self {
        self.suffixes = Some(Arc::new(suffixes));
        self
    }

    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn filesystem(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn template_engine(mut self, templates: Arc<dyn TemplateEngine>) -> Self {
        self.templates = templates;
        self
    }

    pub fn reload_delay(mut self, delay: Duration) -> Self {
        self.reload_delay = delay;
        self
    }

    pub fn reload_disabled(mut self, disabled: bool) -> Self {
        self.reload_disabled = disabled;
        self
    }

    pub fn sequence_merge(mut self, mode: SequenceMerge) -> Self {
        self.sequence_merge = mode;
        self
    }

    pub fn root_name(mut self, name: impl Into<String>) -> Self {
        self.root_name = name.into();
        self
    }

    /// Fails only when the extension has no parser.
    pub fn build(self) -> Result<ConfigStore> {
        let format = Format::from_extension(&self.extension)?;
        let search_path = self.search_path.unwrap_or_else(SearchPath::from_env);
        let suffixes = self
            .suffixes
            .unwrap_or_else(|| Arc::new(StandardSuffixes::from_env()));

        tracing::debug!(
            dirs = search_path.len(),
            extension = %self.extension,
            "Creating config store"
        );

        Ok(ConfigStore {
            resolver: FileResolver::new(search_path, suffixes, self.extension, self.fs.clone()),
            files: FileCache::new(self.fs, format, self.templates),
            snapshots: SnapshotCache::new(),
            staleness: StalenessController::new(),
            callbacks: CallbackRegistry::new(),
            policy: ReloadPolicy::new(self.reload_disabled, self.reload_delay),
            clock: self.clock,
            sequence_merge: self.sequence_merge,
            root_name: self.root_name,
        })
    }
}
