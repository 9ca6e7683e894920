//! Layered, cached, change-aware configuration
//!
//! `overlay-core` loads a configuration *name* (e.g. `global`) from a family
//! of files, merges them in overlay order and serves the result as an
//! immutable [`Snapshot`], re-checking the disk at most once per reload delay.
//!
//! # Architecture
//!
//! ```text
//!                     ConfigStore
//!                          |
//!   +-----------+----------+-----------+-------------+-----------+
//!   |           |          |           |             |           |
//! resolver  file_cache   merge   snapshot_cache  staleness    notify
//!   |           |
//! suffix   format + template
//!   |
//! overlay-fs (filesystem, search path, clock)
//! ```
//!
//! # Overlay order
//!
//! For each suffixed name (`global`, `global_local`, `global_production`, ...
//! see [`StandardSuffixes`]) and each search directory from last to first,
//! the file `<dir>/<suffixed>.<ext>` contributes if it exists. Later files
//! win: maps merge recursively, sequences and scalars are replaced.
//!
//! # Example
//!
//! ```no_run
//! use overlay_core::{ConfigStore, FixedSuffixes};
//! use overlay_fs::SearchPath;
//!
//! let store = ConfigStore::builder()
//!     .search_path(SearchPath::parse("/etc/myapp:/srv/myapp/config"))
//!     .suffixes(FixedSuffixes::new().with("app", &["app", "app_local"]))
//!     .build()?;
//!
//! let _host = store.lookup("app", ["database", "host"])?;
//! store.on_load(&["app"], |_event| {
//!     // drop anything derived from the old configuration
//!     Ok(())
//! })?;
//! # Ok::<(), overlay_core::Error>(())
//! ```

pub mod error;
pub mod file_cache;
pub mod format;
pub mod merge;
pub mod notify;
pub mod options;
pub mod policy;
pub mod resolver;
pub mod snapshot;
pub mod snapshot_cache;
pub mod staleness;
pub mod store;
pub mod suffix;
pub mod template;
pub mod value;

pub use error::{CallbackError, Error, Result};
pub use file_cache::{FileCache, FileCacheEntry};
pub use format::Format;
pub use merge::{SequenceMerge, merge, weave};
pub use notify::{CallbackRegistry, LoadEvent, OnLoadCallback, callback};
pub use options::StoreOptions;
pub use policy::{DEFAULT_RELOAD_DELAY, ReloadGuard, ReloadPolicy};
pub use resolver::{ConfigFileList, FileDescriptor, FileResolver};
pub use snapshot::{PathSegment, Snapshot};
pub use snapshot_cache::SnapshotCache;
pub use staleness::StalenessController;
pub use store::{ConfigStore, ConfigStoreBuilder, DEFAULT_EXTENSION, DEFAULT_ROOT_NAME};
pub use suffix::{FixedSuffixes, StandardSuffixes, SuffixSource};
pub use template::{MiniJinjaEngine, TemplateContext, TemplateEngine};
pub use value::{ConfigMap, ConfigValue, canonical_key};
