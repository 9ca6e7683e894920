//! Store construction options

use crate::Result;
use crate::merge::SequenceMerge;
use crate::store::{ConfigStore, ConfigStoreBuilder, DEFAULT_EXTENSION, DEFAULT_ROOT_NAME};
use crate::suffix::{ENVIRONMENT_ENV, HOSTNAME_ENV, StandardSuffixes};
use overlay_fs::{CONFIG_PATH_ENV, SearchPath};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Plain-data description of a store, loadable from any serde format.
///
/// Unset fields take the documented defaults; `environment` and `hostname`
/// feed [`StandardSuffixes`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreOptions {
    /// `;`- or `:`-separated search directories.
    pub path: Option<String>,
    pub root_name: String,
    pub reload_delay_secs: u64,
    pub reload_disabled: bool,
    pub extension: String,
    pub environment: Option<String>,
    pub hostname: Option<String>,
    pub sequence_merge: SequenceMerge,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            path: None,
            root_name: DEFAULT_ROOT_NAME.to_string(),
            reload_delay_secs: 300,
            reload_disabled: false,
            extension: DEFAULT_EXTENSION.to_string(),
            environment: None,
            hostname: None,
            sequence_merge: SequenceMerge::Replace,
        }
    }
}

impl StoreOptions {
    /// Defaults overlaid with `OVERLAY_CONFIG_PATH`, `OVERLAY_ENV` and
    /// `OVERLAY_HOSTNAME` (plus their `RUST_ENV` / `HOSTNAME` fallbacks).
    pub fn from_env() -> Self {
        let suffixes = StandardSuffixes::from_env();
        tracing::trace!(
            path_var = CONFIG_PATH_ENV,
            env_var = ENVIRONMENT_ENV,
            host_var = HOSTNAME_ENV,
            "Reading store options from environment"
        );
        Self {
            path: std::env::var(CONFIG_PATH_ENV).ok(),
            environment: suffixes.environment().map(str::to_string),
            hostname: suffixes.hostname().map(str::to_string),
            ..Self::default()
        }
    }

    /// A builder configured from these options.
    pub fn into_builder(self) -> ConfigStoreBuilder {
        ConfigStore::builder()
            .search_path(SearchPath::parse(self.path.as_deref().unwrap_or("")))
            .suffixes(StandardSuffixes::new(self.environment, self.hostname))
            .extension(self.extension)
            .reload_delay(Duration::from_secs(self.reload_delay_secs))
            .reload_disabled(self.reload_disabled)
            .sequence_merge(self.sequence_merge)
            .root_name(self.root_name)
    }

    pub fn build(self) -> Result<ConfigStore> {
        self.into_builder().build()
    }
}
