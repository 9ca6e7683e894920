//! Ordered list of configuration directories

use std::path::{Path, PathBuf};

/// Environment variable consulted when no explicit search path is given.
pub const CONFIG_PATH_ENV: &str = "OVERLAY_CONFIG_PATH";

/// Directories searched for configuration files, in declaration order.
///
/// The resolver walks the list back to front for each suffixed name, so the
/// first-declared directory contributes last and wins for that suffix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPath {
    dirs: Vec<PathBuf>,
}

impl SearchPath {
    /// Build a search path from already-separated directories.
    ///
    /// Relative directories are anchored to the current working directory
    /// at construction time so later `chdir` calls do not move them.
    pub fn new<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let dirs = dirs
            .into_iter()
            .map(|d| {
                let d = d.as_ref();
                std::path::absolute(d).unwrap_or_else(|_| d.to_path_buf())
            })
            .collect();
        Self { dirs }
    }

    /// Parse a `;`- or `:`-separated directory list.
    ///
    /// `;` is used when the string contains one (Windows-style lists with
    /// drive letters), otherwise `:`. Empty segments are discarded.
    pub fn parse(raw: &str) -> Self {
        let sep = if raw.contains(';') { ';' } else { ':' };
        Self::new(raw.split(sep).filter(|s| !s.is_empty()))
    }

    /// Search path from [`CONFIG_PATH_ENV`], empty if unset.
    pub fn from_env() -> Self {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(raw) => Self::parse(&raw),
            Err(_) => {
                tracing::debug!("{} not set, search path is empty", CONFIG_PATH_ENV);
                Self::default()
            }
        }
    }

    /// Explicit value if present, else the environment.
    pub fn from_option_or_env(explicit: Option<&str>) -> Self {
        match explicit {
            Some(raw) => Self::parse(raw),
            None => Self::from_env(),
        }
    }

    /// Directories in declaration order.
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.dirs.len()
    }
}
