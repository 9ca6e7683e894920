//! Error types for overlay-core

use std::path::PathBuf;

/// Result type for overlay-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type callbacks may return; propagated to whoever triggered the check.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while loading or refreshing configuration
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A file that existed at probe time could not be read
    #[error("Failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: overlay_fs::Error,
    },

    /// The template step rejected the file
    #[error("Template preprocessing failed for {path}: {message}")]
    TemplatePreprocess { path: PathBuf, message: String },

    /// The structured-data parser rejected the (possibly preprocessed) content
    #[error("Failed to parse {format} config at {path}: {message}")]
    Parse {
        path: PathBuf,
        format: String,
        message: String,
    },

    /// A change-notification callback failed
    #[error("on_load callback for {name:?} failed: {source}")]
    Callback {
        name: String,
        #[source]
        source: CallbackError,
    },

    /// The configured file extension has no parser
    #[error("Unsupported config format: {extension}")]
    UnsupportedFormat { extension: String },

    /// Typed access to a snapshot failed
    #[error("Snapshot does not match the requested type: {message}")]
    Deserialize { message: String },
}

impl Error {
    /// The configuration file the error is about, if any.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::FileRead { path, .. }
            | Self::TemplatePreprocess { path, .. }
            | Self::Parse { path, .. } => Some(path),
            _ => None,
        }
    }
}
