//! Get command implementation

use overlay_core::{ConfigStore, PathSegment};

use super::render;
use crate::cli::OutputFormat;
use crate::error::{CliError, Result};

/// Run the get command, returning the rendered value.
pub fn run_get(store: &ConfigStore, name: &str, path: &[String], format: OutputFormat) -> Result<String> {
    let segments: Vec<PathSegment> = path.iter().map(|p| PathSegment::parse(p)).collect();
    match store.lookup(name, &segments)? {
        Some(value) => render(&value, format),
        None => Err(CliError::user(format!(
            "No value at {}:{}",
            name,
            segments
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(".")
        ))),
    }
}
