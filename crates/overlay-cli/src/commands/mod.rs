//! Command implementations for overlay-cli

pub mod dump;
pub mod files;
pub mod get;
pub mod watch;

pub use dump::run_dump;
pub use files::run_files;
pub use get::run_get;
pub use watch::run_watch;

use crate::cli::OutputFormat;
use crate::error::{CliError, Result};
use serde::Serialize;

/// Encode `value` in the requested format, always ending with a newline.
pub fn render<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> Result<String> {
    let mut out = match format {
        OutputFormat::Yaml => serde_yaml::to_string(value).map_err(|e| CliError::Render(e.to_string()))?,
        OutputFormat::Json => {
            serde_json::to_string_pretty(value).map_err(|e| CliError::Render(e.to_string()))?
        }
    };
    if !out.ends_with('\n') {
        out.push('\n');
    }
    Ok(out)
}

#[cfg(test)]
pub(crate) mod test_support {
    use overlay_core::{ConfigStore, FixedSuffixes};
    use overlay_fs::SearchPath;
    use overlay_test_utils::MemoryFileSystem;
    use std::sync::Arc;

    pub const DIR: &str = "/etc/app";

    pub fn store_with(files: &[(&str, &str)]) -> (Arc<MemoryFileSystem>, ConfigStore) {
        let fs = Arc::new(MemoryFileSystem::new());
        for (name, content) in files {
            fs.write(format!("{DIR}/{name}"), content);
        }
        let store = ConfigStore::builder()
            .search_path(SearchPath::new([DIR]))
            .suffixes(FixedSuffixes::new().with("app", &["app", "app_local"]))
            .filesystem(fs.clone())
            .build()
            .unwrap();
        (fs, store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use overlay_core::ConfigValue;
    use pretty_assertions::assert_eq;

    #[test]
    fn render_json_ends_with_newline() {
        let value = ConfigValue::Sequence(vec![ConfigValue::from(1i64), ConfigValue::from(2i64)]);
        assert_eq!(render(&value, OutputFormat::Json).unwrap(), "[\n  1,\n  2\n]\n");
    }

    #[test]
    fn render_yaml_scalar() {
        assert_eq!(render(&ConfigValue::from("db"), OutputFormat::Yaml).unwrap(), "db\n");
    }
}
