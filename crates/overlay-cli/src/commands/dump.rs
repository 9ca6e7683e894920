//! Dump command implementation

use overlay_core::ConfigStore;

use super::render;
use crate::cli::OutputFormat;
use crate::error::Result;

/// Run the dump command, returning the rendered snapshot.
pub fn run_dump(store: &ConfigStore, name: &str, format: OutputFormat) -> Result<String> {
    let snapshot = store.get_configuration(name)?;
    render(&snapshot, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::store_with;
    use pretty_assertions::assert_eq;

    #[test]
    fn dump_merged_json() {
        let (_fs, store) = store_with(&[("app.yml", "a: 1\nb: [x]\n"), ("app_local.yml", "b: [y]\n")]);
        let out = run_dump(&store, "app", OutputFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed, serde_json::json!({"a": 1, "b": ["y"]}));
    }

    #[test]
    fn dump_unknown_name_is_empty_map() {
        let (_fs, store) = store_with(&[]);
        assert_eq!(run_dump(&store, "nothing", OutputFormat::Json).unwrap(), "{}\n");
    }

    #[test]
    fn parse_error_surfaces() {
        let (_fs, store) = store_with(&[("app.yml", "a: [unclosed\n")]);
        let err = run_dump(&store, "app", OutputFormat::Yaml).unwrap_err();
        assert!(err.to_string().contains("app.yml"), "{err}");
    }
}
