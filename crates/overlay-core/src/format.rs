//! Structured-data parsers, selected by file extension

use crate::value::{ConfigMap, ConfigValue};
use crate::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Json,
    Toml,
}

impl Format {
    /// Detect the format from a file extension (without the dot).
    ///
    /// - `yml`, `yaml` -> YAML
    /// - `json` -> JSON
    /// - `toml` -> TOML
    pub fn from_extension(extension: &str) -> Result<Self> {
        match extension.trim_start_matches('.').to_lowercase().as_str() {
            "yml" | "yaml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            "toml" => Ok(Self::Toml),
            _ => Err(Error::UnsupportedFormat {
                extension: extension.to_string(),
            }),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Yaml => "YAML",
            Self::Json => "JSON",
            Self::Toml => "TOML",
        }
    }

    /// Parse `content` read from `path`.
    ///
    /// A document with no data (empty, or only comments) parses to
    /// [`ConfigValue::Null`], which contributes nothing to a merge.
    pub fn parse(self, content: &str, path: &Path) -> Result<ConfigValue> {
        if is_blank_document(content) {
            return Ok(ConfigValue::Null);
        }

        let parsed = match self {
            Self::Yaml => parse_yaml(content),
            Self::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            Self::Toml => toml::from_str::<toml::Table>(content)
                .map(|table| from_toml(toml::Value::Table(table)))
                .map_err(|e| e.to_string()),
        };

        parsed.map_err(|message| Error::Parse {
            path: path.to_path_buf(),
            format: self.name().into(),
            message,
        })
    }
}

/// YAML with `<<` merge keys resolved.
fn parse_yaml(content: &str) -> std::result::Result<ConfigValue, String> {
    let mut value: serde_yaml::Value = serde_yaml::from_str(content).map_err(|e| e.to_string())?;
    value.apply_merge().map_err(|e| e.to_string())?;
    ConfigValue::deserialize(value).map_err(|e| e.to_string())
}

/// TOML datetimes become their RFC 3339 string form.
fn from_toml(value: toml::Value) -> ConfigValue {
    match value {
        toml::Value::String(s) => ConfigValue::String(s),
        toml::Value::Integer(i) => ConfigValue::Integer(i),
        toml::Value::Float(f) => ConfigValue::Float(f),
        toml::Value::Boolean(b) => ConfigValue::Bool(b),
        toml::Value::Datetime(dt) => ConfigValue::String(dt.to_string()),
        toml::Value::Array(items) => ConfigValue::Sequence(items.into_iter().map(from_toml).collect()),
        toml::Value::Table(table) => ConfigValue::Map(
            table
                .into_iter()
                .map(|(k, v)| (k, from_toml(v)))
                .collect::<ConfigMap>(),
        ),
    }
}

fn is_blank_document(content: &str) -> bool {
    content.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#') || line == "---"
    })
}
