//! Optional template preprocessing of configuration files
//!
//! A file opts in with a comment line such as:
//!
//! ```yaml
//! # OVERLAY_CONFIG: TEMPLATE
//! log_dir: "{{ config_directory }}/logs"
//! ```
//!
//! Opted-in files are rendered before parsing with these variables bound:
//!
//! - `config_file` - path of the file being rendered
//! - `config_directory` - its directory
//! - `config_name` - the configuration name being loaded
//! - `config_files` - every candidate file (`name`, `suffixed_name`, `path`, `exists`)
//!
//! plus an `env(name, default)` function reading the process environment.

use crate::resolver::{ConfigFileList, FileDescriptor};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Matches the in-file opt-in marker.
pub static TEMPLATE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^\s*#\s*OVERLAY_CONFIG\s*:\s*TEMPLATE").unwrap());

/// Whether `content` asks to be template-preprocessed.
pub fn wants_template(content: &str) -> bool {
    TEMPLATE_MARKER.is_match(content)
}

/// Values bound while rendering one file.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateContext {
    pub config_file: String,
    pub config_directory: String,
    pub config_name: String,
    pub config_files: Vec<TemplateFile>,
}

/// A candidate file as seen from a template.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateFile {
    pub name: String,
    pub suffixed_name: String,
    pub path: String,
    pub exists: bool,
}

impl TemplateContext {
    pub fn new(file: &FileDescriptor, files: &ConfigFileList) -> Self {
        Self {
            config_file: file.path.display().to_string(),
            config_directory: file
                .path
                .parent()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            config_name: file.name.clone(),
            config_files: files
                .files()
                .iter()
                .map(|f| TemplateFile {
                    name: f.name.clone(),
                    suffixed_name: f.suffixed_name.clone(),
                    path: f.path.display().to_string(),
                    exists: f.exists(),
                })
                .collect(),
        }
    }
}

/// Renders opted-in file contents.
pub trait TemplateEngine: Send + Sync {
    /// Render `source`, returning the text to parse or a human-readable error.
    fn render(&self, source: &str, ctx: &TemplateContext) -> Result<String, String>;
}

/// [`TemplateEngine`] backed by minijinja.
///
/// Sources are arbitrary strings, so a fresh [`minijinja::Environment`] is
/// built per render call.
#[derive(Debug, Default, Clone, Copy)]
pub struct MiniJinjaEngine;

impl MiniJinjaEngine {
    fn build_env() -> minijinja::Environment<'static> {
        let mut env = minijinja::Environment::new();
        env.set_keep_trailing_newline(true);
        env.add_function("env", env_function);
        env
    }
}

impl TemplateEngine for MiniJinjaEngine {
    fn render(&self, source: &str, ctx: &TemplateContext) -> Result<String, String> {
        Self::build_env()
            .render_str(source, ctx)
            .map_err(|e| e.to_string())
    }
}

fn env_function(name: String, default: Option<String>) -> String {
    std::env::var(&name).unwrap_or_else(|_| default.unwrap_or_default())
}
