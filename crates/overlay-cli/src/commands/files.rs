//! Files command implementation

use colored::Colorize;
use overlay_core::ConfigStore;

use crate::error::Result;

/// Run the files command, returning one line per candidate file.
pub fn run_files(store: &ConfigStore, name: &str, existing_only: bool) -> Result<String> {
    let files = store.config_files(name);
    let mut out = String::new();

    for file in files.files() {
        if file.exists() {
            out.push_str(&format!("{} {}\n", "+".green(), file.path.display()));
        } else if !existing_only {
            out.push_str(&format!("{} {}\n", "-".dimmed(), file.path.display().to_string().dimmed()));
        }
    }

    if files.is_empty() {
        out.push_str(&format!(
            "{} (set {} or pass {})\n",
            "No search directories".yellow(),
            "OVERLAY_CONFIG_PATH".cyan(),
            "--path".cyan()
        ));
    }
    Ok(out)
}
