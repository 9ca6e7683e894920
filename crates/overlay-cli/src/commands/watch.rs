//! Watch command implementation

use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use colored::Colorize;
use overlay_core::{ConfigStore, LoadEvent};

use super::render;
use crate::cli::OutputFormat;
use crate::error::{CliError, Result};

/// Poll `name` every `interval`, writing the snapshot to `out` initially and
/// after each detected change. Returns after `count` changes, or never.
pub fn run_watch(
    store: &ConfigStore,
    name: &str,
    interval: Duration,
    count: Option<usize>,
    format: OutputFormat,
    out: &mut impl Write,
) -> Result<()> {
    // Every poll is a real check.
    store.set_reload_delay(Duration::ZERO);

    let changed = Arc::new(AtomicBool::new(false));
    let flag = changed.clone();
    store.on_load(&[name], move |event| {
        if let LoadEvent::Changed { .. } = event {
            flag.store(true, Ordering::SeqCst);
        }
        Ok(())
    })?;

    emit(out, &render(&store.get_configuration(name)?, format)?)?;

    let mut seen = 0;
    while count.is_none_or(|limit| seen < limit) {
        std::thread::sleep(interval);
        let snapshot = match store.get_configuration(name) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                // Keep watching: the file may be mid-edit.
                tracing::warn!(name, error = %e, "Reload failed");
                eprintln!("{}: {}", "warning".yellow().bold(), e);
                continue;
            }
        };
        if changed.swap(false, Ordering::SeqCst) {
            seen += 1;
            emit(out, &format!("{}\n", format!("# change {seen}").dimmed()))?;
            emit(out, &render(&snapshot, format)?)?;
        }
    }
    Ok(())
}

fn emit(out: &mut impl Write, text: &str) -> Result<()> {
    out.write_all(text.as_bytes())
        .and_then(|_| out.flush())
        .map_err(|e| CliError::user(format!("Failed to write output: {e}")))
}
