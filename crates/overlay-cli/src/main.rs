//! Overlay CLI
//!
//! Inspect what a layered configuration resolves to on this host.

mod cli;
mod commands;
mod error;
mod logging;

use std::time::Duration;

use clap::Parser;
use colored::Colorize;
use overlay_core::{ConfigStore, StoreOptions};

use cli::{Cli, Commands};
use error::{CliError, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.verbose).map_err(|e| CliError::user(format!("Failed to set up logging: {e}")))?;
    tracing::debug!(?cli, "Parsed arguments");

    let Some(cmd) = cli.command.clone() else {
        println!("{} layered configuration inspector", "overlay".green().bold());
        println!();
        println!("Run {} for available commands.", "overlay --help".cyan());
        return Ok(());
    };

    let store = build_store(&cli)?;
    execute_command(&store, cmd)
}

fn build_store(cli: &Cli) -> Result<ConfigStore> {
    let defaults = StoreOptions::from_env();
    let options = StoreOptions {
        path: cli.path.clone(),
        extension: cli.extension.clone(),
        environment: cli.environment.clone().or(defaults.environment.clone()),
        hostname: cli.hostname.clone().or(defaults.hostname.clone()),
        ..defaults
    };
    Ok(options.build()?)
}

fn execute_command(store: &ConfigStore, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Get { name, path, format } => {
            print!("{}", commands::run_get(store, &name, &path, format)?);
        }
        Commands::Dump { name, format } => {
            print!("{}", commands::run_dump(store, &name, format)?);
        }
        Commands::Files { name, existing } => {
            print!("{}", commands::run_files(store, &name, existing)?);
        }
        Commands::Watch {
            name,
            interval,
            count,
            format,
        } => {
            let mut stdout = std::io::stdout();
            commands::run_watch(
                store,
                &name,
                Duration::from_secs(interval),
                count,
                format,
                &mut stdout,
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn get_collects_path_segments() {
        let cli = Cli::try_parse_from(["overlay", "get", "app", "servers", "0", "--format", "json"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Get {
                name: "app".into(),
                path: vec!["servers".into(), "0".into()],
                format: cli::OutputFormat::Json,
            })
        );
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "overlay", "dump", "app", "--env", "prod", "--host", "web1", "--ext", "toml", "--path", "/a:/b",
        ])
        .unwrap();
        assert_eq!(cli.environment.as_deref(), Some("prod"));
        assert_eq!(cli.hostname.as_deref(), Some("web1"));
        assert_eq!(cli.extension, "toml");
        assert_eq!(cli.path.as_deref(), Some("/a:/b"));
    }

    #[test]
    fn watch_defaults() {
        let cli = Cli::try_parse_from(["overlay", "watch", "app"]).unwrap();
        match cli.command {
            Some(Commands::Watch { interval, count, .. }) => {
                assert_eq!(interval, 2);
                assert_eq!(count, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
