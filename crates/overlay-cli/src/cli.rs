//! CLI argument parsing using clap derive

use clap::{Parser, Subcommand, ValueEnum};

/// Overlay - inspect layered, environment-aware configuration
#[derive(Parser, Debug)]
#[command(name = "overlay")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Search directories, separated by ':' (or ';')
    #[arg(long, global = true, env = "OVERLAY_CONFIG_PATH")]
    pub path: Option<String>,

    /// Deployment environment used for `<name>_<env>` overlays
    #[arg(long = "env", global = true, env = "OVERLAY_ENV")]
    pub environment: Option<String>,

    /// Host name used for `<name>_<host>` overlays
    #[arg(long = "host", global = true, env = "OVERLAY_HOSTNAME")]
    pub hostname: Option<String>,

    /// Configuration file extension (yml, yaml, json, toml)
    #[arg(long = "ext", global = true, default_value = "yml")]
    pub extension: String,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Output encoding for values
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Print the value at a path inside a configuration
    ///
    /// Path segments made of digits index into sequences.
    ///
    /// Examples:
    ///   overlay get global database host
    ///   overlay get global servers 0 --format json
    Get {
        /// Configuration name
        name: String,

        /// Keys and indices to walk
        path: Vec<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Print the whole merged configuration
    Dump {
        /// Configuration name
        name: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// List candidate files in overlay order
    Files {
        /// Configuration name
        name: String,

        /// Only show files that exist
        #[arg(long)]
        existing: bool,
    },

    /// Poll a configuration and print it whenever it changes
    Watch {
        /// Configuration name
        name: String,

        /// Seconds between checks
        #[arg(short, long, default_value_t = 2)]
        interval: u64,

        /// Stop after this many changes
        #[arg(long)]
        count: Option<usize>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
    },
}
