//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Bulkline - batch a command stream and dispatch it to concurrent consumers
#[derive(Parser, Debug)]
#[command(
    name = "bulkline",
    author,
    version,
    about = "Command stream batching and concurrent dispatch",
    long_about = "Reads a line-oriented command stream, groups it into batches \n\
                  under a size limit and explicit block delimiters, and fans every \n\
                  batch out to concurrent console and file consumers."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "BULKLINE_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "compact",
        global = true,
        env = "BULKLINE_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the batching pipeline
    Run(RunArgs),

    /// Validate a blueprint file without running
    Validate(ValidateArgs),

    /// Display blueprint information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Batch size limit (0 = one batch per stream, delimiters still apply)
    #[arg(value_name = "LIMIT")]
    pub limit: Option<usize>,

    /// Path to blueprint file (TOML or JSON); default consumers when omitted
    #[arg(short, long, env = "BULKLINE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Read commands from a file instead of stdin
    #[arg(short, long, env = "BULKLINE_INPUT")]
    pub input: Option<PathBuf>,

    /// Directory for file consumer output (unless set per consumer)
    #[arg(long, default_value = ".", env = "BULKLINE_OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Override queue capacity for every consumer
    #[arg(long, env = "BULKLINE_QUEUE_CAPACITY")]
    pub queue_capacity: Option<usize>,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "BULKLINE_METRICS_PORT")]
    pub metrics_port: u16,

    /// Validate the blueprint and exit without running
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to blueprint file to validate
    #[arg(short, long, default_value = "bulkline.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to blueprint file
    #[arg(short, long, default_value = "bulkline.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show consumer parameters
    #[arg(long)]
    pub params: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    Pretty,
    /// Compact single-line format
    #[default]
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
