//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// eventwire - send analytics events from the command line
#[derive(Parser, Debug)]
#[command(
    name = "eventwire",
    author,
    version,
    about = "Analytics event dispatch client",
    long_about = "Records single events and batches against an analytics collection API.\n\n\
                  Credentials come from a TOML or JSON configuration file; \n\
                  EVENTWIRE_PROJECT_ID, EVENTWIRE_WRITE_KEY and EVENTWIRE_HOST override it."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "EVENTWIRE_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "EVENTWIRE_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    /// Turn the kill switch off: every dispatch is rejected locally
    #[arg(long, global = true)]
    pub disabled: bool,

    /// Prometheus metrics port (0 = disabled)
    #[arg(long, default_value = "0", global = true, env = "EVENTWIRE_METRICS_PORT")]
    pub metrics_port: u16,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Record a single event
    Record(RecordArgs),

    /// Record a batch of events from a JSON file
    Batch(BatchArgs),

    /// Validate configuration file without sending
    Validate(ValidateArgs),

    /// Display resolved client configuration
    Info(InfoArgs),
}

/// Configuration file argument shared by every command
#[derive(Args, Debug, Clone)]
pub struct ConfigArg {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "eventwire.toml",
        env = "EVENTWIRE_CONFIG"
    )]
    pub config: PathBuf,
}

/// Arguments for the `record` command
#[derive(Args, Debug, Clone)]
pub struct RecordArgs {
    #[command(flatten)]
    pub config: ConfigArg,

    /// Target collection name
    #[arg(long)]
    pub collection: String,

    /// Event properties as inline JSON
    #[arg(
        long,
        conflicts_with = "properties_file",
        required_unless_present = "properties_file"
    )]
    pub properties: Option<String>,

    /// Read event properties from a JSON file
    #[arg(long)]
    pub properties_file: Option<PathBuf>,

    /// Print the request that would be sent and exit
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `batch` command
#[derive(Args, Debug, Clone)]
pub struct BatchArgs {
    #[command(flatten)]
    pub config: ConfigArg,

    /// JSON file mapping collection names to arrays of events
    #[arg(short, long)]
    pub file: PathBuf,

    /// Print the request that would be sent and exit
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `validate` command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub config: ConfigArg,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Args, Debug)]
pub struct InfoArgs {
    #[command(flatten)]
    pub config: ConfigArg,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
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
