//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

/// Output format for history
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
    /// EasyWeather-compatible comma-separated lines
    Easyweather,
}

impl OutputFormat {
    /// Parse a format name as stored in the config file.
    pub fn from_name(name: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(name, true).ok()
    }
}

/// Visual styling mode for output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum StyleMode {
    /// Standard styling with colors
    Minimal,
    /// Rounded tables and full formatting (default)
    #[default]
    Rich,
    /// Plain text with no decorations (for scripting)
    Plain,
}

/// Reusable memory source arguments
#[derive(Debug, Clone, Args)]
pub struct SourceArgs {
    /// Memory dump to read, or use WSP_INFILE env var
    #[arg(long, global = true, env = "WSP_INFILE")]
    pub infile: Option<PathBuf>,

    /// Station altitude in meters, for relative pressure
    #[arg(short = 'A', long, global = true, allow_negative_numbers = true)]
    pub altitude: Option<f32>,
}

#[derive(Parser)]
#[command(name = "wsp")]
#[command(author, version, about = "Weather station poller for Fineoffset USB weather stations", long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Visual styling mode (minimal, rich, plain)
    #[arg(long, global = true, value_enum, default_value = "rich", env = "WSP_STYLE")]
    pub style: StyleMode,

    /// Write output to file instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub source: SourceArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show indoor and outdoor values of the newest record (default)
    Summary,

    /// Show settings block status: read period, data count, clock
    Status,

    /// Show unit and display settings
    Settings,

    /// Show alarm thresholds and whether each alarm is enabled
    Alarms,

    /// Show recorded extremes with their dates
    Maxmin,

    /// Print history records
    History(HistoryArgs),

    /// List the directives accepted by `history --template`
    FormatList,

    /// Write the full memory image to a file
    Dump {
        /// Destination file
        path: PathBuf,

        /// Overwrite an existing file without asking
        #[arg(short, long)]
        force: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Arguments for the history command.
#[derive(Debug, Clone, Args)]
pub struct HistoryArgs {
    /// Number of newest records to print, 0 for all
    #[arg(short, long, default_value = "1", conflicts_with = "all")]
    pub count: u16,

    /// Print every stored record
    #[arg(short, long)]
    pub all: bool,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Render each record with a %-directive template (see `format-list`)
    #[arg(short, long, conflicts_with = "format")]
    pub template: Option<String>,

    /// Estimate rain windows from the read period instead of loaded records
    #[arg(long)]
    pub quick_rain: bool,

    /// Omit header row in CSV output (useful for appending)
    #[arg(long)]
    pub no_header: bool,

    /// Output compact JSON (no pretty-printing)
    #[arg(long)]
    pub compact: bool,
}

/// Configuration keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConfigKey {
    /// Default memory dump
    Infile,
    /// Station altitude in meters
    Altitude,
    /// Use quick rain estimates by default
    QuickRain,
    /// Default history output format
    Format,
    /// Disable colored output
    NoColor,
}

/// Configuration subcommands
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Get a configuration value
    Get {
        /// Configuration key
        #[arg(value_enum)]
        key: ConfigKey,
    },

    /// Set a configuration value
    Set {
        /// Configuration key
        #[arg(value_enum)]
        key: ConfigKey,
        /// Configuration value
        value: String,
    },

    /// Unset (remove) a configuration value
    Unset {
        /// Configuration key to remove
        #[arg(value_enum)]
        key: ConfigKey,
    },

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init,
}
