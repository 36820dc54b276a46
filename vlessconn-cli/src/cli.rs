//! CLI argument parsing types using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use vlessconn_core::config::CONFIG_DIR_ENV;

use crate::util::parse_key_val;

/// `vlessconn` command-line interface for managing VLESS profiles
#[derive(Parser)]
#[command(name = "vlessconn-cli")]
#[command(author, version, about = "vlessconn command-line interface")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the configuration directory
    #[arg(short, long, global = true, env = CONFIG_DIR_ENV)]
    pub config: Option<PathBuf>,

    /// Increase output verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// List all profiles
    #[command(about = "List all saved profiles")]
    List {
        /// Output format for the profile list
        #[arg(short, long, default_value = "table", value_enum)]
        format: OutputFormat,
    },

    /// Add a new profile
    #[command(about = "Add a profile from a link or from individual fields")]
    Add {
        /// Name for the new profile
        #[arg(short, long)]
        name: String,

        /// Full vless:// link
        #[arg(short, long, conflicts_with_all = ["host", "id"], required_unless_present = "host")]
        uri: Option<String>,

        /// Server host (hostname or IP)
        #[arg(short = 'H', long, requires = "id")]
        host: Option<String>,

        /// Server port
        #[arg(short, long, default_value = "443")]
        port: u32,

        /// Client identifier
        #[arg(long)]
        id: Option<String>,
    },

    /// Import links from a file
    #[command(about = "Import every valid link from a text file (use - for stdin)")]
    Import {
        /// File with one link per line
        file: PathBuf,
    },

    /// Show profile details
    #[command(about = "Show profile details")]
    Show {
        /// Profile name or UUID
        name: String,
    },

    /// Delete a profile
    #[command(about = "Delete a profile")]
    Delete {
        /// Profile name or UUID
        name: String,
    },

    /// Update a profile
    #[command(about = "Update an existing profile; the link is regenerated")]
    Update {
        /// Profile name or UUID
        name: String,

        /// New name
        #[arg(short, long)]
        new_name: Option<String>,

        /// New host
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// New port
        #[arg(short, long)]
        port: Option<u32>,

        /// New client identifier
        #[arg(long)]
        id: Option<String>,
    },

    /// Export links
    #[command(about = "Export the links of all profiles, one per line")]
    Export {
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Parse a link
    #[command(about = "Validate a link and print its fields as JSON")]
    Parse {
        /// The vless:// link
        uri: String,
    },

    /// Generate a link
    #[command(about = "Build a vless:// link from its parts")]
    Generate {
        /// Server host (hostname or IP)
        #[arg(short = 'H', long)]
        host: String,

        /// Server port
        #[arg(short, long, default_value = "443", value_parser = clap::value_parser!(u16).range(1..))]
        port: u16,

        /// Client identifier
        #[arg(long)]
        id: String,

        /// Query parameter in key=value format (can be repeated)
        #[arg(long = "param", value_parser = parse_key_val)]
        params: Vec<(String, String)>,
    },

    /// Manage application settings
    #[command(subcommand, about = "Show or change application settings")]
    Settings(SettingsCommands),

    /// Delete every profile
    #[command(about = "Delete every saved profile")]
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },

    /// Generate shell completions
    #[command(about = "Generate shell completion scripts")]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Output format for the list command
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    /// Display as formatted table
    Table,
    /// Output as JSON
    Json,
    /// Output as CSV
    Csv,
}

/// Settings subcommands
#[derive(Subcommand)]
pub enum SettingsCommands {
    /// Print the current settings
    #[command(about = "Print the current settings as TOML")]
    Show,

    /// Change a single setting
    #[command(about = "Set a setting (auto_connect, kill_switch, theme, connect_timeout_secs, logging.level)")]
    Set {
        /// Setting key
        key: String,

        /// New value
        value: String,
    },
}
