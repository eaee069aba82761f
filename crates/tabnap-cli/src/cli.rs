//! CLI command definitions and argument parsing.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// tabnap - Unload browser tabs that sit idle too long.
#[derive(Debug, Parser)]
#[command(name = "tabnap")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Settings database path
    #[arg(short, long, global = true, env = "TABNAP_DB")]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (values only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Inspect or change the persisted settings
    Settings(SettingsArgs),

    /// Run the engine against a simulated browser
    Repl,
}

/// Arguments for settings management.
#[derive(Debug, Parser)]
pub struct SettingsArgs {
    #[command(subcommand)]
    pub action: SettingsAction,
}

/// Settings management actions.
#[derive(Debug, Subcommand)]
pub enum SettingsAction {
    /// Show every setting
    Show,

    /// Change one or more settings
    Set {
        /// Idle seconds before a tab is discarded
        #[arg(long)]
        timeout: Option<u64>,

        /// Seconds between sweeps
        #[arg(long)]
        tick: Option<u64>,

        /// Keep pinned tabs loaded
        #[arg(long, value_name = "BOOL", action = ArgAction::Set)]
        pinned: Option<bool>,

        /// Master switch
        #[arg(long, value_name = "BOOL", action = ArgAction::Set)]
        active: Option<bool>,
    },

    /// Restore the configured defaults
    Reset,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}
