//! tabnap CLI library.
//!
//! This library provides the core functionality for the tabnap command-line interface,
//! including configuration management, settings commands, the simulated browser
//! the REPL drives the engine against, and output formatting.

pub mod browser;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod indicator;
pub mod output;
pub mod repl;

pub use browser::SimulatedBrowser;
pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use indicator::ConsoleIndicator;
pub use output::Formatter;
