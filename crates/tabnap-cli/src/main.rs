//! tabnap CLI - Unload browser tabs that sit idle too long.

use clap::Parser;
use std::sync::Arc;
use tabnap_cli::commands;
use tabnap_cli::repl;
use tabnap_cli::{Cli, Command, Config, ConsoleIndicator, Formatter};
use tabnap_store::SqliteSettingsStore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> tabnap_cli::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load or create config; a broken file stops here rather than being replaced
    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::path()?,
    };
    let config = Config::load_or_create(&config_path)?;

    // Initialize tracing (log to stderr)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    // Determine output format
    let format = cli.format.map(Into::into).unwrap_or(config.format);

    // Determine color setting
    let color_enabled = !cli.no_color && config.color;

    let formatter = Formatter::new(format, color_enabled);

    // Open the settings store
    let db_path = match cli.database {
        Some(path) => path,
        None => config.database_path()?,
    };
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    tracing::debug!("Opening settings store at {}", db_path.display());
    let store = SqliteSettingsStore::with_defaults(&db_path, config.defaults)?;

    match cli.command {
        None | Some(Command::Repl) => {
            let indicator = Arc::new(ConsoleIndicator::new(Formatter::new(format, color_enabled)));
            repl::run_repl(Arc::new(store), indicator, &formatter).await?;
        }
        Some(Command::Settings(args)) => {
            commands::execute_settings(args, &store, &formatter).await?;
        }
    }

    Ok(())
}
