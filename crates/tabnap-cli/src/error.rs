//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Settings store error
    #[error("Store error: {0}")]
    Store(#[from] tabnap_store::StoreError),

    /// Settings rejected or unreadable
    #[error("Settings error: {0}")]
    Settings(#[from] tabnap_domain::SettingsError),

    /// Simulated browser error
    #[error("Browser error: {0}")]
    Host(#[from] tabnap_domain::HostError),

    /// Engine error
    #[error("Reclaimer error: {0}")]
    Reclaimer(#[from] tabnap_reclaimer::ReclaimerError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
