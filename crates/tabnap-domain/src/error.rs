//! Errors reported across the port boundaries

use thiserror::Error;

use crate::TabId;

/// Errors raised by a [`TabHost`](crate::traits::TabHost) implementation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// The host does not know the tab (closed between signals)
    #[error("No tab with id {0}")]
    UnknownTab(TabId),

    /// The host refused or failed the call
    #[error("Host call failed: {0}")]
    Call(String),
}

/// Errors raised by a [`SettingsProvider`](crate::traits::SettingsProvider)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    /// Backing storage is unavailable or failed
    #[error("Settings storage error: {0}")]
    Storage(String),

    /// A stored value has the wrong shape for its key
    #[error("Invalid value for setting '{key}': {reason}")]
    InvalidValue {
        /// Storage key of the offending setting
        key: String,
        /// What was wrong with it
        reason: String,
    },

    /// A key that is not one of the recognized settings
    #[error("Unknown setting key: {0}")]
    UnknownKey(String),
}
