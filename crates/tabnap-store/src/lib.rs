//! tabnap Storage Layer
//!
//! Implements the `SettingsProvider` port.
//!
//! # Backends
//!
//! - [`SqliteSettingsStore`]: persistent, one SQLite table with a row per key
//! - [`MemorySettingsStore`]: process-local map, for tests and throwaway runs
//!
//! Both merge defaults for keys that were never written, so a fresh store
//! reads as `active=true, timeout=900, tick=60, pinned=true` unless other
//! defaults are supplied.
//!
//! # Examples
//!
//! ```no_run
//! use tabnap_store::SqliteSettingsStore;
//!
//! let store = SqliteSettingsStore::new("tabnap.db").unwrap();
//! let settings = store.load().unwrap();
//! assert!(settings.tick_secs > 0);
//! ```

#![warn(missing_docs)]

mod memory;
mod sqlite;

pub use memory::MemorySettingsStore;
pub use sqlite::SqliteSettingsStore;

use tabnap_domain::SettingsError;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A stored value could not be decoded
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Value encoding failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A previous holder of the connection lock panicked
    #[error("Store lock poisoned")]
    Poisoned,

    /// Storage was marked unavailable
    #[error("Store unavailable")]
    Unavailable,
}

impl From<StoreError> for SettingsError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidData(reason) => SettingsError::InvalidValue {
                key: "<stored>".to_string(),
                reason,
            },
            other => SettingsError::Storage(other.to_string()),
        }
    }
}
