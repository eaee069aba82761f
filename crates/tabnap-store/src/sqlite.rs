//! SQLite-backed settings store

use crate::StoreError;
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tabnap_domain::traits::SettingsProvider;
use tabnap_domain::{SettingKey, SettingValue, SettingValues, Settings, SettingsError};

/// SQLite implementation of `SettingsProvider`
///
/// The connection sits behind a mutex; every call is a handful of
/// single-row statements, so the async methods run them inline.
pub struct SqliteSettingsStore {
    conn: Mutex<Connection>,
    defaults: Settings,
}

impl SqliteSettingsStore {
    /// Open (or create) a store at `path` with the built-in defaults
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        Self::with_defaults(path, Settings::default())
    }

    /// Open (or create) a store at `path`, filling unset keys from `defaults`
    pub fn with_defaults<P: AsRef<Path>>(path: P, defaults: Settings) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(include_str!("schema.sql"))?;
        Ok(Self {
            conn: Mutex::new(conn),
            defaults,
        })
    }

    /// In-memory store with the built-in defaults
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::new(":memory:")
    }

    /// Defaults used for keys that were never written
    pub fn defaults(&self) -> &Settings {
        &self.defaults
    }

    /// Read every key into a settings snapshot
    pub fn load(&self) -> Result<Settings, StoreError> {
        let values = self.read(&SettingKey::ALL)?;
        Settings::from_values(&values, &self.defaults)
            .map_err(|e| StoreError::InvalidData(e.to_string()))
    }

    /// Persist defaults for keys that have no row yet
    ///
    /// Returns the number of rows inserted.
    pub fn seed_defaults(&self) -> Result<usize, StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let mut inserted = 0;
        for key in SettingKey::ALL {
            let encoded = serde_json::to_string(&self.defaults.value_of(key))?;
            inserted += tx.execute(
                "INSERT OR IGNORE INTO settings (key, value) VALUES (?1, ?2)",
                params![key.as_str(), encoded],
            )?;
        }
        tx.commit()?;
        Ok(inserted)
    }

    /// Read the given keys, substituting defaults for missing rows
    pub fn read(&self, keys: &[SettingKey]) -> Result<SettingValues, StoreError> {
        let conn = self.lock()?;
        let mut values = SettingValues::new();
        for key in keys {
            let stored: Option<String> = conn
                .query_row(
                    "SELECT value FROM settings WHERE key = ?1",
                    params![key.as_str()],
                    |row| row.get(0),
                )
                .optional()?;

            let value = match stored {
                Some(text) => serde_json::from_str::<SettingValue>(&text).map_err(|e| {
                    StoreError::InvalidData(format!("setting '{}' holds '{}': {}", key, text, e))
                })?,
                None => self.defaults.value_of(*key),
            };
            values.insert(*key, value);
        }
        Ok(values)
    }

    /// Upsert the given values in one transaction
    pub fn write(&self, values: &SettingValues) -> Result<(), StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        for (key, value) in values {
            let encoded = serde_json::to_string(value)?;
            tx.execute(
                "INSERT INTO settings (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                                                updated_at = strftime('%s', 'now')",
                params![key.as_str(), encoded],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }
}

#[async_trait]
impl SettingsProvider for SqliteSettingsStore {
    async fn ready(&self) -> Result<(), SettingsError> {
        let inserted = self.seed_defaults()?;
        if inserted > 0 {
            tracing::debug!("Seeded {} default setting(s)", inserted);
        }
        Ok(())
    }

    async fn get(&self, keys: &[SettingKey]) -> Result<SettingValues, SettingsError> {
        Ok(self.read(keys)?)
    }

    async fn set(&self, values: SettingValues) -> Result<(), SettingsError> {
        // Reject shape mismatches before they reach storage
        let mut check = self.defaults;
        for (key, value) in &values {
            check.apply(*key, *value)?;
        }
        Ok(self.write(&values)?)
    }
}
