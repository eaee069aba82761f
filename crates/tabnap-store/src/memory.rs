//! In-memory settings store

use crate::StoreError;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tabnap_domain::traits::SettingsProvider;
use tabnap_domain::{SettingKey, SettingValues, Settings, SettingsError};

/// Process-local `SettingsProvider`
///
/// Nothing survives the process. Can be switched unavailable to exercise
/// callers' handling of storage failures.
#[derive(Debug)]
pub struct MemorySettingsStore {
    values: Mutex<SettingValues>,
    defaults: Settings,
    unavailable: AtomicBool,
}

impl MemorySettingsStore {
    /// Empty store with the built-in defaults
    pub fn new() -> Self {
        Self::with_defaults(Settings::default())
    }

    /// Empty store filling unset keys from `defaults`
    pub fn with_defaults(defaults: Settings) -> Self {
        Self {
            values: Mutex::new(SettingValues::new()),
            defaults,
            unavailable: AtomicBool::new(false),
        }
    }

    /// Store pre-populated with every value of `settings`
    pub fn with_settings(settings: Settings) -> Self {
        let store = Self::new();
        if let Ok(mut values) = store.values.lock() {
            *values = settings.to_values();
        }
        store
    }

    /// Make every subsequent call fail (or succeed again)
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Current snapshot, defaults merged
    pub fn snapshot(&self) -> Result<Settings, SettingsError> {
        let values = self.lock()?;
        Settings::from_values(&values, &self.defaults)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, SettingValues>, SettingsError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable.into());
        }
        self.values.lock().map_err(|_| StoreError::Poisoned.into())
    }
}

impl Default for MemorySettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SettingsProvider for MemorySettingsStore {
    async fn ready(&self) -> Result<(), SettingsError> {
        self.lock().map(|_| ())
    }

    async fn get(&self, keys: &[SettingKey]) -> Result<SettingValues, SettingsError> {
        let values = self.lock()?;
        Ok(keys
            .iter()
            .map(|k| (*k, values.get(k).copied().unwrap_or_else(|| self.defaults.value_of(*k))))
            .collect())
    }

    async fn set(&self, new_values: SettingValues) -> Result<(), SettingsError> {
        let mut values = self.lock()?;
        let mut check = self.defaults;
        for (key, value) in &new_values {
            check.apply(*key, *value)?;
        }
        values.extend(new_values);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabnap_domain::SettingValue;

    #[tokio::test]
    async fn test_get_merges_defaults() {
        let store = MemorySettingsStore::new();
        let values = store.get(&[SettingKey::Timeout, SettingKey::Pinned]).await.unwrap();
        assert_eq!(values[&SettingKey::Timeout], SettingValue::Seconds(900));
        assert_eq!(values[&SettingKey::Pinned], SettingValue::Flag(true));
        assert!(!values.contains_key(&SettingKey::Tick));
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let store = MemorySettingsStore::new();
        let mut values = SettingValues::new();
        values.insert(SettingKey::Active, SettingValue::Flag(false));
        store.set(values).await.unwrap();

        assert!(!store.snapshot().unwrap().active);
    }

    #[tokio::test]
    async fn test_unavailable_store_fails() {
        let store = MemorySettingsStore::new();
        store.set_unavailable(true);
        assert_eq!(
            store.ready().await,
            Err(SettingsError::Storage("Store unavailable".to_string()))
        );
        assert!(store.get(&[SettingKey::Active]).await.is_err());

        store.set_unavailable(false);
        assert!(store.ready().await.is_ok());
    }

    #[test]
    fn test_with_settings() {
        let settings = Settings {
            tick_secs: 1,
            timeout_secs: 2,
            ..Default::default()
        };
        let store = MemorySettingsStore::with_settings(settings);
        assert_eq!(store.snapshot().unwrap(), settings);
    }
}
