//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the engine and its host.
//! Implementations live in other crates (or in the embedding application).

use crate::{
    HostError, IndicatorState, SettingKey, SettingValues, SettingsError, TabId, TabInfo, TabQuery,
};
use async_trait::async_trait;

/// Tab enumeration and discard primitives of the host
///
/// Implemented by whatever embeds the engine (a browser binding, or the
/// simulated browser in `tabnap-cli`).
#[async_trait]
pub trait TabHost: Send + Sync {
    /// List the tabs matching `query`, in any order
    async fn query(&self, query: &TabQuery) -> Result<Vec<TabInfo>, HostError>;

    /// Discard a tab's loaded state
    ///
    /// `Ok(None)` means the host accepted the call but did not unload the tab
    /// (already discarded, or not eligible).
    async fn discard(&self, id: TabId) -> Result<Option<TabInfo>, HostError>;
}

/// Persistent key/value settings storage
///
/// Implemented by the infrastructure layer (tabnap-store). The provider never
/// pushes change notifications; callers poll it when they need a value.
#[async_trait]
pub trait SettingsProvider: Send + Sync {
    /// Resolve once storage is loaded and usable
    async fn ready(&self) -> Result<(), SettingsError>;

    /// Read the given keys; keys that were never written come back with their default
    async fn get(&self, keys: &[SettingKey]) -> Result<SettingValues, SettingsError>;

    /// Write the given values
    async fn set(&self, values: SettingValues) -> Result<(), SettingsError>;
}

/// Two-state UI indicator (icon and title)
pub trait Indicator: Send + Sync {
    /// Show the given state
    fn show(&self, state: IndicatorState);
}
