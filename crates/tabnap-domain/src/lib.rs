//! tabnap Domain Layer
//!
//! Value types and port traits shared by every other tabnap crate.
//! Nothing in here performs I/O; implementations of the ports live in
//! `tabnap-store` (settings) and in whatever embeds the engine (tab host,
//! indicator).
//!
//! ## Key Concepts
//!
//! - **Tab**: a tracked resource, identified by an opaque host-assigned [`TabId`]
//! - **Settings**: the four persisted values that drive the engine
//!   (`active`, `timeout`, `tick`, `pinned`)
//! - **Reclamation**: discarding a tab's loaded state through the host
//! - **Indicator**: the two-state UI affordance that mirrors the master switch

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod indicator;
pub mod settings;
pub mod tab;
pub mod traits;

// Re-exports for convenience
pub use error::{HostError, SettingsError};
pub use indicator::IndicatorState;
pub use settings::{SettingKey, SettingValue, SettingValues, Settings};
pub use tab::{TabId, TabInfo, TabQuery};
