//! Tabnap Reclaimer
//!
//! Idle-tab reclamation engine: tracks how long each open tab has gone
//! without focus and asks the host to discard tabs that stay idle past the
//! configured timeout.
//!
//! # Overview
//!
//! The Reclaimer is responsible for:
//! - **Idle accounting**: One accumulator per tracked tab, reset by focus
//! - **Sweeping**: Periodic aging of every tracked tab against a fresh host enumeration
//! - **Reclamation**: One discard request per tab that crosses the threshold
//! - **Master switch**: Persisted on/off state mirrored on the host indicator
//!
//! # Sweep Rules
//!
//! | Tab state at sweep time | Effect on its entry |
//! |-------------------------|---------------------|
//! | **Focused** | Reset to zero |
//! | **Pinned** (when pinned tabs are skipped) | Reset to zero |
//! | **Missing from the enumeration** | Left untouched |
//! | **Otherwise** | Ages by one tick; removed and discarded at `idle >= timeout` |
//!
//! A tab left alone is therefore reclaimed after `ceil(timeout / tick)`
//! sweeps, and a discard request is issued at most once per tracking period.
//!
//! # Usage
//!
//! ## Single Sweep
//!
//! ```
//! use tabnap_domain::{Settings, TabId, TabInfo};
//! use tabnap_reclaimer::{ActivityEvent, EvictionPolicy, IdleTable};
//!
//! let settings = Settings { timeout_secs: 120, tick_secs: 60, ..Default::default() };
//! let policy = EvictionPolicy::from_settings(&settings);
//!
//! let mut table = IdleTable::new();
//! ActivityEvent::Created(TabId::new(7)).apply(&mut table);
//!
//! let tabs = [TabInfo::new(TabId::new(7))];
//! assert!(policy.sweep(&mut table, &tabs).reclaim.is_empty());
//! assert_eq!(policy.sweep(&mut table, &tabs).reclaim, vec![TabId::new(7)]);
//! ```
//!
//! ## Background Worker
//!
//! [`ReclaimerWorker::spawn`] starts the engine on the current runtime and
//! returns a [`ReclaimerHandle`] for lifecycle signals and switch commands.
//! See its documentation for a complete example.
//!
//! # Metrics
//!
//! ```no_run
//! # use tabnap_reclaimer::{ReclaimerError, ReclaimerHandle};
//! # async fn show(handle: ReclaimerHandle) -> Result<(), ReclaimerError> {
//! let status = handle.status().await?;
//!
//! println!("Tracked tabs: {}", status.entries.len());
//! println!("Reclaimed: {}", status.metrics.reclaimed);
//! println!("\n{}", status.metrics.summary());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod activity;
mod error;
mod idle_table;
mod metrics;
mod policy;
mod worker;

pub use activity::ActivityEvent;
pub use error::ReclaimerError;
pub use idle_table::{IdleEntry, IdleTable};
pub use metrics::ReclaimerMetrics;
pub use policy::{EvictionPolicy, SweepOutcome};
pub use worker::{ReclaimerHandle, ReclaimerStatus, ReclaimerWorker};
