//! Tab module - the tracked resources and the host enumeration filter

use serde::{Deserialize, Serialize};
use std::fmt;

/// Host-assigned identifier of a tab
///
/// Opaque and process-unique. It carries no ordering meaning for the engine;
/// `Ord` is derived only so that status output can be listed deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(u64);

impl TabId {
    /// Wrap a raw host id
    ///
    /// # Examples
    ///
    /// ```
    /// use tabnap_domain::TabId;
    ///
    /// let id = TabId::new(42);
    /// assert_eq!(id.value(), 42);
    /// ```
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Get the raw host id
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for TabId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TabId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|e| format!("Invalid tab id '{}': {}", s, e))
    }
}

/// One tab as reported by a host enumeration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabInfo {
    /// Host identifier
    pub id: TabId,

    /// Whether this is the focused tab of its window
    pub active: bool,

    /// Whether the user pinned the tab
    pub pinned: bool,

    /// Whether the tab's content is already unloaded
    pub discarded: bool,

    /// Whether the host allows the tab to be unloaded
    pub auto_discardable: bool,
}

impl TabInfo {
    /// A loaded, discardable, unfocused and unpinned tab
    pub fn new(id: TabId) -> Self {
        Self {
            id,
            active: false,
            pinned: false,
            discarded: false,
            auto_discardable: true,
        }
    }

    /// Builder-style setter for `active`
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Builder-style setter for `pinned`
    pub fn with_pinned(mut self, pinned: bool) -> Self {
        self.pinned = pinned;
        self
    }

    /// Whether the tab is exempt from idle accrual in the current sweep
    ///
    /// Active tabs are always exempt; pinned tabs only when `skip_pinned` is set.
    pub fn is_exempt(&self, skip_pinned: bool) -> bool {
        self.active || (skip_pinned && self.pinned)
    }
}

/// Filter for a host tab enumeration
///
/// `None` fields match anything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabQuery {
    /// Match on the `discarded` flag
    pub discarded: Option<bool>,

    /// Match on the `auto_discardable` flag
    pub auto_discardable: Option<bool>,
}

impl TabQuery {
    /// Tabs that are still loaded and that the host allows to unload
    pub const fn reclaimable() -> Self {
        Self {
            discarded: Some(false),
            auto_discardable: Some(true),
        }
    }

    /// Check a tab against this filter
    pub fn matches(&self, tab: &TabInfo) -> bool {
        self.discarded.map_or(true, |d| tab.discarded == d)
            && self.auto_discardable.map_or(true, |a| tab.auto_discardable == a)
    }
}
