//! In-process browser the REPL drives the engine against.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use tabnap_domain::traits::TabHost;
use tabnap_domain::{HostError, TabId, TabInfo, TabQuery};

#[derive(Debug, Default)]
struct BrowserState {
    tabs: BTreeMap<TabId, TabInfo>,
    next_id: u64,
}

/// A single-window browser kept in memory
///
/// At most one tab is focused at a time. Focusing a discarded tab loads it
/// again, and the focused tab is never discarded.
#[derive(Debug, Default)]
pub struct SimulatedBrowser {
    state: Mutex<BrowserState>,
}

impl SimulatedBrowser {
    /// Browser with no tabs
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new background tab
    pub fn open(&self, pinned: bool) -> Result<TabInfo, HostError> {
        let mut state = self.lock()?;
        state.next_id += 1;
        let tab = TabInfo::new(TabId::new(state.next_id)).with_pinned(pinned);
        state.tabs.insert(tab.id, tab.clone());
        Ok(tab)
    }

    /// Close a tab
    pub fn close(&self, id: TabId) -> Result<TabInfo, HostError> {
        self.lock()?.tabs.remove(&id).ok_or(HostError::UnknownTab(id))
    }

    /// Focus a tab, reloading it if it was discarded
    pub fn focus(&self, id: TabId) -> Result<TabInfo, HostError> {
        let mut state = self.lock()?;
        if !state.tabs.contains_key(&id) {
            return Err(HostError::UnknownTab(id));
        }

        for tab in state.tabs.values_mut() {
            tab.active = tab.id == id;
        }
        let tab = state.tabs.get_mut(&id).ok_or(HostError::UnknownTab(id))?;
        tab.discarded = false;
        Ok(tab.clone())
    }

    /// Pin or unpin a tab
    pub fn set_pinned(&self, id: TabId, pinned: bool) -> Result<TabInfo, HostError> {
        let mut state = self.lock()?;
        let tab = state.tabs.get_mut(&id).ok_or(HostError::UnknownTab(id))?;
        tab.pinned = pinned;
        Ok(tab.clone())
    }

    /// Every tab, ordered by id
    pub fn tabs(&self) -> Result<Vec<TabInfo>, HostError> {
        Ok(self.lock()?.tabs.values().cloned().collect())
    }

    fn lock(&self) -> Result<MutexGuard<'_, BrowserState>, HostError> {
        self.state
            .lock()
            .map_err(|_| HostError::Call("browser state poisoned".to_string()))
    }
}

#[async_trait]
impl TabHost for SimulatedBrowser {
    async fn query(&self, query: &TabQuery) -> Result<Vec<TabInfo>, HostError> {
        Ok(self
            .lock()?
            .tabs
            .values()
            .filter(|tab| query.matches(tab))
            .cloned()
            .collect())
    }

    async fn discard(&self, id: TabId) -> Result<Option<TabInfo>, HostError> {
        let mut state = self.lock()?;
        let tab = state.tabs.get_mut(&id).ok_or(HostError::UnknownTab(id))?;
        if tab.active || tab.discarded || !tab.auto_discardable {
            return Ok(None);
        }
        tab.discarded = true;
        Ok(Some(tab.clone()))
    }
}
