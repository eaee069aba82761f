//! Per-tab idle accounting

use serde::Serialize;
use std::collections::HashMap;
use tabnap_domain::TabId;

/// Accumulated idle time of one tracked tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IdleEntry {
    /// Tab being tracked
    pub id: TabId,

    /// Seconds of idle time, counted in sweep-interval units
    pub idle_secs: u64,
}

impl IdleEntry {
    /// Fresh entry with no idle time
    pub fn new(id: TabId) -> Self {
        Self { id, idle_secs: 0 }
    }
}

/// Mapping from tab to idle accumulator
///
/// Pure state: no timers, no I/O, every operation is total. An entry exists
/// exactly while the tab is known to an enabled engine.
#[derive(Debug, Clone, Default)]
pub struct IdleTable {
    entries: HashMap<TabId, IdleEntry>,
}

impl IdleTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the entry, or reset it to zero if it exists
    pub fn upsert_zero(&mut self, id: TabId) {
        self.entries.insert(id, IdleEntry::new(id));
    }

    /// Delete the entry if present
    pub fn remove(&mut self, id: TabId) -> Option<IdleEntry> {
        self.entries.remove(&id)
    }

    /// Look up one entry
    pub fn get(&self, id: TabId) -> Option<&IdleEntry> {
        self.entries.get(&id)
    }

    /// Whether the tab is tracked
    pub fn contains(&self, id: TabId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Every entry, in unspecified order
    pub fn iter(&self) -> impl Iterator<Item = &IdleEntry> {
        self.entries.values()
    }

    /// Every entry, mutably, in unspecified order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut IdleEntry> {
        self.entries.values_mut()
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of tracked tabs
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no tab is tracked
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy of every entry, ordered by tab id
    pub fn snapshot(&self) -> Vec<IdleEntry> {
        let mut entries: Vec<IdleEntry> = self.entries.values().copied().collect();
        entries.sort_by_key(|e| e.id);
        entries
    }
}

impl Extend<TabId> for IdleTable {
    /// Track every id with zero idle time
    fn extend<I: IntoIterator<Item = TabId>>(&mut self, ids: I) {
        for id in ids {
            self.upsert_zero(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u64) -> TabId {
        TabId::new(n)
    }

    #[test]
    fn test_upsert_creates_and_resets() {
        let mut table = IdleTable::new();
        table.upsert_zero(id(1));
        assert_eq!(table.get(id(1)).unwrap().idle_secs, 0);

        for entry in table.iter_mut() {
            entry.idle_secs = 300;
        }
        assert_eq!(table.get(id(1)).unwrap().idle_secs, 300);

        table.upsert_zero(id(1));
        assert_eq!(table.get(id(1)).unwrap().idle_secs, 0);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut table = IdleTable::new();
        assert!(table.remove(id(7)).is_none());

        table.upsert_zero(id(7));
        assert_eq!(table.remove(id(7)), Some(IdleEntry::new(id(7))));
        assert!(!table.contains(id(7)));
    }

    #[test]
    fn test_clear() {
        let mut table = IdleTable::new();
        table.extend([id(1), id(2), id(3)]);
        assert_eq!(table.len(), 3);

        table.clear();
        assert!(table.is_empty());
    }

    #[test]
    fn test_snapshot_is_sorted() {
        let mut table = IdleTable::new();
        table.extend([id(30), id(10), id(20)]);

        let ids: Vec<u64> = table.snapshot().iter().map(|e| e.id.value()).collect();
        assert_eq!(ids, vec![10, 20, 30]);
    }
}
