//! Eviction policy: one sweep over the idle table

use crate::IdleTable;
use std::collections::HashSet;
use tabnap_domain::{Settings, TabId, TabInfo};

/// Result of one sweep
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepOutcome {
    /// Entries reset to zero because their tab was exempt
    pub reset: usize,

    /// Entries that accrued idle time
    pub aged: usize,

    /// Entries left alone because their tab was missing from the enumeration
    pub skipped: usize,

    /// Tabs that crossed the threshold, ordered by id
    ///
    /// Already removed from the table; the caller owes each one a discard.
    pub reclaim: Vec<TabId>,
}

/// Decides which tracked tabs have been idle too long
///
/// Built from one settings snapshot, so every entry in a sweep is judged
/// with the same tick, timeout and pin policy.
///
/// # Examples
///
/// ```
/// use tabnap_domain::{Settings, TabId, TabInfo};
/// use tabnap_reclaimer::{EvictionPolicy, IdleTable};
///
/// let settings = Settings { timeout_secs: 60, tick_secs: 60, ..Default::default() };
/// let policy = EvictionPolicy::from_settings(&settings);
///
/// let mut table = IdleTable::new();
/// table.upsert_zero(TabId::new(1));
///
/// let outcome = policy.sweep(&mut table, &[TabInfo::new(TabId::new(1))]);
/// assert_eq!(outcome.reclaim, vec![TabId::new(1)]);
/// assert!(table.is_empty());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvictionPolicy {
    tick_secs: u64,
    timeout_secs: u64,
    skip_pinned: bool,
}

impl EvictionPolicy {
    /// Policy for one sweep cycle
    ///
    /// Idle time accrues by the interval the timer actually uses, so a stored
    /// tick of zero counts as one second here too.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            tick_secs: settings.tick().as_secs(),
            timeout_secs: settings.timeout_secs,
            skip_pinned: settings.skip_pinned,
        }
    }

    /// Idle seconds added per sweep
    pub fn tick_secs(&self) -> u64 {
        self.tick_secs
    }

    /// Tabs immune from idle accrual this sweep
    pub fn exemptions(&self, tabs: &[TabInfo]) -> HashSet<TabId> {
        tabs.iter()
            .filter(|tab| tab.is_exempt(self.skip_pinned))
            .map(|tab| tab.id)
            .collect()
    }

    /// Run one sweep
    ///
    /// For each tracked tab present in `tabs`: exempt tabs reset to zero,
    /// others accrue one tick and are removed from the table once their idle
    /// time reaches the timeout. Tracked tabs missing from `tabs` are left
    /// untouched; only a removal signal deletes them.
    pub fn sweep(&self, table: &mut IdleTable, tabs: &[TabInfo]) -> SweepOutcome {
        let exempt = self.exemptions(tabs);
        let present: HashSet<TabId> = tabs.iter().map(|tab| tab.id).collect();

        let mut outcome = SweepOutcome::default();
        for entry in table.iter_mut() {
            if !present.contains(&entry.id) {
                outcome.skipped += 1;
                continue;
            }

            if exempt.contains(&entry.id) {
                entry.idle_secs = 0;
                outcome.reset += 1;
                continue;
            }

            entry.idle_secs = entry.idle_secs.saturating_add(self.tick_secs);
            outcome.aged += 1;
            if entry.idle_secs >= self.timeout_secs {
                outcome.reclaim.push(entry.id);
            }
        }

        // Remove before anyone calls the host, so a slow or failed discard
        // can never lead to a second one.
        outcome.reclaim.sort();
        for id in &outcome.reclaim {
            table.remove(*id);
        }

        outcome
    }
}
