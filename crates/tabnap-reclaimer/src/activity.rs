//! Host lifecycle signals and their effect on the idle table

use crate::IdleTable;
use tabnap_domain::TabId;

/// A tab lifecycle signal from the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityEvent {
    /// A new tab was opened
    Created(TabId),

    /// A tab was closed
    Removed(TabId),

    /// A tab became the focused one
    Activated(TabId),
}

impl ActivityEvent {
    /// Apply the signal to the table
    ///
    /// New and focused tabs start (or restart) fully active; closed tabs are
    /// forgotten whatever their accumulated idle time.
    pub fn apply(self, table: &mut IdleTable) {
        match self {
            ActivityEvent::Created(id) | ActivityEvent::Activated(id) => table.upsert_zero(id),
            ActivityEvent::Removed(id) => {
                table.remove(id);
            }
        }
    }
}
