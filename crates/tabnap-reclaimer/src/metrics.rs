//! Metrics collection for Reclaimer operations

use crate::SweepOutcome;
use serde::Serialize;

/// Counters collected by the worker
///
/// Survive enable/disable cycles; only [`reset`](Self::reset) clears them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReclaimerMetrics {
    /// Sweeps that ran against a host enumeration
    pub sweep_count: usize,

    /// Entry resets caused by exemption (focused or pinned tabs)
    pub exempt_resets: usize,

    /// Discards the host confirmed
    pub reclaimed: usize,

    /// Discards the host accepted without unloading the tab
    pub not_discarded: usize,

    /// Discards the host rejected with an error
    pub discard_failed: usize,

    /// Host enumerations that failed
    pub query_failed: usize,

    /// Sweep results dropped because the engine was toggled meanwhile
    pub stale_results: usize,
}

impl ReclaimerMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed sweep
    pub fn record_sweep(&mut self, outcome: &SweepOutcome) {
        self.sweep_count += 1;
        self.exempt_resets += outcome.reset;
    }

    /// Record a confirmed discard
    pub fn record_reclaimed(&mut self) {
        self.reclaimed += 1;
    }

    /// Record a discard the host declined
    pub fn record_not_discarded(&mut self) {
        self.not_discarded += 1;
    }

    /// Record a failed discard
    pub fn record_discard_failure(&mut self) {
        self.discard_failed += 1;
    }

    /// Record a failed enumeration
    pub fn record_query_failure(&mut self) {
        self.query_failed += 1;
    }

    /// Record a dropped sweep result
    pub fn record_stale_result(&mut self) {
        self.stale_results += 1;
    }

    /// Discards issued, whatever their outcome
    pub fn total_attempts(&self) -> usize {
        self.reclaimed + self.not_discarded + self.discard_failed
    }

    /// Reset all metrics
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Reclaimer Metrics Summary".to_string(),
            "=========================".to_string(),
            format!("Sweep cycles: {}", self.sweep_count),
            format!("Exempt resets: {}", self.exempt_resets),
            String::new(),
            "Discards:".to_string(),
            format!("  Reclaimed: {}", self.reclaimed),
            format!("  Not discarded: {}", self.not_discarded),
            format!("  Failed: {}", self.discard_failed),
            format!("  Total: {}", self.total_attempts()),
        ];

        if self.query_failed > 0 || self.stale_results > 0 {
            lines.push(String::new());
            lines.push(format!("Failed enumerations: {}", self.query_failed));
            lines.push(format!("Dropped stale results: {}", self.stale_results));
        }

        lines.join("\n")
    }
}
