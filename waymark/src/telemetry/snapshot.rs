//! Point-in-time copy of engine metrics for display.

use serde::Serialize;

/// Snapshot of [`super::EngineMetrics`] counters.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct MetricsSnapshot {
    /// Samples that arrived on the engine channel.
    pub samples_received: u64,
    /// Samples dropped by the minimum-interval filter.
    pub samples_throttled: u64,
    /// Total marker evaluations across all passes.
    pub markers_evaluated: u64,
    /// Notifications shown (FAR -> NEAR transitions).
    pub notifications_shown: u64,
    /// Notifications cancelled (NEAR -> FAR transitions and clears).
    pub notifications_cancelled: u64,
    /// Sink show/cancel calls that failed.
    pub sink_failures: u64,
}

impl std::fmt::Display for MetricsSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} samples ({} throttled), {} marker checks, {} shown, {} cancelled, {} sink failures",
            self.samples_received,
            self.samples_throttled,
            self.markers_evaluated,
            self.notifications_shown,
            self.notifications_cancelled,
            self.sink_failures
        )
    }
}
