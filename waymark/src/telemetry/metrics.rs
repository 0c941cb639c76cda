//! Atomic counters recorded by the proximity loop.

use std::sync::atomic::{AtomicU64, Ordering};

use super::MetricsSnapshot;

/// Counters for one engine instance.
///
/// All methods are callable from any thread; counts are monotonic for the
/// life of the process.
#[derive(Debug, Default)]
pub struct EngineMetrics {
    samples_received: AtomicU64,
    samples_throttled: AtomicU64,
    markers_evaluated: AtomicU64,
    notifications_shown: AtomicU64,
    notifications_cancelled: AtomicU64,
    sink_failures: AtomicU64,
}

impl EngineMetrics {
    /// Create zeroed metrics.
    pub fn new() -> Self {
        Self::default()
    }

    /// A sample arrived on the engine channel.
    pub fn sample_received(&self) {
        self.samples_received.fetch_add(1, Ordering::Relaxed);
    }

    /// A sample was dropped by the minimum-interval filter.
    pub fn sample_throttled(&self) {
        self.samples_throttled.fetch_add(1, Ordering::Relaxed);
    }

    /// An evaluation pass checked `count` markers.
    pub fn markers_evaluated(&self, count: usize) {
        self.markers_evaluated
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    /// A notification was shown (FAR -> NEAR transition).
    pub fn notification_shown(&self) {
        self.notifications_shown.fetch_add(1, Ordering::Relaxed);
    }

    /// A notification was cancelled (NEAR -> FAR or clear).
    pub fn notification_cancelled(&self) {
        self.notifications_cancelled.fetch_add(1, Ordering::Relaxed);
    }

    /// A sink show/cancel call failed.
    pub fn sink_failure(&self) {
        self.sink_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a point-in-time copy for display.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            samples_received: self.samples_received.load(Ordering::Relaxed),
            samples_throttled: self.samples_throttled.load(Ordering::Relaxed),
            markers_evaluated: self.markers_evaluated.load(Ordering::Relaxed),
            notifications_shown: self.notifications_shown.load(Ordering::Relaxed),
            notifications_cancelled: self.notifications_cancelled.load(Ordering::Relaxed),
            sink_failures: self.sink_failures.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let metrics = EngineMetrics::new();
        metrics.sample_received();
        metrics.sample_received();
        metrics.sample_throttled();
        metrics.markers_evaluated(5);
        metrics.notification_shown();
        metrics.notification_cancelled();
        metrics.sink_failure();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.samples_received, 2);
        assert_eq!(snapshot.samples_throttled, 1);
        assert_eq!(snapshot.markers_evaluated, 5);
        assert_eq!(snapshot.notifications_shown, 1);
        assert_eq!(snapshot.notifications_cancelled, 1);
        assert_eq!(snapshot.sink_failures, 1);
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let metrics = EngineMetrics::new();
        metrics.sample_received();

        let before = metrics.snapshot();
        metrics.sample_received();
        let after = metrics.snapshot();

        assert_eq!(before.samples_received, 1);
        assert_eq!(after.samples_received, 2);
    }
}
