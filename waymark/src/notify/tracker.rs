//! Per-marker notification state tracking.
//!
//! The tracker owns the only mutable notification state in the engine: a
//! table mapping marker identity to its live notification record. Show and
//! cancel side effects happen exactly on state transitions; re-reporting the
//! same state is a no-op.
//!
//! The table is guarded by a single mutex. Only two paths touch it - the
//! serialized proximity loop and the marker-deletion path - so no finer
//! locking is needed at the expected marker cardinality. Deletion also
//! tombstones the identity under the same lock: an evaluation pass working
//! from a snapshot taken before the deletion cannot re-create the record.
//! Marker identities are store-assigned and never reused, so a tombstoned
//! identity staying cleared forever is correct.
//!
//! The table is never persisted: a process restart rebuilds it empty, so a
//! marker still in range re-notifies on the first in-range sample after
//! startup.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::sink::{NotificationHandle, NotificationSink, SinkError};
use crate::marker::{Marker, MarkerId};

/// A live notification owned by the tracker.
#[derive(Debug, Clone)]
pub struct ActiveNotification {
    /// The marker this notification belongs to.
    pub marker_id: MarkerId,
    /// Handle minted by the sink, used for cancellation.
    pub handle: NotificationHandle,
    /// When the notification was shown.
    pub created_at: DateTime<Utc>,
}

/// Outcome of a tracker call, for observers and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// A notification was shown (FAR -> NEAR).
    Entered,
    /// A notification was cancelled (NEAR -> FAR, or forced clear).
    Exited,
    /// The marker was already in the reported state; no side effect.
    Unchanged,
}

#[derive(Default)]
struct TrackerState {
    records: HashMap<MarkerId, ActiveNotification>,
    /// Identities removed by deletion; mark_near refuses them.
    cleared: HashSet<MarkerId>,
}

/// Enforces the at-most-one-live-notification-per-marker invariant.
pub struct NotificationTracker {
    sink: Arc<dyn NotificationSink>,
    state: Mutex<TrackerState>,
}

impl NotificationTracker {
    /// Create a tracker delivering through the given sink.
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            sink,
            state: Mutex::new(TrackerState::default()),
        }
    }

    /// Report that a marker is within the proximity threshold.
    ///
    /// On the first report a notification is requested from the sink and the
    /// returned handle is recorded. Further reports while the record exists
    /// are no-ops and never re-trigger delivery. Reports for a deleted
    /// (cleared) marker are refused.
    ///
    /// # Errors
    ///
    /// Returns `SinkError` when the sink rejects the show call. No record is
    /// stored in that case, so the next in-range sample retries delivery.
    pub fn mark_near(&self, marker: &Marker) -> Result<Transition, SinkError> {
        let mut state = self.state.lock();

        if state.cleared.contains(&marker.id) {
            debug!(marker = %marker.id, "Marker was deleted, ignoring near report");
            return Ok(Transition::Unchanged);
        }

        if state.records.contains_key(&marker.id) {
            debug!(marker = %marker.id, "Notification already active");
            return Ok(Transition::Unchanged);
        }

        let body = format!("You are near \"{}\"", marker.title);
        let handle = match self.sink.show(&marker.title, &body) {
            Ok(handle) => handle,
            Err(e) => {
                warn!(marker = %marker.id, error = %e, "Notification show failed");
                return Err(e);
            }
        };

        info!(marker = %marker.id, handle = %handle, "Marker entered range");
        state.records.insert(
            marker.id,
            ActiveNotification {
                marker_id: marker.id,
                handle,
                created_at: Utc::now(),
            },
        );

        Ok(Transition::Entered)
    }

    /// Report that a marker is outside the proximity threshold.
    ///
    /// Cancels and removes the marker's record if one exists; otherwise a
    /// no-op.
    ///
    /// # Errors
    ///
    /// Returns `SinkError` when cancellation fails. The record is retained
    /// so a later call can retry the cancellation.
    pub fn mark_far(&self, marker_id: MarkerId) -> Result<Transition, SinkError> {
        let mut state = self.state.lock();
        Self::cancel_record(&self.sink, &mut state, marker_id, "Marker left range")
    }

    /// Force-remove a marker's notification (marker deleted).
    ///
    /// Identical effect to [`mark_far`](Self::mark_far), plus the identity is
    /// tombstoned so a stale evaluation pass cannot resurrect the record.
    /// Succeeds quietly when the marker is unknown to the rest of the system.
    pub fn clear(&self, marker_id: MarkerId) -> Result<Transition, SinkError> {
        let mut state = self.state.lock();
        state.cleared.insert(marker_id);
        Self::cancel_record(&self.sink, &mut state, marker_id, "Marker cleared")
    }

    fn cancel_record(
        sink: &Arc<dyn NotificationSink>,
        state: &mut TrackerState,
        marker_id: MarkerId,
        context: &str,
    ) -> Result<Transition, SinkError> {
        let Some(record) = state.records.get(&marker_id) else {
            return Ok(Transition::Unchanged);
        };

        if let Err(e) = sink.cancel(&record.handle) {
            // Keep the record: a later mark_far/clear retries the cancel.
            warn!(marker = %marker_id, error = %e, "Notification cancel failed");
            return Err(e);
        }

        info!(marker = %marker_id, "{}", context);
        state.records.remove(&marker_id);
        Ok(Transition::Exited)
    }

    /// Whether a marker currently has a live notification.
    pub fn is_active(&self, marker_id: MarkerId) -> bool {
        self.state.lock().records.contains_key(&marker_id)
    }

    /// Number of live notifications.
    pub fn active_count(&self) -> usize {
        self.state.lock().records.len()
    }

    /// Markers with live notifications, in no particular order.
    pub fn active_markers(&self) -> Vec<MarkerId> {
        self.state.lock().records.keys().copied().collect()
    }
}

impl std::fmt::Debug for NotificationTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationTracker")
            .field("active", &self.active_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinate;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

    /// Records every sink call and can be told to fail on demand.
    #[derive(Default)]
    struct RecordingSink {
        shows: Mutex<Vec<String>>,
        cancels: Mutex<Vec<NotificationHandle>>,
        next_id: AtomicU64,
        fail_show: AtomicBool,
        fail_cancel: AtomicBool,
    }

    impl RecordingSink {
        fn show_count(&self) -> usize {
            self.shows.lock().len()
        }

        fn cancel_count(&self) -> usize {
            self.cancels.lock().len()
        }
    }

    impl NotificationSink for RecordingSink {
        fn show(&self, title: &str, _body: &str) -> Result<NotificationHandle, SinkError> {
            if self.fail_show.load(Ordering::Relaxed) {
                return Err(SinkError::PermissionDenied);
            }
            let id = self.next_id.fetch_add(1, Ordering::Relaxed);
            self.shows.lock().push(title.to_string());
            Ok(NotificationHandle(format!("test-{id}")))
        }

        fn cancel(&self, handle: &NotificationHandle) -> Result<(), SinkError> {
            if self.fail_cancel.load(Ordering::Relaxed) {
                return Err(SinkError::Cancellation("test failure".to_string()));
            }
            self.cancels.lock().push(handle.clone());
            Ok(())
        }
    }

    fn marker(id: i64) -> Marker {
        Marker::new(
            MarkerId(id),
            Coordinate::new(53.5511, 9.9937).unwrap(),
            format!("Marker {id}"),
        )
    }

    fn tracker() -> (Arc<RecordingSink>, NotificationTracker) {
        let sink = Arc::new(RecordingSink::default());
        let tracker = NotificationTracker::new(sink.clone());
        (sink, tracker)
    }

    #[test]
    fn test_mark_near_shows_once() {
        let (sink, tracker) = tracker();
        let m = marker(1);

        assert_eq!(tracker.mark_near(&m).unwrap(), Transition::Entered);
        assert_eq!(sink.show_count(), 1);
        assert!(tracker.is_active(m.id));
    }

    #[test]
    fn test_mark_near_is_idempotent() {
        let (sink, tracker) = tracker();
        let m = marker(1);

        assert_eq!(tracker.mark_near(&m).unwrap(), Transition::Entered);
        assert_eq!(tracker.mark_near(&m).unwrap(), Transition::Unchanged);
        assert_eq!(tracker.mark_near(&m).unwrap(), Transition::Unchanged);

        assert_eq!(sink.show_count(), 1, "Repeated mark_near must not re-show");
        assert_eq!(tracker.active_count(), 1);
    }

    #[test]
    fn test_mark_far_without_record_is_noop() {
        let (sink, tracker) = tracker();

        assert_eq!(
            tracker.mark_far(MarkerId(99)).unwrap(),
            Transition::Unchanged
        );
        assert_eq!(sink.cancel_count(), 0);
    }

    #[test]
    fn test_mark_far_cancels_and_removes() {
        let (sink, tracker) = tracker();
        let m = marker(1);

        tracker.mark_near(&m).unwrap();
        assert_eq!(tracker.mark_far(m.id).unwrap(), Transition::Exited);

        assert_eq!(sink.cancel_count(), 1);
        assert!(!tracker.is_active(m.id));
    }

    #[test]
    fn test_far_near_far_cycle_can_renotify() {
        let (sink, tracker) = tracker();
        let m = marker(1);

        tracker.mark_near(&m).unwrap();
        tracker.mark_far(m.id).unwrap();
        assert_eq!(tracker.mark_near(&m).unwrap(), Transition::Entered);

        assert_eq!(sink.show_count(), 2, "Leaving range re-arms notification");
    }

    #[test]
    fn test_failed_show_leaves_no_phantom_record() {
        let (sink, tracker) = tracker();
        let m = marker(1);

        sink.fail_show.store(true, Ordering::Relaxed);
        assert!(tracker.mark_near(&m).is_err());
        assert!(!tracker.is_active(m.id), "Failed show must not record");

        // Recovery: next sample retries and succeeds
        sink.fail_show.store(false, Ordering::Relaxed);
        assert_eq!(tracker.mark_near(&m).unwrap(), Transition::Entered);
        assert_eq!(sink.show_count(), 1);
    }

    #[test]
    fn test_failed_cancel_retains_record_for_retry() {
        let (sink, tracker) = tracker();
        let m = marker(1);

        tracker.mark_near(&m).unwrap();

        sink.fail_cancel.store(true, Ordering::Relaxed);
        assert!(tracker.mark_far(m.id).is_err());
        assert!(
            tracker.is_active(m.id),
            "Failed cancel must keep the record so cancellation can retry"
        );

        sink.fail_cancel.store(false, Ordering::Relaxed);
        assert_eq!(tracker.mark_far(m.id).unwrap(), Transition::Exited);
        assert!(!tracker.is_active(m.id));
    }

    #[test]
    fn test_clear_unknown_marker_is_ok() {
        let (_sink, tracker) = tracker();
        assert_eq!(tracker.clear(MarkerId(404)).unwrap(), Transition::Unchanged);
    }

    #[test]
    fn test_clear_cancels_live_notification() {
        let (sink, tracker) = tracker();
        let m = marker(1);

        tracker.mark_near(&m).unwrap();
        assert_eq!(tracker.clear(m.id).unwrap(), Transition::Exited);
        assert_eq!(sink.cancel_count(), 1);
        assert_eq!(tracker.active_count(), 0);
    }

    #[test]
    fn test_cleared_marker_cannot_be_resurrected() {
        // An evaluation pass may hold a snapshot taken before a deletion;
        // its near report for the deleted marker must not re-create state.
        let (sink, tracker) = tracker();
        let m = marker(1);

        tracker.mark_near(&m).unwrap();
        tracker.clear(m.id).unwrap();

        assert_eq!(tracker.mark_near(&m).unwrap(), Transition::Unchanged);
        assert!(!tracker.is_active(m.id));
        assert_eq!(sink.show_count(), 1, "Cleared marker must stay cleared");
    }

    #[test]
    fn test_mark_far_does_not_tombstone() {
        let (_sink, tracker) = tracker();
        let m = marker(1);

        tracker.mark_near(&m).unwrap();
        tracker.mark_far(m.id).unwrap();

        // Ordinary range exit re-arms; only deletion tombstones.
        assert_eq!(tracker.mark_near(&m).unwrap(), Transition::Entered);
    }
}
