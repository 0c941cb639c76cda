//! The proximity evaluation loop.
//!
//! One logical producer (the location source) feeds one logical consumer
//! (the engine) over an mpsc channel; the engine evaluates samples strictly
//! in arrival order and never runs two evaluations concurrently. Each pass
//! snapshots the marker set, computes the distance from the sample to every
//! marker, and reports near/far to the notification tracker - which turns
//! repeated reports into at most one live notification per marker.
//!
//! ```text
//! Location source ──mpsc──► ProximityEngine ──per marker──► haversine
//!                                │                              │
//!                                └────── mark_near / mark_far ◄─┘
//!                                        (NotificationTracker)
//! ```
//!
//! Stopping the engine (cancellation or closing the channel) releases the
//! stream subscription but does NOT cancel live notifications; they persist
//! until a marker is deleted or the process restarts.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::config::ProximityConfig;
use super::events::{ProximityEvent, ProximityEvents};
use super::markers::MarkerSet;
use crate::geo::haversine_meters;
use crate::location::{LocationSample, SampleHistory, SampleHistoryConfig};
use crate::marker::{Marker, MarkerId};
use crate::notify::{NotificationTracker, SinkError, Transition};
use crate::telemetry::EngineMetrics;

/// Channel-fed proximity evaluation daemon.
pub struct ProximityEngine {
    config: ProximityConfig,
    markers: MarkerSet,
    tracker: Arc<NotificationTracker>,
    metrics: Arc<EngineMetrics>,
    events: ProximityEvents,
    history: SampleHistory,
    sample_rx: mpsc::Receiver<LocationSample>,
}

impl ProximityEngine {
    /// Create an engine with its sample channel.
    ///
    /// Returns the engine and the sender producers push samples into; clone
    /// the sender for multiple producers. Dropping every sender stops the
    /// engine once the channel drains.
    pub fn new(
        config: ProximityConfig,
        markers: MarkerSet,
        tracker: Arc<NotificationTracker>,
    ) -> (Self, mpsc::Sender<LocationSample>) {
        let (sample_tx, sample_rx) = mpsc::channel(config.channel_capacity);

        let history = SampleHistory::with_config(SampleHistoryConfig {
            max_samples: config.history_samples,
            min_interval: config.min_sample_interval,
        });

        let engine = Self {
            config,
            markers,
            tracker,
            metrics: Arc::new(EngineMetrics::new()),
            events: ProximityEvents::default(),
            history,
            sample_rx,
        };

        (engine, sample_tx)
    }

    /// Metrics recorded by this engine.
    pub fn metrics(&self) -> Arc<EngineMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Event channel for transition observers.
    pub fn events(&self) -> ProximityEvents {
        self.events.clone()
    }

    /// Mutation handle for user-interaction contexts.
    pub fn handle(&self) -> ProximityHandle {
        ProximityHandle {
            markers: self.markers.clone(),
            tracker: Arc::clone(&self.tracker),
            events: self.events.clone(),
            metrics: Arc::clone(&self.metrics),
        }
    }

    /// Run until cancellation or until every sample sender is dropped.
    ///
    /// Live notifications are intentionally left standing on exit.
    pub async fn run(mut self, shutdown: CancellationToken) {
        info!(
            threshold_m = self.config.threshold_meters,
            markers = self.markers.len(),
            "Proximity engine starting"
        );

        loop {
            let next = tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!("Proximity engine shutting down");
                    break;
                }

                sample = self.sample_rx.recv() => sample,
            };

            match next {
                Some(sample) => self.evaluate(sample),
                None => {
                    info!("Location stream closed");
                    break;
                }
            }
        }

        info!(
            live_notifications = self.tracker.active_count(),
            "Proximity engine stopped"
        );
    }

    /// Evaluate one sample against every marker in the current snapshot.
    fn evaluate(&mut self, sample: LocationSample) {
        self.metrics.sample_received();

        if !self.history.accept(sample) {
            self.metrics.sample_throttled();
            debug!(sample = %sample, "Sample throttled");
            return;
        }

        let position = match sample.coordinate() {
            Ok(position) => position,
            Err(e) => {
                warn!(sample = %sample, error = %e, "Discarding invalid sample");
                return;
            }
        };

        let snapshot = self.markers.snapshot();
        self.metrics.markers_evaluated(snapshot.len());

        for marker in snapshot.iter() {
            let Ok(coordinate) = marker.coordinate() else {
                // The store validates on insert; a bad row means external
                // tampering. Skip rather than poison the whole pass.
                warn!(marker = %marker.id, "Marker has invalid coordinates, skipping");
                continue;
            };

            let distance = haversine_meters(position, coordinate);

            if distance <= self.config.threshold_meters {
                match self.tracker.mark_near(marker) {
                    Ok(Transition::Entered) => {
                        debug!(marker = %marker.id, distance_m = distance, "Entered range");
                        self.metrics.notification_shown();
                        self.events.publish(ProximityEvent::Entered {
                            marker_id: marker.id,
                        });
                    }
                    Ok(_) => {}
                    Err(_) => self.metrics.sink_failure(),
                }
            } else {
                match self.tracker.mark_far(marker.id) {
                    Ok(Transition::Exited) => {
                        debug!(marker = %marker.id, distance_m = distance, "Left range");
                        self.metrics.notification_cancelled();
                        self.events.publish(ProximityEvent::Exited {
                            marker_id: marker.id,
                        });
                    }
                    Ok(_) => {}
                    Err(_) => self.metrics.sink_failure(),
                }
            }
        }
    }
}

/// Clonable handle for mutating the active marker set.
///
/// Deletions clear the marker's notification record synchronously, before
/// returning to the caller, taking precedence over any in-flight evaluation
/// working from a stale snapshot.
#[derive(Clone)]
pub struct ProximityHandle {
    markers: MarkerSet,
    tracker: Arc<NotificationTracker>,
    events: ProximityEvents,
    metrics: Arc<EngineMetrics>,
}

impl ProximityHandle {
    /// The shared marker set.
    pub fn markers(&self) -> &MarkerSet {
        &self.markers
    }

    /// Markers that currently have a live notification.
    pub fn active_notifications(&self) -> Vec<MarkerId> {
        self.tracker.active_markers()
    }

    /// Add a marker to the active set.
    ///
    /// It is evaluated from the first sample after it appears in a snapshot.
    pub fn insert_marker(&self, marker: Marker) {
        debug!(marker = %marker.id, "Marker added to active set");
        self.markers.insert(marker);
    }

    /// Remove a marker and clear its notification record.
    ///
    /// # Errors
    ///
    /// Returns `SinkError` when cancelling the live notification failed; the
    /// record is retained for retry but the marker is already out of the
    /// active set.
    pub fn remove_marker(&self, marker_id: MarkerId) -> Result<(), SinkError> {
        self.markers.remove(marker_id);
        self.clear_notification(marker_id)
    }

    /// Replace the whole active set (store refresh).
    ///
    /// Markers missing from the new set are treated as deleted and their
    /// notification records cleared.
    ///
    /// # Errors
    ///
    /// Returns the first `SinkError` hit while clearing; all removals are
    /// attempted regardless.
    pub fn replace_markers(&self, markers: Vec<Marker>) -> Result<(), SinkError> {
        let removed = self.markers.replace(markers);

        let mut first_error = None;
        for marker_id in removed {
            if let Err(e) = self.clear_notification(marker_id) {
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn clear_notification(&self, marker_id: MarkerId) -> Result<(), SinkError> {
        match self.tracker.clear(marker_id)? {
            Transition::Exited => {
                self.metrics.notification_cancelled();
                self.events.publish(ProximityEvent::Exited { marker_id });
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinate;
    use crate::notify::{NotificationHandle, NotificationSink};
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::Duration;

    /// Counts sink calls; show can be made to fail.
    #[derive(Default)]
    struct CountingSink {
        shows: AtomicU64,
        cancels: AtomicU64,
        fail_shows: AtomicU64,
        titles: Mutex<Vec<String>>,
    }

    impl NotificationSink for CountingSink {
        fn show(&self, title: &str, _body: &str) -> Result<NotificationHandle, SinkError> {
            if self.fail_shows.load(Ordering::Relaxed) > 0 {
                self.fail_shows.fetch_sub(1, Ordering::Relaxed);
                return Err(SinkError::Delivery("transient".to_string()));
            }
            let id = self.shows.fetch_add(1, Ordering::Relaxed);
            self.titles.lock().push(title.to_string());
            Ok(NotificationHandle(format!("n-{id}")))
        }

        fn cancel(&self, _handle: &NotificationHandle) -> Result<(), SinkError> {
            self.cancels.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }
    }

    fn marker_at(id: i64, lat: f64, lon: f64) -> Marker {
        Marker::new(
            MarkerId(id),
            Coordinate::new(lat, lon).unwrap(),
            format!("M{id}"),
        )
    }

    /// Longitude offset (degrees) putting a point roughly `meters` east of
    /// the origin on the equator.
    fn lon_for_meters(meters: f64) -> f64 {
        meters / 111_195.0
    }

    fn engine_with_marker() -> (
        Arc<CountingSink>,
        ProximityEngine,
        mpsc::Sender<LocationSample>,
    ) {
        let sink = Arc::new(CountingSink::default());
        let tracker = Arc::new(NotificationTracker::new(sink.clone()));
        let markers = MarkerSet::from_markers(vec![marker_at(1, 0.0, 0.0)]);
        let (engine, tx) = ProximityEngine::new(ProximityConfig::default(), markers, tracker);
        (sink, engine, tx)
    }

    #[test]
    fn test_transition_sequence_shows_and_cancels_once() {
        // 200m -> 50m -> 30m -> 150m must produce exactly one show (at 50m)
        // and one cancel (at 150m); the 30m sample changes nothing.
        let (sink, mut engine, _tx) = engine_with_marker();

        for meters in [200.0, 50.0, 30.0, 150.0] {
            engine.evaluate(LocationSample::new(0.0, lon_for_meters(meters)));
        }

        assert_eq!(sink.shows.load(Ordering::Relaxed), 1);
        assert_eq!(sink.cancels.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let sink = Arc::new(CountingSink::default());
        let tracker = Arc::new(NotificationTracker::new(sink.clone()));
        let markers = MarkerSet::from_markers(vec![marker_at(1, 0.0, 0.0)]);

        // Configure the threshold to the exact distance of the sample point.
        let sample = LocationSample::new(0.0, 0.0005);
        let exact = haversine_meters(
            sample.coordinate().unwrap(),
            Coordinate::new(0.0, 0.0).unwrap(),
        );

        let config = ProximityConfig::default().with_threshold_meters(exact);
        let (mut engine, _tx) = ProximityEngine::new(config, markers, tracker);

        engine.evaluate(sample);
        assert_eq!(
            sink.shows.load(Ordering::Relaxed),
            1,
            "distance == threshold must count as NEAR"
        );
    }

    #[test]
    fn test_every_marker_checked_every_sample() {
        let sink = Arc::new(CountingSink::default());
        let tracker = Arc::new(NotificationTracker::new(sink.clone()));
        let markers = MarkerSet::from_markers(vec![
            marker_at(1, 0.0, 0.0),
            marker_at(2, 0.0, lon_for_meters(50.0)),
            marker_at(3, 10.0, 10.0),
        ]);
        let (mut engine, _tx) =
            ProximityEngine::new(ProximityConfig::default(), markers, tracker);

        engine.evaluate(LocationSample::new(0.0, 0.0));

        // Markers 1 and 2 are inside 100m of the origin, marker 3 far away.
        assert_eq!(sink.shows.load(Ordering::Relaxed), 2);
        assert_eq!(engine.metrics().snapshot().markers_evaluated, 3);
    }

    #[test]
    fn test_marker_added_mid_run_is_picked_up() {
        let (sink, mut engine, _tx) = engine_with_marker();
        let handle = engine.handle();

        engine.evaluate(LocationSample::new(0.0, lon_for_meters(500.0)));
        assert_eq!(sink.shows.load(Ordering::Relaxed), 0);

        // New marker right at the 500m position appears in the next snapshot.
        handle.insert_marker(marker_at(2, 0.0, lon_for_meters(500.0)));
        engine.evaluate(LocationSample::new(0.0, lon_for_meters(500.0)));

        assert_eq!(sink.shows.load(Ordering::Relaxed), 1);
        let titles = sink.titles.lock();
        assert_eq!(titles.as_slice(), ["M2"]);
    }

    #[test]
    fn test_deletion_cancels_exactly_once() {
        let (sink, mut engine, _tx) = engine_with_marker();
        let handle = engine.handle();

        engine.evaluate(LocationSample::new(0.0, 0.0));
        assert_eq!(sink.shows.load(Ordering::Relaxed), 1);

        handle.remove_marker(MarkerId(1)).unwrap();
        assert_eq!(sink.cancels.load(Ordering::Relaxed), 1);

        // Further samples cannot touch the deleted marker.
        engine.evaluate(LocationSample::new(0.0, 0.0));
        assert_eq!(sink.shows.load(Ordering::Relaxed), 1);
        assert_eq!(sink.cancels.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_failed_show_retries_on_next_sample() {
        let (sink, mut engine, _tx) = engine_with_marker();
        sink.fail_shows.store(1, Ordering::Relaxed);

        engine.evaluate(LocationSample::new(0.0, 0.0));
        assert_eq!(sink.shows.load(Ordering::Relaxed), 0);
        assert_eq!(engine.metrics().snapshot().sink_failures, 1);

        engine.evaluate(LocationSample::new(0.0, 0.0));
        assert_eq!(
            sink.shows.load(Ordering::Relaxed),
            1,
            "Next sample retries the failed show"
        );
    }

    #[test]
    fn test_invalid_sample_is_discarded() {
        let (sink, mut engine, _tx) = engine_with_marker();

        engine.evaluate(LocationSample::new(200.0, 0.0));
        assert_eq!(sink.shows.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_throttled_samples_are_not_evaluated() {
        let sink = Arc::new(CountingSink::default());
        let tracker = Arc::new(NotificationTracker::new(sink.clone()));
        let markers = MarkerSet::from_markers(vec![marker_at(1, 0.0, 0.0)]);
        let config =
            ProximityConfig::default().with_min_sample_interval(Duration::from_secs(60));
        let (mut engine, _tx) = ProximityEngine::new(config, markers, tracker);

        engine.evaluate(LocationSample::new(0.0, 0.0));
        engine.evaluate(LocationSample::new(0.0, 0.0));

        let snapshot = engine.metrics().snapshot();
        assert_eq!(snapshot.samples_received, 2);
        assert_eq!(snapshot.samples_throttled, 1);
        assert_eq!(snapshot.markers_evaluated, 1);
    }

    #[tokio::test]
    async fn test_run_consumes_channel_and_stops_on_close() {
        let (sink, engine, tx) = engine_with_marker();
        let shutdown = CancellationToken::new();
        let task = tokio::spawn(engine.run(shutdown));

        tx.send(LocationSample::new(0.0, 0.0)).await.unwrap();
        drop(tx);

        task.await.unwrap();
        assert_eq!(sink.shows.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_shutdown_leaves_notifications_standing() {
        let (sink, engine, tx) = engine_with_marker();
        let tracker_view = engine.handle();
        let shutdown = CancellationToken::new();
        let task = tokio::spawn(engine.run(shutdown.clone()));

        tx.send(LocationSample::new(0.0, 0.0)).await.unwrap();

        // Wait for the sample to be processed before cancelling.
        for _ in 0..100 {
            if sink.shows.load(Ordering::Relaxed) == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        shutdown.cancel();
        task.await.unwrap();

        assert_eq!(sink.shows.load(Ordering::Relaxed), 1);
        assert_eq!(
            sink.cancels.load(Ordering::Relaxed),
            0,
            "Stopping the engine must not cancel live notifications"
        );
        drop(tracker_view);
    }

    #[tokio::test]
    async fn test_events_published_on_transitions() {
        let (_sink, mut engine, _tx) = engine_with_marker();
        let mut events = engine.events().subscribe();

        engine.evaluate(LocationSample::new(0.0, 0.0));
        engine.evaluate(LocationSample::new(0.0, 1.0));

        assert_eq!(
            events.recv().await.unwrap(),
            ProximityEvent::Entered {
                marker_id: MarkerId(1)
            }
        );
        assert_eq!(
            events.recv().await.unwrap(),
            ProximityEvent::Exited {
                marker_id: MarkerId(1)
            }
        );
    }
}
