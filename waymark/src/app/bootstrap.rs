//! Application bootstrap implementation.
//!
//! `App` wires the storage, notification, and proximity layers together in
//! the right order: markers are loaded from the store before the engine
//! task starts, so the first sample already sees the full set.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::config::AppConfig;
use super::error::AppError;
use crate::location::LocationSample;
use crate::marker::{Marker, MarkerId, MarkerPhoto, PhotoId};
use crate::notify::{NotificationSink, NotificationTracker};
use crate::proximity::{MarkerSet, ProximityEngine, ProximityEvents, ProximityHandle};
use crate::store::MarkerStore;
use crate::telemetry::{EngineMetrics, MetricsSnapshot};

/// The assembled proximity-notification application.
///
/// Owns the running engine task and offers the operations the surrounding
/// system (CLI, UI) needs: marker CRUD that keeps the engine's active set in
/// sync, a sample sender for the location producer, and graceful shutdown.
pub struct App {
    store: Arc<dyn MarkerStore>,
    handle: ProximityHandle,
    sample_tx: mpsc::Sender<LocationSample>,
    metrics: Arc<EngineMetrics>,
    events: ProximityEvents,
    shutdown: CancellationToken,
    engine_task: JoinHandle<()>,
}

impl App {
    /// Start the application.
    ///
    /// Loads the marker set from the store, then spawns the engine task on
    /// the current Tokio runtime. Must be called from within a runtime.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Store` when the initial marker load fails.
    pub fn start(
        config: AppConfig,
        store: Arc<dyn MarkerStore>,
        sink: Arc<dyn NotificationSink>,
    ) -> Result<Self, AppError> {
        let markers = store.list_markers()?;
        info!(markers = markers.len(), "Starting application");

        let marker_set = MarkerSet::from_markers(markers);
        let tracker = Arc::new(NotificationTracker::new(sink));

        let (engine, sample_tx) = ProximityEngine::new(config.proximity, marker_set, tracker);
        let handle = engine.handle();
        let metrics = engine.metrics();
        let events = engine.events();

        let shutdown = CancellationToken::new();
        let engine_task = tokio::spawn(engine.run(shutdown.clone()));

        Ok(Self {
            store,
            handle,
            sample_tx,
            metrics,
            events,
            shutdown,
            engine_task,
        })
    }

    /// Sender for pushing location samples into the engine.
    pub fn sample_sender(&self) -> mpsc::Sender<LocationSample> {
        self.sample_tx.clone()
    }

    /// Subscribe point for proximity transition events.
    pub fn events(&self) -> ProximityEvents {
        self.events.clone()
    }

    /// Point-in-time engine metrics.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Persist a new marker and add it to the active set.
    pub fn add_marker(
        &self,
        latitude: f64,
        longitude: f64,
        title: &str,
    ) -> Result<Marker, AppError> {
        let id = self.store.add_marker(latitude, longitude, title)?;
        let marker = self.store.get_marker(id)?;
        self.handle.insert_marker(marker.clone());
        Ok(marker)
    }

    /// Delete a marker, its photos, and any live notification.
    ///
    /// The notification record is cleared synchronously before this returns,
    /// even if the marker never left range naturally.
    pub fn delete_marker(&self, id: MarkerId) -> Result<(), AppError> {
        self.store.delete_marker(id)?;
        self.handle.remove_marker(id)?;
        Ok(())
    }

    /// Delete every marker, clearing all live notifications.
    pub fn delete_all_markers(&self) -> Result<usize, AppError> {
        let removed = self.store.delete_all_markers()?;
        self.handle.replace_markers(Vec::new())?;
        Ok(removed.len())
    }

    /// All markers, from the store.
    pub fn list_markers(&self) -> Result<Vec<Marker>, AppError> {
        Ok(self.store.list_markers()?)
    }

    /// Attach a photo to a marker.
    pub fn add_photo(&self, marker_id: MarkerId, uri: &str) -> Result<PhotoId, AppError> {
        Ok(self.store.add_photo(marker_id, uri)?)
    }

    /// Photos attached to a marker.
    pub fn list_photos(&self, marker_id: MarkerId) -> Result<Vec<MarkerPhoto>, AppError> {
        Ok(self.store.list_photos(marker_id)?)
    }

    /// Delete a photo.
    pub fn delete_photo(&self, id: PhotoId) -> Result<(), AppError> {
        Ok(self.store.delete_photo(id)?)
    }

    /// Re-read the marker set from the store.
    ///
    /// On success the engine's active set is replaced (markers that vanished
    /// are treated as deleted and cleared) and the new count returned. On
    /// storage failure the previous snapshot stays in effect and the error
    /// propagates.
    pub fn refresh_markers(&self) -> Result<usize, AppError> {
        let markers = match self.store.list_markers() {
            Ok(markers) => markers,
            Err(e) => {
                warn!(error = %e, "Marker refresh failed, keeping previous snapshot");
                return Err(e.into());
            }
        };

        let count = markers.len();
        self.handle.replace_markers(markers)?;
        Ok(count)
    }

    /// Markers that currently have a live notification.
    pub fn active_notifications(&self) -> Vec<MarkerId> {
        self.handle.active_notifications()
    }

    /// Stop the engine.
    ///
    /// Releases the location-stream subscription and waits for the loop to
    /// exit. Live notifications are NOT cancelled; they persist until their
    /// markers are deleted or the process restarts.
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        let _ = self.engine_task.await;
        info!("Application stopped");
    }
}
