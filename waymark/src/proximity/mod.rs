//! The proximity-notification engine.
//!
//! Compares a stream of location samples against the active marker set and
//! raises or clears a notification when a marker's great-circle distance
//! crosses the configured threshold.
//!
//! # State machine
//!
//! Each marker is independently `FAR` (initial) or `NEAR`:
//!
//! ```text
//!            distance <= threshold
//!      FAR ──────────────────────────► NEAR     (notification shown)
//!       ▲                                │
//!       └────────────────────────────────┘      (notification cancelled)
//!            distance > threshold
//! ```
//!
//! Repeated samples on the same side of the threshold cause no side effects.
//! The threshold is a single value with no hysteresis band; a track sitting
//! exactly on the boundary will alternate states. Notification state is not
//! persisted - after a restart every marker starts `FAR` and an in-range
//! marker re-notifies on the first sample.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use waymark::notify::{NotificationTracker, TracingSink};
//! use waymark::proximity::{MarkerSet, ProximityConfig, ProximityEngine};
//!
//! let tracker = Arc::new(NotificationTracker::new(Arc::new(TracingSink::new())));
//! let markers = MarkerSet::from_markers(store.list_markers()?);
//!
//! let (engine, sample_tx) = ProximityEngine::new(ProximityConfig::default(), markers, tracker);
//! let handle = engine.handle();
//!
//! let shutdown = CancellationToken::new();
//! tokio::spawn(engine.run(shutdown.clone()));
//!
//! // Feed samples from the platform location source
//! sample_tx.send(sample).await?;
//!
//! // Deleting a marker clears its notification before returning
//! handle.remove_marker(marker_id)?;
//! ```

mod config;
mod engine;
mod events;
mod markers;

pub use config::{ProximityConfig, DEFAULT_CHANNEL_CAPACITY, DEFAULT_THRESHOLD_METERS};
pub use engine::{ProximityEngine, ProximityHandle};
pub use events::{ProximityEvent, ProximityEvents};
pub use markers::MarkerSet;
