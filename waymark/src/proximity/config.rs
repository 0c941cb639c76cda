//! Proximity engine configuration.

use std::time::Duration;

/// Default proximity threshold in meters.
pub const DEFAULT_THRESHOLD_METERS: f64 = 100.0;

/// Default capacity of the location-sample channel.
///
/// The producer decouples from evaluation through this buffer; at typical
/// GPS cadence (~1 Hz) it holds over a minute of backlog.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Configuration for [`super::ProximityEngine`].
#[derive(Debug, Clone)]
pub struct ProximityConfig {
    /// Distance at or under which a marker is "near", in meters.
    ///
    /// The comparison is inclusive: distance == threshold triggers NEAR.
    /// A single threshold with no hysteresis band - a track oscillating
    /// exactly at the boundary will show and cancel repeatedly.
    pub threshold_meters: f64,

    /// Capacity of the sample channel between producer and engine.
    pub channel_capacity: usize,

    /// Minimum interval between evaluated samples. Zero (the default)
    /// evaluates every sample; raise it to damp sources that fire faster
    /// than evaluations are useful.
    pub min_sample_interval: Duration,

    /// Recent samples retained for display surfaces.
    pub history_samples: usize,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            threshold_meters: DEFAULT_THRESHOLD_METERS,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            min_sample_interval: Duration::ZERO,
            history_samples: 300,
        }
    }
}

impl ProximityConfig {
    /// Create a configuration with the default threshold.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the proximity threshold in meters.
    pub fn with_threshold_meters(mut self, meters: f64) -> Self {
        self.threshold_meters = meters;
        self
    }

    /// Set the sample channel capacity.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Set the minimum interval between evaluated samples.
    pub fn with_min_sample_interval(mut self, interval: Duration) -> Self {
        self.min_sample_interval = interval;
        self
    }
}
