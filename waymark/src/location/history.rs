//! Recent-sample history with flood protection.
//!
//! The proximity loop evaluates every accepted sample against every marker,
//! so a source that fires many times per second would burn work without
//! changing any outcome. `SampleHistory` throttles acceptance to a minimum
//! interval measured at arrival time (wall-clock `Instant`, not the sample's
//! own timestamp, so duplicate or out-of-order source timestamps cannot
//! stall the filter) and retains a bounded window of recent fixes for
//! display surfaces.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use super::LocationSample;

/// Default maximum samples retained (5 minutes at one fix per second,
/// post-throttle).
const DEFAULT_MAX_SAMPLES: usize = 300;

/// Default minimum interval between accepted samples.
const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(500);

/// Configuration for the sample history.
#[derive(Debug, Clone)]
pub struct SampleHistoryConfig {
    /// Maximum samples to retain.
    pub max_samples: usize,
    /// Minimum interval between accepted samples. Zero disables throttling.
    pub min_interval: Duration,
}

impl Default for SampleHistoryConfig {
    fn default() -> Self {
        Self {
            max_samples: DEFAULT_MAX_SAMPLES,
            min_interval: DEFAULT_MIN_INTERVAL,
        }
    }
}

/// Bounded history of recently accepted location samples.
#[derive(Debug)]
pub struct SampleHistory {
    /// Accepted samples, oldest first.
    samples: VecDeque<LocationSample>,
    config: SampleHistoryConfig,
    /// Arrival time of the last accepted sample.
    last_accepted: Option<Instant>,
}

impl Default for SampleHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleHistory {
    /// Create a history with default configuration.
    pub fn new() -> Self {
        Self::with_config(SampleHistoryConfig::default())
    }

    /// Create a history with custom configuration.
    pub fn with_config(config: SampleHistoryConfig) -> Self {
        Self {
            samples: VecDeque::with_capacity(config.max_samples),
            config,
            last_accepted: None,
        }
    }

    /// Offer a sample to the history.
    ///
    /// Returns true if the sample was accepted and should be evaluated;
    /// false if it arrived inside the minimum interval and was dropped.
    pub fn accept(&mut self, sample: LocationSample) -> bool {
        self.accept_at(sample, Instant::now())
    }

    /// Offer a sample with an explicit arrival time (for tests).
    pub fn accept_at(&mut self, sample: LocationSample, arrived: Instant) -> bool {
        if let Some(last) = self.last_accepted {
            if arrived.duration_since(last) < self.config.min_interval {
                return false;
            }
        }

        self.samples.push_back(sample);
        self.last_accepted = Some(arrived);

        while self.samples.len() > self.config.max_samples {
            self.samples.pop_front();
        }

        true
    }

    /// Number of retained samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the history is empty.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// The most recently accepted sample.
    pub fn latest(&self) -> Option<&LocationSample> {
        self.samples.back()
    }

    /// Iterate retained samples, oldest first.
    pub fn samples(&self) -> impl Iterator<Item = &LocationSample> {
        self.samples.iter()
    }

    /// Drop all retained samples and reset the throttle.
    pub fn clear(&mut self) {
        self.samples.clear();
        self.last_accepted = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_config() -> SampleHistoryConfig {
        SampleHistoryConfig {
            max_samples: 4,
            min_interval: Duration::from_millis(100),
        }
    }

    #[test]
    fn test_first_sample_always_accepted() {
        let mut history = SampleHistory::with_config(fast_config());
        assert!(history.accept(LocationSample::new(53.5, 10.0)));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_throttles_samples_inside_interval() {
        let mut history = SampleHistory::with_config(fast_config());
        let start = Instant::now();

        assert!(history.accept_at(LocationSample::new(53.5, 10.0), start));
        assert!(!history.accept_at(
            LocationSample::new(53.6, 10.1),
            start + Duration::from_millis(50)
        ));
        assert_eq!(history.len(), 1);

        assert!(history.accept_at(
            LocationSample::new(53.6, 10.1),
            start + Duration::from_millis(150)
        ));
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_duplicate_timestamps_do_not_stall_throttle() {
        // Arrival time drives throttling, so a source that repeats the same
        // fix timestamp still gets samples through.
        let mut history = SampleHistory::with_config(fast_config());
        let start = Instant::now();
        let sample = LocationSample::new(53.5, 10.0);

        assert!(history.accept_at(sample, start));
        assert!(history.accept_at(sample, start + Duration::from_millis(150)));
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut history = SampleHistory::with_config(fast_config());
        let start = Instant::now();

        for i in 0..10 {
            history.accept_at(
                LocationSample::new(53.5 + i as f64 * 0.001, 10.0),
                start + Duration::from_millis(i * 200),
            );
        }

        assert_eq!(history.len(), 4, "History should trim to max_samples");
        let newest = history.latest().unwrap();
        assert!(
            (newest.latitude - 53.509).abs() < 1e-9,
            "Newest sample should survive trimming"
        );
    }

    #[test]
    fn test_clear_resets_throttle() {
        let mut history = SampleHistory::with_config(fast_config());
        let start = Instant::now();

        assert!(history.accept_at(LocationSample::new(53.5, 10.0), start));
        history.clear();

        // Immediately after clear the throttle window is gone
        assert!(history.accept_at(
            LocationSample::new(53.5, 10.0),
            start + Duration::from_millis(1)
        ));
    }
}
