//! Location sampling types.
//!
//! The engine consumes [`LocationSample`]s from whatever platform source the
//! host wires up (a GPS callback, a replay file, a test fixture). Samples
//! arrive as an unbounded, time-ordered but not strictly monotonic sequence;
//! out-of-order or duplicate timestamps must never corrupt engine state.
//!
//! A failed location source is fatal to the feature, never to the host
//! process: the engine simply idles until samples resume.

mod history;

pub use history::{SampleHistory, SampleHistoryConfig};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::geo::Coordinate;

/// Errors surfaced by a location source.
#[derive(Debug, Error)]
pub enum LocationError {
    /// The user denied location permission. Permanent for this run.
    #[error("Location permission denied")]
    PermissionDenied,

    /// The location hardware or service is temporarily unavailable.
    #[error("Location unavailable: {0}")]
    Unavailable(String),
}

/// A single position fix from the location source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationSample {
    /// Latitude in degrees (WGS-84).
    pub latitude: f64,
    /// Longitude in degrees (WGS-84).
    pub longitude: f64,
    /// When the fix was taken, as reported by the source.
    pub timestamp: DateTime<Utc>,
}

impl LocationSample {
    /// Create a sample stamped with the current time.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            timestamp: Utc::now(),
        }
    }

    /// Create a sample with an explicit timestamp.
    pub fn at(latitude: f64, longitude: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            latitude,
            longitude,
            timestamp,
        }
    }

    /// The sample's position as a coordinate.
    ///
    /// Samples are constructed from platform fixes and may carry values the
    /// engine should reject; callers use this to validate before evaluating.
    pub fn coordinate(&self) -> Result<Coordinate, crate::geo::GeoError> {
        Coordinate::new(self.latitude, self.longitude)
    }
}

impl std::fmt::Display for LocationSample {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({:.6}, {:.6}) @ {}",
            self.latitude,
            self.longitude,
            self.timestamp.to_rfc3339()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_coordinate_validation() {
        let good = LocationSample::new(53.55, 9.99);
        assert!(good.coordinate().is_ok());

        let bad = LocationSample::new(123.0, 0.0);
        assert!(bad.coordinate().is_err());
    }
}
