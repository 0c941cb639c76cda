//! Marker and photo domain types.
//!
//! A marker is a saved point of interest: a coordinate pair plus a display
//! title, with zero or more photos attached. Markers are immutable once
//! created except by explicit update through the store; deleting a marker
//! removes it from the active set and cancels any live notification for it.

use serde::{Deserialize, Serialize};

use crate::geo::{Coordinate, GeoError};

/// Stable identity of a marker (SQLite row id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MarkerId(pub i64);

impl std::fmt::Display for MarkerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<i64> for MarkerId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Stable identity of a photo attached to a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhotoId(pub i64);

impl std::fmt::Display for PhotoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<i64> for PhotoId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// A saved point of interest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    /// Stable identity assigned by the store.
    pub id: MarkerId,
    /// Latitude in degrees (WGS-84).
    pub latitude: f64,
    /// Longitude in degrees (WGS-84).
    pub longitude: f64,
    /// Display title shown in notifications and listings.
    pub title: String,
}

impl Marker {
    /// Create a marker from already-validated parts.
    pub fn new(id: MarkerId, coordinate: Coordinate, title: impl Into<String>) -> Self {
        Self {
            id,
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
            title: title.into(),
        }
    }

    /// The marker's position as a validated coordinate.
    ///
    /// # Errors
    ///
    /// Returns `GeoError` if the stored components are out of range, which
    /// indicates the record was written outside this crate's constructors.
    pub fn coordinate(&self) -> Result<Coordinate, GeoError> {
        Coordinate::new(self.latitude, self.longitude)
    }
}

impl std::fmt::Display for Marker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} \"{}\" ({:.6}, {:.6})",
            self.id, self.title, self.latitude, self.longitude
        )
    }
}

/// A photo attached to a marker.
///
/// The photo content itself lives wherever `uri` points (a file path or a
/// platform media URI); the store only persists the reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerPhoto {
    /// Stable identity assigned by the store.
    pub id: PhotoId,
    /// The marker this photo belongs to.
    pub marker_id: MarkerId,
    /// Location of the photo content.
    pub uri: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_coordinate_roundtrip() {
        let coordinate = Coordinate::new(53.5511, 9.9937).unwrap();
        let marker = Marker::new(MarkerId(1), coordinate, "Harbour");

        let restored = marker.coordinate().unwrap();
        assert_eq!(restored, coordinate);
    }

    #[test]
    fn test_marker_display_includes_title_and_id() {
        let coordinate = Coordinate::new(0.0, 0.0).unwrap();
        let marker = Marker::new(MarkerId(7), coordinate, "Null Island");

        let rendered = marker.to_string();
        assert!(rendered.contains("#7"));
        assert!(rendered.contains("Null Island"));
    }

    #[test]
    fn test_marker_serializes_to_flat_json() {
        let coordinate = Coordinate::new(51.5074, -0.1278).unwrap();
        let marker = Marker::new(MarkerId(3), coordinate, "London");

        let json = serde_json::to_value(&marker).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["title"], "London");
        assert!(json["latitude"].as_f64().unwrap() > 51.0);
    }
}
