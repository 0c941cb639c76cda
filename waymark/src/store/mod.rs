//! Marker and photo persistence.
//!
//! The [`MarkerStore`] trait is the storage boundary: a simple record store
//! with CRUD operations for markers and their attached photos. Two providers
//! ship with the crate:
//!
//! - [`SqliteStore`] - durable storage in a SQLite database file
//! - [`MemoryStore`] - ephemeral storage for tests and previews
//!
//! The proximity side never talks to a store directly; the application layer
//! refreshes the engine's marker snapshot from `list_markers` and treats a
//! storage error as "keep the previous snapshot, report upward".

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use thiserror::Error;

use crate::geo::GeoError;
use crate::marker::{Marker, MarkerId, MarkerPhoto, PhotoId};

/// Errors raised by a marker store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying database failed or is unavailable.
    #[error("Storage unavailable: {0}")]
    Database(#[from] rusqlite::Error),

    /// Rejected marker input (out-of-range coordinate).
    #[error("Invalid marker coordinate: {0}")]
    InvalidCoordinate(#[from] GeoError),

    /// No marker with the given id.
    #[error("Marker {0} not found")]
    MarkerNotFound(MarkerId),

    /// No photo with the given id.
    #[error("Photo {0} not found")]
    PhotoNotFound(PhotoId),
}

/// A record store for markers and their photos.
///
/// All operations are fallible with [`StoreError`]; implementations must be
/// usable from multiple threads (the CLI mutates while the engine's refresh
/// path reads).
pub trait MarkerStore: Send + Sync {
    /// All markers, ordered by id.
    fn list_markers(&self) -> Result<Vec<Marker>, StoreError>;

    /// Fetch a single marker.
    fn get_marker(&self, id: MarkerId) -> Result<Marker, StoreError>;

    /// Create a marker, returning its assigned identity.
    ///
    /// Coordinates are validated before the record is written.
    fn add_marker(&self, latitude: f64, longitude: f64, title: &str)
        -> Result<MarkerId, StoreError>;

    /// Delete a marker and, by cascade, its photos.
    fn delete_marker(&self, id: MarkerId) -> Result<(), StoreError>;

    /// Delete every marker, returning the ids that were removed so callers
    /// can clear any live notifications for them.
    fn delete_all_markers(&self) -> Result<Vec<MarkerId>, StoreError>;

    /// Attach a photo to a marker.
    fn add_photo(&self, marker_id: MarkerId, uri: &str) -> Result<PhotoId, StoreError>;

    /// Photos attached to a marker, ordered by id.
    fn list_photos(&self, marker_id: MarkerId) -> Result<Vec<MarkerPhoto>, StoreError>;

    /// Detach and delete a photo.
    fn delete_photo(&self, id: PhotoId) -> Result<(), StoreError>;
}
