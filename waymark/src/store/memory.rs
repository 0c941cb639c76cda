//! In-memory marker storage for tests and ephemeral sessions.

use std::collections::HashMap;

use parking_lot::Mutex;

use super::{MarkerStore, StoreError};
use crate::geo::Coordinate;
use crate::marker::{Marker, MarkerId, MarkerPhoto, PhotoId};

#[derive(Default)]
struct Tables {
    markers: HashMap<i64, Marker>,
    photos: HashMap<i64, MarkerPhoto>,
    next_marker_id: i64,
    next_photo_id: i64,
}

/// HashMap-backed store with the same semantics as [`super::SqliteStore`],
/// including photo cascade on marker deletion.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl MarkerStore for MemoryStore {
    fn list_markers(&self) -> Result<Vec<Marker>, StoreError> {
        let tables = self.tables.lock();
        let mut markers: Vec<Marker> = tables.markers.values().cloned().collect();
        markers.sort_by_key(|m| m.id);
        Ok(markers)
    }

    fn get_marker(&self, id: MarkerId) -> Result<Marker, StoreError> {
        self.tables
            .lock()
            .markers
            .get(&id.0)
            .cloned()
            .ok_or(StoreError::MarkerNotFound(id))
    }

    fn add_marker(
        &self,
        latitude: f64,
        longitude: f64,
        title: &str,
    ) -> Result<MarkerId, StoreError> {
        let coordinate = Coordinate::new(latitude, longitude)?;

        let mut tables = self.tables.lock();
        tables.next_marker_id += 1;
        let id = MarkerId(tables.next_marker_id);
        tables
            .markers
            .insert(id.0, Marker::new(id, coordinate, title));
        Ok(id)
    }

    fn delete_marker(&self, id: MarkerId) -> Result<(), StoreError> {
        let mut tables = self.tables.lock();
        if tables.markers.remove(&id.0).is_none() {
            return Err(StoreError::MarkerNotFound(id));
        }
        tables.photos.retain(|_, photo| photo.marker_id != id);
        Ok(())
    }

    fn delete_all_markers(&self) -> Result<Vec<MarkerId>, StoreError> {
        let mut tables = self.tables.lock();
        let mut ids: Vec<MarkerId> = tables.markers.values().map(|m| m.id).collect();
        ids.sort();
        tables.markers.clear();
        tables.photos.clear();
        Ok(ids)
    }

    fn add_photo(&self, marker_id: MarkerId, uri: &str) -> Result<PhotoId, StoreError> {
        let mut tables = self.tables.lock();
        if !tables.markers.contains_key(&marker_id.0) {
            return Err(StoreError::MarkerNotFound(marker_id));
        }

        tables.next_photo_id += 1;
        let id = PhotoId(tables.next_photo_id);
        tables.photos.insert(
            id.0,
            MarkerPhoto {
                id,
                marker_id,
                uri: uri.to_string(),
            },
        );
        Ok(id)
    }

    fn list_photos(&self, marker_id: MarkerId) -> Result<Vec<MarkerPhoto>, StoreError> {
        let tables = self.tables.lock();
        let mut photos: Vec<MarkerPhoto> = tables
            .photos
            .values()
            .filter(|photo| photo.marker_id == marker_id)
            .cloned()
            .collect();
        photos.sort_by_key(|p| p.id.0);
        Ok(photos)
    }

    fn delete_photo(&self, id: PhotoId) -> Result<(), StoreError> {
        let mut tables = self.tables.lock();
        if tables.photos.remove(&id.0).is_none() {
            return Err(StoreError::PhotoNotFound(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_stable_and_increasing() {
        let store = MemoryStore::new();
        let a = store.add_marker(0.0, 0.0, "A").unwrap();
        let b = store.add_marker(1.0, 1.0, "B").unwrap();
        assert!(b > a);
    }

    #[test]
    fn test_cascade_matches_sqlite_semantics() {
        let store = MemoryStore::new();
        let id = store.add_marker(53.5511, 9.9937, "Hamburg").unwrap();
        store.add_photo(id, "file:///a.jpg").unwrap();

        store.delete_marker(id).unwrap();
        assert!(store.list_photos(id).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_coordinate_rejected() {
        let store = MemoryStore::new();
        assert!(store.add_marker(0.0, 200.0, "Bad").is_err());
    }
}
