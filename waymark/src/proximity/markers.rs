//! Shared marker set with atomic snapshots.
//!
//! The active marker set is read by the evaluation loop on every sample and
//! mutated from user-interaction contexts. Readers take a snapshot - a clone
//! of an `Arc`'d immutable slice - so iteration never observes a half-applied
//! mutation, and writers block readers only for the duration of the pointer
//! swap.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::marker::{Marker, MarkerId};

/// Shared, snapshot-readable set of active markers.
#[derive(Clone, Default)]
pub struct MarkerSet {
    inner: Arc<RwLock<Arc<[Marker]>>>,
}

impl MarkerSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a set seeded with markers.
    pub fn from_markers(markers: Vec<Marker>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(markers.into())),
        }
    }

    /// Take a point-in-time, read-only view of the set.
    pub fn snapshot(&self) -> Arc<[Marker]> {
        self.inner.read().clone()
    }

    /// Replace the whole set (store refresh).
    ///
    /// Returns the ids present before but absent after - markers the caller
    /// must treat as deleted.
    pub fn replace(&self, markers: Vec<Marker>) -> Vec<MarkerId> {
        let next: Arc<[Marker]> = markers.into();
        let mut current = self.inner.write();

        let removed = current
            .iter()
            .map(|m| m.id)
            .filter(|id| !next.iter().any(|m| m.id == *id))
            .collect();

        *current = next;
        removed
    }

    /// Add a marker, or update it in place if the id is already present.
    pub fn insert(&self, marker: Marker) {
        let mut current = self.inner.write();
        let mut markers: Vec<Marker> = current
            .iter()
            .filter(|m| m.id != marker.id)
            .cloned()
            .collect();
        markers.push(marker);
        *current = markers.into();
    }

    /// Remove a marker. Returns true if it was present.
    pub fn remove(&self, id: MarkerId) -> bool {
        let mut current = self.inner.write();
        if !current.iter().any(|m| m.id == id) {
            return false;
        }
        let markers: Vec<Marker> = current.iter().filter(|m| m.id != id).cloned().collect();
        *current = markers.into();
        true
    }

    /// Whether a marker id is in the set.
    pub fn contains(&self, id: MarkerId) -> bool {
        self.inner.read().iter().any(|m| m.id == id)
    }

    /// Number of active markers.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

impl std::fmt::Debug for MarkerSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarkerSet").field("len", &self.len()).finish()
    }
}
