//! SQLite-backed marker storage.

use std::path::Path;

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use super::{MarkerStore, StoreError};
use crate::geo::Coordinate;
use crate::marker::{Marker, MarkerId, MarkerPhoto, PhotoId};

/// Durable marker store over a SQLite database file.
///
/// The schema is created on open if missing. Photos reference their marker
/// with `ON DELETE CASCADE`, so deleting a marker removes its photos in the
/// same statement.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (and migrate) the database at the given path.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the file cannot be opened or the schema
    /// cannot be created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path.as_ref())?;
        let store = Self::from_connection(conn)?;
        info!(path = %path.as_ref().display(), "Marker database opened");
        Ok(store)
    }

    /// Open an in-memory database (tests and previews).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS markers (
                id        INTEGER PRIMARY KEY AUTOINCREMENT,
                latitude  REAL NOT NULL,
                longitude REAL NOT NULL,
                title     TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS marker_photos (
                id        INTEGER PRIMARY KEY AUTOINCREMENT,
                marker_id INTEGER NOT NULL REFERENCES markers(id) ON DELETE CASCADE,
                uri       TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_marker_photos_marker_id
                ON marker_photos(marker_id);",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl MarkerStore for SqliteStore {
    fn list_markers(&self) -> Result<Vec<Marker>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt =
            conn.prepare("SELECT id, latitude, longitude, title FROM markers ORDER BY id")?;
        let markers = stmt
            .query_map([], |row| {
                Ok(Marker {
                    id: MarkerId(row.get(0)?),
                    latitude: row.get(1)?,
                    longitude: row.get(2)?,
                    title: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(markers)
    }

    fn get_marker(&self, id: MarkerId) -> Result<Marker, StoreError> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT id, latitude, longitude, title FROM markers WHERE id = ?1",
            params![id.0],
            |row| {
                Ok(Marker {
                    id: MarkerId(row.get(0)?),
                    latitude: row.get(1)?,
                    longitude: row.get(2)?,
                    title: row.get(3)?,
                })
            },
        )
        .optional()?
        .ok_or(StoreError::MarkerNotFound(id))
    }

    fn add_marker(
        &self,
        latitude: f64,
        longitude: f64,
        title: &str,
    ) -> Result<MarkerId, StoreError> {
        // Validate before writing so the table never holds junk coordinates.
        Coordinate::new(latitude, longitude)?;

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO markers (latitude, longitude, title) VALUES (?1, ?2, ?3)",
            params![latitude, longitude, title],
        )?;
        let id = MarkerId(conn.last_insert_rowid());
        debug!(marker = %id, title, "Marker added");
        Ok(id)
    }

    fn delete_marker(&self, id: MarkerId) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        let affected = conn.execute("DELETE FROM markers WHERE id = ?1", params![id.0])?;
        if affected == 0 {
            return Err(StoreError::MarkerNotFound(id));
        }
        debug!(marker = %id, "Marker deleted");
        Ok(())
    }

    fn delete_all_markers(&self) -> Result<Vec<MarkerId>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT id FROM markers ORDER BY id")?;
        let ids = stmt
            .query_map([], |row| Ok(MarkerId(row.get(0)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        drop(stmt);

        conn.execute("DELETE FROM markers", [])?;
        info!(count = ids.len(), "All markers deleted");
        Ok(ids)
    }

    fn add_photo(&self, marker_id: MarkerId, uri: &str) -> Result<PhotoId, StoreError> {
        let conn = self.conn.lock();

        // Check the marker exists first: with foreign keys enforced the
        // insert would fail anyway, but this maps to a clearer error.
        let exists: Option<i64> = conn
            .query_row(
                "SELECT id FROM markers WHERE id = ?1",
                params![marker_id.0],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_none() {
            return Err(StoreError::MarkerNotFound(marker_id));
        }

        conn.execute(
            "INSERT INTO marker_photos (marker_id, uri) VALUES (?1, ?2)",
            params![marker_id.0, uri],
        )?;
        let id = PhotoId(conn.last_insert_rowid());
        debug!(marker = %marker_id, photo = %id, "Photo attached");
        Ok(id)
    }

    fn list_photos(&self, marker_id: MarkerId) -> Result<Vec<MarkerPhoto>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare("SELECT id, marker_id, uri FROM marker_photos WHERE marker_id = ?1 ORDER BY id")?;
        let photos = stmt
            .query_map(params![marker_id.0], |row| {
                Ok(MarkerPhoto {
                    id: PhotoId(row.get(0)?),
                    marker_id: MarkerId(row.get(1)?),
                    uri: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(photos)
    }

    fn delete_photo(&self, id: PhotoId) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        let affected = conn.execute("DELETE FROM marker_photos WHERE id = ?1", params![id.0])?;
        if affected == 0 {
            return Err(StoreError::PhotoNotFound(id));
        }
        Ok(())
    }
}
