//! Local persistence for planned trips.
//!
//! Each trip lives in its own `SQLite` file under the storage root:
//!
//! ```text
//! <root>/<uuid>.sqlite
//!   trip         # One row: inputs, summary and creation time
//!   log_entry    # Normalized log entries with grid slots, in order
//! ```

mod entries;
mod trip;

use std::{fs, io, path::PathBuf};

use rusqlite::Connection;
use uuid::Uuid;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("trip not found: {0}")]
    TripNotFound(Uuid),

    #[error("trip already exists: {0}")]
    TripAlreadyExists(Uuid),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("corrupt record: {0}")]
    Corrupt(String),
}

pub type Result<T> = core::result::Result<T, StorageError>;

const SCHEMA: &str = "
    CREATE TABLE trip (
        id                  TEXT PRIMARY KEY,
        current_location    TEXT NOT NULL,
        pickup_location     TEXT NOT NULL,
        dropoff_location    TEXT NOT NULL,
        current_cycle_hours REAL NOT NULL,
        use_sleeper_berth   INTEGER NOT NULL,
        start_date          TEXT NOT NULL,
        total_miles         REAL NOT NULL,
        violations          TEXT NOT NULL,
        created_at          TEXT NOT NULL
    );
    CREATE TABLE log_entry (
        seq         INTEGER PRIMARY KEY,
        date        TEXT NOT NULL,
        status      TEXT NOT NULL,
        start_time  TEXT NOT NULL,
        end_time    TEXT NOT NULL,
        remarks     TEXT NOT NULL,
        miles       REAL NOT NULL,
        start_slot  INTEGER NOT NULL,
        end_slot    INTEGER NOT NULL
    );
";

/// Local file-based storage for trips and their logs.
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    /// Creates a new storage instance rooted at the given directory.
    ///
    /// The directory is created if it doesn't exist.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Creates the database file for a new trip and lays down the schema.
    fn create_db(&self, id: Uuid) -> Result<Connection> {
        let path = self.trip_path(id);
        if path.exists() {
            return Err(StorageError::TripAlreadyExists(id));
        }
        let conn = Connection::open(&path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(conn)
    }

    /// Opens an existing trip's database without creating it.
    fn open_db(&self, id: Uuid) -> Result<Connection> {
        let path = self.trip_path(id);
        if !path.exists() {
            return Err(StorageError::TripNotFound(id));
        }
        Ok(Connection::open(&path)?)
    }

    fn trip_path(&self, id: Uuid) -> PathBuf {
        self.root.join(format!("{id}.sqlite"))
    }
}
