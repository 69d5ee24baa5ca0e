//! Trip storage: create, load, and list trips.

use std::{fs, io};

use jiff::Timestamp;
use jiff::civil::Date;
use rusqlite::Connection;
use tracing::{debug, info};
use uuid::Uuid;

use crate::model::{LogLine, Trip};

use super::entries::insert_entries;
use super::{Result, Storage, StorageError};

impl Storage {
    /// Creates a new trip, writing its record to a new `SQLite` file.
    pub fn create_trip(&self, trip: &Trip) -> Result<()> {
        let conn = self.create_db(trip.id)?;
        insert_trip(&conn, trip)?;
        info!(id = %trip.id, "trip saved");
        Ok(())
    }

    /// Creates a new trip together with its log.
    ///
    /// The trip row and the entries are written in one transaction. On
    /// failure the new file is removed, so no trip is left without its
    /// log. Returns the number of entries written.
    pub fn create_trip_with_log(&self, trip: &Trip, lines: &[LogLine]) -> Result<usize> {
        let mut conn = self.create_db(trip.id)?;
        match insert_trip_with_log(&mut conn, trip, lines) {
            Ok(written) => {
                info!(id = %trip.id, written, "trip saved");
                Ok(written)
            }
            Err(e) => {
                drop(conn);
                if let Err(rm) = fs::remove_file(self.trip_path(trip.id)) {
                    debug!(id = %trip.id, error = %rm, "failed to remove unsaved trip");
                }
                Err(e)
            }
        }
    }

    /// Loads a single trip's record.
    pub fn load_trip(&self, id: Uuid) -> Result<Trip> {
        let conn = self.open_db(id)?;
        load_trip_row(&conn)
    }

    /// Lists all trips by reading each `.sqlite` file in the storage root,
    /// oldest first.
    ///
    /// Unreadable or malformed files are skipped.
    pub fn list_trips(&self) -> Result<Vec<Trip>> {
        let mut trips = Vec::new();
        let entries = match fs::read_dir(&self.root) {
            Ok(e) => e,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(trips),
            Err(e) => return Err(e.into()),
        };
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("sqlite") {
                continue;
            }
            let Ok(conn) = Connection::open(&path) else {
                continue;
            };
            match load_trip_row(&conn) {
                Ok(t) => trips.push(t),
                Err(e) => debug!(path = %path.display(), error = %e, "skipping unreadable trip"),
            }
        }
        trips.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(trips)
    }
}

/// Writes the trip row.
fn insert_trip(conn: &Connection, trip: &Trip) -> Result<()> {
    conn.execute(
        "INSERT INTO trip (id, current_location, pickup_location, dropoff_location,
                           current_cycle_hours, use_sleeper_berth, start_date,
                           total_miles, violations, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        rusqlite::params![
            trip.id.to_string(),
            &trip.current_location,
            &trip.pickup_location,
            &trip.dropoff_location,
            trip.current_cycle_hours,
            trip.use_sleeper_berth,
            trip.start_date.to_string(),
            trip.total_miles,
            serde_json::to_string(&trip.violations)?,
            trip.created_at.to_string(),
        ],
    )?;
    Ok(())
}

/// Writes the trip row and its log in one transaction.
fn insert_trip_with_log(conn: &mut Connection, trip: &Trip, lines: &[LogLine]) -> Result<usize> {
    let tx = conn.transaction()?;
    insert_trip(&tx, trip)?;
    let written = insert_entries(&tx, lines)?;
    tx.commit()?;
    Ok(written)
}

/// Reads the single trip row from an open connection.
fn load_trip_row(conn: &Connection) -> Result<Trip> {
    let row = conn.query_row(
        "SELECT id, current_location, pickup_location, dropoff_location,
                current_cycle_hours, use_sleeper_berth, start_date,
                total_miles, violations, created_at
         FROM trip LIMIT 1",
        [],
        |row| {
            Ok(TripRow {
                id: row.get(0)?,
                current_location: row.get(1)?,
                pickup_location: row.get(2)?,
                dropoff_location: row.get(3)?,
                current_cycle_hours: row.get(4)?,
                use_sleeper_berth: row.get(5)?,
                start_date: row.get(6)?,
                total_miles: row.get(7)?,
                violations: row.get(8)?,
                created_at: row.get(9)?,
            })
        },
    )?;

    let id = row
        .id
        .parse::<Uuid>()
        .map_err(|e| StorageError::Corrupt(format!("invalid trip id: {e}")))?;
    let start_date = row
        .start_date
        .parse::<Date>()
        .map_err(|e| StorageError::Corrupt(format!("invalid start_date: {e}")))?;
    let created_at = row
        .created_at
        .parse::<Timestamp>()
        .map_err(|e| StorageError::Corrupt(format!("invalid created_at: {e}")))?;

    Ok(Trip {
        id,
        current_location: row.current_location,
        pickup_location: row.pickup_location,
        dropoff_location: row.dropoff_location,
        current_cycle_hours: row.current_cycle_hours,
        use_sleeper_berth: row.use_sleeper_berth,
        start_date,
        total_miles: row.total_miles,
        violations: serde_json::from_str(&row.violations)?,
        created_at,
    })
}

/// Raw column values of the trip table.
struct TripRow {
    id: String,
    current_location: String,
    pickup_location: String,
    dropoff_location: String,
    current_cycle_hours: f64,
    use_sleeper_berth: bool,
    start_date: String,
    total_miles: f64,
    violations: String,
    created_at: String,
}
