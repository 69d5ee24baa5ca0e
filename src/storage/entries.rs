//! Log entry storage: the normalized log of a saved trip.

use jiff::civil::{Date, Time};
use rusqlite::Connection;
use tracing::debug;
use uuid::Uuid;

use crate::grid;
use crate::model::{DutyStatus, LogEntry, LogLine};

use super::{Result, Storage, StorageError};

impl Storage {
    /// Replaces a trip's stored log with the real entries in `lines`.
    ///
    /// `Total` lines are derived and are not stored. Returns the number
    /// of entries written.
    pub fn store_entries(&self, trip_id: Uuid, lines: &[LogLine]) -> Result<usize> {
        let mut conn = self.open_db(trip_id)?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM log_entry", [])?;
        let written = insert_entries(&tx, lines)?;
        tx.commit()?;
        debug!(trip = %trip_id, written, "log entries stored");
        Ok(written)
    }

    /// Loads a trip's stored log, in the order it was written.
    pub fn load_entries(&self, trip_id: Uuid) -> Result<Vec<LogEntry>> {
        let conn = self.open_db(trip_id)?;
        let mut stmt = conn.prepare(
            "SELECT date, status, start_time, end_time, remarks, miles
             FROM log_entry ORDER BY seq",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, f64>(5)?,
            ))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (date, status, start, end, remarks, miles) = row?;
            let date = date
                .parse::<Date>()
                .map_err(|e| StorageError::Corrupt(format!("invalid date: {e}")))?;
            let status = status
                .parse::<DutyStatus>()
                .map_err(|e| StorageError::Corrupt(e.to_string()))?;
            let start = parse_time(&start)?;
            let end = parse_time(&end)?;
            entries.push(LogEntry::new(date, status, start, end, remarks).with_miles(miles));
        }
        Ok(entries)
    }
}

/// Appends the real entries in `lines` to the log table.
pub(super) fn insert_entries(conn: &Connection, lines: &[LogLine]) -> Result<usize> {
    let mut stmt = conn.prepare(
        "INSERT INTO log_entry
             (date, status, start_time, end_time, remarks, miles, start_slot, end_slot)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    )?;
    let mut written = 0;
    for entry in lines.iter().filter_map(LogLine::as_entry) {
        let placement = grid::place(entry);
        stmt.execute(rusqlite::params![
            entry.date.to_string(),
            entry.status.label(),
            entry.start_time.to_string(),
            entry.end_time.to_string(),
            &entry.remarks,
            entry.miles,
            placement.start_slot,
            placement.end_slot,
        ])?;
        written += 1;
    }
    Ok(written)
}

fn parse_time(s: &str) -> Result<Time> {
    s.parse::<Time>()
        .map_err(|e| StorageError::Corrupt(format!("invalid time '{s}': {e}")))
}
