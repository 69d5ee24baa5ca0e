//! Core data model for hoslog.
//!
//! These types describe a driver's log: duty statuses, the intervals
//! recorded against them, and the per-day totals derived from those
//! intervals.

mod entry;
mod status;
mod totals;
mod trip;

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

pub use entry::{END_OF_DAY, LogEntry, SECONDS_PER_DAY, seconds_of_day, time_of_secs};
pub use status::{DutyStatus, ParseStatusError};
pub use totals::{DailyTotals, daily_totals, round_hours};
pub use trip::Trip;

/// One line of a finished log: a real interval or a synthetic daily total.
///
/// Tagged so each line is self-describing when written out as JSON and
/// read back by the audit command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LogLine {
    /// A recorded duty-status interval.
    Entry(LogEntry),

    /// The `Total` row closing out a day.
    Total {
        date: Date,
        totals: DailyTotals,
        remarks: String,
    },
}

impl LogLine {
    /// The calendar date this line belongs to.
    pub fn date(&self) -> Date {
        match self {
            Self::Entry(e) => e.date,
            Self::Total { date, .. } => *date,
        }
    }

    /// The interval, if this line is a real entry.
    pub fn as_entry(&self) -> Option<&LogEntry> {
        match self {
            Self::Entry(e) => Some(e),
            Self::Total { .. } => None,
        }
    }

    /// Display label for the line's status column.
    pub fn status_label(&self) -> &'static str {
        match self {
            Self::Entry(e) => e.status.label(),
            Self::Total { .. } => "Total",
        }
    }
}

/// Collect the real entries out of a sequence of log lines.
pub fn entries_of(lines: &[LogLine]) -> Vec<LogEntry> {
    lines.iter().filter_map(LogLine::as_entry).cloned().collect()
}
