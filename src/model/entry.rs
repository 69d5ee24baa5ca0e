//! Log entries: one duty-status interval within one calendar day.

use jiff::SignedDuration;
use jiff::civil::{Date, DateTime, Time, time};
use serde::{Deserialize, Serialize};

use super::DutyStatus;

/// The last second of a day.
///
/// An entry ending here runs through midnight: every duration
/// computation treats it as 24:00:00.
pub const END_OF_DAY: Time = time(23, 59, 59, 0);

/// Seconds in a calendar day.
pub const SECONDS_PER_DAY: i64 = 86_400;

/// A single interval on a driver's log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub date: Date,
    pub status: DutyStatus,
    pub start_time: Time,
    pub end_time: Time,
    #[serde(default)]
    pub remarks: String,
    #[serde(default)]
    pub miles: f64,
}

impl LogEntry {
    pub fn new(
        date: Date,
        status: DutyStatus,
        start_time: Time,
        end_time: Time,
        remarks: impl Into<String>,
    ) -> Self {
        Self {
            date,
            status,
            start_time,
            end_time,
            remarks: remarks.into(),
            miles: 0.0,
        }
    }

    #[must_use]
    pub fn with_miles(mut self, miles: f64) -> Self {
        self.miles = miles;
        self
    }

    /// Start as seconds after midnight.
    pub fn start_secs(&self) -> i64 {
        seconds_of_day(self.start_time)
    }

    /// End as seconds after midnight, with [`END_OF_DAY`] read as 24:00:00.
    pub fn end_secs(&self) -> i64 {
        if self.end_time == END_OF_DAY {
            SECONDS_PER_DAY
        } else {
            seconds_of_day(self.end_time)
        }
    }

    /// Length of the interval in seconds. Zero or negative for malformed entries.
    pub fn duration_secs(&self) -> i64 {
        self.end_secs() - self.start_secs()
    }

    /// Length rounded to the nearest whole minute.
    pub fn minutes(&self) -> i64 {
        (self.duration_secs() + 30).div_euclid(60)
    }

    /// Whether `start_time < end_time`.
    pub fn is_well_formed(&self) -> bool {
        self.duration_secs() > 0
    }

    /// Absolute start of the interval.
    pub fn starts_at(&self) -> DateTime {
        self.date.to_datetime(self.start_time)
    }

    /// Absolute end of the interval. An entry running to [`END_OF_DAY`]
    /// ends at the following midnight.
    pub fn ends_at(&self) -> DateTime {
        self.date.to_datetime(Time::midnight()) + SignedDuration::from_secs(self.end_secs())
    }
}

/// Seconds after midnight for a wall-clock time.
pub fn seconds_of_day(t: Time) -> i64 {
    i64::from(t.hour()) * 3600 + i64::from(t.minute()) * 60 + i64::from(t.second())
}

/// Wall-clock time `secs` after midnight. A full day maps to [`END_OF_DAY`].
pub fn time_of_secs(secs: i64) -> Time {
    if secs >= SECONDS_PER_DAY {
        return END_OF_DAY;
    }
    Time::midnight() + SignedDuration::from_secs(secs.max(0))
}
