//! Placement of log entries on the 96-slot log-sheet grid.
//!
//! Each slot is 15 minutes; slot 0 starts at midnight and slot 95 at 23:45.

use jiff::civil::{Date, Time};
use serde::{Deserialize, Serialize};

use crate::model::{DutyStatus, LogEntry, LogLine};

pub const SLOTS_PER_DAY: usize = 96;

const SECONDS_PER_SLOT: i64 = 15 * 60;

/// Where one entry sits on its day's grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridPlacement {
    pub date: Date,
    pub start_slot: u8,
    pub end_slot: u8,
    pub status: DutyStatus,
}

/// The slot holding `t`, truncating to the quarter hour.
pub fn slot(t: Time) -> u8 {
    let hour = u8::try_from(t.hour()).unwrap_or(0);
    let minute = u8::try_from(t.minute()).unwrap_or(0);
    hour * 4 + minute / 15
}

pub fn place(entry: &LogEntry) -> GridPlacement {
    GridPlacement {
        date: entry.date,
        start_slot: slot(entry.start_time),
        end_slot: slot(entry.end_time),
        status: entry.status,
    }
}

/// Placements for every real entry; `Total` lines are skipped.
pub fn annotate(lines: &[LogLine]) -> Vec<GridPlacement> {
    lines.iter().filter_map(LogLine::as_entry).map(place).collect()
}

/// The status occupying each slot of one normalized day, judged at the
/// middle of the slot.
pub fn day_strip(entries: &[LogEntry]) -> [Option<DutyStatus>; SLOTS_PER_DAY] {
    let mut strip = [None; SLOTS_PER_DAY];
    let mut midpoint = SECONDS_PER_SLOT / 2;
    for cell in &mut strip {
        *cell = entries
            .iter()
            .find(|e| e.start_secs() <= midpoint && midpoint < e.end_secs())
            .map(|e| e.status);
        midpoint += SECONDS_PER_SLOT;
    }
    strip
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::civil::{date, time};

    use crate::model::END_OF_DAY;

    #[test]
    fn slots_truncate_to_quarter_hours() {
        assert_eq!(slot(time(0, 0, 0, 0)), 0);
        assert_eq!(slot(time(6, 14, 59, 0)), 24);
        assert_eq!(slot(time(6, 15, 0, 0)), 25);
        assert_eq!(slot(END_OF_DAY), 95);
    }

    #[test]
    fn placement_carries_status() {
        let entry = LogEntry::new(
            date(2026, 3, 2),
            DutyStatus::Driving,
            time(12, 30, 0, 0),
            time(13, 30, 0, 0),
            "",
        );
        let p = place(&entry);
        assert_eq!((p.start_slot, p.end_slot), (50, 54));
        assert_eq!(p.status, DutyStatus::Driving);
    }

    #[test]
    fn strip_follows_entries() {
        let day = date(2026, 3, 2);
        let entries = vec![
            LogEntry::new(day, DutyStatus::OffDuty, time(0, 0, 0, 0), time(6, 0, 0, 0), ""),
            LogEntry::new(day, DutyStatus::Driving, time(6, 0, 0, 0), time(7, 0, 0, 0), ""),
            LogEntry::new(day, DutyStatus::OffDuty, time(7, 0, 0, 0), END_OF_DAY, ""),
        ];
        let strip = day_strip(&entries);

        assert_eq!(strip[23], Some(DutyStatus::OffDuty));
        assert_eq!(strip[24], Some(DutyStatus::Driving));
        assert_eq!(strip[27], Some(DutyStatus::Driving));
        assert_eq!(strip[28], Some(DutyStatus::OffDuty));
        assert_eq!(strip[95], Some(DutyStatus::OffDuty));
    }
}
