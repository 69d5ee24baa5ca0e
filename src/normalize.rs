//! Day normalization: every calendar day in a log covers exactly
//! 00:00:00 to 24:00:00 with no gaps and no overlaps.

use std::collections::BTreeMap;

use jiff::civil::Date;
use tracing::debug;

use crate::model::{DutyStatus, LogEntry, SECONDS_PER_DAY, time_of_secs};

const LEADING_FILLER_REMARKS: &str = "Home terminal time base";

/// Normalize every day present in `entries`, returning days in date order.
///
/// Malformed entries (start not before end) are discarded.
pub fn normalize(entries: &[LogEntry]) -> Vec<LogEntry> {
    let mut days: BTreeMap<Date, Vec<LogEntry>> = BTreeMap::new();
    for entry in entries.iter().filter(|e| e.is_well_formed()) {
        days.entry(entry.date).or_default().push(entry.clone());
    }
    days.into_iter()
        .flat_map(|(date, day)| normalize_day(date, day))
        .collect()
}

/// Produce a sorted, contiguous sequence covering all of `date`.
///
/// Touching or overlapping rest entries of the same status are merged.
/// Any other overlap is resolved in favor of the earlier entry: the
/// later one is trimmed to start where the earlier ends, or dropped if
/// fully covered. Gaps are filled with Off-Duty.
pub fn normalize_day(date: Date, mut entries: Vec<LogEntry>) -> Vec<LogEntry> {
    entries.retain(|e| e.date == date && e.is_well_formed());
    entries.sort_by_key(|e| (e.start_secs(), e.end_secs()));

    let mut merged: Vec<LogEntry> = Vec::with_capacity(entries.len());
    for entry in entries {
        push_merged(&mut merged, entry);
    }

    let mut filled = Vec::with_capacity(merged.len() + 2);
    let mut cursor = 0;
    for entry in merged {
        if entry.start_secs() > cursor {
            let remarks = if cursor == 0 {
                LEADING_FILLER_REMARKS
            } else {
                ""
            };
            filled.push(filler(date, cursor, entry.start_secs(), remarks));
        }
        cursor = entry.end_secs();
        filled.push(entry);
    }
    if cursor < SECONDS_PER_DAY {
        let remarks = if cursor == 0 {
            LEADING_FILLER_REMARKS
        } else {
            ""
        };
        filled.push(filler(date, cursor, SECONDS_PER_DAY, remarks));
    }

    // Fillers may now touch rest of the same kind.
    let mut out: Vec<LogEntry> = Vec::with_capacity(filled.len());
    for entry in filled {
        push_merged(&mut out, entry);
    }
    out
}

fn filler(date: Date, from: i64, to: i64, remarks: &str) -> LogEntry {
    LogEntry::new(
        date,
        DutyStatus::OffDuty,
        time_of_secs(from),
        time_of_secs(to),
        remarks,
    )
}

/// Append `entry` to a sorted run, merging or trimming against the last one.
fn push_merged(out: &mut Vec<LogEntry>, mut entry: LogEntry) {
    let Some(prev) = out.last_mut() else {
        out.push(entry);
        return;
    };

    let touching = entry.start_secs() <= prev.end_secs();
    if touching && entry.status == prev.status && entry.status.is_rest() {
        if entry.end_secs() > prev.end_secs() {
            prev.end_time = entry.end_time;
        }
        join_remarks(&mut prev.remarks, &entry.remarks);
        return;
    }

    if entry.start_secs() < prev.end_secs() {
        if entry.end_secs() <= prev.end_secs() {
            debug!(date = %entry.date, start = %entry.start_time, "dropping covered entry");
            return;
        }
        let kept = entry.end_secs() - prev.end_secs();
        entry.miles *= kept as f64 / entry.duration_secs() as f64;
        entry.start_time = prev.end_time;
        debug!(date = %entry.date, start = %entry.start_time, "trimmed overlapping entry");
    }
    out.push(entry);
}

fn join_remarks(into: &mut String, more: &str) {
    if more.is_empty() || into.contains(more) {
        return;
    }
    if into.is_empty() {
        into.push_str(more);
    } else {
        into.push_str(" / ");
        into.push_str(more);
    }
}
