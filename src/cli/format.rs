//! Output formatting for CLI display.

use std::collections::BTreeMap;
use std::fmt::Write;

use jiff::civil::Date;
use serde::Serialize;

use crate::compliance::Violation;
use crate::grid::day_strip;
use crate::model::{DailyTotals, DutyStatus, LogEntry, LogLine};

/// An audited log as printed by `--json`.
#[derive(Serialize)]
pub(super) struct AuditDocument<'a> {
    pub lines: &'a [LogLine],
    pub daily_totals: &'a BTreeMap<Date, DailyTotals>,
    pub hos_compliant: bool,
    pub violations: &'a [Violation],
}

/// Format a log day by day: grid, entries, totals, then the verdict.
pub(super) fn format_log(lines: &[LogLine], violations: &[Violation]) -> String {
    let mut out = String::new();
    let mut day: Vec<LogEntry> = Vec::new();

    for line in lines {
        match line {
            LogLine::Entry(entry) => day.push(entry.clone()),
            LogLine::Total {
                date,
                totals,
                remarks,
            } => {
                let _ = writeln!(out, "── {date} ──");
                out.push_str(&format_grid(&day, totals));
                for entry in &day {
                    out.push_str(&format_entry(entry));
                }
                let _ = writeln!(out, "  {remarks}");
                if totals.miles > 0.0 {
                    let _ = writeln!(out, "  Miles: {:.1}", totals.miles);
                }
                out.push('\n');
                day.clear();
            }
        }
    }

    out.push_str(&format_verdict(violations));
    out
}

fn format_entry(entry: &LogEntry) -> String {
    let mut line = format!(
        "  {}–{}  {:<13} {:>5.2}h",
        entry.start_time,
        entry.end_time,
        entry.status.label(),
        entry.minutes() as f64 / 60.0,
    );
    if entry.miles > 0.0 {
        let _ = write!(line, "  {:>6.1} mi", entry.miles);
    }
    if !entry.remarks.is_empty() {
        let _ = write!(line, "  {}", entry.remarks);
    }
    line.push('\n');
    line
}

/// Render one day's entries on the four-row, 96-slot grid, each row
/// closed by its hours for the day.
pub(super) fn format_grid(entries: &[LogEntry], totals: &DailyTotals) -> String {
    let strip = day_strip(entries);

    let mut out = String::from("                 ");
    for hour in 0..24 {
        let _ = write!(out, "{hour:<4}");
    }
    out.push('\n');

    for status in DutyStatus::ALL {
        let row: String = strip
            .iter()
            .map(|cell| if *cell == Some(status) { '█' } else { '·' })
            .collect();
        let _ = writeln!(
            out,
            "  {:<14} {row} {:>5.2}",
            status.label(),
            totals.hours(status)
        );
    }
    out
}

pub(super) fn format_verdict(violations: &[Violation]) -> String {
    if violations.is_empty() {
        return "HOS compliant\n".to_string();
    }
    let mut out = String::from("HOS violations:\n");
    for v in violations {
        let _ = writeln!(out, "  - {v}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::civil::{date, time};

    use crate::compliance::{RuleSet, audit};
    use crate::model::END_OF_DAY;

    fn sample_entries() -> Vec<LogEntry> {
        let day = date(2026, 3, 2);
        vec![
            LogEntry::new(day, DutyStatus::OffDuty, time(0, 0, 0, 0), time(6, 0, 0, 0), ""),
            LogEntry::new(
                day,
                DutyStatus::Driving,
                time(6, 0, 0, 0),
                time(7, 0, 0, 0),
                "Drive to Chicago, IL",
            )
            .with_miles(60.0),
            LogEntry::new(day, DutyStatus::OffDuty, time(7, 0, 0, 0), END_OF_DAY, ""),
        ]
    }

    #[test]
    fn grid_marks_one_row_per_slot() {
        let entries = sample_entries();
        let totals = crate::model::daily_totals(&entries);
        let grid = format_grid(&entries, &totals[&date(2026, 3, 2)]);

        let rows: Vec<&str> = grid.lines().skip(1).collect();
        assert_eq!(rows.len(), 4);
        let driving = rows[2];
        assert!(driving.contains("Driving"));
        assert_eq!(driving.matches('█').count(), 4);
        assert_eq!(rows[0].matches('█').count(), 92);
        assert_eq!(rows[1].matches('█').count(), 0);
        assert!(rows[0].ends_with("23.00"), "{}", rows[0]);
        assert!(driving.ends_with(" 1.00"), "{driving}");
    }

    #[test]
    fn log_prints_entries_totals_and_verdict() {
        let audit = audit(&sample_entries(), RuleSet::default());
        let out = format_log(&audit.lines, &audit.violations);

        assert!(out.contains("── 2026-03-02 ──"));
        assert!(out.contains("Drive to Chicago, IL"));
        assert!(out.contains("60.0 mi"));
        assert!(out.contains("Daily Total - Lines 3+4: 1 hrs"));
        assert!(out.ends_with("HOS compliant\n"));
    }

    #[test]
    fn verdict_lists_violations() {
        let out = format_verdict(&[Violation::DrivingLimit, Violation::DutyWindow]);
        assert_eq!(
            out,
            "HOS violations:\n  - Exceeded 11-hour driving limit\n  - Exceeded 14-hour on-duty window\n"
        );
    }
}
