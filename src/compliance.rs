//! Post-hoc audit of any log, simulated or edited by hand.
//!
//! The auditor never looks at the scheduler's clocks. It normalizes the
//! entries it is given, recomputes totals from them and walks the whole
//! timeline again, so it can check logs that never went near the
//! scheduler.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use jiff::civil::{Date, DateTime};
use serde::{Deserialize, Serialize};

use crate::model::{DailyTotals, DutyStatus, LogEntry, LogLine, daily_totals};
use crate::normalize::normalize;
use crate::rules;

/// Which optional checks the auditor runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RuleSet {
    /// Report driving past 8 hours without a 30-minute break.
    pub flag_missing_break: bool,
}

/// A rule broken somewhere in a log.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Violation {
    #[serde(rename = "Exceeded 11-hour driving limit")]
    DrivingLimit,

    #[serde(rename = "Exceeded 14-hour on-duty window")]
    DutyWindow,

    #[serde(rename = "Missing 30-minute break after 8 hours driving")]
    MissingBreak,
}

impl Violation {
    pub fn message(self) -> &'static str {
        match self {
            Self::DrivingLimit => "Exceeded 11-hour driving limit",
            Self::DutyWindow => "Exceeded 14-hour on-duty window",
            Self::MissingBreak => "Missing 30-minute break after 8 hours driving",
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// The result of auditing a log.
#[derive(Debug, Clone, PartialEq)]
pub struct Audit {
    /// Normalized entries, each day closed by a `Total` line.
    pub lines: Vec<LogLine>,
    pub daily_totals: BTreeMap<Date, DailyTotals>,
    /// Distinct violations, in a fixed order.
    pub violations: Vec<Violation>,
}

impl Audit {
    pub fn is_compliant(&self) -> bool {
        self.violations.is_empty()
    }

    /// The normalized entries without the `Total` lines.
    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.lines.iter().filter_map(LogLine::as_entry)
    }
}

/// Audit `entries` against the hours-of-service rules.
///
/// Never fails: empty input gives an empty, compliant audit.
pub fn audit(entries: &[LogEntry], rule_set: RuleSet) -> Audit {
    let normalized = normalize(entries);
    let daily_totals = daily_totals(&normalized);
    let violations = find_violations(&normalized, rule_set);

    let mut lines = Vec::with_capacity(normalized.len() + daily_totals.len());
    let mut entries = normalized.into_iter().peekable();
    for (date, totals) in &daily_totals {
        while let Some(entry) = entries.next_if(|e| e.date == *date) {
            lines.push(LogLine::Entry(entry));
        }
        lines.push(LogLine::Total {
            date: *date,
            remarks: totals.remarks(),
            totals: totals.clone(),
        });
    }

    Audit {
        lines,
        daily_totals,
        violations,
    }
}

/// Tracks one driver's limits while walking a timeline forward.
#[derive(Debug, Default)]
struct Walk {
    /// Driving since the last 10-hour rest.
    driving_since_reset: i64,
    /// Driving since the last 30-minute break.
    driving_since_break: i64,
    /// Start of the first duty after the last 10-hour rest.
    anchor: Option<DateTime>,
    /// Length of the rest run in progress, across midnight and gaps.
    rest_run: i64,
    last_end: Option<DateTime>,
}

impl Walk {
    /// Extend the rest run in progress.
    ///
    /// Any run of 30 minutes clears the break counter, however little
    /// driving came before it. The scheduler breaks ahead of the 8-hour
    /// mark, so a break taken early must count here too.
    fn rest(&mut self, minutes: i64) {
        self.rest_run += minutes;
        if rules::is_reset_rest(self.rest_run) {
            self.driving_since_reset = 0;
            self.driving_since_break = 0;
            self.anchor = None;
        } else if rules::satisfies_break(self.rest_run) {
            self.driving_since_break = 0;
        }
    }

    /// Account one entry.
    ///
    /// Only driving and on-duty entries are measured against the 14-hour
    /// window. Rest past the window's end is not a violation; the next
    /// duty after it is.
    fn step(&mut self, entry: &LogEntry, rule_set: RuleSet, found: &mut BTreeSet<Violation>) {
        let start = entry.starts_at();
        let end = entry.ends_at();

        // Unlogged time between entries counts as rest.
        if let Some(last_end) = self.last_end {
            if start > last_end {
                self.rest(start.duration_since(last_end).as_mins());
            }
        }
        self.last_end = Some(self.last_end.map_or(end, |last| last.max(end)));

        if entry.status.is_rest() {
            self.rest(entry.minutes());
            return;
        }

        self.rest_run = 0;
        let anchor = *self.anchor.get_or_insert(start);

        if entry.status == DutyStatus::Driving {
            let minutes = entry.minutes();
            self.driving_since_reset += minutes;
            self.driving_since_break += minutes;
            if rules::exceeds_driving_limit(self.driving_since_reset) {
                found.insert(Violation::DrivingLimit);
            }
            if rule_set.flag_missing_break && rules::missed_break(self.driving_since_break) {
                found.insert(Violation::MissingBreak);
            }
        }

        if rules::exceeds_duty_window(end.duration_since(anchor).as_mins()) {
            found.insert(Violation::DutyWindow);
            self.anchor = None;
        }
    }
}

/// Walk a normalized, time-ordered sequence and collect every rule broken.
pub fn find_violations(entries: &[LogEntry], rule_set: RuleSet) -> Vec<Violation> {
    let mut found = BTreeSet::new();
    let mut walk = Walk::default();
    for entry in entries {
        walk.step(entry, rule_set, &mut found);
    }
    found.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::civil::{Time, date, time};

    use crate::model::END_OF_DAY;

    fn on(d: Date, status: DutyStatus, start: Time, end: Time) -> LogEntry {
        LogEntry::new(d, status, start, end, "")
    }

    fn day1() -> Date {
        date(2026, 3, 2)
    }

    fn day2() -> Date {
        date(2026, 3, 3)
    }

    #[test]
    fn empty_log_is_compliant() {
        let audit = audit(&[], RuleSet::default());
        assert!(audit.lines.is_empty());
        assert!(audit.daily_totals.is_empty());
        assert!(audit.is_compliant());
    }

    #[test]
    fn eleven_hours_of_driving_is_fine() {
        let entries = [on(day1(), DutyStatus::Driving, time(6, 0, 0, 0), time(17, 0, 0, 0))];
        assert!(audit(&entries, RuleSet::default()).is_compliant());
    }

    #[test]
    fn driving_past_eleven_hours_is_flagged() {
        let entries = [on(day1(), DutyStatus::Driving, time(6, 0, 0, 0), time(17, 1, 0, 0))];
        let audit = audit(&entries, RuleSet::default());
        assert_eq!(audit.violations, vec![Violation::DrivingLimit]);
        assert!(!audit.is_compliant());
    }

    #[test]
    fn driving_limit_spans_midnight() {
        let entries = [
            on(day1(), DutyStatus::Driving, time(18, 0, 0, 0), END_OF_DAY),
            on(day2(), DutyStatus::Driving, time(0, 0, 0, 0), time(6, 0, 0, 0)),
        ];
        let violations = audit(&entries, RuleSet::default()).violations;
        assert!(violations.contains(&Violation::DrivingLimit));
    }

    #[test]
    fn ten_hour_rest_across_midnight_resets() {
        let entries = [
            on(day1(), DutyStatus::Driving, time(9, 0, 0, 0), time(19, 0, 0, 0)),
            // Off duty 19:00 to 05:00 the next day, filled in by normalization.
            on(day2(), DutyStatus::Driving, time(5, 0, 0, 0), time(15, 0, 0, 0)),
        ];
        assert!(audit(&entries, RuleSet::default()).is_compliant());
    }

    #[test]
    fn short_rest_does_not_reset() {
        let entries = [
            on(day1(), DutyStatus::Driving, time(4, 0, 0, 0), time(10, 0, 0, 0)),
            on(day1(), DutyStatus::Driving, time(11, 0, 0, 0), time(19, 0, 0, 0)),
        ];
        let violations = audit(&entries, RuleSet::default()).violations;
        assert_eq!(violations, vec![Violation::DrivingLimit, Violation::DutyWindow]);
    }

    #[test]
    fn duty_past_fourteen_hours_is_flagged() {
        let entries = [
            on(day1(), DutyStatus::OnDuty, time(5, 0, 0, 0), time(6, 0, 0, 0)),
            on(day1(), DutyStatus::Driving, time(6, 0, 0, 0), time(10, 0, 0, 0)),
            on(day1(), DutyStatus::OnDuty, time(18, 30, 0, 0), time(19, 30, 0, 0)),
        ];
        let violations = audit(&entries, RuleSet::default()).violations;
        assert_eq!(violations, vec![Violation::DutyWindow]);
    }

    #[test]
    fn window_anchor_is_first_duty_after_rest() {
        let entries = [
            on(day1(), DutyStatus::OnDuty, time(10, 0, 0, 0), time(11, 0, 0, 0)),
            on(day1(), DutyStatus::OnDuty, time(23, 0, 0, 0), END_OF_DAY),
        ];
        assert!(audit(&entries, RuleSet::default()).is_compliant());
    }

    #[test]
    fn missing_break_flag_is_optional() {
        let entries = [on(day1(), DutyStatus::Driving, time(6, 0, 0, 0), time(15, 0, 0, 0))];
        assert!(audit(&entries, RuleSet::default()).is_compliant());

        let strict = RuleSet {
            flag_missing_break: true,
        };
        assert_eq!(audit(&entries, strict).violations, vec![Violation::MissingBreak]);
    }

    #[test]
    fn thirty_minute_break_clears_break_counter() {
        let entries = [
            on(day1(), DutyStatus::Driving, time(6, 0, 0, 0), time(13, 0, 0, 0)),
            on(day1(), DutyStatus::OffDuty, time(13, 0, 0, 0), time(13, 30, 0, 0)),
            on(day1(), DutyStatus::Driving, time(13, 30, 0, 0), time(16, 0, 0, 0)),
        ];
        let strict = RuleSet {
            flag_missing_break: true,
        };
        assert!(audit(&entries, strict).is_compliant());
    }

    #[test]
    fn early_break_clears_break_counter() {
        let entries = [
            on(day1(), DutyStatus::Driving, time(6, 0, 0, 0), time(12, 0, 0, 0)),
            on(day1(), DutyStatus::OffDuty, time(12, 0, 0, 0), time(12, 30, 0, 0)),
            on(day1(), DutyStatus::Driving, time(12, 30, 0, 0), time(15, 30, 0, 0)),
        ];
        let strict = RuleSet {
            flag_missing_break: true,
        };
        assert!(audit(&entries, strict).is_compliant());
    }

    #[test]
    fn rest_past_the_window_is_not_flagged() {
        // Duty ends 13 hours in; the off-duty that follows runs far past 14.
        let entries = [
            on(day1(), DutyStatus::OnDuty, time(6, 0, 0, 0), time(7, 0, 0, 0)),
            on(day1(), DutyStatus::Driving, time(7, 0, 0, 0), time(17, 0, 0, 0)),
            on(day1(), DutyStatus::OnDuty, time(17, 0, 0, 0), time(19, 0, 0, 0)),
            on(day1(), DutyStatus::OffDuty, time(19, 0, 0, 0), time(23, 0, 0, 0)),
        ];
        assert!(audit(&entries, RuleSet::default()).is_compliant());
    }

    #[test]
    fn lines_close_each_day_with_a_total() {
        let entries = [
            on(day1(), DutyStatus::Driving, time(6, 0, 0, 0), time(8, 0, 0, 0)),
            on(day2(), DutyStatus::OnDuty, time(6, 0, 0, 0), time(7, 0, 0, 0)),
        ];
        let audit = audit(&entries, RuleSet::default());

        let labels: Vec<_> = audit.lines.iter().map(LogLine::status_label).collect();
        assert_eq!(
            labels,
            vec![
                "Off-Duty", "Driving", "Off-Duty", "Total", "Off-Duty", "On-Duty", "Off-Duty",
                "Total",
            ]
        );
        let LogLine::Total { totals, remarks, .. } = &audit.lines[3] else {
            panic!("expected a total line");
        };
        assert!((totals.sum24 - 24.0).abs() < 1e-9);
        assert!(remarks.starts_with("Daily Total - Lines 3+4: 2"));
    }

    #[test]
    fn auditing_twice_is_stable() {
        let entries = [
            on(day1(), DutyStatus::Driving, time(4, 0, 0, 0), time(16, 0, 0, 0)),
            on(day2(), DutyStatus::OnDuty, time(1, 0, 0, 0), time(2, 0, 0, 0)),
        ];
        let first = audit(&entries, RuleSet::default());
        let again: Vec<LogEntry> = first.entries().cloned().collect();
        let second = audit(&again, RuleSet::default());

        assert_eq!(first, second);
    }

    #[test]
    fn violations_serialize_as_messages() {
        let json = serde_json::to_string(&vec![Violation::DrivingLimit]).unwrap();
        assert_eq!(json, r#"["Exceeded 11-hour driving limit"]"#);
    }
}
