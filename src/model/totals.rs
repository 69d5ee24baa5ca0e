//! Per-day totals, recomputed from log entries.

use std::collections::BTreeMap;

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use super::{DutyStatus, LogEntry};

/// Hours spent in each status on one calendar day.
///
/// Always derived from entries via [`daily_totals`]; never edited in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyTotals {
    pub off_duty: f64,
    pub sleeper_berth: f64,
    pub driving: f64,
    pub on_duty: f64,
    /// Driving plus on-duty (not driving): the figure carried on lines 3 and 4.
    pub lines_3_4_total: f64,
    /// All four buckets together; 24.0 for a fully normalized day.
    pub sum24: f64,
    pub miles: f64,
}

impl DailyTotals {
    /// Hours recorded against one status.
    pub fn hours(&self, status: DutyStatus) -> f64 {
        match status {
            DutyStatus::OffDuty => self.off_duty,
            DutyStatus::SleeperBerth => self.sleeper_berth,
            DutyStatus::Driving => self.driving,
            DutyStatus::OnDuty => self.on_duty,
        }
    }

    /// The remark printed on a day's `Total` row.
    pub fn remarks(&self) -> String {
        format!(
            "Daily Total - Lines 3+4: {} hrs (Driving: {} hrs, On-Duty Not Driving: {} hrs), \
             Off-Duty: {} hrs, Sleeper Berth: {} hrs",
            self.lines_3_4_total, self.driving, self.on_duty, self.off_duty, self.sleeper_berth
        )
    }
}

#[derive(Default)]
struct SecondTally {
    secs: [i64; 4],
    miles: f64,
}

/// Sum entries into per-day totals, second by second.
///
/// Each bucket is converted to hours and rounded to two decimals once,
/// after every entry of the day has been added.
pub fn daily_totals(entries: &[LogEntry]) -> BTreeMap<Date, DailyTotals> {
    let mut tallies: BTreeMap<Date, SecondTally> = BTreeMap::new();
    for entry in entries.iter().filter(|e| e.is_well_formed()) {
        let tally = tallies.entry(entry.date).or_default();
        tally.secs[entry.status.row()] += entry.duration_secs();
        tally.miles += entry.miles;
    }

    tallies
        .into_iter()
        .map(|(date, tally)| {
            let [off, sleeper, driving, on_duty] = tally.secs;
            let totals = DailyTotals {
                off_duty: round_secs(off),
                sleeper_berth: round_secs(sleeper),
                driving: round_secs(driving),
                on_duty: round_secs(on_duty),
                lines_3_4_total: round_secs(driving + on_duty),
                sum24: round_secs(off + sleeper + driving + on_duty),
                miles: (tally.miles * 100.0).round() / 100.0,
            };
            (date, totals)
        })
        .collect()
}

/// Minutes to hours, rounded to two decimals.
pub fn round_hours(minutes: i64) -> f64 {
    (minutes as f64 / 60.0 * 100.0).round() / 100.0
}

fn round_secs(secs: i64) -> f64 {
    (secs as f64 / 3600.0 * 100.0).round() / 100.0
}
