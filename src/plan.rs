//! Trip planning: from two legs and a starting balance to an audited log.

use std::collections::BTreeMap;

use jiff::civil::{Date, Time, time};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::clock::CycleSeed;
use crate::compliance::{self, RuleSet, Violation};
use crate::grid::{self, GridPlacement};
use crate::model::{DailyTotals, DutyStatus, LogLine, round_hours};
use crate::route::Leg;
use crate::rules::CYCLE_DAYS;
use crate::schedule::{DriveLeg, Scheduler, TripScript};

/// Trip input rejected before any scheduling starts.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum InputError {
    #[error("{field} must be a finite number, got {value}")]
    NotFinite { field: &'static str, value: f64 },

    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f64 },

    #[error("average speed must be positive, got {0}")]
    NonPositiveSpeed(f64),
}

/// Everything known about a trip before it is planned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripInput {
    pub current_location: String,
    pub pickup_location: String,
    pub dropoff_location: String,
    pub to_pickup: Leg,
    pub to_dropoff: Leg,
    /// On-duty hours already used in the current 8-day cycle.
    pub current_cycle_hours: f64,
    /// Exact hours for the prior seven days, oldest first. Overrides
    /// `current_cycle_hours` when present.
    #[serde(default)]
    pub cycle_history: Option<[f64; CYCLE_DAYS - 1]>,
    #[serde(default)]
    pub use_sleeper_berth: bool,
    pub start_date: Date,
}

impl TripInput {
    /// A trip between unnamed places.
    pub fn new(start_date: Date, pickup_miles: f64, dropoff_miles: f64) -> Self {
        Self {
            current_location: "Current location".into(),
            pickup_location: "Pickup".into(),
            dropoff_location: "Dropoff".into(),
            to_pickup: Leg::from_miles(pickup_miles),
            to_dropoff: Leg::from_miles(dropoff_miles),
            current_cycle_hours: 0.0,
            cycle_history: None,
            use_sleeper_berth: false,
            start_date,
        }
    }

    pub fn validate(&self) -> Result<(), InputError> {
        check("distance to pickup", self.to_pickup.miles)?;
        check("distance to dropoff", self.to_dropoff.miles)?;
        check_minutes("duration to pickup", self.to_pickup.minutes)?;
        check_minutes("duration to dropoff", self.to_dropoff.minutes)?;
        check("current cycle hours", self.current_cycle_hours)?;
        if let Some(days) = &self.cycle_history {
            for hours in days {
                check("cycle history hours", *hours)?;
            }
        }
        Ok(())
    }

    pub fn cycle_seed(&self) -> CycleSeed {
        match self.cycle_history {
            Some(days) => CycleSeed::History { days },
            None => CycleSeed::Even {
                hours: self.current_cycle_hours,
            },
        }
    }
}

fn check(field: &'static str, value: f64) -> Result<(), InputError> {
    if !value.is_finite() {
        return Err(InputError::NotFinite { field, value });
    }
    if value < 0.0 {
        return Err(InputError::Negative { field, value });
    }
    Ok(())
}

fn check_minutes(field: &'static str, minutes: Option<i64>) -> Result<(), InputError> {
    match minutes {
        Some(m) if m < 0 => Err(InputError::Negative {
            field,
            value: m as f64,
        }),
        _ => Ok(()),
    }
}

/// Knobs that shape a plan without being part of the trip itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanOptions {
    /// Wall-clock time the driver comes on the clock.
    pub start_time: Time,
    pub average_speed_mph: f64,
    /// Use backend leg durations instead of distance over average speed.
    pub use_route_durations: bool,
    pub rules: RuleSet,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            start_time: time(6, 0, 0, 0),
            average_speed_mph: 60.0,
            use_route_durations: false,
            rules: RuleSet::default(),
        }
    }
}

/// A planned and audited trip log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripLog {
    /// Normalized entries, each day closed by a `Total` line.
    pub lines: Vec<LogLine>,
    pub daily_totals: BTreeMap<Date, DailyTotals>,
    pub hos_compliant: bool,
    pub violations: Vec<Violation>,
    pub grid: Vec<GridPlacement>,
    pub total_miles: f64,
    pub total_driving_hours: f64,
    /// First duty-status change to last, in hours.
    pub total_duration_hours: f64,
}

/// Plan a trip and audit the result.
pub fn plan_trip(input: &TripInput, options: &PlanOptions) -> Result<TripLog, InputError> {
    input.validate()?;
    if !options.average_speed_mph.is_finite() || options.average_speed_mph <= 0.0 {
        return Err(InputError::NonPositiveSpeed(options.average_speed_mph));
    }

    let leg = |leg: &Leg| DriveLeg {
        minutes: leg.drive_minutes(options.average_speed_mph, options.use_route_durations),
        miles: leg.miles,
    };
    let script = TripScript {
        current_location: input.current_location.clone(),
        pickup_location: input.pickup_location.clone(),
        dropoff_location: input.dropoff_location.clone(),
        to_pickup: leg(&input.to_pickup),
        to_dropoff: leg(&input.to_dropoff),
    };
    debug!(
        pickup_minutes = script.to_pickup.minutes,
        dropoff_minutes = script.to_dropoff.minutes,
        "planning trip"
    );

    let start = input.start_date.to_datetime(options.start_time);
    let mut scheduler = Scheduler::new(start, &input.cycle_seed(), input.use_sleeper_berth);
    script.run(&mut scheduler);

    let total_miles = scheduler.total_miles();
    let entries = scheduler.into_entries();
    let total_duration_hours = match (entries.first(), entries.last()) {
        (Some(first), Some(last)) => {
            round_hours(last.ends_at().duration_since(first.starts_at()).as_mins())
        }
        _ => 0.0,
    };

    let audit = compliance::audit(&entries, options.rules);
    let driving_minutes: i64 = audit
        .entries()
        .filter(|e| e.status == DutyStatus::Driving)
        .map(|e| e.minutes())
        .sum();
    let grid = grid::annotate(&audit.lines);
    info!(
        days = audit.daily_totals.len(),
        compliant = audit.is_compliant(),
        "trip planned"
    );

    Ok(TripLog {
        hos_compliant: audit.is_compliant(),
        lines: audit.lines,
        daily_totals: audit.daily_totals,
        violations: audit.violations,
        grid,
        total_miles: (total_miles * 100.0).round() / 100.0,
        total_driving_hours: round_hours(driving_minutes),
        total_duration_hours,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::civil::date;

    use crate::model::{END_OF_DAY, LogEntry, entries_of};

    fn sample_input(pickup: f64, dropoff: f64) -> TripInput {
        TripInput {
            current_location: "Green Bay, WI".into(),
            pickup_location: "Chicago, IL".into(),
            dropoff_location: "Indianapolis, IN".into(),
            ..TripInput::new(date(2026, 3, 2), pickup, dropoff)
        }
    }

    fn plan(input: &TripInput) -> TripLog {
        plan_trip(input, &PlanOptions::default()).unwrap()
    }

    fn driving_spans(log: &TripLog) -> Vec<LogEntry> {
        entries_of(&log.lines)
            .into_iter()
            .filter(|e| e.status == DutyStatus::Driving)
            .collect()
    }

    fn assert_days_complete(log: &TripLog) {
        let entries = entries_of(&log.lines);
        for (date, totals) in &log.daily_totals {
            assert!((totals.sum24 - 24.0).abs() < 1e-9, "{date}");
            let day: Vec<_> = entries.iter().filter(|e| e.date == *date).collect();
            assert_eq!(day[0].start_time, Time::midnight());
            assert_eq!(day.last().unwrap().end_time, END_OF_DAY);
            for pair in day.windows(2) {
                assert_eq!(pair[0].end_time, pair[1].start_time, "{date}");
            }
        }
    }

    #[test]
    fn short_trip_drives_two_hours() {
        let log = plan(&sample_input(60.0, 60.0));

        let drives = driving_spans(&log);
        assert_eq!(drives.len(), 2);
        assert!(drives.iter().all(|e| e.minutes() == 60));
        assert!((log.total_driving_hours - 2.0).abs() < 1e-9);
        assert!((log.total_miles - 120.0).abs() < 1e-9);
        assert!(log.hos_compliant);
        assert!(log.violations.is_empty());
        assert_days_complete(&log);
    }

    #[test]
    fn home_terminal_fills_the_morning() {
        let log = plan(&sample_input(60.0, 60.0));
        let first = log.lines[0].as_entry().unwrap();

        assert_eq!(first.status, DutyStatus::OffDuty);
        assert_eq!(first.start_time, Time::midnight());
        assert_eq!(first.end_time, time(12, 0, 0, 0));
        assert_eq!(first.remarks, "Home terminal time base");
        assert_eq!(log.lines[1].as_entry().unwrap().remarks, "Green Bay, WI, Pre-trip and TIV");
    }

    #[test]
    fn near_cycle_limit_restarts() {
        let mut input = sample_input(60.0, 120.0);
        input.current_cycle_hours = 68.0;
        let log = plan(&input);

        let restart_minutes: i64 = entries_of(&log.lines)
            .iter()
            .filter(|e| e.remarks.starts_with("34-hour restart"))
            .map(LogEntry::minutes)
            .sum();
        assert_eq!(restart_minutes, 2040);
        assert!(log.hos_compliant);
        assert_days_complete(&log);
    }

    #[test]
    fn long_trips_stay_within_limits() {
        for (pickup, dropoff, cycle, sleeper) in [
            (300.0, 2500.0, 0.0, false),
            (900.0, 1800.0, 40.0, true),
            (700.0, 700.0, 60.0, false),
            (50.0, 3000.0, 20.0, true),
        ] {
            let mut input = sample_input(pickup, dropoff);
            input.current_cycle_hours = cycle;
            input.use_sleeper_berth = sleeper;
            let log = plan(&input);

            assert!(
                log.hos_compliant,
                "{pickup}/{dropoff}/{cycle}/{sleeper}: {:?}",
                log.violations
            );
            let driven: f64 = driving_spans(&log).iter().map(|e| e.miles).sum();
            assert!((driven - (pickup + dropoff)).abs() < 0.5, "{driven}");
            assert_days_complete(&log);
        }
    }

    #[test]
    fn sleeper_berth_shows_on_long_trips() {
        let mut input = sample_input(100.0, 1500.0);
        input.use_sleeper_berth = true;
        let log = plan(&input);

        let berth = entries_of(&log.lines)
            .into_iter()
            .filter(|e| e.status == DutyStatus::SleeperBerth)
            .count();
        assert!(berth > 0);
        assert!(log.daily_totals.values().any(|t| t.sleeper_berth > 0.0));
    }

    #[test]
    fn every_day_has_a_total_line() {
        let log = plan(&sample_input(500.0, 1200.0));
        let totals = log
            .lines
            .iter()
            .filter(|l| matches!(l, LogLine::Total { .. }))
            .count();
        assert_eq!(totals, log.daily_totals.len());
        assert!(matches!(log.lines.last(), Some(LogLine::Total { .. })));
    }

    #[test]
    fn grid_covers_every_entry() {
        let log = plan(&sample_input(60.0, 60.0));
        assert_eq!(log.grid.len(), entries_of(&log.lines).len());
        assert_eq!(log.grid[0].start_slot, 0);
    }

    #[test]
    fn rejects_bad_input() {
        let err = plan_trip(&sample_input(-1.0, 10.0), &PlanOptions::default()).unwrap_err();
        assert!(matches!(err, InputError::Negative { .. }));

        let err = plan_trip(&sample_input(f64::NAN, 10.0), &PlanOptions::default()).unwrap_err();
        assert!(matches!(err, InputError::NotFinite { .. }));

        let mut input = sample_input(10.0, 10.0);
        input.current_cycle_hours = -2.0;
        assert!(plan_trip(&input, &PlanOptions::default()).is_err());

        let options = PlanOptions {
            average_speed_mph: 0.0,
            ..PlanOptions::default()
        };
        let err = plan_trip(&sample_input(10.0, 10.0), &options).unwrap_err();
        assert_eq!(err, InputError::NonPositiveSpeed(0.0));
    }

    #[test]
    fn history_seed_overrides_even_spread() {
        let mut input = sample_input(60.0, 60.0);
        input.current_cycle_hours = 69.0;
        input.cycle_history = Some([0.0; CYCLE_DAYS - 1]);
        let log = plan(&input);

        assert!(
            entries_of(&log.lines)
                .iter()
                .all(|e| !e.remarks.starts_with("34-hour restart"))
        );
    }

    #[test]
    fn route_durations_are_opt_in() {
        let mut input = sample_input(60.0, 60.0);
        input.to_pickup.minutes = Some(90);
        let options = PlanOptions {
            use_route_durations: true,
            ..PlanOptions::default()
        };
        let log = plan_trip(&input, &options).unwrap();

        let drives = driving_spans(&log);
        assert_eq!(drives[0].minutes(), 90);
        assert!((plan(&input).total_driving_hours - 2.0).abs() < 1e-9);
    }
}
