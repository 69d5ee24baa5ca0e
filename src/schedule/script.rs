//! The fixed sequence of activities making up one trip.

use tracing::{debug, info};

use super::{Activity, Scheduler};
use crate::rules;

const HOME_TERMINAL_MINUTES: i64 = 6 * 60;
const INSPECTION_MINUTES: i64 = 30;
const LOADING_MINUTES: i64 = 60;
const UNLOADING_MINUTES: i64 = 60;
const FUELING_MINUTES: i64 = 30;

/// Longest stretch driven toward the dropoff before limits are re-checked.
const DROPOFF_CHUNK_MINUTES: i64 = 60;

const BREAK_REMARKS: &str = "30-min break after 8 hours driving";
const RESTART_REMARKS: &str = "34-hour restart to reset 70-hour limit";

/// One drive, already converted to minutes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveLeg {
    pub minutes: i64,
    pub miles: f64,
}

/// A trip from the driver's current location through pickup to dropoff.
#[derive(Debug, Clone, PartialEq)]
pub struct TripScript {
    pub current_location: String,
    pub pickup_location: String,
    pub dropoff_location: String,
    pub to_pickup: DriveLeg,
    pub to_dropoff: DriveLeg,
}

/// How a leg is fed to the scheduler.
#[derive(Debug, Clone, Copy)]
struct LegPolicy {
    /// Longest piece handed over at once; `None` hands over the whole leg.
    chunk_minutes: Option<i64>,
    /// Count the coming chunk when deciding whether a break is due.
    break_lookahead: bool,
    fueling: bool,
}

const PICKUP_POLICY: LegPolicy = LegPolicy {
    chunk_minutes: None,
    break_lookahead: false,
    fueling: false,
};

const DROPOFF_POLICY: LegPolicy = LegPolicy {
    chunk_minutes: Some(DROPOFF_CHUNK_MINUTES),
    break_lookahead: true,
    fueling: true,
};

impl TripScript {
    /// Lay the whole trip onto `scheduler`.
    pub fn run(&self, scheduler: &mut Scheduler) {
        let mut last_fuel_odometer = 0.0;

        perform(
            scheduler,
            Activity::off_duty(HOME_TERMINAL_MINUTES, "Home terminal time base"),
        );
        perform(
            scheduler,
            Activity::on_duty(
                INSPECTION_MINUTES,
                format!("{}, Pre-trip and TIV", self.current_location),
            ),
        );
        drive(
            scheduler,
            self.to_pickup,
            &format!("Drive to {}", self.pickup_location),
            PICKUP_POLICY,
            &mut last_fuel_odometer,
        );
        perform(
            scheduler,
            Activity::on_duty(LOADING_MINUTES, format!("{}, Loading", self.pickup_location)),
        );
        drive(
            scheduler,
            self.to_dropoff,
            &format!("Drive to {}", self.dropoff_location),
            DROPOFF_POLICY,
            &mut last_fuel_odometer,
        );
        perform(
            scheduler,
            Activity::on_duty(
                UNLOADING_MINUTES,
                format!("{}, Unloading", self.dropoff_location),
            ),
        );
    }
}

/// Process an activity, re-issuing whatever a closed window left undone.
fn perform(scheduler: &mut Scheduler, activity: Activity) {
    let mut pending = Some(activity);
    while let Some(activity) = pending.take() {
        let outcome = scheduler.process(activity.clone());
        if !outcome.is_complete() {
            pending = Some(activity.remainder(&outcome));
        }
    }
}

fn drive(
    scheduler: &mut Scheduler,
    leg: DriveLeg,
    remarks: &str,
    policy: LegPolicy,
    last_fuel_odometer: &mut f64,
) {
    let mut minutes_left = leg.minutes;
    let mut miles_left = leg.miles;

    while minutes_left > 0 {
        let chunk = policy
            .chunk_minutes
            .map_or(minutes_left, |max| max.min(minutes_left));
        let chunk_miles = miles_left * chunk as f64 / minutes_left as f64;

        if policy.fueling
            && scheduler.total_miles() + chunk_miles - *last_fuel_odometer
                >= rules::FUELING_INTERVAL_MILES
        {
            debug!(odometer = scheduler.total_miles(), "fueling stop");
            perform(scheduler, Activity::on_duty(FUELING_MINUTES, "Fueling stop"));
            *last_fuel_odometer = scheduler.total_miles();
        }

        let lookahead = if policy.break_lookahead { chunk } else { 0 };
        if rules::break_due(scheduler.clock().cumulative_driving_minutes(), lookahead) {
            scheduler.take_break(BREAK_REMARKS);
        }

        let projected = scheduler.advance_and_project_cycle(chunk);
        if rules::exceeds_cycle(projected) {
            info!(projected, "rolling cycle would pass 70 hours");
            scheduler.restart(RESTART_REMARKS);
        }

        let outcome = scheduler.process(Activity::driving(chunk, chunk_miles, remarks));
        minutes_left -= chunk - outcome.unfinished_minutes;
        miles_left -= chunk_miles - outcome.unfinished_miles;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::civil::date;

    use crate::clock::CycleSeed;
    use crate::model::{DutyStatus, LogEntry};

    fn sample_script(pickup: DriveLeg, dropoff: DriveLeg) -> TripScript {
        TripScript {
            current_location: "Green Bay, WI".into(),
            pickup_location: "Chicago, IL".into(),
            dropoff_location: "Indianapolis, IN".into(),
            to_pickup: pickup,
            to_dropoff: dropoff,
        }
    }

    fn leg(minutes: i64) -> DriveLeg {
        DriveLeg {
            minutes,
            miles: minutes as f64,
        }
    }

    fn run(script: &TripScript, cycle_hours: f64, sleeper: bool) -> Scheduler {
        let mut s = Scheduler::new(
            date(2026, 3, 2).at(6, 0, 0, 0),
            &CycleSeed::Even { hours: cycle_hours },
            sleeper,
        );
        script.run(&mut s);
        s
    }

    fn minutes_of(entries: &[LogEntry], status: DutyStatus) -> i64 {
        entries
            .iter()
            .filter(|e| e.status == status)
            .map(LogEntry::minutes)
            .sum()
    }

    #[test]
    fn short_trip_follows_the_script() {
        let s = run(&sample_script(leg(60), leg(60)), 0.0, false);
        let remarks: Vec<_> = s.entries().iter().map(|e| e.remarks.as_str()).collect();

        assert_eq!(
            remarks,
            vec![
                "Home terminal time base",
                "Green Bay, WI, Pre-trip and TIV",
                "Drive to Chicago, IL",
                "Chicago, IL, Loading",
                "Drive to Indianapolis, IN",
                "Indianapolis, IN, Unloading",
            ]
        );
        assert_eq!(minutes_of(s.entries(), DutyStatus::Driving), 120);
        assert!((s.total_miles() - 120.0).abs() < 1e-9);
    }

    #[test]
    fn near_cycle_limit_forces_restart() {
        let s = run(&sample_script(leg(60), leg(120)), 68.0, false);

        let restart: Vec<_> = s
            .entries()
            .iter()
            .filter(|e| e.remarks.starts_with(RESTART_REMARKS))
            .collect();
        assert!(!restart.is_empty());
        assert_eq!(restart.iter().map(|e| e.minutes()).sum::<i64>(), 2040);

        // Nothing but the remaining dropoff drive and unloading after it.
        let last = s.entries().last().unwrap();
        assert_eq!(last.remarks, "Indianapolis, IN, Unloading");
        assert_eq!(minutes_of(s.entries(), DutyStatus::Driving), 180);
    }

    #[test]
    fn long_dropoff_leg_takes_breaks_and_fuel() {
        let s = run(&sample_script(leg(60), leg(1500)), 0.0, false);
        let entries = s.entries();

        assert!(entries.iter().any(|e| e.remarks == BREAK_REMARKS));
        assert!(entries.iter().any(|e| e.remarks == "Fueling stop"));
        assert!(
            entries
                .iter()
                .any(|e| e.remarks.starts_with("10-hour break"))
        );
        assert_eq!(minutes_of(entries, DutyStatus::Driving), 1560);
        assert!((s.total_miles() - 1560.0).abs() < 1e-6);
    }

    #[test]
    fn clipped_pickup_drive_resumes_after_break() {
        // Home time and inspection leave 7.5h of window at 12:30.
        let s = run(&sample_script(leg(14 * 60), leg(0)), 0.0, false);
        let entries = s.entries();

        assert!(
            entries
                .iter()
                .any(|e| e.remarks.ends_with("(clipped to end of 14-hour window)"))
        );
        assert_eq!(minutes_of(entries, DutyStatus::Driving), 14 * 60);
    }

    #[test]
    fn zero_length_legs_skip_driving() {
        let s = run(&sample_script(leg(0), leg(0)), 0.0, false);
        assert_eq!(minutes_of(s.entries(), DutyStatus::Driving), 0);
        assert_eq!(s.entries().len(), 4);
    }
}
