//! The scheduler: turns planned activities into log entries while
//! holding the driver inside every hours-of-service limit.
//!
//! Overruns never fail. Each limit is resolved by cutting the activity
//! and inserting the rest or restart the rules require. Cuts are queued
//! as pending steps and worked off in order, so one activity may expand
//! into several entries and mandatory breaks.

mod activity;
mod script;

use std::collections::VecDeque;

use jiff::SignedDuration;
use jiff::civil::{DateTime, Time};
use tracing::{debug, info};

use crate::clock::{ClockState, CycleSeed};
use crate::model::{DutyStatus, END_OF_DAY, LogEntry};
use crate::rules;

pub use activity::{Activity, Outcome};
pub use script::{DriveLeg, TripScript};

/// One unit of pending work.
#[derive(Debug)]
enum Step {
    /// Lay an activity onto the log.
    Work(Pending),

    /// The rest closing a duty period has been logged: open the next one.
    StartDutyPeriod,

    /// Rest owed for hitting the 11-hour limit during `period`. Dropped if
    /// a window break has already ended that period.
    DrivingLimitBreak { period: u32 },

    /// A sleeper-berth split has been logged: clear the driving clocks.
    ClearDriving,

    /// A 30-minute break has been logged.
    ClearCumulativeDriving,

    /// A 34-hour restart has been logged.
    RestartCycle,
}

#[derive(Debug)]
struct Pending {
    activity: Activity,
    /// Minutes belong to the caller's activity rather than an inserted rest.
    owned: bool,
    /// Off-duty time still eligible for a sleeper-berth split.
    splittable: bool,
}

impl Pending {
    fn owned(activity: Activity) -> Self {
        Self {
            activity,
            owned: true,
            splittable: true,
        }
    }

    fn inserted(activity: Activity) -> Self {
        Self {
            activity,
            owned: false,
            splittable: true,
        }
    }

    #[must_use]
    fn unsplittable(mut self) -> Self {
        self.splittable = false;
        self
    }
}

/// Lays activities onto a driver's log for one trip.
#[derive(Debug)]
pub struct Scheduler {
    clock: ClockState,
    use_sleeper_berth: bool,
    entries: Vec<LogEntry>,
    total_miles: f64,
    duty_period: u32,
}

impl Scheduler {
    pub fn new(start: DateTime, seed: &CycleSeed, use_sleeper_berth: bool) -> Self {
        Self {
            clock: ClockState::new(start, seed),
            use_sleeper_berth,
            entries: Vec::new(),
            total_miles: 0.0,
            duty_period: 0,
        }
    }

    pub fn clock(&self) -> &ClockState {
        &self.clock
    }

    /// Entries logged so far, in the order they were laid down.
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<LogEntry> {
        self.entries
    }

    /// Miles driven so far.
    pub fn total_miles(&self) -> f64 {
        self.total_miles
    }

    /// Roll the cycle window forward to today, then return its total if
    /// `minutes` more duty were worked.
    pub fn advance_and_project_cycle(&mut self, minutes: i64) -> f64 {
        self.clock.cycle_hours_now() + minutes as f64 / 60.0
    }

    /// Log one activity.
    ///
    /// Returns the part of it, if any, that the closing of the 14-hour
    /// window left undone.
    pub fn process(&mut self, activity: Activity) -> Outcome {
        self.run(VecDeque::from([Step::Work(Pending::owned(activity))]))
    }

    /// Take a 30-minute off-duty break and clear cumulative driving.
    pub fn take_break(&mut self, remarks: &str) {
        debug!(at = %self.clock.current_time(), "30-minute break after 8 hours driving");
        self.run(VecDeque::from([
            Step::Work(Pending::inserted(Activity::off_duty(
                rules::BREAK_MINUTES,
                remarks,
            ))),
            Step::ClearCumulativeDriving,
        ]));
    }

    /// Take a 34-hour restart, emptying the rolling window.
    pub fn restart(&mut self, remarks: &str) {
        info!(
            at = %self.clock.current_time(),
            cycle_hours = self.clock.rolling().total(),
            "34-hour restart"
        );
        self.run(VecDeque::from([
            Step::Work(Pending::inserted(
                Activity::off_duty(rules::RESTART_MINUTES, remarks).skipping_limit_check(),
            )),
            Step::RestartCycle,
        ]));
    }

    fn run(&mut self, mut queue: VecDeque<Step>) -> Outcome {
        let mut outcome = Outcome::default();
        while let Some(step) = queue.pop_front() {
            match step {
                Step::Work(pending) => self.apply(pending, &mut queue, &mut outcome),
                Step::StartDutyPeriod => {
                    self.clock.start_duty_period();
                    self.duty_period += 1;
                }
                Step::DrivingLimitBreak { period } => {
                    if period == self.duty_period {
                        queue.push_front(Step::StartDutyPeriod);
                        queue.push_front(Step::Work(Pending::inserted(
                            Activity::off_duty(
                                rules::RESET_REST_MINUTES,
                                "10-hour break (11-hour driving limit reached)",
                            )
                            .skipping_limit_check(),
                        )));
                    }
                }
                Step::ClearDriving => self.clock.clear_driving(),
                Step::ClearCumulativeDriving => self.clock.clear_cumulative_driving(),
                Step::RestartCycle => {
                    self.clock.restart_cycle();
                    self.duty_period += 1;
                }
            }
        }
        outcome
    }

    fn apply(&mut self, pending: Pending, queue: &mut VecDeque<Step>, outcome: &mut Outcome) {
        let activity = &pending.activity;
        if activity.minutes <= 0 {
            return;
        }

        // 11-hour driving limit.
        if activity.status == DutyStatus::Driving
            && !activity.skip_limit_check
            && rules::exceeds_driving_limit(self.clock.driving_minutes() + activity.minutes)
        {
            let allowed = rules::driving_allowance(self.clock.driving_minutes());
            let (head, tail) = activity.split_at(allowed);
            debug!(
                at = %self.clock.current_time(),
                allowed,
                deferred = tail.minutes,
                "11-hour driving limit reached"
            );
            queue.push_front(Step::Work(Pending {
                activity: tail,
                ..pending
            }));
            queue.push_front(Step::DrivingLimitBreak {
                period: self.duty_period,
            });
            queue.push_front(Step::Work(Pending {
                activity: head.skipping_limit_check(),
                owned: pending.owned,
                splittable: false,
            }));
            return;
        }

        // 14-hour on-duty window.
        let window_left = self.clock.window_remaining_minutes();
        if activity.status.is_on_duty_type() && activity.minutes > window_left {
            let fits = window_left.max(0);
            if fits > 0 {
                let (head, _) = activity.split_at(fits);
                let start = self.clock.current_time();
                self.emit_span(
                    head.status,
                    start,
                    start + SignedDuration::from_mins(fits),
                    &format!("{} (clipped to end of 14-hour window)", head.remarks),
                    head.miles,
                );
            }
            let dropped = activity.minutes - fits;
            if pending.owned {
                outcome.unfinished_minutes += dropped;
                outcome.unfinished_miles += activity.miles_for(dropped);
            }
            info!(
                at = %self.clock.current_time(),
                status = %activity.status,
                unfinished = dropped,
                "14-hour window closed"
            );
            queue.push_front(Step::StartDutyPeriod);
            queue.push_front(Step::Work(
                Pending::inserted(
                    Activity::off_duty(rules::RESET_REST_MINUTES, "10-hour break")
                        .skipping_limit_check(),
                )
                .unsplittable(),
            ));
            return;
        }

        // Sleeper-berth split.
        if activity.status == DutyStatus::OffDuty && self.use_sleeper_berth && pending.splittable {
            if let Some((berth, rest)) = rules::sleeper_split(activity.minutes) {
                debug!(at = %self.clock.current_time(), berth, rest, "sleeper-berth split");
                let berth = Activity::new(
                    DutyStatus::SleeperBerth,
                    berth,
                    format!("{} (Sleeper Berth)", activity.remarks),
                );
                let rest = Activity::off_duty(
                    rest,
                    format!("{} (Off-Duty after Berth)", activity.remarks),
                );
                queue.push_front(Step::ClearDriving);
                queue.push_front(Step::Work(Pending {
                    activity: rest,
                    owned: pending.owned,
                    splittable: false,
                }));
                queue.push_front(Step::Work(Pending {
                    activity: berth,
                    owned: pending.owned,
                    splittable: false,
                }));
                return;
            }
        }

        let start = self.clock.current_time();
        let end = start + SignedDuration::from_mins(activity.minutes);
        self.emit_span(activity.status, start, end, &activity.remarks, activity.miles);
    }

    /// Log `[start, end)`, one entry per calendar day it touches.
    ///
    /// Miles are shared out by time. When the span crosses midnight,
    /// pieces of a minute or less are not logged: their time is lost to
    /// the log, their miles go to a neighboring piece, or straight to the
    /// odometer when no piece is kept.
    fn emit_span(
        &mut self,
        status: DutyStatus,
        start: DateTime,
        end: DateTime,
        remarks: &str,
        miles: f64,
    ) {
        let total_secs = end.duration_since(start).as_secs();
        if total_secs <= 0 {
            return;
        }

        if start.date() == end.date() {
            self.record(
                LogEntry::new(start.date(), status, start.time(), end.time(), remarks)
                    .with_miles(miles),
            );
        } else {
            let mut cursor = start;
            // Miles of dropped slivers ride along with the next piece kept.
            let mut carried = 0.0;
            let mut kept = 0;
            while cursor < end {
                let midnight = cursor.date().to_datetime(Time::midnight())
                    + SignedDuration::from_hours(24);
                let piece_end = midnight.min(end);
                let secs = piece_end.duration_since(cursor).as_secs();
                let share = miles * secs as f64 / total_secs as f64;
                if secs <= 60 {
                    carried += share;
                } else {
                    let note = match (cursor == start, piece_end == end) {
                        (true, true) => None,
                        (true, false) => Some("continued next day"),
                        (false, true) => Some("continued from previous day"),
                        (false, false) => Some("continued"),
                    };
                    let remarks = match note {
                        Some(note) if remarks.is_empty() => format!("({note})"),
                        Some(note) => format!("{remarks} ({note})"),
                        None => remarks.to_string(),
                    };
                    let end_time = if piece_end == midnight {
                        END_OF_DAY
                    } else {
                        piece_end.time()
                    };
                    self.record(
                        LogEntry::new(cursor.date(), status, cursor.time(), end_time, remarks)
                            .with_miles(share + carried),
                    );
                    carried = 0.0;
                    kept += 1;
                }
                cursor = piece_end;
            }
            if carried > 0.0 {
                if kept > 0 {
                    if let Some(last) = self.entries.last_mut() {
                        last.miles += carried;
                    }
                }
                self.total_miles += carried;
            }
        }

        self.clock.advance_to(end);
    }

    /// Append an entry and charge it against the clocks.
    fn record(&mut self, entry: LogEntry) {
        let minutes = entry.minutes();
        match entry.status {
            DutyStatus::Driving => {
                self.clock.record_driving(entry.date, minutes);
                self.total_miles += entry.miles;
            }
            DutyStatus::OnDuty => self.clock.record_on_duty(entry.date, minutes),
            DutyStatus::OffDuty | DutyStatus::SleeperBerth => self.clock.record_rest(entry.date),
        }
        self.entries.push(entry);
    }
}
