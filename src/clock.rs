//! Simulation clock: where the driver is in time and how much of each
//! limit has been used.

use jiff::SignedDuration;
use jiff::civil::{Date, DateTime};
use serde::{Deserialize, Serialize};

use crate::rules::{CYCLE_DAYS, DUTY_WINDOW_MINUTES};

/// How the seven days before the trip are filled in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CycleSeed {
    /// Spread the starting cycle hours evenly over the prior seven days.
    Even { hours: f64 },

    /// Exact on-duty hours for each prior day, oldest first.
    History { days: [f64; CYCLE_DAYS - 1] },
}

impl CycleSeed {
    /// Total hours the seed places in the window.
    pub fn total_hours(&self) -> f64 {
        match self {
            Self::Even { hours } => *hours,
            Self::History { days } => days.iter().sum(),
        }
    }
}

/// On-duty hours for the last eight days, oldest first; the last slot is today.
#[derive(Debug, Clone, PartialEq)]
pub struct RollingWindow {
    today: Date,
    slots: [f64; CYCLE_DAYS],
}

impl RollingWindow {
    /// A window whose current slot is `today`, with prior days filled from `seed`.
    pub fn seeded(today: Date, seed: &CycleSeed) -> Self {
        let mut slots = [0.0; CYCLE_DAYS];
        match seed {
            CycleSeed::Even { hours } => {
                let per_day = hours / (CYCLE_DAYS - 1) as f64;
                for slot in &mut slots[..CYCLE_DAYS - 1] {
                    *slot = per_day;
                }
            }
            CycleSeed::History { days } => slots[..CYCLE_DAYS - 1].copy_from_slice(days),
        }
        Self { today, slots }
    }

    /// Shift the window forward so its current slot is `date`.
    ///
    /// Each elapsed day drops the oldest slot and opens an empty one.
    /// Dates at or before the current slot leave the window unchanged.
    pub fn advance_to(&mut self, date: Date) {
        if date <= self.today {
            return;
        }
        let elapsed = date.duration_since(self.today).as_hours() / 24;
        let shift = usize::try_from(elapsed).map_or(CYCLE_DAYS, |d| d.min(CYCLE_DAYS));
        self.slots.rotate_left(shift);
        for slot in &mut self.slots[CYCLE_DAYS - shift..] {
            *slot = 0.0;
        }
        self.today = date;
    }

    /// Add on-duty hours worked on `date`.
    pub fn add(&mut self, date: Date, hours: f64) {
        self.advance_to(date);
        self.slots[CYCLE_DAYS - 1] += hours;
    }

    /// Zero every slot, as after a 34-hour restart.
    pub fn reset(&mut self) {
        self.slots = [0.0; CYCLE_DAYS];
    }

    /// Hours across all eight slots.
    pub fn total(&self) -> f64 {
        self.slots.iter().sum()
    }

    pub fn today(&self) -> Date {
        self.today
    }

    pub fn slots(&self) -> &[f64; CYCLE_DAYS] {
        &self.slots
    }
}

/// The mutable temporal state of one simulation run.
///
/// Owned by exactly one [`Scheduler`](crate::schedule::Scheduler); only
/// the scheduler moves it forward.
#[derive(Debug, Clone)]
pub struct ClockState {
    current_time: DateTime,
    window_end: DateTime,
    driving_minutes: i64,
    cumulative_driving_minutes: i64,
    rolling: RollingWindow,
}

impl ClockState {
    /// A fresh clock at `start`: the 14-hour window opens now and both
    /// driving accumulators are empty.
    pub fn new(start: DateTime, seed: &CycleSeed) -> Self {
        Self {
            current_time: start,
            window_end: start + SignedDuration::from_mins(DUTY_WINDOW_MINUTES),
            driving_minutes: 0,
            cumulative_driving_minutes: 0,
            rolling: RollingWindow::seeded(start.date(), seed),
        }
    }

    pub fn current_time(&self) -> DateTime {
        self.current_time
    }

    pub fn window_end(&self) -> DateTime {
        self.window_end
    }

    /// Driving in the current duty period, in minutes.
    pub fn driving_minutes(&self) -> i64 {
        self.driving_minutes
    }

    /// Driving since the last 30-minute break, in minutes.
    pub fn cumulative_driving_minutes(&self) -> i64 {
        self.cumulative_driving_minutes
    }

    pub fn rolling(&self) -> &RollingWindow {
        &self.rolling
    }

    /// Rolling total after rolling the window forward to the current day.
    pub(crate) fn cycle_hours_now(&mut self) -> f64 {
        self.rolling.advance_to(self.current_time.date());
        self.rolling.total()
    }

    /// Minutes left before the 14-hour window closes; negative once past it.
    pub(crate) fn window_remaining_minutes(&self) -> i64 {
        self.window_end.duration_since(self.current_time).as_mins()
    }

    pub(crate) fn advance_to(&mut self, t: DateTime) {
        self.current_time = t;
    }

    pub(crate) fn record_driving(&mut self, date: Date, minutes: i64) {
        self.driving_minutes += minutes;
        self.cumulative_driving_minutes += minutes;
        self.rolling.add(date, minutes as f64 / 60.0);
    }

    pub(crate) fn record_on_duty(&mut self, date: Date, minutes: i64) {
        self.rolling.add(date, minutes as f64 / 60.0);
    }

    pub(crate) fn record_rest(&mut self, date: Date) {
        self.rolling.advance_to(date);
    }

    /// Clear the break accumulator after a qualifying 30-minute break.
    pub(crate) fn clear_cumulative_driving(&mut self) {
        self.cumulative_driving_minutes = 0;
    }

    /// Clear both driving accumulators without reopening the window.
    pub(crate) fn clear_driving(&mut self) {
        self.driving_minutes = 0;
        self.cumulative_driving_minutes = 0;
    }

    /// Start a new duty period: clear driving and open a fresh window now.
    pub(crate) fn start_duty_period(&mut self) {
        self.clear_driving();
        self.window_end = self.current_time + SignedDuration::from_mins(DUTY_WINDOW_MINUTES);
    }

    /// Restart the cycle: a new duty period with an empty rolling window.
    pub(crate) fn restart_cycle(&mut self) {
        self.rolling.advance_to(self.current_time.date());
        self.rolling.reset();
        self.start_duty_period();
    }
}
