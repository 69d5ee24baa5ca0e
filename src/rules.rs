//! Hours-of-service limits.
//!
//! Every threshold and limit predicate lives here, shared by the forward
//! simulator ([`crate::schedule`]) and the backward auditor
//! ([`crate::compliance`]) so the two cannot drift apart.
//!
//! Durations are whole minutes; the rolling cycle is tracked in hours.

/// Maximum driving within one duty period (11 hours).
pub const MAX_DRIVING_MINUTES: i64 = 11 * 60;

/// Length of the on-duty window opened by a duty period (14 hours).
pub const DUTY_WINDOW_MINUTES: i64 = 14 * 60;

/// Consecutive rest that ends a duty period (10 hours).
pub const RESET_REST_MINUTES: i64 = 10 * 60;

/// Cumulative driving after which a break is required (8 hours).
pub const BREAK_AFTER_DRIVING_MINUTES: i64 = 8 * 60;

/// Minimum length of the interrupting break.
pub const BREAK_MINUTES: i64 = 30;

/// Rolling 8-day on-duty budget.
pub const CYCLE_LIMIT_HOURS: f64 = 70.0;

/// Days covered by the rolling cycle.
pub const CYCLE_DAYS: usize = 8;

/// Off-duty time that restarts the cycle (34 hours).
pub const RESTART_MINUTES: i64 = 34 * 60;

/// Sleeper-berth segment carved out of a long rest (7 hours).
pub const SLEEPER_BERTH_MINUTES: i64 = 7 * 60;

/// Shortest rest eligible for a sleeper-berth split (9 hours).
pub const SLEEPER_SPLIT_MIN_REST_MINUTES: i64 = 9 * 60;

/// Shortest off-duty remainder a sleeper-berth split may leave (2 hours).
pub const SLEEPER_SPLIT_MIN_REMAINDER_MINUTES: i64 = 2 * 60;

/// Driving past which the odometer calls for fuel.
pub const FUELING_INTERVAL_MILES: f64 = 1000.0;

/// Whether `driving_minutes` of driving breaks the 11-hour limit.
pub const fn exceeds_driving_limit(driving_minutes: i64) -> bool {
    driving_minutes > MAX_DRIVING_MINUTES
}

/// Driving still allowed before the 11-hour limit, never negative.
pub const fn driving_allowance(driving_minutes: i64) -> i64 {
    let left = MAX_DRIVING_MINUTES - driving_minutes;
    if left > 0 { left } else { 0 }
}

/// Whether work ending `elapsed_minutes` after the window opened falls
/// outside the 14-hour window.
pub const fn exceeds_duty_window(elapsed_minutes: i64) -> bool {
    elapsed_minutes > DUTY_WINDOW_MINUTES
}

/// Whether a rest of this length ends the duty period.
pub const fn is_reset_rest(rest_minutes: i64) -> bool {
    rest_minutes >= RESET_REST_MINUTES
}

/// Whether a rest of this length interrupts cumulative driving.
pub const fn satisfies_break(rest_minutes: i64) -> bool {
    rest_minutes >= BREAK_MINUTES
}

/// Whether driving `next_minutes` more, on top of `cumulative_minutes`
/// since the last break, reaches the point where a break is due first.
pub const fn break_due(cumulative_minutes: i64, next_minutes: i64) -> bool {
    cumulative_minutes + next_minutes >= BREAK_AFTER_DRIVING_MINUTES
}

/// Whether cumulative driving has run past the break requirement.
pub const fn missed_break(cumulative_minutes: i64) -> bool {
    cumulative_minutes > BREAK_AFTER_DRIVING_MINUTES
}

/// Whether the projected rolling total breaks the 70-hour cycle.
pub fn exceeds_cycle(projected_hours: f64) -> bool {
    projected_hours > CYCLE_LIMIT_HOURS
}

/// Split a rest into sleeper-berth and off-duty minutes, if it qualifies.
///
/// Returns `(sleeper, off_duty)` when the rest is at least 9 hours and
/// leaves at least 2 hours after the 7-hour sleeper segment.
pub const fn sleeper_split(rest_minutes: i64) -> Option<(i64, i64)> {
    if rest_minutes < SLEEPER_SPLIT_MIN_REST_MINUTES {
        return None;
    }
    let remainder = rest_minutes - SLEEPER_BERTH_MINUTES;
    if remainder < SLEEPER_SPLIT_MIN_REMAINDER_MINUTES {
        return None;
    }
    Some((SLEEPER_BERTH_MINUTES, remainder))
}
