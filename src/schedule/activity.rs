//! Planned activities fed to the scheduler.

use crate::model::DutyStatus;

/// A block of time the driver intends to spend in one status.
#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
    pub status: DutyStatus,
    pub minutes: i64,
    pub remarks: String,
    pub miles: f64,
    /// Bypass the 11-hour driving check. Set on the pieces the
    /// scheduler has already cut to fit the limit.
    pub skip_limit_check: bool,
}

impl Activity {
    pub fn new(status: DutyStatus, minutes: i64, remarks: impl Into<String>) -> Self {
        Self {
            status,
            minutes,
            remarks: remarks.into(),
            miles: 0.0,
            skip_limit_check: false,
        }
    }

    pub fn driving(minutes: i64, miles: f64, remarks: impl Into<String>) -> Self {
        Self {
            miles,
            ..Self::new(DutyStatus::Driving, minutes, remarks)
        }
    }

    pub fn on_duty(minutes: i64, remarks: impl Into<String>) -> Self {
        Self::new(DutyStatus::OnDuty, minutes, remarks)
    }

    pub fn off_duty(minutes: i64, remarks: impl Into<String>) -> Self {
        Self::new(DutyStatus::OffDuty, minutes, remarks)
    }

    #[must_use]
    pub fn skipping_limit_check(mut self) -> Self {
        self.skip_limit_check = true;
        self
    }

    /// Miles attributed to `minutes` of this activity.
    pub(crate) fn miles_for(&self, minutes: i64) -> f64 {
        if self.minutes <= 0 {
            return 0.0;
        }
        self.miles * minutes as f64 / self.minutes as f64
    }

    /// Cut into `[0, minutes)` and the rest, sharing miles by time.
    pub(crate) fn split_at(&self, minutes: i64) -> (Self, Self) {
        let head_miles = self.miles_for(minutes);
        let head = Self {
            minutes,
            miles: head_miles,
            ..self.clone()
        };
        let tail = Self {
            minutes: self.minutes - minutes,
            miles: self.miles - head_miles,
            ..self.clone()
        };
        (head, tail)
    }

    /// What is left to do after the scheduler reported `outcome`.
    pub(crate) fn remainder(&self, outcome: &Outcome) -> Self {
        Self {
            minutes: outcome.unfinished_minutes,
            miles: outcome.unfinished_miles,
            ..self.clone()
        }
    }
}

/// What happened to an activity handed to the scheduler.
///
/// Work cut off by the closing of the 14-hour window is not resumed by
/// the scheduler; it is reported here for the caller to re-issue.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outcome {
    pub unfinished_minutes: i64,
    pub unfinished_miles: f64,
}

impl Outcome {
    pub fn is_complete(&self) -> bool {
        self.unfinished_minutes <= 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_shares_miles_by_time() {
        let drive = Activity::driving(60, 60.0, "Drive to Joliet, IL");
        let (head, tail) = drive.split_at(15);

        assert_eq!(head.minutes, 15);
        assert_eq!(tail.minutes, 45);
        assert!((head.miles - 15.0).abs() < 1e-9);
        assert!((tail.miles - 45.0).abs() < 1e-9);
        assert_eq!(tail.remarks, "Drive to Joliet, IL");
    }

    #[test]
    fn remainder_takes_unfinished_work() {
        let drive = Activity::driving(60, 55.0, "Drive");
        let outcome = Outcome {
            unfinished_minutes: 20,
            unfinished_miles: 18.0,
        };
        let rest = drive.remainder(&outcome);

        assert_eq!(rest.minutes, 20);
        assert!((rest.miles - 18.0).abs() < 1e-9);
        assert!(!outcome.is_complete());
    }
}
