//! Duty statuses: the four rows of a driver's log grid.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What the driver was doing during an interval.
///
/// Ordered as the rows appear on a paper log sheet, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DutyStatus {
    #[serde(rename = "Off-Duty")]
    OffDuty,

    #[serde(rename = "Sleeper Berth")]
    SleeperBerth,

    Driving,

    #[serde(rename = "On-Duty", alias = "On-Duty (Not Driving)")]
    OnDuty,
}

impl DutyStatus {
    /// All statuses in grid row order.
    pub const ALL: [Self; 4] = [Self::OffDuty, Self::SleeperBerth, Self::Driving, Self::OnDuty];

    /// Rest statuses break up a duty period and can reset the clocks.
    pub const fn is_rest(self) -> bool {
        matches!(self, Self::OffDuty | Self::SleeperBerth)
    }

    /// Driving and on-duty work both count toward the 14-hour window
    /// and the rolling cycle.
    pub const fn is_on_duty_type(self) -> bool {
        matches!(self, Self::Driving | Self::OnDuty)
    }

    /// The name printed on the log sheet.
    pub const fn label(self) -> &'static str {
        match self {
            Self::OffDuty => "Off-Duty",
            Self::SleeperBerth => "Sleeper Berth",
            Self::Driving => "Driving",
            Self::OnDuty => "On-Duty",
        }
    }

    /// Zero-based grid row: 0 = Off-Duty … 3 = On-Duty.
    pub const fn row(self) -> usize {
        match self {
            Self::OffDuty => 0,
            Self::SleeperBerth => 1,
            Self::Driving => 2,
            Self::OnDuty => 3,
        }
    }
}

impl fmt::Display for DutyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A status string that names none of the four duty statuses.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown duty status: {0}")]
pub struct ParseStatusError(pub String);

impl FromStr for DutyStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Off-Duty" => Ok(Self::OffDuty),
            "Sleeper Berth" => Ok(Self::SleeperBerth),
            "Driving" => Ok(Self::Driving),
            "On-Duty" | "On-Duty (Not Driving)" => Ok(Self::OnDuty),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}
