//! Saved trip records.

use jiff::Timestamp;
use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::compliance::Violation;

/// A planned trip as kept on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub id: Uuid,
    pub current_location: String,
    pub pickup_location: String,
    pub dropoff_location: String,
    pub current_cycle_hours: f64,
    pub use_sleeper_berth: bool,
    pub start_date: Date,
    pub total_miles: f64,
    pub violations: Vec<Violation>,
    pub created_at: Timestamp,
}

impl Trip {
    /// The first eight characters of the id, as shown in listings.
    pub fn short_id(&self) -> String {
        self.id.to_string()[..8].to_string()
    }

    pub fn is_compliant(&self) -> bool {
        self.violations.is_empty()
    }
}
