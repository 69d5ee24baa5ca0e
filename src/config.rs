//! hoslog configuration.
//!
//! Loaded from `~/.hoslog/config.toml`, or `$HOSLOG_HOME/config.toml`
//! when that is set. Every key is optional; a missing file means defaults.

use std::path::{Path, PathBuf};
use std::{env, fs, io};

use jiff::civil::{Time, time};
use serde::{Deserialize, Serialize};

use crate::compliance::RuleSet;
use crate::plan::PlanOptions;

/// Environment variable naming the base directory.
pub const HOME_ENV: &str = "HOSLOG_HOME";

/// hoslog configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// When the driver comes on the clock on the first day.
    pub start_time: Time,

    /// Speed used to turn leg distances into driving time.
    pub average_speed_mph: f64,

    /// Prefer routing durations over distance at average speed.
    pub use_route_durations: bool,

    /// Report driving past 8 hours without a 30-minute break.
    pub flag_missing_break: bool,

    /// Where saved trips live. Defaults to `<base>/trips`.
    pub storage_root: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            start_time: time(6, 0, 0, 0),
            average_speed_mph: 60.0,
            use_route_durations: false,
            flag_missing_break: false,
            storage_root: None,
        }
    }
}

impl Config {
    /// Load config from the base directory.
    /// Returns defaults if the file is missing, an error if it is invalid.
    pub fn load() -> Result<Self, String> {
        let base = base_dir().ok_or("could not determine home directory")?;
        Self::load_from(&base.join("config.toml"))
    }

    /// Load config from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let contents = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(format!("failed to read {}: {e}", path.display())),
        };

        let config: Self = toml::from_str(&contents)
            .map_err(|e| format!("invalid config at {}: {e}", path.display()))?;

        if !config.average_speed_mph.is_finite() || config.average_speed_mph <= 0.0 {
            return Err(format!(
                "average-speed-mph must be positive in {}",
                path.display()
            ));
        }

        Ok(config)
    }

    /// The directory holding saved trips.
    pub fn storage_root(&self) -> Option<PathBuf> {
        self.storage_root
            .clone()
            .or_else(|| base_dir().map(|b| b.join("trips")))
    }

    pub fn plan_options(&self) -> PlanOptions {
        PlanOptions {
            start_time: self.start_time,
            average_speed_mph: self.average_speed_mph,
            use_route_durations: self.use_route_durations,
            rules: RuleSet {
                flag_missing_break: self.flag_missing_break,
            },
        }
    }
}

/// The base directory: `$HOSLOG_HOME`, else `~/.hoslog`.
pub fn base_dir() -> Option<PathBuf> {
    match env::var_os(HOME_ENV) {
        Some(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
        _ => dirs::home_dir().map(|h| h.join(".hoslog")),
    }
}
