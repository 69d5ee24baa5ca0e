//! CLI interface for hoslog.
//!
//! Each subcommand is non-interactive: arguments in, a log out.
//!
//! - `hoslog plan`: simulate a trip and print its log.
//! - `hoslog audit <file>`: check a log written elsewhere or edited by hand.
//! - `hoslog trip list|show`: browse trips saved with `plan --save`.

mod format;
mod trip;

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use jiff::{Timestamp, Zoned};
use jiff::civil::Date;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::compliance;
use crate::config::Config;
use crate::model::{LogEntry, LogLine, Trip, entries_of};
use crate::plan::{self, TripInput, TripLog};
use crate::route::{self, Coordinates, Leg, StraightLine};
use crate::rules::CYCLE_DAYS;
use crate::storage::Storage;

use trip::TripCommand;

/// hoslog: plan and audit hours-of-service driver logs.
#[derive(Debug, Parser)]
#[command(name = "hoslog", after_long_help = WORKFLOW_HELP)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

const WORKFLOW_HELP: &str = r"Workflow:
  1. hoslog plan --from 'Green Bay, WI' --pickup 'Chicago, IL' --dropoff 'Indianapolis, IN' \
       --pickup-miles 208 --dropoff-miles 183 --cycle-hours 40 --save
     → prints the log and a trip ID (e.g. a3b0fc12)
  2. hoslog trip show a3b --json > trip.json
  3. edit trip.json by hand, then: hoslog audit trip.json

Distances:
  hoslog plan --from-coords 44.51,-88.01 --pickup-coords 41.88,-87.63 \
       --dropoff-coords 39.77,-86.16";

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Simulate a trip and print its log.
    ///
    /// Leg distances come from `--*-miles`, or from straight-line distance
    /// between `--*-coords` when miles are not given.
    Plan(PlanArgs),

    /// Audit a log from a JSON file.
    ///
    /// Accepts the output of `plan --json` or `trip show --json`, an array
    /// of log lines, or a bare array of entries.
    Audit {
        /// JSON file to audit.
        file: PathBuf,

        /// Print the audited log as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Browse saved trips.
    Trip {
        #[command(subcommand)]
        command: TripCommand,
    },
}

#[derive(Debug, Args)]
pub struct PlanArgs {
    /// Miles from the current location to pickup.
    #[arg(long)]
    pickup_miles: Option<f64>,

    /// Miles from pickup to dropoff.
    #[arg(long)]
    dropoff_miles: Option<f64>,

    /// On-duty hours already used in the current 8-day cycle.
    #[arg(long, default_value_t = 0.0)]
    cycle_hours: f64,

    /// On-duty hours for each of the prior seven days, oldest first.
    /// Overrides `--cycle-hours`.
    #[arg(long, value_delimiter = ',')]
    cycle_history: Option<Vec<f64>>,

    /// Split long rests into sleeper-berth time.
    #[arg(long)]
    sleeper_berth: bool,

    /// First day of the trip (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    start_date: Option<Date>,

    /// Name of the current location.
    #[arg(long = "from", default_value = "Current location")]
    from: String,

    /// Name of the pickup location.
    #[arg(long, default_value = "Pickup")]
    pickup: String,

    /// Name of the dropoff location.
    #[arg(long, default_value = "Dropoff")]
    dropoff: String,

    /// Current location as LAT,LON.
    #[arg(long, allow_hyphen_values = true)]
    from_coords: Option<Coordinates>,

    /// Pickup location as LAT,LON.
    #[arg(long, allow_hyphen_values = true)]
    pickup_coords: Option<Coordinates>,

    /// Dropoff location as LAT,LON.
    #[arg(long, allow_hyphen_values = true)]
    dropoff_coords: Option<Coordinates>,

    /// Print the log as JSON.
    #[arg(long)]
    json: bool,

    /// Save the trip and its log.
    #[arg(long)]
    save: bool,
}

/// Run the CLI, returning an error message on failure.
pub fn run(config: &Config, storage: &Storage) -> Result<(), String> {
    let cli = Cli::parse();

    match cli.command {
        Command::Plan(args) => cmd_plan(config, storage, &args),
        Command::Audit { file, json } => cmd_audit(config, &file, json),
        Command::Trip { command } => trip::run(config, storage, command),
    }
}

fn cmd_plan(config: &Config, storage: &Storage, args: &PlanArgs) -> Result<(), String> {
    let input = trip_input(args)?;
    let log = plan::plan_trip(&input, &config.plan_options()).map_err(|e| e.to_string())?;

    let saved = if args.save {
        Some(save_trip(storage, &input, &log)?)
    } else {
        None
    };

    if args.json {
        let json = serde_json::to_string_pretty(&log)
            .map_err(|e| format!("failed to serialize log: {e}"))?;
        println!("{json}");
    } else {
        print!("{}", format::format_log(&log.lines, &log.violations));
        println!(
            "Trip: {:.1} miles, {:.2} hours driving, {:.2} hours elapsed",
            log.total_miles, log.total_driving_hours, log.total_duration_hours
        );
    }

    if let Some(trip) = saved {
        eprintln!("Saved trip {}", trip.short_id());
    }
    Ok(())
}

fn trip_input(args: &PlanArgs) -> Result<TripInput, String> {
    let to_pickup = leg(
        args.pickup_miles,
        args.from_coords,
        args.pickup_coords,
        "--pickup-miles",
        "--from-coords and --pickup-coords",
    )?;
    let to_dropoff = leg(
        args.dropoff_miles,
        args.pickup_coords,
        args.dropoff_coords,
        "--dropoff-miles",
        "--pickup-coords and --dropoff-coords",
    )?;

    let cycle_history = match &args.cycle_history {
        None => None,
        Some(days) => Some(<[f64; CYCLE_DAYS - 1]>::try_from(days.as_slice()).map_err(
            |_| {
                format!(
                    "--cycle-history needs {} values, got {}",
                    CYCLE_DAYS - 1,
                    days.len()
                )
            },
        )?),
    };

    Ok(TripInput {
        current_location: args.from.clone(),
        pickup_location: args.pickup.clone(),
        dropoff_location: args.dropoff.clone(),
        to_pickup,
        to_dropoff,
        current_cycle_hours: args.cycle_hours,
        cycle_history,
        use_sleeper_berth: args.sleeper_berth,
        start_date: args.start_date.unwrap_or_else(|| Zoned::now().date()),
    })
}

/// A leg from explicit miles, or from the straight line between two points.
fn leg(
    miles: Option<f64>,
    from: Option<Coordinates>,
    to: Option<Coordinates>,
    miles_flag: &str,
    coords_flags: &str,
) -> Result<Leg, String> {
    match (miles, from, to) {
        (Some(miles), _, _) => Ok(Leg::from_miles(miles)),
        (None, Some(from), Some(to)) => Ok(route::resolve_leg(&StraightLine, from, to)),
        _ => Err(format!("specify {miles_flag}, or both {coords_flags}")),
    }
}

fn save_trip(storage: &Storage, input: &TripInput, log: &TripLog) -> Result<Trip, String> {
    let trip = Trip {
        id: Uuid::new_v4(),
        current_location: input.current_location.clone(),
        pickup_location: input.pickup_location.clone(),
        dropoff_location: input.dropoff_location.clone(),
        current_cycle_hours: input.cycle_seed().total_hours(),
        use_sleeper_berth: input.use_sleeper_berth,
        start_date: input.start_date,
        total_miles: log.total_miles,
        violations: log.violations.clone(),
        created_at: Timestamp::now(),
    };

    storage
        .create_trip_with_log(&trip, &log.lines)
        .map_err(|e| format!("failed to save trip: {e}"))?;

    Ok(trip)
}

/// The shapes of JSON the audit command accepts.
#[derive(Deserialize)]
#[serde(untagged)]
enum AuditInput {
    Document { lines: Vec<LogLine> },
    Lines(Vec<LogLine>),
    Entries(Vec<LogEntry>),
}

impl AuditInput {
    fn into_entries(self) -> Vec<LogEntry> {
        match self {
            Self::Document { lines } | Self::Lines(lines) => entries_of(&lines),
            Self::Entries(entries) => entries,
        }
    }
}

fn read_audit_input(path: &Path) -> Result<Vec<LogEntry>, String> {
    let contents =
        fs::read_to_string(path).map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    let input: AuditInput = serde_json::from_str(&contents)
        .map_err(|_| format!("{} is not a log: expected log lines or entries", path.display()))?;
    Ok(input.into_entries())
}

fn cmd_audit(config: &Config, path: &Path, json: bool) -> Result<(), String> {
    let entries = read_audit_input(path)?;
    let audit = compliance::audit(&entries, config.plan_options().rules);
    info!(entries = entries.len(), compliant = audit.is_compliant(), "audit finished");

    if json {
        let doc = format::AuditDocument {
            lines: &audit.lines,
            daily_totals: &audit.daily_totals,
            hos_compliant: audit.is_compliant(),
            violations: &audit.violations,
        };
        let json = serde_json::to_string_pretty(&doc)
            .map_err(|e| format!("failed to serialize audit: {e}"))?;
        println!("{json}");
    } else {
        print!("{}", format::format_log(&audit.lines, &audit.violations));
    }
    Ok(())
}
