//! Saved trip commands: list, show.

use clap::Subcommand;
use serde::Serialize;
use uuid::Uuid;

use crate::compliance;
use crate::config::Config;
use crate::model::{LogLine, Trip};
use crate::storage::Storage;

use super::format;

#[derive(Debug, Subcommand)]
pub enum TripCommand {
    /// List saved trips, oldest first.
    List,

    /// Show a saved trip's log.
    Show {
        /// Trip ID: full UUID or unambiguous prefix (e.g. `a3b`).
        trip: String,

        /// Print the trip and its log as JSON.
        #[arg(long)]
        json: bool,
    },
}

/// A saved trip as printed by `trip show --json`.
#[derive(Serialize)]
struct TripDocument<'a> {
    trip: &'a Trip,
    lines: &'a [LogLine],
    hos_compliant: bool,
    violations: &'a [compliance::Violation],
}

pub(super) fn run(config: &Config, storage: &Storage, command: TripCommand) -> Result<(), String> {
    match command {
        TripCommand::List => cmd_list(storage),
        TripCommand::Show { trip, json } => {
            let trip = resolve_trip(storage, &trip)?;
            cmd_show(config, storage, &trip, json)
        }
    }
}

fn cmd_list(storage: &Storage) -> Result<(), String> {
    let trips = storage
        .list_trips()
        .map_err(|e| format!("failed to list trips: {e}"))?;

    if trips.is_empty() {
        println!("No trips");
        return Ok(());
    }

    for t in &trips {
        let verdict = if t.is_compliant() {
            "compliant"
        } else {
            "violations"
        };
        println!(
            "{}  {}  [{verdict}]  {} → {} → {}  ({:.0} mi)",
            t.short_id(),
            t.start_date,
            t.current_location,
            t.pickup_location,
            t.dropoff_location,
            t.total_miles
        );
    }

    Ok(())
}

fn cmd_show(config: &Config, storage: &Storage, trip: &Trip, json: bool) -> Result<(), String> {
    let entries = storage
        .load_entries(trip.id)
        .map_err(|e| format!("failed to load log: {e}"))?;
    let audit = compliance::audit(&entries, config.plan_options().rules);

    if json {
        let doc = TripDocument {
            trip,
            lines: &audit.lines,
            hos_compliant: audit.is_compliant(),
            violations: &audit.violations,
        };
        let json = serde_json::to_string_pretty(&doc)
            .map_err(|e| format!("failed to serialize trip: {e}"))?;
        println!("{json}");
        return Ok(());
    }

    println!(
        "Trip {}: {} → {} → {}",
        trip.short_id(),
        trip.current_location,
        trip.pickup_location,
        trip.dropoff_location
    );
    println!(
        "Started {} with {:.1} cycle hours{}",
        trip.start_date,
        trip.current_cycle_hours,
        if trip.use_sleeper_berth {
            ", sleeper berth"
        } else {
            ""
        }
    );
    println!();
    print!("{}", format::format_log(&audit.lines, &audit.violations));
    Ok(())
}

/// Resolve a trip reference (full UUID or unambiguous prefix).
fn resolve_trip(storage: &Storage, reference: &str) -> Result<Trip, String> {
    // Try full UUID first.
    if let Ok(id) = reference.parse::<Uuid>() {
        return storage
            .load_trip(id)
            .map_err(|e| format!("trip not found: {e}"));
    }

    // Try as a prefix match against all trips.
    let trips = storage
        .list_trips()
        .map_err(|e| format!("failed to list trips: {e}"))?;
    let matches: Vec<&Trip> = trips
        .iter()
        .filter(|t| t.id.to_string().starts_with(reference))
        .collect();

    match matches.as_slice() {
        [] => Err(format!("no trip matching '{reference}'")),
        [trip] => Ok((*trip).clone()),
        many => {
            let ids: Vec<String> = many.iter().map(|t| t.short_id()).collect();
            Err(format!(
                "'{reference}' is ambiguous: matches {} trips: {}",
                many.len(),
                ids.join(", ")
            ))
        }
    }
}
