//! Leg distances and durations.
//!
//! Routing itself is an outside concern. This module defines the seam a
//! routing backend plugs into and a great-circle fallback used when no
//! backend answers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

const EARTH_RADIUS_MILES: f64 = 3958.8;

/// Errors from parsing coordinates or asking a backend for a route.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum RouteError {
    #[error("invalid coordinates '{0}': expected LAT,LON")]
    BadCoordinates(String),

    #[error("latitude {0} out of range")]
    LatitudeOutOfRange(f64),

    #[error("longitude {0} out of range")]
    LongitudeOutOfRange(f64),

    #[error("routing unavailable: {0}")]
    Unavailable(String),
}

/// A point on the globe, in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Result<Self, RouteError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(RouteError::LatitudeOutOfRange(lat));
        }
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(RouteError::LongitudeOutOfRange(lon));
        }
        Ok(Self { lat, lon })
    }

    /// Great-circle distance in miles.
    pub fn miles_to(self, other: Self) -> f64 {
        let (lat1, lat2) = (self.lat.to_radians(), other.lat.to_radians());
        let dlat = lat2 - lat1;
        let dlon = (other.lon - self.lon).to_radians();
        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_MILES * a.sqrt().asin()
    }
}

impl FromStr for Coordinates {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || RouteError::BadCoordinates(s.to_string());
        let (lat, lon) = s.split_once(',').ok_or_else(bad)?;
        let lat = lat.trim().parse::<f64>().map_err(|_| bad())?;
        let lon = lon.trim().parse::<f64>().map_err(|_| bad())?;
        Self::new(lat, lon)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4},{:.4}", self.lat, self.lon)
    }
}

/// One travel leg.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Leg {
    pub miles: f64,
    /// Transit time reported by a routing backend, if any.
    #[serde(default)]
    pub minutes: Option<i64>,
}

impl Leg {
    pub fn from_miles(miles: f64) -> Self {
        Self {
            miles,
            minutes: None,
        }
    }

    /// Minutes spent driving this leg.
    ///
    /// Uses the backend's duration when `use_route_duration` is set and
    /// one is known, otherwise whole minutes at `speed_mph`.
    pub fn drive_minutes(&self, speed_mph: f64, use_route_duration: bool) -> i64 {
        match self.minutes {
            Some(minutes) if use_route_duration => minutes,
            _ => (self.miles * 60.0 / speed_mph).floor() as i64,
        }
    }
}

/// A source of road distances and durations.
pub trait RouteProvider {
    fn route(&self, from: Coordinates, to: Coordinates) -> Result<Leg, RouteError>;
}

/// Great-circle distance with no duration.
#[derive(Debug, Clone, Copy, Default)]
pub struct StraightLine;

impl RouteProvider for StraightLine {
    fn route(&self, from: Coordinates, to: Coordinates) -> Result<Leg, RouteError> {
        Ok(Leg::from_miles(from.miles_to(to)))
    }
}

/// Ask `provider` for a leg, falling back to straight-line distance.
pub fn resolve_leg(provider: &dyn RouteProvider, from: Coordinates, to: Coordinates) -> Leg {
    match provider.route(from, to) {
        Ok(leg) => leg,
        Err(e) => {
            warn!(%from, %to, error = %e, "routing failed, using straight-line distance");
            Leg::from_miles(from.miles_to(to))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Offline;

    impl RouteProvider for Offline {
        fn route(&self, _: Coordinates, _: Coordinates) -> Result<Leg, RouteError> {
            Err(RouteError::Unavailable("no network".into()))
        }
    }

    fn green_bay() -> Coordinates {
        Coordinates::new(44.5133, -88.0133).unwrap()
    }

    fn chicago() -> Coordinates {
        Coordinates::new(41.8781, -87.6298).unwrap()
    }

    #[test]
    fn parses_lat_lon() {
        let c: Coordinates = "44.5133, -88.0133".parse().unwrap();
        assert!((c.lat - 44.5133).abs() < 1e-9);
        assert!((c.lon + 88.0133).abs() < 1e-9);
    }

    #[test]
    fn rejects_malformed_coordinates() {
        let err = "44.5".parse::<Coordinates>().unwrap_err();
        assert!(matches!(err, RouteError::BadCoordinates(_)));

        let err = "95,10".parse::<Coordinates>().unwrap_err();
        assert!(matches!(err, RouteError::LatitudeOutOfRange(_)));
    }

    #[test]
    fn great_circle_distance_is_plausible() {
        let miles = green_bay().miles_to(chicago());
        assert!((175.0..190.0).contains(&miles), "{miles}");
        assert!(chicago().miles_to(chicago()).abs() < 1e-9);
    }

    #[test]
    fn failing_provider_falls_back() {
        let leg = resolve_leg(&Offline, green_bay(), chicago());
        assert!(leg.minutes.is_none());
        assert!((leg.miles - green_bay().miles_to(chicago())).abs() < 1e-9);
    }

    #[test]
    fn drive_minutes_prefers_route_duration_when_enabled() {
        let leg = Leg {
            miles: 90.0,
            minutes: Some(100),
        };
        assert_eq!(leg.drive_minutes(60.0, true), 100);
        assert_eq!(leg.drive_minutes(60.0, false), 90);
        assert_eq!(Leg::from_miles(59.9).drive_minutes(60.0, true), 59);
    }
}
