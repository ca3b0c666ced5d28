//! # Home Location
//!
//! Resolves the point the flight plan takes off from and returns to.
//!
//! The home comes from a user override (`"lon,lat"` or `"lon,lat,alt"`) or
//! from the plan's planned home position. Unless the override fixes it, the
//! flying altitude at home is taken from the first navigation waypoint, since
//! the planned home altitude is ground level rather than a flying altitude.

use std::str::FromStr;
use tracing::debug;

use crate::error::{PlanToWplError, Result};
use crate::plan::Mission;

/// User supplied home position, `lon, lat[, alt]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HomeOverride {
    pub longitude: f64,
    pub latitude: f64,
    pub altitude: Option<f64>,
}

impl HomeOverride {
    /// Build an override from 2 (`[lon, lat]`) or 3 (`[lon, lat, alt]`) values
    ///
    /// # Errors
    ///
    /// Returns `InvalidHomeOverride` for any other count or non-finite values
    pub fn from_values(values: &[f64]) -> Result<Self> {
        if values.iter().any(|value| !value.is_finite()) {
            return Err(invalid_override(values));
        }

        match *values {
            [longitude, latitude] => Ok(Self {
                longitude,
                latitude,
                altitude: None,
            }),
            [longitude, latitude, altitude] => Ok(Self {
                longitude,
                latitude,
                altitude: Some(altitude),
            }),
            _ => Err(invalid_override(values)),
        }
    }
}

impl FromStr for HomeOverride {
    type Err = PlanToWplError;

    /// Parse `"lon,lat"` or `"lon,lat,alt"`; whitespace around values is ignored
    fn from_str(s: &str) -> Result<Self> {
        let values = s
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| {
                PlanToWplError::InvalidHomeOverride(format!(
                    "expected \"lon,lat\" or \"lon,lat,alt\", got \"{}\" ({})",
                    s, e
                ))
            })?;

        Self::from_values(&values)
    }
}

fn invalid_override(values: &[f64]) -> PlanToWplError {
    PlanToWplError::InvalidHomeOverride(format!(
        "expected 2 or 3 finite values (lon, lat[, alt]), got {:?}",
        values
    ))
}

/// Resolved home, shared by the first and last waypoint of the flight plan
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HomeLocation {
    pub longitude: f64,
    pub latitude: f64,
    pub altitude: f64,
}

/// Resolve the home location for a mission
///
/// # Errors
///
/// - `MissingHome` if there is no override and no planned home position
/// - `NoWaypoint` if the altitude must be backfilled but the mission has no
///   navigation waypoint
pub fn resolve_home(mission: &Mission, home_override: Option<&HomeOverride>) -> Result<HomeLocation> {
    let (longitude, latitude, fixed_altitude) = match (home_override, mission.planned_home) {
        (Some(home), _) => (home.longitude, home.latitude, home.altitude),
        (None, Some(planned)) => (planned.longitude, planned.latitude, None),
        (None, None) => return Err(PlanToWplError::MissingHome),
    };

    let altitude = match fixed_altitude {
        Some(altitude) => altitude,
        None => mission
            .first_waypoint()
            .map(|waypoint| waypoint.altitude())
            .ok_or(PlanToWplError::NoWaypoint)?,
    };

    debug!(
        "Home resolved to lon {}, lat {}, alt {} ({})",
        longitude,
        latitude,
        altitude,
        if home_override.is_some() { "override" } else { "planned home" }
    );

    Ok(HomeLocation {
        longitude,
        latitude,
        altitude,
    })
}
