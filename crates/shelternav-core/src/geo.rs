//! Coordinates and great-circle distance.
//!
//! `Coordinate` is a validated immutable value type; construction rejects
//! non-finite or out-of-range components rather than coercing them.
//! Distance uses the haversine formula with the 6371 km mean Earth radius.

use serde::{Deserialize, Serialize};
use thiserror::Error;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Errors from coordinate construction or route geometry.
#[derive(Debug, Error)]
pub enum GeoError {
    #[error("invalid coordinate: lat={lat}, lon={lon} (expected lat in [-90,90], lon in [-180,180], both finite)")]
    InvalidCoordinate { lat: f64, lon: f64 },
}

/// A WGS-84 point. Latitude in [-90, 90], longitude in [-180, 180].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    lat: f64,
    lon: f64,
}

impl Coordinate {
    /// Builds a coordinate, rejecting non-finite or out-of-range values.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::InvalidCoordinate`] if either component is not
    /// finite, `lat` is outside [-90, 90], or `lon` is outside [-180, 180].
    pub fn new(lat: f64, lon: f64) -> Result<Self, GeoError> {
        if !lat.is_finite() || !lon.is_finite() || lat.abs() > 90.0 || lon.abs() > 180.0 {
            return Err(GeoError::InvalidCoordinate { lat, lon });
        }
        Ok(Self { lat, lon })
    }

    #[must_use]
    pub fn lat(&self) -> f64 {
        self.lat
    }

    #[must_use]
    pub fn lon(&self) -> f64 {
        self.lon
    }
}

/// Great-circle distance between two coordinates in kilometers (haversine).
///
/// Symmetric; zero (within floating epsilon) iff `a == b`.
#[must_use]
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    EARTH_RADIUS_KM * 2.0 * h.sqrt().atan2((1.0 - h).sqrt())
}
