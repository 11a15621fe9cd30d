//! Wire types for the assistant backend.
//!
//! ## Observed shapes
//!
//! ### `/api/location/extract`
//! `coordinates` is a `[lat, lon]` pair (latitude first — unlike the
//! directions endpoint). `intent`, `tool_used`, and `message` are all
//! optional; text-only answers come back with `success: true`, an empty
//! shelter list, and no coordinates.
//!
//! ### `/api/shelters/nearest`
//! Shelter records carry a server-computed `distance` field. It is relative
//! to the queried origin and is ignored here — ranking is a client
//! responsibility.
//!
//! ### `/api/directions`
//! A GeoJSON-style feature collection from the pedestrian routing proxy.
//! Coordinate pairs are `(longitude, latitude)` order. `totalDistance`
//! (meters) and `totalTime` (seconds) appear once, on whichever feature the
//! service attaches the aggregate to.

use serde::{Deserialize, Serialize};

use shelternav_core::{Coordinate, GeoError, Shelter};

/// Response from `GET /api/status`.
#[derive(Debug, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub server_ready: bool,
    #[serde(default)]
    pub llm_available: bool,
    #[serde(default)]
    pub shelter_data_ready: bool,
    #[serde(default)]
    pub total_shelters: u64,
}

/// Request body for `POST /api/location/extract`.
#[derive(Debug, Serialize)]
pub struct ExtractRequest<'a> {
    pub query: &'a str,
    pub use_llm: bool,
}

/// Response from `POST /api/location/extract`.
#[derive(Debug, Deserialize)]
pub struct ExtractResponse {
    pub success: bool,
    #[serde(default)]
    pub location: Option<String>,
    /// `[lat, lon]` of the extracted place, when one was found.
    #[serde(default)]
    pub coordinates: Option<[f64; 2]>,
    #[serde(default)]
    pub shelters: Vec<WireShelter>,
    #[serde(default)]
    pub intent: Option<String>,
    #[serde(default)]
    pub tool_used: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Response from `GET /api/shelters/nearest`.
#[derive(Debug, Deserialize)]
pub struct NearestResponse {
    #[serde(default)]
    pub shelters: Vec<WireShelter>,
}

/// A shelter record as the backend sends it.
#[derive(Debug, Clone, Deserialize)]
pub struct WireShelter {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub address: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub capacity: u32,
    /// Server-side distance from the queried origin; ignored (ranking is
    /// recomputed client-side).
    #[serde(default)]
    pub distance: Option<f64>,
}

impl WireShelter {
    /// Converts to the domain type, validating the coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::InvalidCoordinate`] when the record carries an
    /// out-of-range or non-finite position.
    pub fn into_shelter(self) -> Result<Shelter, GeoError> {
        Ok(Shelter {
            coordinate: Coordinate::new(self.lat, self.lon)?,
            id: self.id,
            name: self.name,
            address: self.address,
            capacity: self.capacity,
            distance_km: None,
        })
    }
}

/// Feature collection from `GET /api/directions`.
#[derive(Debug, Deserialize, Default)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
pub struct Feature {
    pub geometry: Geometry,
    #[serde(default)]
    pub properties: FeatureProperties,
}

/// Geometry of one directions feature. Line runs carry path coordinates;
/// points carry guidance properties.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    LineString {
        /// `(lon, lat)` pairs in path order.
        coordinates: Vec<[f64; 2]>,
    },
    Point {
        /// `(lon, lat)` of the guidance point.
        coordinates: [f64; 2],
    },
}

#[derive(Debug, Deserialize, Default)]
pub struct FeatureProperties {
    /// Guidance text of a point feature ("turn left at ...").
    #[serde(default)]
    pub description: Option<String>,
    /// Sub-leg distance in meters for the step this point starts.
    #[serde(default)]
    pub distance: Option<f64>,
    /// Aggregate route distance in meters; present once per response.
    #[serde(default, rename = "totalDistance")]
    pub total_distance: Option<f64>,
    /// Aggregate route duration in seconds; present once per response.
    #[serde(default, rename = "totalTime")]
    pub total_time: Option<f64>,
}
