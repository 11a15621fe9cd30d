//! Shelter records and distance ranking.

use serde::{Deserialize, Serialize};

use crate::geo::{distance_km, Coordinate};

/// An emergency shelter candidate.
///
/// `distance_km` is derived data: it is `None` until the shelter has been
/// ranked against a specific origin, and is only meaningful relative to the
/// origin that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shelter {
    pub id: Option<String>,
    pub name: String,
    pub address: String,
    pub capacity: u32,
    pub coordinate: Coordinate,
    pub distance_km: Option<f64>,
}

/// One completed search: an origin, its label, and shelters ranked by
/// ascending distance from that origin.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub origin: Coordinate,
    pub origin_label: String,
    /// Ascending by `distance_km`; ties keep input order.
    pub shelters: Vec<Shelter>,
    /// Classification label from the intent service, if any.
    pub intent: Option<String>,
    /// Lookup strategy the intent service applied, if any.
    pub tool_used: Option<String>,
}

impl SearchResult {
    /// The minimum-distance shelter, if the search produced any.
    #[must_use]
    pub fn nearest(&self) -> Option<&Shelter> {
        self.shelters.first()
    }
}

/// Annotates each shelter with its distance from `origin` and sorts
/// ascending. The sort is stable, so equal distances keep input order.
/// Empty input produces empty output.
#[must_use]
pub fn rank(origin: Coordinate, mut shelters: Vec<Shelter>) -> Vec<Shelter> {
    for shelter in &mut shelters {
        shelter.distance_km = Some(distance_km(origin, shelter.coordinate));
    }
    // distance_km is always Some and finite here, so total_cmp is safe and
    // keeps the sort stable.
    shelters.sort_by(|a, b| {
        a.distance_km
            .unwrap_or(f64::MAX)
            .total_cmp(&b.distance_km.unwrap_or(f64::MAX))
    });
    shelters
}
