//! Parsed route geometry: the renderable path and its guidance steps.

use crate::geo::Coordinate;

/// One human-readable guidance entry along a route.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteStep {
    /// 1-based display index.
    pub index: usize,
    pub instruction: String,
    /// Distance of the sub-leg this step covers, in meters, when the
    /// service reports one.
    pub leg_distance_m: Option<f64>,
}

/// A walking route from origin to destination.
///
/// `points` is the polyline; when non-empty it has at least two entries.
/// Totals come from the routing service, not from summing legs.
#[derive(Debug, Clone, Default)]
pub struct RoutePath {
    pub points: Vec<Coordinate>,
    pub steps: Vec<RouteStep>,
    pub total_distance_m: f64,
    pub total_duration_s: f64,
}

impl RoutePath {
    /// True when the service produced no usable geometry ("no route
    /// available", not an error).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.len() < 2
    }

    #[must_use]
    pub fn distance_km(&self) -> f64 {
        self.total_distance_m / 1000.0
    }

    /// Duration in whole minutes, rounded up.
    #[must_use]
    pub fn duration_minutes(&self) -> u64 {
        let minutes = (self.total_duration_s / 60.0).ceil();
        if minutes.is_sign_negative() {
            0
        } else {
            minutes as u64
        }
    }
}
