//! Parses the directions feature collection into a renderable [`RoutePath`].

use shelternav_core::{Coordinate, GeoError, RoutePath, RouteStep};

use crate::types::{FeatureCollection, Geometry};

/// Builds a [`RoutePath`] from the routing service's feature collection.
///
/// Features are consumed in response order — it defines both path
/// continuity and step ordering:
/// - line features append their coordinates to the path, transposed from
///   the wire's `(lon, lat)` to internal `(lat, lon)`;
/// - point features carrying guidance text become 1-based-indexed steps
///   with their optional sub-leg distance;
/// - aggregate distance/time are taken from the first feature that exposes
///   them (the service reports the totals once, not per leg).
///
/// An empty or absent feature list produces an empty path: "no route
/// available", for the caller to render as a message, not an error.
///
/// # Errors
///
/// Returns [`GeoError::InvalidCoordinate`] when the service emits an
/// out-of-range or non-finite coordinate pair.
pub fn parse_route(collection: &FeatureCollection) -> Result<RoutePath, GeoError> {
    let mut path = RoutePath::default();
    let mut totals_seen = false;

    for feature in &collection.features {
        match &feature.geometry {
            Geometry::LineString { coordinates } => {
                for pair in coordinates {
                    path.points.push(Coordinate::new(pair[1], pair[0])?);
                }
            }
            Geometry::Point { .. } => {
                if let Some(description) = &feature.properties.description {
                    path.steps.push(RouteStep {
                        index: path.steps.len() + 1,
                        instruction: description.clone(),
                        leg_distance_m: feature.properties.distance,
                    });
                }
            }
        }

        if !totals_seen {
            if let Some(total_distance) = feature.properties.total_distance {
                path.total_distance_m = total_distance;
                path.total_duration_s = feature.properties.total_time.unwrap_or(0.0);
                totals_seen = true;
            }
        }
    }

    tracing::debug!(
        points = path.points.len(),
        steps = path.steps.len(),
        total_distance_m = path.total_distance_m,
        "parsed directions response"
    );
    Ok(path)
}
