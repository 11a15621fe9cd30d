//! Overlay lifecycle management.
//!
//! Exactly one generation of overlays is visible at a time. The manager is
//! the sole owner of overlay handles; replacement is always
//! remove-then-add (or remove-with-add) per category, so repeated searches
//! can never accumulate stale markers or route lines — the dominant bug
//! class this module exists to rule out.

use std::sync::Arc;
use std::time::Duration;

use shelternav_core::{Coordinate, RoutePath, Shelter};

use crate::animate::AnimatorHandle;
use crate::surface::{MapSurface, MarkerKind, OverlayId, PolylineStyle};

/// Owns every live overlay: the user/search-location marker, the shelter
/// marker set, the route unit (line + outline + start/end markers), and the
/// moving indicator's animation.
pub struct OverlayManager {
    surface: Arc<dyn MapSurface>,
    animation_tick: Duration,
    user_marker: Option<OverlayId>,
    user_position: Option<Coordinate>,
    shelter_markers: Vec<OverlayId>,
    route_line: Option<OverlayId>,
    route_outline: Option<OverlayId>,
    route_endpoint_markers: Vec<OverlayId>,
    animator: Option<AnimatorHandle>,
}

impl OverlayManager {
    #[must_use]
    pub fn new(surface: Arc<dyn MapSurface>, animation_tick: Duration) -> Self {
        Self {
            surface,
            animation_tick,
            user_marker: None,
            user_position: None,
            shelter_markers: Vec::new(),
            route_line: None,
            route_outline: None,
            route_endpoint_markers: Vec::new(),
            animator: None,
        }
    }

    /// Removes every tracked overlay and stops any running animation.
    /// Idempotent; safe with nothing active.
    pub fn reset_all(&mut self) {
        self.stop_indicator();
        self.clear_route_unit();
        self.clear_shelter_markers();
        if let Some(id) = self.user_marker.take() {
            self.surface.remove_overlay(id);
        }
        self.user_position = None;
        tracing::debug!("overlays reset");
    }

    /// Replaces the user/search-location marker. At most one exists.
    pub fn set_user_marker(&mut self, position: Coordinate, label: &str) {
        if let Some(id) = self.user_marker.take() {
            self.surface.remove_overlay(id);
        }
        self.user_marker = Some(self.surface.add_marker(position, MarkerKind::User, label));
        self.user_position = Some(position);
    }

    /// Replaces the shelter marker set atomically: the old set is fully
    /// removed before the new one goes up, never both at once.
    ///
    /// Fits the viewport over the new markers plus the user position.
    pub fn set_shelter_markers(&mut self, shelters: &[Shelter]) {
        self.clear_shelter_markers();
        let mut bounds: Vec<Coordinate> = Vec::with_capacity(shelters.len() + 1);
        if let Some(origin) = self.user_position {
            bounds.push(origin);
        }
        for shelter in shelters {
            let id = self
                .surface
                .add_marker(shelter.coordinate, MarkerKind::Shelter, &shelter.name);
            self.shelter_markers.push(id);
            bounds.push(shelter.coordinate);
        }
        if !bounds.is_empty() {
            self.surface.fit_bounds(&bounds);
        }
    }

    /// Replaces the route as one unit: outline, line, and start/end markers
    /// all go together — a partial route (line without markers, or the
    /// reverse) never exists. Any running indicator is stopped first.
    ///
    /// An empty path clears the route instead of drawing one.
    pub fn set_route(&mut self, path: &RoutePath) {
        self.stop_indicator();
        self.clear_route_unit();
        if path.is_empty() {
            return;
        }

        // Outline under line: draw order matters on the widget side.
        self.route_outline = Some(
            self.surface
                .add_polyline(&path.points, PolylineStyle::RouteOutline),
        );
        self.route_line = Some(
            self.surface
                .add_polyline(&path.points, PolylineStyle::RouteLine),
        );

        let start = path.points[0];
        let end = path.points[path.points.len() - 1];
        self.route_endpoint_markers
            .push(self.surface.add_marker(start, MarkerKind::RouteStart, "S"));
        self.route_endpoint_markers
            .push(self.surface.add_marker(end, MarkerKind::RouteEnd, "E"));

        self.surface.fit_bounds(&path.points);
        tracing::debug!(points = path.points.len(), "route drawn");
    }

    /// Starts the moving indicator along `path`, stopping any previous
    /// animation first. Empty paths only stop.
    pub fn start_indicator(&mut self, path: &RoutePath) {
        self.stop_indicator();
        self.animator = AnimatorHandle::spawn(
            Arc::clone(&self.surface),
            path.points.clone(),
            self.animation_tick,
        );
    }

    /// Stops the animation and removes the indicator, if one is running.
    pub fn stop_indicator(&mut self) {
        if let Some(animator) = self.animator.take() {
            animator.stop(self.surface.as_ref());
        }
    }

    /// True while an indicator animation is running.
    #[must_use]
    pub fn indicator_running(&self) -> bool {
        self.animator.as_ref().is_some_and(|a| !a.is_finished())
    }

    fn clear_shelter_markers(&mut self) {
        for id in self.shelter_markers.drain(..) {
            self.surface.remove_overlay(id);
        }
    }

    fn clear_route_unit(&mut self) {
        if let Some(id) = self.route_line.take() {
            self.surface.remove_overlay(id);
        }
        if let Some(id) = self.route_outline.take() {
            self.surface.remove_overlay(id);
        }
        for id in self.route_endpoint_markers.drain(..) {
            self.surface.remove_overlay(id);
        }
    }
}

impl Drop for OverlayManager {
    fn drop(&mut self) {
        self.stop_indicator();
    }
}
