//! The rendering seam between overlay logic and the map widget.
//!
//! The widget itself (pixel rendering, click handling) is an external
//! collaborator. Overlay code only decides which overlays exist, where they
//! are, and which way the moving indicator faces; it drives those decisions
//! through this trait and never holds widget internals.

use shelternav_core::Coordinate;

/// Opaque handle to one overlay the surface is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OverlayId(pub u64);

/// What a marker represents, so the surface can pick an icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    /// The user's position or the searched location.
    User,
    /// A shelter candidate.
    Shelter,
    /// Route start ("S").
    RouteStart,
    /// Route end ("E").
    RouteEnd,
    /// The moving walking indicator.
    Indicator,
}

/// Which polyline of the route pair this is. The outline is drawn under the
/// line as a shadow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolylineStyle {
    RouteLine,
    RouteOutline,
}

/// Horizontal orientation of the walking indicator. `Left` means the
/// indicator is mirrored because the path is heading westward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    Left,
    Right,
}

/// Primitive overlay operations a map widget must provide.
///
/// Implementations use interior mutability; methods take `&self` so the
/// surface can be shared with the animator task behind an `Arc`.
pub trait MapSurface: Send + Sync {
    fn add_marker(&self, position: Coordinate, kind: MarkerKind, label: &str) -> OverlayId;

    fn add_polyline(&self, points: &[Coordinate], style: PolylineStyle) -> OverlayId;

    fn move_overlay(&self, id: OverlayId, position: Coordinate);

    fn set_facing(&self, id: OverlayId, facing: Facing);

    fn remove_overlay(&self, id: OverlayId);

    /// Hint: adjust the viewport so all `points` are visible.
    fn fit_bounds(&self, points: &[Coordinate]);
}
