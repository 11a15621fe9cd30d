//! A map surface that renders to the log.
//!
//! The real map widget lives outside this repository; the CLI drives the
//! same overlay contract against structured log lines so the lifecycle is
//! observable in a terminal session.

use std::sync::atomic::{AtomicU64, Ordering};

use shelternav_core::Coordinate;
use shelternav_map::{Facing, MapSurface, MarkerKind, OverlayId, PolylineStyle};

/// Logs every overlay operation via `tracing`.
#[derive(Default)]
pub struct LogSurface {
    next_id: AtomicU64,
}

impl LogSurface {
    fn mint(&self) -> OverlayId {
        OverlayId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

impl MapSurface for LogSurface {
    fn add_marker(&self, position: Coordinate, kind: MarkerKind, label: &str) -> OverlayId {
        let id = self.mint();
        tracing::info!(
            id = id.0,
            ?kind,
            label,
            lat = position.lat(),
            lon = position.lon(),
            "add marker"
        );
        id
    }

    fn add_polyline(&self, points: &[Coordinate], style: PolylineStyle) -> OverlayId {
        let id = self.mint();
        tracing::info!(id = id.0, ?style, points = points.len(), "add polyline");
        id
    }

    fn move_overlay(&self, id: OverlayId, position: Coordinate) {
        tracing::trace!(
            id = id.0,
            lat = position.lat(),
            lon = position.lon(),
            "move overlay"
        );
    }

    fn set_facing(&self, id: OverlayId, facing: Facing) {
        tracing::trace!(id = id.0, ?facing, "set facing");
    }

    fn remove_overlay(&self, id: OverlayId) {
        tracing::info!(id = id.0, "remove overlay");
    }

    fn fit_bounds(&self, points: &[Coordinate]) {
        tracing::info!(points = points.len(), "fit bounds");
    }
}
