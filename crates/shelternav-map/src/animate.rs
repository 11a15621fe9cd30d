//! The moving route indicator.
//!
//! A repeating timer task walks the indicator along the route path point by
//! point, wrapping at the end and looping until stopped. Orientation follows
//! travel direction: a westward segment mirrors the indicator.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use shelternav_core::Coordinate;

use crate::surface::{Facing, MapSurface, MarkerKind, OverlayId};

/// A running indicator animation: the spawned timer task plus the indicator
/// overlay it drives. At most one of these exists at a time; the overlay
/// manager enforces that by stopping the previous handle before spawning a
/// new one.
pub struct AnimatorHandle {
    task: JoinHandle<()>,
    indicator: OverlayId,
}

impl AnimatorHandle {
    /// Places an indicator at the path start and spawns the tick loop.
    ///
    /// Returns `None` for paths with fewer than two points — there is
    /// nothing to walk along.
    #[must_use]
    pub fn spawn(
        surface: Arc<dyn MapSurface>,
        points: Vec<Coordinate>,
        tick: Duration,
    ) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }
        let indicator = surface.add_marker(points[0], MarkerKind::Indicator, "");
        tracing::debug!(points = points.len(), ?tick, "starting route indicator");
        let task = tokio::spawn(run_loop(surface, indicator, points, tick));
        Some(Self { task, indicator })
    }

    /// Cancels the timer task and removes the indicator overlay.
    pub fn stop(self, surface: &dyn MapSurface) {
        self.task.abort();
        surface.remove_overlay(self.indicator);
        tracing::debug!("stopped route indicator");
    }

    #[must_use]
    pub fn indicator(&self) -> OverlayId {
        self.indicator
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

async fn run_loop(
    surface: Arc<dyn MapSurface>,
    indicator: OverlayId,
    points: Vec<Coordinate>,
    tick: Duration,
) {
    let mut interval = tokio::time::interval(tick);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut cursor = 0usize;
    loop {
        interval.tick().await;
        // Wrap before reading: cursor + 1 must stay in bounds.
        if cursor >= points.len() - 1 {
            cursor = 0;
        }
        let current = points[cursor];
        let next = points[cursor + 1];
        let facing = if next.lon() < current.lon() {
            Facing::Left
        } else {
            Facing::Right
        };
        surface.move_overlay(indicator, current);
        surface.set_facing(indicator, facing);
        cursor += 1;
    }
}
