//! The device geolocation seam.
//!
//! Real deployments back this with a platform position source; the CLI uses
//! a fixed position from configuration. Error variants mirror the usual
//! provider error codes so failures surface as specific messages rather
//! than a silent hang.

use std::future::Future;

use thiserror::Error;

use shelternav_core::Coordinate;

/// Failures from the device position source.
#[derive(Debug, Error)]
pub enum GeolocationError {
    /// No position source exists on this device.
    #[error("geolocation is not supported on this device")]
    Unsupported,

    /// The user denied the position request (provider code 1).
    #[error("position permission denied (code 1)")]
    Denied,

    /// The provider could not determine a position (provider code 2).
    #[error("position unavailable (code 2): {0}")]
    Unavailable(String),

    /// The position request timed out (provider code 3).
    #[error("position request timed out (code 3)")]
    Timeout,
}

/// Asynchronous device position source.
pub trait GeoProvider: Send + Sync {
    /// Resolves the device's current position.
    ///
    /// # Errors
    ///
    /// Returns a [`GeolocationError`] describing why no position is
    /// available; callers surface it as a user-facing message.
    fn current_position(
        &self,
    ) -> impl Future<Output = Result<Coordinate, GeolocationError>> + Send;
}

/// A provider that always reports one configured position, or
/// [`GeolocationError::Unsupported`] when none was configured.
pub struct FixedPosition {
    position: Option<(f64, f64)>,
}

impl FixedPosition {
    #[must_use]
    pub fn new(position: Option<(f64, f64)>) -> Self {
        Self { position }
    }
}

impl GeoProvider for FixedPosition {
    fn current_position(
        &self,
    ) -> impl Future<Output = Result<Coordinate, GeolocationError>> + Send {
        let position = self.position;
        async move {
            let (lat, lon) = position.ok_or(GeolocationError::Unsupported)?;
            Coordinate::new(lat, lon)
                .map_err(|e| GeolocationError::Unavailable(e.to_string()))
        }
    }
}
