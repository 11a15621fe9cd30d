//! Search orchestration and presentation seams for the shelter assistant.
//!
//! The binary (`main.rs`) wires these against the console and a logging map
//! surface; integration tests wire them against recording fakes and a
//! wiremock backend.

pub mod geoloc;
pub mod presenter;
pub mod search;
pub mod surface;

pub use geoloc::{FixedPosition, GeoProvider, GeolocationError};
pub use presenter::{ConsolePresenter, Presenter, Role, RouteSummary};
pub use search::{BackendMode, SearchOrchestrator};
pub use surface::LogSurface;
