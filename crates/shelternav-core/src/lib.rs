pub mod app_config;
pub mod config;
pub mod geo;
pub mod intent;
pub mod route;
pub mod shelter;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use geo::{distance_km, Coordinate, GeoError};
pub use intent::should_show_directions;
pub use route::{RoutePath, RouteStep};
pub use shelter::{rank, SearchResult, Shelter};

use thiserror::Error;

/// Errors from loading application configuration.
///
/// Every `SHELTERNAV_*` variable has a default, so the only way loading
/// fails is a present-but-unparseable value.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
