//! Application configuration shared by the CLI and its collaborators.

/// Runtime configuration, loaded from `SHELTERNAV_*` environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the assistant backend (status / extract / nearest /
    /// directions endpoints).
    pub api_base_url: String,
    pub log_level: String,
    pub request_timeout_secs: u64,
    /// How many nearest shelters to request per search.
    pub nearest_k: usize,
    /// Animation tick interval for the moving route indicator.
    pub animation_tick_ms: u64,
    /// Fixed device position for the CLI geolocation provider. `None`
    /// means the device has no position source.
    pub device_position: Option<(f64, f64)>,
}
