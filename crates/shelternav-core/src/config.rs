//! Environment-variable configuration loading.

use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value fails to parse.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the
/// process. Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value fails to parse.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup
/// function. Decoupled from the real environment so tests can drive it with
/// a pure map lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_f64 = |var: &str| -> Result<Option<f64>, ConfigError> {
        match lookup(var) {
            Ok(raw) => raw
                .parse::<f64>()
                .map(Some)
                .map_err(|e| ConfigError::InvalidEnvVar {
                    var: var.to_string(),
                    reason: e.to_string(),
                }),
            Err(_) => Ok(None),
        }
    };

    let api_base_url = or_default("SHELTERNAV_API_BASE_URL", "http://127.0.0.1:8001");
    let log_level = or_default("SHELTERNAV_LOG_LEVEL", "info");
    let request_timeout_secs = parse_u64("SHELTERNAV_REQUEST_TIMEOUT_SECS", "30")?;
    let nearest_k = parse_usize("SHELTERNAV_NEAREST_K", "5")?;
    let animation_tick_ms = parse_u64("SHELTERNAV_ANIMATION_TICK_MS", "200")?;

    // Both must be present for a device position; one without the other is
    // a configuration mistake worth failing on.
    let lat = parse_f64("SHELTERNAV_DEVICE_LAT")?;
    let lon = parse_f64("SHELTERNAV_DEVICE_LON")?;
    let device_position = match (lat, lon) {
        (Some(lat), Some(lon)) => Some((lat, lon)),
        (None, None) => None,
        _ => {
            return Err(ConfigError::InvalidEnvVar {
                var: "SHELTERNAV_DEVICE_LAT/SHELTERNAV_DEVICE_LON".to_string(),
                reason: "set both or neither".to_string(),
            })
        }
    };

    Ok(AppConfig {
        api_base_url,
        log_level,
        request_timeout_secs,
        nearest_k,
        animation_tick_ms,
        device_position,
    })
}
