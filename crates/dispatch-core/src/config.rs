use crate::app_config::{AppConfig, Endpoints, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but malformed.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but malformed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Core parsing/validation, decoupled from the process environment so it can
/// be tested with a `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_url = |var: &str, default: &str| -> Result<String, ConfigError> {
        let raw = or_default(var, default);
        if raw.starts_with("http://") || raw.starts_with("https://") {
            Ok(raw.trim_end_matches('/').to_string())
        } else {
            Err(invalid(var, "expected an http(s) URL".to_string()))
        }
    };

    let env = parse_environment(&or_default("DISPATCH_ENV", "development"));
    let bind_addr = parse_addr("DISPATCH_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("DISPATCH_LOG_LEVEL", "info");
    let user_agent = or_default(
        "DISPATCH_USER_AGENT",
        "dispatch-brief/0.1 (wildfire-dispatch)",
    );

    let provider_timeout_secs = parse_u64("DISPATCH_PROVIDER_TIMEOUT_SECS", "5")?;
    if provider_timeout_secs == 0 {
        return Err(invalid(
            "DISPATCH_PROVIDER_TIMEOUT_SECS",
            "must be greater than zero".to_string(),
        ));
    }
    let http_timeout_secs = parse_u64("DISPATCH_HTTP_TIMEOUT_SECS", "10")?;
    let provider_max_retries = parse_u32("DISPATCH_PROVIDER_MAX_RETRIES", "1")?;
    let retry_backoff_base_ms = parse_u64("DISPATCH_RETRY_BACKOFF_BASE_MS", "250")?;

    let google_maps_api_key = lookup("GOOGLE_MAPS_API_KEY")
        .ok()
        .filter(|k| !k.trim().is_empty());

    let defaults = Endpoints::default();
    let endpoints = Endpoints {
        bc_geocoder_url: parse_url("DISPATCH_BC_GEOCODER_URL", &defaults.bc_geocoder_url)?,
        nominatim_url: parse_url("DISPATCH_NOMINATIM_URL", &defaults.nominatim_url)?,
        directions_url: parse_url("DISPATCH_DIRECTIONS_URL", &defaults.directions_url)?,
        places_url: parse_url("DISPATCH_PLACES_URL", &defaults.places_url)?,
        places_nearby_url: parse_url("DISPATCH_PLACES_NEARBY_URL", &defaults.places_nearby_url)?,
        fires_url: parse_url("DISPATCH_FIRES_URL", &defaults.fires_url)?,
        weather_base_url: parse_url("DISPATCH_WEATHER_BASE_URL", &defaults.weather_base_url)?,
        first_nations_url: parse_url("DISPATCH_FIRST_NATIONS_URL", &defaults.first_nations_url)?,
        first_nations_alt_url: parse_url(
            "DISPATCH_FIRST_NATIONS_ALT_URL",
            &defaults.first_nations_alt_url,
        )?,
        road_events_url: parse_url("DISPATCH_ROAD_EVENTS_URL", &defaults.road_events_url)?,
        evacuation_url: parse_url("DISPATCH_EVACUATION_URL", &defaults.evacuation_url)?,
    };

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        user_agent,
        provider_timeout_secs,
        http_timeout_secs,
        provider_max_retries,
        retry_backoff_base_ms,
        google_maps_api_key,
        endpoints,
    })
}

/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
