use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn parse_environment_variants() {
    assert_eq!(parse_environment("development"), Environment::Development);
    assert_eq!(parse_environment("test"), Environment::Test);
    assert_eq!(parse_environment("production"), Environment::Production);
    assert_eq!(parse_environment("staging"), Environment::Development);
}

#[test]
fn empty_environment_yields_defaults() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:3000");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.user_agent, "dispatch-brief/0.1 (wildfire-dispatch)");
    assert_eq!(cfg.provider_timeout_secs, 5);
    assert_eq!(cfg.http_timeout_secs, 10);
    assert_eq!(cfg.provider_max_retries, 1);
    assert_eq!(cfg.retry_backoff_base_ms, 250);
    assert!(cfg.google_maps_api_key.is_none());
    assert_eq!(cfg.endpoints, Endpoints::default());
}

#[test]
fn invalid_bind_addr_is_rejected() {
    let mut map = HashMap::new();
    map.insert("DISPATCH_BIND_ADDR", "not-a-socket-addr");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "DISPATCH_BIND_ADDR"),
        "expected InvalidEnvVar(DISPATCH_BIND_ADDR), got: {result:?}"
    );
}

#[test]
fn provider_timeout_override_and_zero() {
    let mut map = HashMap::new();
    map.insert("DISPATCH_PROVIDER_TIMEOUT_SECS", "8");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.provider_timeout_secs, 8);

    map.insert("DISPATCH_PROVIDER_TIMEOUT_SECS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "DISPATCH_PROVIDER_TIMEOUT_SECS"),
        "got: {result:?}"
    );
}

#[test]
fn non_numeric_retries_are_rejected() {
    let mut map = HashMap::new();
    map.insert("DISPATCH_PROVIDER_MAX_RETRIES", "many");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "DISPATCH_PROVIDER_MAX_RETRIES"),
        "got: {result:?}"
    );
}

#[test]
fn blank_api_key_is_treated_as_absent() {
    let mut map = HashMap::new();
    map.insert("GOOGLE_MAPS_API_KEY", "  ");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.google_maps_api_key.is_none());
}

#[test]
fn endpoint_override_strips_trailing_slash() {
    let mut map = HashMap::new();
    map.insert("DISPATCH_WEATHER_BASE_URL", "http://127.0.0.1:9000/rss/city/");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.endpoints.weather_base_url, "http://127.0.0.1:9000/rss/city");
}

#[test]
fn endpoint_override_must_be_http() {
    let mut map = HashMap::new();
    map.insert("DISPATCH_FIRES_URL", "ftp://example.org/wfs");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "DISPATCH_FIRES_URL"),
        "got: {result:?}"
    );
}

#[test]
fn debug_redacts_api_key() {
    let mut map = HashMap::new();
    map.insert("GOOGLE_MAPS_API_KEY", "AIza-secret-value");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("AIza-secret-value"));
    assert!(rendered.contains("[redacted]"));
}
