use crate::app_config::{AppConfig, DatasetSource, Environment};
use crate::error::ConfigError;
use crate::geo::Point;
use crate::ranker::SearchRadius;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
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
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default; only malformed values are errors.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
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

    let parse_point = |var: &str, raw: &str| -> Result<Point, ConfigError> {
        raw.parse::<Point>().map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("NURSEMAP_ENV", "development"));
    let log_level = or_default("NURSEMAP_LOG_LEVEL", "info");
    let dataset = DatasetSource::parse(&or_default(
        "NURSEMAP_DATASET",
        "./data/nursery_with_capacity.json",
    ));

    let maps_api_key = lookup("GOOGLE_MAPS_API_KEY")
        .ok()
        .filter(|key| !key.trim().is_empty());
    let maps_base_url = or_default(
        "NURSEMAP_MAPS_BASE_URL",
        "https://maps.googleapis.com/maps/api/",
    );
    let geocode_prefix = or_default("NURSEMAP_GEOCODE_PREFIX", "東京都大田区");

    let default_center = parse_point(
        "NURSEMAP_DEFAULT_CENTER",
        &or_default("NURSEMAP_DEFAULT_CENTER", "35.561,139.716"),
    )?;
    let default_radius = SearchRadius::new(parse_u32("NURSEMAP_DEFAULT_RADIUS_M", "700")?)
        .map_err(|e| invalid("NURSEMAP_DEFAULT_RADIUS_M", e.to_string()))?;
    let home = match lookup("NURSEMAP_HOME") {
        Ok(raw) if !raw.trim().is_empty() => Some(parse_point("NURSEMAP_HOME", &raw)?),
        _ => None,
    };

    let request_timeout_secs = parse_u64("NURSEMAP_REQUEST_TIMEOUT_SECS", "10")?;
    let user_agent = or_default("NURSEMAP_USER_AGENT", "nursemap/0.1 (nursery-search)");
    let max_retries = parse_u32("NURSEMAP_MAX_RETRIES", "2")?;
    let retry_backoff_base_ms = parse_u64("NURSEMAP_RETRY_BACKOFF_BASE_MS", "500")?;

    Ok(AppConfig {
        env,
        log_level,
        dataset,
        maps_api_key,
        maps_base_url,
        geocode_prefix,
        default_center,
        default_radius,
        home,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_ms,
    })
}

/// Parse a string into an `Environment` variant.
///
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
