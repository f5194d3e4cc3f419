use crate::app_config::{AppConfig, DEFAULT_USER_AGENT};
use crate::ConfigError;

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
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default, so an empty environment yields a usable
/// configuration. Values that are present must parse.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let log_level = or_default("ROZETKA_LOG_LEVEL", "info");
    let log_file = PathBuf::from(or_default("ROZETKA_LOG_FILE", "parser.log"));
    let categories_path = PathBuf::from(or_default("ROZETKA_CATEGORIES_PATH", "links.txt"));
    let output_dir = PathBuf::from(or_default("ROZETKA_OUTPUT_DIR", "."));
    let images_file = PathBuf::from(or_default("ROZETKA_IMAGES_FILE", "images.csv"));
    let proxy_url = optional("ROZETKA_PROXY_URL");
    let clearance_cookie = optional("ROZETKA_CLEARANCE_COOKIE");

    let request_timeout_secs = parse_u64("ROZETKA_REQUEST_TIMEOUT_SECS", "60")?;
    let user_agent = or_default("ROZETKA_USER_AGENT", DEFAULT_USER_AGENT);

    let max_attempts = parse_u32("ROZETKA_MAX_ATTEMPTS", "5")?;
    if max_attempts == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "ROZETKA_MAX_ATTEMPTS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let pacing_min_ms = parse_u64("ROZETKA_PACING_MIN_MS", "300")?;
    let pacing_max_ms = parse_u64("ROZETKA_PACING_MAX_MS", "800")?;
    if pacing_min_ms > pacing_max_ms {
        return Err(ConfigError::InvalidEnvVar {
            var: "ROZETKA_PACING_MIN_MS".to_string(),
            reason: format!("{pacing_min_ms} exceeds ROZETKA_PACING_MAX_MS ({pacing_max_ms})"),
        });
    }

    Ok(AppConfig {
        log_level,
        log_file,
        categories_path,
        output_dir,
        images_file,
        proxy_url,
        clearance_cookie,
        request_timeout_secs,
        user_agent,
        max_attempts,
        pacing_min_ms,
        pacing_max_ms,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
