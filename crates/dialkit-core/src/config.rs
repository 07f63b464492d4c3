use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
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
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup — no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
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

    let api_base_url = require("DIALKIT_API_BASE_URL")?;
    let api_key = lookup("DIALKIT_API_KEY").ok();

    let log_level = or_default("DIALKIT_LOG_LEVEL", "info");
    let http_timeout_secs = parse_u64("DIALKIT_HTTP_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("DIALKIT_USER_AGENT", "dialkit/0.1 (calling-client)");
    let max_retries = parse_u32("DIALKIT_MAX_RETRIES", "3")?;
    let retry_backoff_base_secs = parse_u64("DIALKIT_RETRY_BACKOFF_BASE_SECS", "1")?;

    let poll_interval_ms = parse_u64("DIALKIT_POLL_INTERVAL_MS", "5000")?;
    if poll_interval_ms == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "DIALKIT_POLL_INTERVAL_MS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    let poll_backoff_cap_secs = parse_u64("DIALKIT_POLL_BACKOFF_CAP_SECS", "60")?;

    Ok(AppConfig {
        api_base_url,
        api_key,
        log_level,
        http_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_secs,
        poll_interval_ms,
        poll_backoff_cap_secs,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
