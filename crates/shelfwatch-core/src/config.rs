use crate::app_config::{AppConfig, Environment};
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
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
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

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let env = parse_environment(&or_default("SHELFWATCH_ENV", "development"));

    let bind_addr = parse_addr("SHELFWATCH_BIND_ADDR", "0.0.0.0:8080")?;
    let log_level = or_default("SHELFWATCH_LOG_LEVEL", "info");

    let retail_api_base = trim_base(require("RETAIL_API_BASE")?);
    let availability_api_base = trim_base(require("AVAILABILITY_API_BASE")?);
    let store_pages_base = trim_base(require("STORE_PAGES_BASE")?);
    let buying_api_base = lookup("BUYING_API_BASE").ok().map(trim_base);
    let upstream_client_id = lookup("UPSTREAM_CLIENT_ID").ok();

    let request_timeout_secs = parse_u64("SHELFWATCH_REQUEST_TIMEOUT_SECS", "10")?;
    let user_agent = or_default("SHELFWATCH_USER_AGENT", "shelfwatch/0.1 (stock-proxy)");
    let cache_capacity = parse_usize("SHELFWATCH_CACHE_CAPACITY", "500")?;
    let cache_ttl_secs = parse_u64("SHELFWATCH_CACHE_TTL_SECS", "60")?;
    let html_cache_ttl_secs = parse_u64("SHELFWATCH_HTML_CACHE_TTL_SECS", "21600")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        retail_api_base,
        availability_api_base,
        buying_api_base,
        store_pages_base,
        upstream_client_id,
        request_timeout_secs,
        user_agent,
        cache_capacity,
        cache_ttl_secs,
        html_cache_ttl_secs,
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

/// Base URLs are joined with path templates, so a trailing slash would
/// produce `//` in every derived URL.
fn trim_base(s: String) -> String {
    s.trim_end_matches('/').to_string()
}
