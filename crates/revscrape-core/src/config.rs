use crate::app_config::{AppConfig, BackendKind, DelayRange, Environment};
use crate::reference::Domain;
use crate::ConfigError;

/// Public proxy list queried by the proxy rotator when proxies are enabled.
pub const DEFAULT_PROXY_LIST_URL: &str = "https://api.proxyscrape.com/v2/?request=get&protocol=http&timeout=10000&country=all&ssl=all&anonymity=all&format=json";

/// Upper bound on pages fetched per product.
pub const MAX_PAGES_LIMIT: u32 = 10;

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
/// Every variable is optional; defaults match a polite single-user run
/// against `amazon.fr` with the static backend.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .trim()
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .trim()
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_secs = |var: &str, default: &str| -> Result<f64, ConfigError> {
        let secs = or_default(var, default)
            .trim()
            .parse::<f64>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if !secs.is_finite() || secs < 0.0 {
            return Err(invalid(var, format!("{secs} is not a non-negative duration")));
        }
        Ok(secs)
    };

    let parse_range = |min_var: &str,
                       min_default: &str,
                       max_var: &str,
                       max_default: &str|
     -> Result<DelayRange, ConfigError> {
        let min_secs = parse_secs(min_var, min_default)?;
        let max_secs = parse_secs(max_var, max_default)?;
        if min_secs > max_secs {
            return Err(invalid(
                max_var,
                format!("maximum {max_secs}s is below minimum {min_secs}s"),
            ));
        }
        Ok(DelayRange::new(min_secs, max_secs))
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        parse_flag(&or_default(var, default)).ok_or_else(|| {
            invalid(var, "expected one of true/false/1/0/yes/no".to_string())
        })
    };

    let env = parse_environment(&or_default("REVSCRAPE_ENV", "development"));
    let log_level = or_default("REVSCRAPE_LOG_LEVEL", "info");

    let default_domain = or_default("REVSCRAPE_DEFAULT_DOMAIN", "amazon.fr")
        .parse::<Domain>()
        .map_err(|e| invalid("REVSCRAPE_DEFAULT_DOMAIN", e))?;

    let max_pages = parse_u32("REVSCRAPE_MAX_PAGES", "2")?;
    if max_pages == 0 || max_pages > MAX_PAGES_LIMIT {
        return Err(invalid(
            "REVSCRAPE_MAX_PAGES",
            format!("{max_pages} is outside 1..={MAX_PAGES_LIMIT}"),
        ));
    }

    let backend = or_default("REVSCRAPE_BACKEND", "static")
        .parse::<BackendKind>()
        .map_err(|e| invalid("REVSCRAPE_BACKEND", e))?;

    let use_proxies = parse_bool("REVSCRAPE_USE_PROXIES", "false")?;
    let proxy_list_url = or_default("REVSCRAPE_PROXY_LIST_URL", DEFAULT_PROXY_LIST_URL);
    let request_timeout_secs = parse_u64("REVSCRAPE_REQUEST_TIMEOUT_SECS", "30")?;

    let request_delay = parse_range(
        "REVSCRAPE_REQUEST_DELAY_MIN_SECS",
        "1.0",
        "REVSCRAPE_REQUEST_DELAY_MAX_SECS",
        "3.0",
    )?;
    let page_delay = parse_range(
        "REVSCRAPE_PAGE_DELAY_MIN_SECS",
        "2.0",
        "REVSCRAPE_PAGE_DELAY_MAX_SECS",
        "4.0",
    )?;
    let settle_delay = parse_range(
        "REVSCRAPE_SETTLE_DELAY_MIN_SECS",
        "3.0",
        "REVSCRAPE_SETTLE_DELAY_MAX_SECS",
        "6.0",
    )?;

    let link_wait_secs = parse_u64("REVSCRAPE_LINK_WAIT_SECS", "5")?;
    let element_wait_secs = parse_u64("REVSCRAPE_ELEMENT_WAIT_SECS", "10")?;
    let chrome_path = lookup("REVSCRAPE_CHROME_PATH")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);
    let headless = parse_bool("REVSCRAPE_HEADLESS", "true")?;

    Ok(AppConfig {
        env,
        log_level,
        default_domain,
        max_pages,
        backend,
        use_proxies,
        proxy_list_url,
        request_timeout_secs,
        request_delay,
        page_delay,
        settle_delay,
        link_wait_secs,
        element_wait_secs,
        chrome_path,
        headless,
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

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
