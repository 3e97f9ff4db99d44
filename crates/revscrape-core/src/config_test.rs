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

fn assert_invalid(map: &HashMap<&str, &str>, expected_var: &str) {
    let result = build_app_config(lookup_from_map(map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == expected_var),
        "expected InvalidEnvVar({expected_var}), got: {result:?}"
    );
}

#[test]
fn parse_environment_known_values() {
    assert_eq!(parse_environment("development"), Environment::Development);
    assert_eq!(parse_environment("test"), Environment::Test);
    assert_eq!(parse_environment("production"), Environment::Production);
}

#[test]
fn parse_environment_unknown_defaults_to_development() {
    assert_eq!(parse_environment("staging"), Environment::Development);
}

#[test]
fn environment_override_is_reported_by_name() {
    let mut map = HashMap::new();
    map.insert("REVSCRAPE_ENV", "production");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.env, Environment::Production);
    assert_eq!(cfg.env.to_string(), "production");
}

#[test]
fn build_app_config_defaults_with_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.default_domain, Domain::Fr);
    assert_eq!(cfg.max_pages, 2);
    assert_eq!(cfg.backend, BackendKind::Static);
    assert!(!cfg.use_proxies);
    assert_eq!(cfg.proxy_list_url, DEFAULT_PROXY_LIST_URL);
    assert_eq!(cfg.request_timeout_secs, 30);
    assert_eq!(cfg.request_delay, DelayRange::new(1.0, 3.0));
    assert_eq!(cfg.page_delay, DelayRange::new(2.0, 4.0));
    assert_eq!(cfg.settle_delay, DelayRange::new(3.0, 6.0));
    assert_eq!(cfg.link_wait_secs, 5);
    assert_eq!(cfg.element_wait_secs, 10);
    assert!(cfg.chrome_path.is_none());
    assert!(cfg.headless);
}

#[test]
fn backend_override_browser() {
    let mut map = HashMap::new();
    map.insert("REVSCRAPE_BACKEND", "browser");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.backend, BackendKind::Browser);
}

#[test]
fn backend_unknown_is_invalid() {
    let mut map = HashMap::new();
    map.insert("REVSCRAPE_BACKEND", "lynx");
    assert_invalid(&map, "REVSCRAPE_BACKEND");
}

#[test]
fn default_domain_override() {
    let mut map = HashMap::new();
    map.insert("REVSCRAPE_DEFAULT_DOMAIN", "amazon.co.uk");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.default_domain, Domain::CoUk);
}

#[test]
fn default_domain_unknown_is_invalid() {
    let mut map = HashMap::new();
    map.insert("REVSCRAPE_DEFAULT_DOMAIN", "amazon.jp");
    assert_invalid(&map, "REVSCRAPE_DEFAULT_DOMAIN");
}

#[test]
fn max_pages_upper_bound_is_ten() {
    let mut map = HashMap::new();
    map.insert("REVSCRAPE_MAX_PAGES", "10");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.max_pages, 10);

    map.insert("REVSCRAPE_MAX_PAGES", "11");
    assert_invalid(&map, "REVSCRAPE_MAX_PAGES");
}

#[test]
fn max_pages_zero_is_invalid() {
    let mut map = HashMap::new();
    map.insert("REVSCRAPE_MAX_PAGES", "0");
    assert_invalid(&map, "REVSCRAPE_MAX_PAGES");
}

#[test]
fn use_proxies_accepts_common_spellings() {
    for raw in ["1", "true", "YES", "on"] {
        let mut map = HashMap::new();
        map.insert("REVSCRAPE_USE_PROXIES", raw);
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert!(cfg.use_proxies, "expected {raw} to enable proxies");
    }
}

#[test]
fn use_proxies_garbage_is_invalid() {
    let mut map = HashMap::new();
    map.insert("REVSCRAPE_USE_PROXIES", "maybe");
    assert_invalid(&map, "REVSCRAPE_USE_PROXIES");
}

#[test]
fn delay_range_inverted_is_invalid() {
    let mut map = HashMap::new();
    map.insert("REVSCRAPE_PAGE_DELAY_MIN_SECS", "5");
    map.insert("REVSCRAPE_PAGE_DELAY_MAX_SECS", "1");
    assert_invalid(&map, "REVSCRAPE_PAGE_DELAY_MAX_SECS");
}

#[test]
fn delay_negative_is_invalid() {
    let mut map = HashMap::new();
    map.insert("REVSCRAPE_REQUEST_DELAY_MIN_SECS", "-1");
    assert_invalid(&map, "REVSCRAPE_REQUEST_DELAY_MIN_SECS");
}

#[test]
fn delay_zero_range_is_allowed() {
    let mut map = HashMap::new();
    map.insert("REVSCRAPE_REQUEST_DELAY_MIN_SECS", "0");
    map.insert("REVSCRAPE_REQUEST_DELAY_MAX_SECS", "0");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.request_delay.is_zero());
}

#[test]
fn request_timeout_invalid() {
    let mut map = HashMap::new();
    map.insert("REVSCRAPE_REQUEST_TIMEOUT_SECS", "not-a-number");
    assert_invalid(&map, "REVSCRAPE_REQUEST_TIMEOUT_SECS");
}

#[test]
fn chrome_path_blank_is_ignored() {
    let mut map = HashMap::new();
    map.insert("REVSCRAPE_CHROME_PATH", "   ");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.chrome_path.is_none());

    map.insert("REVSCRAPE_CHROME_PATH", "/usr/bin/chromium");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(
        cfg.chrome_path.as_deref(),
        Some(std::path::Path::new("/usr/bin/chromium"))
    );
}
