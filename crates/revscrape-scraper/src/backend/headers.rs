//! Desktop browser identity used by both backends.

use rand::seq::IndexedRandom;
use reqwest::header::{HeaderMap, HeaderValue};
use revscrape_core::Domain;

/// Desktop Chrome user agents across the three major platforms.
pub const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
];

/// Picks one of [`USER_AGENTS`] at random.
#[must_use]
pub fn random_user_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
}

/// `Accept-Language` matching the marketplace's primary language.
#[must_use]
pub fn accept_language(domain: Domain) -> &'static str {
    match domain {
        Domain::Fr => "fr-FR,fr;q=0.9,en-US;q=0.8,en;q=0.7",
        Domain::De => "de-DE,de;q=0.9,en-US;q=0.8,en;q=0.7",
        Domain::CoUk => "en-GB,en;q=0.9",
        Domain::Com => "en-US,en;q=0.9",
    }
}

/// The header set a desktop browser sends on a top-level navigation.
///
/// `User-Agent` is set separately on the client builder.
#[must_use]
pub fn desktop_headers(domain: Domain) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let mut put = |name: &'static str, value: &'static str| {
        headers.insert(name, HeaderValue::from_static(value));
    };
    put(
        "accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
    );
    put("accept-language", accept_language(domain));
    put("cache-control", "no-cache");
    put("pragma", "no-cache");
    put("dnt", "1");
    put("upgrade-insecure-requests", "1");
    put("sec-fetch-dest", "document");
    put("sec-fetch-mode", "navigate");
    put("sec-fetch-site", "none");
    put("sec-fetch-user", "?1");
    headers
}
