use std::path::PathBuf;

use crate::reference::Domain;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Which retrieval backend drives page fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Plain HTTP requests with a desktop browser header set.
    Static,
    /// A scripted Chromium session.
    Browser,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Static => write!(f, "static"),
            BackendKind::Browser => write!(f, "browser"),
        }
    }
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "static" | "http" => Ok(BackendKind::Static),
            "browser" | "chromium" => Ok(BackendKind::Browser),
            other => Err(format!("unknown backend \"{other}\" (expected static or browser)")),
        }
    }
}

/// Closed interval of seconds used for randomized pauses.
///
/// `min_secs <= max_secs` and both are non-negative; [`crate::config`]
/// rejects anything else at load time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelayRange {
    pub min_secs: f64,
    pub max_secs: f64,
}

impl DelayRange {
    /// A range that never sleeps. Used by tests and dry runs.
    pub const ZERO: DelayRange = DelayRange {
        min_secs: 0.0,
        max_secs: 0.0,
    };

    #[must_use]
    pub fn new(min_secs: f64, max_secs: f64) -> Self {
        Self { min_secs, max_secs }
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.max_secs <= 0.0
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub default_domain: Domain,
    pub max_pages: u32,
    pub backend: BackendKind,
    pub use_proxies: bool,
    pub proxy_list_url: String,
    pub request_timeout_secs: u64,
    pub request_delay: DelayRange,
    pub page_delay: DelayRange,
    pub settle_delay: DelayRange,
    pub link_wait_secs: u64,
    pub element_wait_secs: u64,
    pub chrome_path: Option<PathBuf>,
    pub headless: bool,
}
