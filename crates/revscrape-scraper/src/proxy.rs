//! Round-robin egress proxy selection.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::error::RetrievalError;

/// At most this many proxies are kept from the list service.
pub const MAX_LISTED_PROXIES: usize = 10;

/// Used when the list service is unreachable or returns nothing usable.
pub const FALLBACK_PROXIES: &[&str] = &["8.210.83.33:80", "47.251.5.248:80", "47.88.3.19:8080"];

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Port {
    Number(u16),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct ListedProxy {
    ip: String,
    port: Port,
}

impl ListedProxy {
    fn address(&self) -> Option<String> {
        let ip = self.ip.trim();
        if ip.is_empty() {
            return None;
        }
        let port = match &self.port {
            Port::Number(n) => *n,
            Port::Text(s) => s.trim().parse().ok()?,
        };
        Some(format!("{ip}:{port}"))
    }
}

/// The list service has answered both as a bare array and wrapped in an
/// object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ProxyListResponse {
    Bare(Vec<ListedProxy>),
    Wrapped { proxies: Vec<ListedProxy> },
}

impl ProxyListResponse {
    fn into_addresses(self) -> Vec<String> {
        let listed = match self {
            ProxyListResponse::Bare(list) | ProxyListResponse::Wrapped { proxies: list } => list,
        };
        listed
            .iter()
            .take(MAX_LISTED_PROXIES)
            .filter_map(ListedProxy::address)
            .collect()
    }
}

/// Hands out proxies from a pool in round-robin order.
///
/// The pool is fetched from the list service on the first [`next_proxy`]
/// call and kept for the lifetime of the rotator. Rotation is only meaningful
/// under sequential use.
///
/// [`next_proxy`]: ProxyRotator::next_proxy
#[derive(Debug)]
pub struct ProxyRotator {
    client: Client,
    list_url: String,
    pool: Option<Vec<String>>,
    index: usize,
}

impl ProxyRotator {
    /// # Errors
    ///
    /// Returns [`RetrievalError::ProxyList`] if the HTTP client cannot be
    /// constructed.
    pub fn new(list_url: &str, timeout_secs: u64) -> Result<Self, RetrievalError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| RetrievalError::ProxyList(e.to_string()))?;
        Ok(Self {
            client,
            list_url: list_url.to_owned(),
            pool: None,
            index: 0,
        })
    }

    /// A rotator over a fixed pool; the list service is never queried.
    #[must_use]
    pub fn with_pool(pool: Vec<String>) -> Self {
        Self {
            client: Client::new(),
            list_url: String::new(),
            pool: Some(pool),
            index: 0,
        }
    }

    /// Returns the next proxy address, or `None` if the pool is empty.
    pub async fn next_proxy(&mut self) -> Option<String> {
        if self.pool.is_none() {
            self.pool = Some(self.populate().await);
        }
        let pool = self.pool.as_ref()?;
        if pool.is_empty() {
            return None;
        }
        let proxy = pool[self.index % pool.len()].clone();
        self.index = (self.index + 1) % pool.len();
        Some(proxy)
    }

    async fn populate(&self) -> Vec<String> {
        match self.fetch_list().await {
            Ok(list) if !list.is_empty() => {
                tracing::info!(count = list.len(), "proxy list loaded");
                list
            }
            Ok(_) => {
                tracing::warn!("proxy list service returned no proxies; using fallback pool");
                fallback_pool()
            }
            Err(e) => {
                tracing::warn!(error = %e, "proxy list unavailable; using fallback pool");
                fallback_pool()
            }
        }
    }

    async fn fetch_list(&self) -> Result<Vec<String>, RetrievalError> {
        let response = self.client.get(&self.list_url).send().await?;
        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(RetrievalError::HttpStatus {
                status: status.as_u16(),
                url: self.list_url.clone(),
            });
        }
        let body = response.text().await?;
        let parsed: ProxyListResponse = serde_json::from_str(&body)
            .map_err(|e| RetrievalError::ProxyList(format!("unexpected proxy list body: {e}")))?;
        Ok(parsed.into_addresses())
    }
}

fn fallback_pool() -> Vec<String> {
    FALLBACK_PROXIES.iter().map(|&p| p.to_owned()).collect()
}
