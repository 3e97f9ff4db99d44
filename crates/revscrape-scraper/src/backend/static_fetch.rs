//! Plain HTTP page retrieval.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use revscrape_core::{DelayRange, Domain};

use super::headers::{desktop_headers, random_user_agent};
use super::{PageContent, RetrievalBackend};
use crate::error::RetrievalError;
use crate::pacing::pause;
use crate::parse::find_reviews_link;

/// Settings for [`StaticFetchBackend`].
#[derive(Debug, Clone)]
pub struct StaticOptions {
    pub domain: Domain,
    pub timeout_secs: u64,
    /// Pause drawn before every request.
    pub request_delay: DelayRange,
    /// Egress proxy as `host:port`.
    pub proxy: Option<String>,
}

/// Fetches pages with direct HTTP requests carrying a desktop browser
/// header set.
///
/// Every request is preceded by a random pause from
/// [`StaticOptions::request_delay`]. Any status other than 200 is reported as
/// [`RetrievalError::HttpStatus`]; nothing is retried here.
pub struct StaticFetchBackend {
    client: Client,
    request_delay: DelayRange,
}

/// Per-product state: the product URL and its page once fetched.
///
/// The product page is requested at most once per session, whether or not
/// that request succeeds.
#[derive(Debug, Clone)]
pub struct StaticSession {
    product_url: String,
    landing: Option<PageContent>,
    landing_requested: bool,
}

impl StaticFetchBackend {
    /// Creates a backend with a random desktop user agent.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::BackendUnavailable`] if the proxy address is
    /// malformed or the `reqwest::Client` cannot be constructed.
    pub fn new(options: &StaticOptions) -> Result<Self, RetrievalError> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(random_user_agent())
            .default_headers(desktop_headers(options.domain));

        if let Some(proxy) = &options.proxy {
            let proxy = reqwest::Proxy::all(format!("http://{proxy}")).map_err(|e| {
                RetrievalError::BackendUnavailable(format!("invalid proxy {proxy}: {e}"))
            })?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| RetrievalError::BackendUnavailable(e.to_string()))?;

        Ok(Self {
            client,
            request_delay: options.request_delay,
        })
    }

    async fn get(&self, url: &str) -> Result<PageContent, RetrievalError> {
        pause(self.request_delay).await;

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                RetrievalError::Timeout {
                    url: url.to_owned(),
                }
            } else {
                RetrievalError::Http(e)
            }
        })?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(RetrievalError::HttpStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        let final_url = response.url().to_string();
        let html = response.text().await?;
        Ok(PageContent {
            url: final_url,
            html,
        })
    }
}

#[async_trait]
impl RetrievalBackend for StaticFetchBackend {
    type Session = StaticSession;

    async fn open_session(&mut self, product_url: &str) -> Result<StaticSession, RetrievalError> {
        Ok(StaticSession {
            product_url: product_url.to_owned(),
            landing: None,
            landing_requested: false,
        })
    }

    async fn locate_reviews_link(&mut self, session: &mut StaticSession) -> Option<String> {
        if !session.landing_requested {
            session.landing_requested = true;
            let product_url = session.product_url.clone();
            match self.get(&product_url).await {
                Ok(page) => session.landing = Some(page),
                Err(e) => {
                    tracing::warn!(url = %product_url, error = %e, "product page unavailable");
                    return None;
                }
            }
        }
        let landing = session.landing.as_ref()?;
        find_reviews_link(&landing.html, &landing.url)
    }

    async fn fetch_page(
        &mut self,
        session: &mut StaticSession,
        url: &str,
    ) -> Result<PageContent, RetrievalError> {
        if url != session.product_url {
            return self.get(url).await;
        }
        if let Some(landing) = &session.landing {
            return Ok(landing.clone());
        }

        session.landing_requested = true;
        let page = self.get(url).await?;
        session.landing = Some(page.clone());
        Ok(page)
    }

    async fn close(&mut self, session: StaticSession) {
        tracing::debug!(url = %session.product_url, "static session closed");
    }
}
