//! Chromium-driven page retrieval using chromiumoxide.
//!
//! The browser is launched per product with automation fingerprints
//! suppressed: no `--enable-automation` switch, the `AutomationControlled`
//! blink feature disabled, `navigator.webdriver` hidden on every document,
//! and a user agent picked at random from the desktop pool.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use revscrape_core::{DelayRange, ProductReference};
use tokio::task::JoinHandle;

use super::headers::random_user_agent;
use super::{PageContent, RetrievalBackend};
use crate::error::RetrievalError;
use crate::pacing::pause;
use crate::parse::resolve_href;
use crate::selectors::{REVIEWS_LINK_CANDIDATES, REVIEW_CONTAINER};

/// Pause between scroll steps while "reading" a page.
const SCROLL_PAUSE: DelayRange = DelayRange {
    min_secs: 0.5,
    max_secs: 1.5,
};

/// Poll interval for bounded element waits.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Settings for [`BrowserSessionBackend`].
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    /// Explicit browser executable; located on `PATH` when unset.
    pub chrome_path: Option<PathBuf>,
    pub headless: bool,
    /// Egress proxy as `host:port`.
    pub proxy: Option<String>,
    /// Pause after each navigation.
    pub settle_delay: DelayRange,
    /// Bounded wait per reviews-link candidate.
    pub link_wait_secs: u64,
    /// Bounded wait for the first review element on a page.
    pub element_wait_secs: u64,
    pub navigation_timeout_secs: u64,
}

/// Drives a scripted Chromium instance, one browser process per session.
pub struct BrowserSessionBackend {
    options: BrowserOptions,
}

/// A running browser positioned on one product.
///
/// Dropping the session stops the event handler task and, through
/// chromiumoxide, kills the browser process if [`RetrievalBackend::close`]
/// was never reached.
pub struct BrowserSession {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    product_url: String,
    current_url: Option<String>,
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

/// Locates a Chromium-family executable on this machine.
#[must_use]
pub fn find_chromium() -> Option<PathBuf> {
    for name in [
        "google-chrome",
        "google-chrome-stable",
        "chromium",
        "chromium-browser",
    ] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    if cfg!(target_os = "macos") {
        let common = PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

/// One way of building a browser configuration.
#[derive(Debug, Clone, Copy)]
enum LaunchStrategy {
    /// Stealth flags with an explicitly located executable.
    Stealth,
    /// Stealth flags with chromiumoxide's own executable detection.
    Managed,
}

impl BrowserSessionBackend {
    #[must_use]
    pub fn new(options: BrowserOptions) -> Self {
        Self { options }
    }

    fn stealth_args(&self, user_agent: &str) -> Vec<String> {
        let mut args = vec![
            "--no-sandbox".to_owned(),
            "--disable-dev-shm-usage".to_owned(),
            "--disable-blink-features=AutomationControlled".to_owned(),
            "--disable-infobars".to_owned(),
            "--no-first-run".to_owned(),
            "--window-size=1366,900".to_owned(),
            format!("--user-agent={user_agent}"),
        ];
        if let Some(proxy) = &self.options.proxy {
            args.push(format!("--proxy-server=http://{proxy}"));
        }
        args
    }

    fn config_for(
        &self,
        strategy: LaunchStrategy,
        user_agent: &str,
    ) -> Result<BrowserConfig, String> {
        let mut builder = BrowserConfig::builder()
            .disable_default_args()
            .args(self.stealth_args(user_agent));
        if !self.options.headless {
            builder = builder.with_head();
        }
        if let LaunchStrategy::Stealth = strategy {
            let path = self
                .options
                .chrome_path
                .clone()
                .or_else(find_chromium)
                .ok_or_else(|| "no Chromium executable found".to_owned())?;
            builder = builder.chrome_executable(path);
        }
        builder.build()
    }

    /// Launches a browser, trying each strategy in order.
    async fn launch(&self, user_agent: &str) -> Result<(Browser, JoinHandle<()>), RetrievalError> {
        let mut failures = Vec::new();

        for strategy in [LaunchStrategy::Stealth, LaunchStrategy::Managed] {
            let config = match self.config_for(strategy, user_agent) {
                Ok(config) => config,
                Err(e) => {
                    tracing::debug!(?strategy, error = %e, "browser config rejected");
                    failures.push(format!("{strategy:?}: {e}"));
                    continue;
                }
            };

            match Browser::launch(config).await {
                Ok((browser, mut handler)) => {
                    let handler = tokio::spawn(async move {
                        while let Some(event) = handler.next().await {
                            if event.is_err() {
                                break;
                            }
                        }
                    });
                    tracing::info!(?strategy, "browser launched");
                    return Ok((browser, handler));
                }
                Err(e) => {
                    tracing::warn!(?strategy, error = %e, "browser launch failed");
                    failures.push(format!("{strategy:?}: {e}"));
                }
            }
        }

        Err(RetrievalError::BackendUnavailable(failures.join("; ")))
    }

    async fn navigate(&self, session: &mut BrowserSession, url: &str) -> Result<(), RetrievalError> {
        let timeout = Duration::from_secs(self.options.navigation_timeout_secs);
        match tokio::time::timeout(timeout, session.page.goto(url)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => return Err(RetrievalError::Browser(format!("navigation failed: {e}"))),
            Err(_) => {
                return Err(RetrievalError::Timeout {
                    url: url.to_owned(),
                })
            }
        }
        // Best effort: the load event may already have fired.
        let _ = tokio::time::timeout(timeout, session.page.wait_for_navigation()).await;

        session.current_url = Some(url.to_owned());
        pause(self.options.settle_delay).await;
        Ok(())
    }

    /// Scrolls to 1/4, 2/4 and 3/4 of the page height with short pauses.
    async fn scroll_like_reader(&self, page: &Page) {
        let height = match page.evaluate("document.body.scrollHeight").await {
            Ok(result) => result.into_value::<f64>().unwrap_or(0.0),
            Err(e) => {
                tracing::debug!(error = %e, "could not read page height");
                return;
            }
        };
        for step in 1..=3 {
            let y = height * f64::from(step) / 4.0;
            if let Err(e) = page.evaluate(format!("window.scrollTo(0, {y:.0});")).await {
                tracing::debug!(error = %e, "scroll step failed");
                return;
            }
            pause(SCROLL_PAUSE).await;
        }
    }

    /// Polls for `selector` until it appears or `wait` elapses.
    async fn wait_for(page: &Page, selector: &str, wait: Duration) -> bool {
        let deadline = Instant::now() + wait;
        loop {
            if page.find_element(selector).await.is_ok() {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Polls until `selector` matches a clickable element carrying an `href`,
    /// or `wait` elapses.
    async fn wait_for_clickable_href(
        page: &Page,
        selector: &str,
        wait: Duration,
    ) -> Option<String> {
        let script = clickable_href_script(selector)?;
        let deadline = Instant::now() + wait;
        loop {
            let href = match page.evaluate(script.as_str()).await {
                Ok(result) => result.into_value::<Option<String>>().ok().flatten(),
                Err(e) => {
                    tracing::debug!(selector, error = %e, "link lookup failed");
                    None
                }
            };
            if let Some(href) = href.filter(|h| !h.trim().is_empty()) {
                return Some(href);
            }
            if Instant::now() >= deadline {
                return None;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn current_url(page: &Page, fallback: &str) -> String {
        page.url()
            .await
            .ok()
            .flatten()
            .map_or_else(|| fallback.to_owned(), |u| u.to_string())
    }
}

#[async_trait]
impl RetrievalBackend for BrowserSessionBackend {
    type Session = BrowserSession;

    async fn open_session(&mut self, product_url: &str) -> Result<BrowserSession, RetrievalError> {
        let user_agent = random_user_agent();
        let (browser, handler) = self.launch(user_agent).await?;

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler.abort();
                return Err(RetrievalError::BackendUnavailable(format!(
                    "could not open a tab: {e}"
                )));
            }
        };

        if let Err(e) = page.enable_stealth_mode_with_agent(user_agent).await {
            tracing::warn!(error = %e, "stealth overrides not applied");
        }

        let mut session = BrowserSession {
            browser,
            page,
            handler,
            product_url: product_url.to_owned(),
            current_url: None,
        };

        tracing::info!(url = %product_url, "loading product page");
        if let Err(e) = self.navigate(&mut session, product_url).await {
            tracing::warn!(url = %product_url, error = %e, "product page did not load");
        }
        Ok(session)
    }

    async fn locate_reviews_link(&mut self, session: &mut BrowserSession) -> Option<String> {
        let wait = Duration::from_secs(self.options.link_wait_secs);
        let base = Self::current_url(&session.page, &session.product_url).await;

        for &candidate in REVIEWS_LINK_CANDIDATES {
            let Some(href) = Self::wait_for_clickable_href(&session.page, candidate, wait).await
            else {
                continue;
            };
            if let Some(url) = resolve_href(href.trim(), &base) {
                tracing::info!(selector = candidate, url = %url, "reviews link found");
                return Some(url);
            }
        }

        tracing::warn!(url = %session.product_url, "reviews link not found; continuing on product page");
        None
    }

    async fn fetch_page(
        &mut self,
        session: &mut BrowserSession,
        url: &str,
    ) -> Result<PageContent, RetrievalError> {
        if session.current_url.as_deref() != Some(url) {
            self.navigate(session, url).await?;
        }

        self.scroll_like_reader(&session.page).await;

        // The product page itself is fetched for its aggregate block and may
        // legitimately carry no review elements.
        if url != session.product_url {
            let wait = Duration::from_secs(self.options.element_wait_secs);
            if !Self::wait_for(&session.page, REVIEW_CONTAINER, wait).await {
                return Err(RetrievalError::Timeout {
                    url: url.to_owned(),
                });
            }
        }

        let html: String = session
            .page
            .evaluate("document.documentElement.outerHTML")
            .await
            .map_err(|e| RetrievalError::Browser(format!("could not read page content: {e}")))?
            .into_value()
            .map_err(|e| RetrievalError::Browser(format!("page content was not a string: {e:?}")))?;
        let final_url = Self::current_url(&session.page, url).await;

        Ok(PageContent {
            url: final_url,
            html,
        })
    }

    async fn close(&mut self, mut session: BrowserSession) {
        if let Err(e) = session.browser.close().await {
            tracing::warn!(error = %e, "browser did not close cleanly");
        }
        if let Err(e) = session.browser.wait().await {
            tracing::debug!(error = %e, "browser process wait failed");
        }
        tracing::debug!(url = %session.product_url, "browser session closed");
    }

    fn fallback_reviews_url(&self, reference: &ProductReference) -> String {
        reference.canonical_url().to_owned()
    }
}

/// Builds a script returning the `href` of the first element matching
/// `selector` (or of its enclosing link) when that element is rendered,
/// visible, enabled and accepts pointer events; `null` otherwise.
fn clickable_href_script(selector: &str) -> Option<String> {
    let selector = serde_json::to_string(selector).ok()?;
    Some(format!(
        r"(() => {{
  const el = document.querySelector({selector});
  if (!el) return null;
  const link = el.closest('a') || el;
  const rect = el.getBoundingClientRect();
  if (rect.width <= 0 || rect.height <= 0) return null;
  const style = window.getComputedStyle(el);
  if (style.visibility === 'hidden' || style.display === 'none') return null;
  if (style.pointerEvents === 'none') return null;
  if (el.disabled || link.getAttribute('aria-disabled') === 'true') return null;
  return link.getAttribute('href');
}})()"
    ))
}
