//! Retrieval backends: where page HTML comes from.
//!
//! [`RetrievalBackend`] abstracts over a plain HTTP client
//! ([`StaticFetchBackend`]) and a scripted Chromium session
//! ([`BrowserSessionBackend`]). The orchestrator is written against the
//! trait only; which implementation runs is decided by configuration.

pub mod browser;
pub mod headers;
pub mod static_fetch;

use async_trait::async_trait;
use revscrape_core::ProductReference;

use crate::error::RetrievalError;

pub use browser::{BrowserOptions, BrowserSession, BrowserSessionBackend};
pub use static_fetch::{StaticFetchBackend, StaticOptions, StaticSession};

/// Raw HTML of one fetched page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContent {
    /// URL the content was served for, after redirects when known.
    pub url: String,
    pub html: String,
}

/// A page source driven one product at a time.
///
/// A session is opened on the product page, used for every page of that
/// product, and closed exactly once. Callers must call [`close`] on every
/// exit path; browser sessions additionally release their process on drop.
///
/// [`close`]: RetrievalBackend::close
#[async_trait]
pub trait RetrievalBackend: Send {
    type Session: Send;

    /// Opens a session positioned on `product_url`.
    ///
    /// # Errors
    ///
    /// [`RetrievalError::BackendUnavailable`] when the backend cannot be
    /// started at all. That failure is terminal for the extraction run.
    async fn open_session(&mut self, product_url: &str) -> Result<Self::Session, RetrievalError>;

    /// Looks for the "see all reviews" control on the product page.
    async fn locate_reviews_link(&mut self, session: &mut Self::Session) -> Option<String>;

    /// Fetches one page.
    ///
    /// # Errors
    ///
    /// Page-scoped failures such as [`RetrievalError::HttpStatus`] and
    /// [`RetrievalError::Timeout`].
    async fn fetch_page(
        &mut self,
        session: &mut Self::Session,
        url: &str,
    ) -> Result<PageContent, RetrievalError>;

    /// Releases everything the session holds.
    async fn close(&mut self, session: Self::Session);

    /// Where pagination starts when no reviews link was found.
    fn fallback_reviews_url(&self, reference: &ProductReference) -> String {
        reference.reviews_url().to_owned()
    }
}
