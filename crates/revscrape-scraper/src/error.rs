use revscrape_core::ReferenceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("timed out waiting for {url}")]
    Timeout { url: String },

    #[error("no browser driver could be constructed: {0}")]
    BackendUnavailable(String),

    #[error("browser error: {0}")]
    Browser(String),

    #[error("proxy list error: {0}")]
    ProxyList(String),
}

impl RetrievalError {
    /// Returns `true` for failures scoped to a single page.
    ///
    /// Page-scoped failures are logged and absorbed by the pagination
    /// controller. [`RetrievalError::BackendUnavailable`] ends the run.
    #[must_use]
    pub fn is_page_recoverable(&self) -> bool {
        matches!(
            self,
            RetrievalError::Http(_)
                | RetrievalError::HttpStatus { .. }
                | RetrievalError::Timeout { .. }
                | RetrievalError::Browser(_)
        )
    }
}

/// Failure of a whole product extraction.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Reference(#[from] ReferenceError),

    #[error(transparent)]
    Retrieval(#[from] RetrievalError),
}
