//! Page-by-page review collection.
//!
//! Review listing pages are addressed by a `pageNumber` query parameter.
//! The controller fetches page 1, parses it, decides whether to continue,
//! and repeats until one of the stop conditions fires:
//!
//! 1. the configured page bound is reached,
//! 2. the page has no review elements (exhausted, or blocked when a CAPTCHA
//!    form is present),
//! 3. elements exist but none were retained (selector mismatch),
//! 4. the "next" pagination control is disabled,
//! 5. the page could not be fetched at all.
//!
//! A page whose review wait timed out does not stop the run; the next page is
//! attempted.

use revscrape_core::{DelayRange, ReviewRecord, StopReason};
use url::Url;

use crate::backend::RetrievalBackend;
use crate::error::RetrievalError;
use crate::pacing::pause;
use crate::parse::{parse_review_page, ReviewPage};

/// Query parameter carrying the 1-based page index.
pub const PAGE_PARAM: &str = "pageNumber";

/// Builds the URL of page `page` by setting or replacing [`PAGE_PARAM`].
///
/// Other query parameters are preserved in order. Unparseable bases get the
/// parameter appended verbatim.
#[must_use]
pub fn page_url(base: &str, page: u32) -> String {
    let Ok(mut url) = Url::parse(base) else {
        let separator = if base.contains('?') { '&' } else { '?' };
        return format!("{base}{separator}{PAGE_PARAM}={page}");
    };

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != PAGE_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        for (key, value) in &kept {
            pairs.append_pair(key, value);
        }
        pairs.append_pair(PAGE_PARAM, &page.to_string());
    }
    url.into()
}

/// What one `FetchPage` step produced.
#[derive(Debug)]
enum PageOutcome {
    Parsed(ReviewPage),
    /// The backend gave up waiting for review elements.
    TimedOut,
    /// Any other page-scoped failure.
    Failed,
}

#[derive(Debug, PartialEq, Eq)]
enum Decision {
    Advance,
    Stop(StopReason),
}

fn decide(page: u32, max_pages: u32, outcome: &PageOutcome) -> Decision {
    if page >= max_pages {
        return Decision::Stop(StopReason::MaxPages);
    }
    match outcome {
        PageOutcome::TimedOut => Decision::Advance,
        PageOutcome::Failed => Decision::Stop(StopReason::FetchFailed),
        PageOutcome::Parsed(parsed) if parsed.element_count == 0 => {
            if parsed.captcha {
                Decision::Stop(StopReason::SuspectedBlock)
            } else {
                Decision::Stop(StopReason::NoElements)
            }
        }
        PageOutcome::Parsed(parsed) if parsed.reviews.is_empty() => {
            Decision::Stop(StopReason::NoRetained)
        }
        PageOutcome::Parsed(parsed) if parsed.last_page => Decision::Stop(StopReason::LastPage),
        PageOutcome::Parsed(_) => Decision::Advance,
    }
}

/// Result of one pagination run.
#[derive(Debug, Clone, PartialEq)]
pub struct PaginationOutcome {
    /// Retained records from every page, in page order.
    pub reviews: Vec<ReviewRecord>,
    /// Number of page fetches attempted.
    pub pages_fetched: u32,
    pub stop_reason: StopReason,
}

/// Drives a [`RetrievalBackend`] across review listing pages.
#[derive(Debug, Clone, Copy)]
pub struct PaginationController {
    max_pages: u32,
    page_delay: DelayRange,
}

impl PaginationController {
    /// `max_pages` is clamped to at least 1.
    #[must_use]
    pub fn new(max_pages: u32, page_delay: DelayRange) -> Self {
        Self {
            max_pages: max_pages.max(1),
            page_delay,
        }
    }

    #[must_use]
    pub fn max_pages(&self) -> u32 {
        self.max_pages
    }

    /// Collects reviews starting at `reviews_url`.
    ///
    /// Page-scoped retrieval errors are logged and folded into the stop
    /// decision.
    ///
    /// # Errors
    ///
    /// Returns the backend's error unchanged when it is not page-recoverable
    /// (see [`RetrievalError::is_page_recoverable`]).
    pub async fn run<B: RetrievalBackend>(
        &self,
        backend: &mut B,
        session: &mut B::Session,
        reviews_url: &str,
    ) -> Result<PaginationOutcome, RetrievalError> {
        let mut reviews = Vec::new();
        let mut page = 1;

        loop {
            let url = page_url(reviews_url, page);
            tracing::info!(page, max_pages = self.max_pages, url = %url, "fetching review page");

            let outcome = match backend.fetch_page(session, &url).await {
                Ok(content) => PageOutcome::Parsed(parse_review_page(&content.html)),
                Err(RetrievalError::Timeout { .. }) => {
                    tracing::warn!(page, url = %url, "no review elements before timeout");
                    PageOutcome::TimedOut
                }
                Err(e) if e.is_page_recoverable() => {
                    tracing::warn!(page, url = %url, error = %e, "page fetch failed");
                    PageOutcome::Failed
                }
                Err(e) => return Err(e),
            };

            if let PageOutcome::Parsed(parsed) = &outcome {
                tracing::info!(
                    page,
                    elements = parsed.element_count,
                    retained = parsed.reviews.len(),
                    "parsed review page"
                );
            }

            let decision = decide(page, self.max_pages, &outcome);
            if let PageOutcome::Parsed(parsed) = outcome {
                reviews.extend(parsed.reviews);
            }

            match decision {
                Decision::Stop(stop_reason) => {
                    if stop_reason == StopReason::SuspectedBlock {
                        tracing::warn!(page, "CAPTCHA page served; stopping");
                    }
                    tracing::info!(
                        pages_fetched = page,
                        reviews = reviews.len(),
                        stop_reason = %stop_reason,
                        "pagination finished"
                    );
                    return Ok(PaginationOutcome {
                        reviews,
                        pages_fetched: page,
                        stop_reason,
                    });
                }
                Decision::Advance => {
                    pause(self.page_delay).await;
                    page += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(element_count: usize, retained: usize, last_page: bool) -> PageOutcome {
        PageOutcome::Parsed(ReviewPage {
            element_count,
            reviews: vec![
                ReviewRecord {
                    rating: Some(5.0),
                    ..ReviewRecord::default()
                };
                retained
            ],
            last_page,
            captcha: false,
        })
    }

    #[test]
    fn page_url_appends_parameter() {
        assert_eq!(
            page_url("https://www.amazon.fr/product-reviews/B086CYFSKW", 1),
            "https://www.amazon.fr/product-reviews/B086CYFSKW?pageNumber=1"
        );
    }

    #[test]
    fn page_url_replaces_existing_parameter_and_keeps_others() {
        assert_eq!(
            page_url(
                "https://www.amazon.fr/product-reviews/B086CYFSKW?pageNumber=4&sortBy=recent",
                2
            ),
            "https://www.amazon.fr/product-reviews/B086CYFSKW?sortBy=recent&pageNumber=2"
        );
    }

    #[test]
    fn page_url_handles_unparseable_base() {
        assert_eq!(page_url("not a url?x=1", 3), "not a url?x=1&pageNumber=3");
    }

    #[test]
    fn stops_at_page_bound_even_with_content() {
        assert_eq!(
            decide(2, 2, &parsed(10, 10, false)),
            Decision::Stop(StopReason::MaxPages)
        );
    }

    #[test]
    fn advances_on_full_page() {
        assert_eq!(decide(1, 3, &parsed(10, 8, false)), Decision::Advance);
    }

    #[test]
    fn stops_on_empty_page() {
        assert_eq!(
            decide(1, 3, &parsed(0, 0, false)),
            Decision::Stop(StopReason::NoElements)
        );
    }

    #[test]
    fn empty_page_with_captcha_is_suspected_block() {
        let outcome = PageOutcome::Parsed(ReviewPage {
            element_count: 0,
            reviews: Vec::new(),
            last_page: false,
            captcha: true,
        });
        assert_eq!(
            decide(1, 3, &outcome),
            Decision::Stop(StopReason::SuspectedBlock)
        );
    }

    #[test]
    fn stops_when_nothing_retained() {
        assert_eq!(
            decide(1, 3, &parsed(5, 0, false)),
            Decision::Stop(StopReason::NoRetained)
        );
    }

    #[test]
    fn stops_on_last_page_marker() {
        assert_eq!(
            decide(1, 3, &parsed(5, 5, true)),
            Decision::Stop(StopReason::LastPage)
        );
    }

    #[test]
    fn timeout_advances_but_failure_stops() {
        assert_eq!(decide(1, 3, &PageOutcome::TimedOut), Decision::Advance);
        assert_eq!(
            decide(1, 3, &PageOutcome::Failed),
            Decision::Stop(StopReason::FetchFailed)
        );
    }

    #[test]
    fn zero_page_bound_is_clamped() {
        assert_eq!(PaginationController::new(0, DelayRange::ZERO).max_pages(), 1);
    }
}
