//! Review-record extraction from review container elements.
//!
//! Every field is read through its fallback chain in [`crate::selectors`].
//! Missing fields degrade to their defaults instead of failing the record;
//! only the retention rule on [`ReviewRecord`] can drop a review.

use revscrape_core::{ProductAggregate, ReviewRecord};
use scraper::{ElementRef, Html};

use crate::parse_helpers::{
    non_empty, parse_count, parse_helpful_votes, parse_rating, strip_read_more,
};
use crate::selectors::{
    any_match, AGGREGATE_CHAINS, CAPTCHA_SELS, LAST_PAGE_DISABLED_SEL, REVIEWS_LINK_SELS,
    REVIEW_CHAINS, REVIEW_CONTAINER_SEL,
};

/// Extracts one review from a review container element.
///
/// Returns `None` when the record fails the retention rule (no rating and
/// ten or fewer characters of content). Callers skip `None` silently.
#[must_use]
pub fn parse_review(element: ElementRef<'_>) -> Option<ReviewRecord> {
    let chains = &*REVIEW_CHAINS;

    let record = ReviewRecord {
        rating: chains.rating.first(element, parse_rating),
        content: chains
            .content
            .first(element, |text| non_empty(&strip_read_more(text)))
            .unwrap_or_default(),
        author: chains.author.first(element, non_empty).unwrap_or_default(),
        date: chains.date.first(element, non_empty).unwrap_or_default(),
        title: chains.title.first(element, non_empty).unwrap_or_default(),
        verified_purchase: chains
            .verified
            .first(element, |text| non_empty(text).map(|_| true))
            .unwrap_or(false),
        helpful_votes: chains
            .helpful
            .first(element, parse_helpful_votes)
            .unwrap_or(0),
    };

    record.is_retainable().then_some(record)
}

/// What one fetched review page contained.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReviewPage {
    /// Number of review container elements found, retained or not.
    pub element_count: usize,
    /// Retained records in document order.
    pub reviews: Vec<ReviewRecord>,
    /// `true` when the pagination control marks this as the last page.
    pub last_page: bool,
    /// `true` when the page carries a robot-check form.
    pub captcha: bool,
}

/// Parses every review container on a page.
///
/// The parsed document is dropped before returning so callers can hold the
/// result across await points.
#[must_use]
pub fn parse_review_page(html: &str) -> ReviewPage {
    let document = Html::parse_document(html);

    let mut element_count = 0usize;
    let mut reviews = Vec::new();
    for element in document.select(&REVIEW_CONTAINER_SEL) {
        element_count += 1;
        if let Some(record) = parse_review(element) {
            reviews.push(record);
        }
    }

    ReviewPage {
        element_count,
        reviews,
        last_page: document.select(&LAST_PAGE_DISABLED_SEL).next().is_some(),
        captcha: any_match(&document, &CAPTCHA_SELS),
    }
}

/// Reads the product-level average rating and total review count.
///
/// Fields the page does not show stay `None` / `0`.
#[must_use]
pub fn parse_product_aggregate(html: &str) -> ProductAggregate {
    let document = Html::parse_document(html);
    let root = document.root_element();
    let chains = &*AGGREGATE_CHAINS;

    ProductAggregate {
        avg_rating: chains.avg_rating.first(root, parse_rating),
        total_review_count: chains.review_count.first(root, parse_count).unwrap_or(0),
    }
}

/// Finds the "see all reviews" link target on a product page.
///
/// Candidates are tried in order; the first one carrying a non-empty
/// `href` wins. Relative links are resolved against `page_url`.
#[must_use]
pub fn find_reviews_link(html: &str, page_url: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let href = REVIEWS_LINK_SELS.iter().find_map(|sel| {
        document
            .select(sel)
            .find_map(|el| el.value().attr("href").and_then(non_empty))
    })?;
    resolve_href(&href, page_url)
}

/// Resolves `href` against `base`, keeping absolute links unchanged.
#[must_use]
pub(crate) fn resolve_href(href: &str, base: &str) -> Option<String> {
    match url::Url::parse(href) {
        Ok(absolute) => Some(absolute.to_string()),
        Err(_) => url::Url::parse(base)
            .and_then(|b| b.join(href))
            .map(|u| u.to_string())
            .ok(),
    }
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
