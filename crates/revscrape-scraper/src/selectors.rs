//! Selector tables for review and product pages.
//!
//! Each review field has an ordered fallback chain: a ranked list of
//! `(selector, source)` rules tried in sequence until one yields a usable
//! value. Markup variants are handled by appending a rule to the relevant
//! table, never by adding branches to the parser.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Node, Selector};

use crate::parse_helpers::normalize_whitespace;

/// Where a rule reads its raw text from.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Source {
    /// Concatenated text of the matched element and its descendants.
    Text,
    /// Like [`Source::Text`], but `<br>`, `<p>` and `<div>` boundaries are
    /// kept as line breaks.
    Paragraphs,
    /// Value of the named attribute on the matched element.
    Attr(&'static str),
}

pub(crate) type RuleSpec = (&'static str, Source);

/// One review per container; the fixed top-level marker.
pub const REVIEW_CONTAINER: &str = "[data-hook='review']";

/// Pagination marker present when the current page is the last one.
pub const LAST_PAGE_DISABLED: &str = "li.a-last.a-disabled";

/// "See all reviews" controls on the product page, most specific first.
pub const REVIEWS_LINK_CANDIDATES: &[&str] = &[
    "a[data-hook='see-all-reviews-link-foot']",
    "a[href*='product-reviews']",
    "#acrCustomerReviewText",
    ".a-link-emphasis[href*='product-reviews']",
];

/// Markers of an interstitial robot check.
pub(crate) const CAPTCHA_MARKERS: &[&str] = &[
    "form[action*='validateCaptcha']",
    "#captchacharacters",
    "input[name='amzn-captcha-verify']",
];

pub(crate) const RATING_RULES: &[RuleSpec] = &[
    ("i[data-hook='review-star-rating'] span.a-icon-alt", Source::Text),
    ("i[data-hook='cmps-review-star-rating'] span.a-icon-alt", Source::Text),
    ("[data-hook='review-star-rating']", Source::Text),
    ("i.review-rating span.a-icon-alt", Source::Text),
    ("span.a-icon-alt", Source::Text),
    ("i[data-hook='review-star-rating']", Source::Attr("title")),
];

pub(crate) const CONTENT_RULES: &[RuleSpec] = &[
    ("span[data-hook='review-body'] span", Source::Paragraphs),
    ("span[data-hook='review-body']", Source::Paragraphs),
    ("div[data-hook='review-collapsed'] span", Source::Paragraphs),
    ("div.review-text-content span", Source::Paragraphs),
    (".review-text", Source::Paragraphs),
];

pub(crate) const AUTHOR_RULES: &[RuleSpec] = &[
    ("span.a-profile-name", Source::Text),
    (".a-profile-name", Source::Text),
    ("a.a-profile", Source::Attr("aria-label")),
    ("[data-hook='genome-widget'] .a-profile-content", Source::Text),
];

pub(crate) const DATE_RULES: &[RuleSpec] = &[
    ("span[data-hook='review-date']", Source::Text),
    (".review-date", Source::Text),
];

pub(crate) const TITLE_RULES: &[RuleSpec] = &[
    (
        "a[data-hook='review-title'] span:not(.a-icon-alt):not(.a-letter-space)",
        Source::Text,
    ),
    (
        "span[data-hook='review-title'] span:not(.a-icon-alt):not(.a-letter-space)",
        Source::Text,
    ),
    ("[data-hook='review-title']", Source::Text),
    (".review-title", Source::Text),
];

pub(crate) const VERIFIED_RULES: &[RuleSpec] = &[
    ("span[data-hook='avp-badge']", Source::Text),
    ("span[data-hook='avp-badge-linkless']", Source::Text),
    ("[data-hook='format-strip-linkless'] .a-color-state", Source::Text),
];

pub(crate) const HELPFUL_RULES: &[RuleSpec] = &[
    ("span[data-hook='helpful-vote-statement']", Source::Text),
    (".cr-vote-text", Source::Text),
];

pub(crate) const AVG_RATING_RULES: &[RuleSpec] = &[
    ("span[data-hook='rating-out-of-text']", Source::Text),
    ("i[data-hook='average-star-rating'] span.a-icon-alt", Source::Text),
    ("#acrPopover", Source::Attr("title")),
    ("#acrPopover span.a-icon-alt", Source::Text),
];

pub(crate) const REVIEW_COUNT_RULES: &[RuleSpec] = &[
    ("div[data-hook='total-review-count'] span", Source::Text),
    ("[data-hook='total-review-count']", Source::Text),
    ("#acrCustomerReviewText", Source::Text),
    ("[data-hook='cr-filter-info-review-rating-count']", Source::Text),
];

/// A compiled fallback chain for one field.
pub(crate) struct Chain {
    rules: Vec<(Selector, Source)>,
}

impl Chain {
    fn compile(specs: &[RuleSpec]) -> Self {
        let rules = specs
            .iter()
            .map(|&(css, source)| (compile(css), source))
            .collect();
        Self { rules }
    }

    /// Applies the rules in order under `scope` and returns the first value
    /// that `map` accepts. Each rule only considers its first matching element.
    pub(crate) fn first<T>(
        &self,
        scope: ElementRef<'_>,
        map: impl Fn(&str) -> Option<T>,
    ) -> Option<T> {
        self.rules.iter().find_map(|(selector, source)| {
            let element = scope.select(selector).next()?;
            let raw = read(element, *source)?;
            map(&raw)
        })
    }
}

/// Compiled review-field chains.
pub(crate) struct ReviewChains {
    pub rating: Chain,
    pub content: Chain,
    pub author: Chain,
    pub date: Chain,
    pub title: Chain,
    pub verified: Chain,
    pub helpful: Chain,
}

pub(crate) static REVIEW_CHAINS: LazyLock<ReviewChains> = LazyLock::new(|| ReviewChains {
    rating: Chain::compile(RATING_RULES),
    content: Chain::compile(CONTENT_RULES),
    author: Chain::compile(AUTHOR_RULES),
    date: Chain::compile(DATE_RULES),
    title: Chain::compile(TITLE_RULES),
    verified: Chain::compile(VERIFIED_RULES),
    helpful: Chain::compile(HELPFUL_RULES),
});

/// Compiled product-page chains.
pub(crate) struct AggregateChains {
    pub avg_rating: Chain,
    pub review_count: Chain,
}

pub(crate) static AGGREGATE_CHAINS: LazyLock<AggregateChains> =
    LazyLock::new(|| AggregateChains {
        avg_rating: Chain::compile(AVG_RATING_RULES),
        review_count: Chain::compile(REVIEW_COUNT_RULES),
    });

pub(crate) static REVIEW_CONTAINER_SEL: LazyLock<Selector> =
    LazyLock::new(|| compile(REVIEW_CONTAINER));

pub(crate) static LAST_PAGE_DISABLED_SEL: LazyLock<Selector> =
    LazyLock::new(|| compile(LAST_PAGE_DISABLED));

pub(crate) static REVIEWS_LINK_SELS: LazyLock<Vec<Selector>> =
    LazyLock::new(|| REVIEWS_LINK_CANDIDATES.iter().map(|css| compile(css)).collect());

pub(crate) static CAPTCHA_SELS: LazyLock<Vec<Selector>> =
    LazyLock::new(|| CAPTCHA_MARKERS.iter().map(|css| compile(css)).collect());

/// Compiles a selector from the static tables above.
///
/// The tables are compile-time constants covered by tests, so a parse
/// failure is a programming error.
fn compile(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {css:?}: {e}"))
}

/// Separates paragraphs while walking a subtree; never produced by HTML text.
const PARAGRAPH_BREAK: char = '\u{2029}';

/// Reads the raw value of `element` according to `source`.
///
/// Text is whitespace-normalized; paragraphs are normalized one by one and
/// joined with `\n`. Empty values are `None`.
pub(crate) fn read(element: ElementRef<'_>, source: Source) -> Option<String> {
    let value = match source {
        Source::Text => normalize_whitespace(&element.text().collect::<String>()),
        Source::Paragraphs => {
            let mut raw = String::new();
            push_paragraphs(element, &mut raw);
            raw.split(PARAGRAPH_BREAK)
                .map(normalize_whitespace)
                .filter(|paragraph| !paragraph.is_empty())
                .collect::<Vec<_>>()
                .join("\n")
        }
        Source::Attr(name) => normalize_whitespace(element.value().attr(name)?),
    };
    (!value.is_empty()).then_some(value)
}

fn push_paragraphs(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            let block = matches!(child_element.value().name(), "br" | "p" | "div");
            if block {
                out.push(PARAGRAPH_BREAK);
            }
            push_paragraphs(child_element, out);
            if block {
                out.push(PARAGRAPH_BREAK);
            }
        } else if let Node::Text(text) = child.value() {
            out.push_str(text);
        }
    }
}

/// Returns `true` when any of `selectors` matches somewhere in `document`.
pub(crate) fn any_match(document: &Html, selectors: &[Selector]) -> bool {
    selectors
        .iter()
        .any(|sel| document.select(sel).next().is_some())
}
