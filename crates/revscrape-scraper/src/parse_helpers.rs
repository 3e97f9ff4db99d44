//! Low-level string helpers for turning localized review markup text into values.
//!
//! Review pages are rendered in the marketplace's language, so numbers use
//! either `.` or `,` as the decimal separator and counts may carry spaces,
//! narrow no-break spaces, dots or commas as thousands separators.

use std::sync::LazyLock;

use regex::Regex;

static DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:[.,]\d+)?").expect("valid decimal regex"));

static GROUPED_INTEGER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d(?:[\d.,'\u{a0}\u{202f} ]*\d)?").expect("valid grouped integer regex")
});

/// Trailing "read more" controls rendered inside the review body.
static READ_MORE_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:\s*(?:read more|see more|lire la suite|en lire plus|voir plus|mehr lesen|weiterlesen)\s*[.…]*)+\s*$",
    )
    .expect("valid read-more regex")
});

/// Words meaning "one" in helpful-vote statements that spell the count out.
const ONE_WORDS: &[&str] = &["one", "une", "un", "eine", "einer"];

/// Collapses every whitespace run to a single space and trims the ends.
#[must_use]
pub(crate) fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parses a star rating from phrases like `"4,5 sur 5 étoiles"` or
/// `"3 out of 5 stars"`.
///
/// Takes the first decimal number in the text, accepting `,` as the decimal
/// separator. Returns `None` when there is no number or it falls outside `[0, 5]`.
#[must_use]
pub(crate) fn parse_rating(text: &str) -> Option<f64> {
    let raw = DECIMAL.find(text)?.as_str().replace(',', ".");
    let value = raw.parse::<f64>().ok()?;
    (0.0..=5.0).contains(&value).then_some(value)
}

/// Parses the first integer in `text`, ignoring thousands separators.
///
/// `"1 234 évaluations"`, `"1.234 Sternebewertungen"` and
/// `"1,234 global ratings"` all yield `1234`.
#[must_use]
pub(crate) fn parse_count(text: &str) -> Option<u64> {
    let grouped = GROUPED_INTEGER.find(text)?.as_str();
    let digits: String = grouped.chars().filter(char::is_ascii_digit).collect();
    digits.parse::<u64>().ok()
}

/// Parses a helpful-vote statement.
///
/// `"12 personnes ont trouvé cela utile"` yields 12; statements that spell
/// out a single vote (`"One person found this helpful"`) yield 1.
#[must_use]
pub(crate) fn parse_helpful_votes(text: &str) -> Option<u32> {
    if let Some(count) = parse_count(text) {
        return u32::try_from(count).ok();
    }
    let first_word = text.split_whitespace().next()?.to_lowercase();
    ONE_WORDS.contains(&first_word.as_str()).then_some(1)
}

/// Strips trailing "read more" boilerplate, then surrounding whitespace.
#[must_use]
pub(crate) fn strip_read_more(text: &str) -> String {
    READ_MORE_SUFFIX.replace(text, "").trim().to_owned()
}

/// Returns `Some(text)` only when `text` is non-empty after trimming.
pub(crate) fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}
