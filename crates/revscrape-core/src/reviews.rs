use serde::{Deserialize, Serialize};

use crate::reference::ProductReference;

/// Minimum trimmed content length (exclusive) that keeps an unrated review.
pub const MIN_UNRATED_CONTENT_CHARS: usize = 10;

/// Content of the single row emitted for a product with no retained reviews.
pub const NO_REVIEWS_CONTENT: &str = "no reviews extracted";

/// One customer review as parsed from a review container element.
///
/// Missing fields carry their documented defaults rather than failing the
/// record: `rating = None`, empty strings, `verified_purchase = false`,
/// `helpful_votes = 0`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReviewRecord {
    /// Star rating in `[0, 5]`.
    pub rating: Option<f64>,
    pub content: String,
    pub author: String,
    /// Free text as displayed, e.g. `"Commenté en France le 3 mars 2024"`.
    pub date: String,
    pub title: String,
    pub verified_purchase: bool,
    pub helpful_votes: u32,
}

impl ReviewRecord {
    /// Retention rule: a record is kept when it has a rating or more than
    /// [`MIN_UNRATED_CONTENT_CHARS`] characters of trimmed content.
    #[must_use]
    pub fn is_retainable(&self) -> bool {
        self.rating.is_some() || self.content.trim().chars().count() > MIN_UNRATED_CONTENT_CHARS
    }
}

/// Product-level statistics shown on the product page.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductAggregate {
    pub avg_rating: Option<f64>,
    pub total_review_count: u64,
}

impl ProductAggregate {
    /// Fills a missing average with the mean of the non-null ratings in
    /// `records`. An average already read from the product page is kept.
    pub fn fill_missing_average(&mut self, records: &[ReviewRecord]) {
        if self.avg_rating.is_some() {
            return;
        }
        self.avg_rating = mean_rating(records);
    }
}

/// Mean of the non-null ratings, or `None` when no record is rated.
#[must_use]
pub fn mean_rating(records: &[ReviewRecord]) -> Option<f64> {
    let rated: Vec<f64> = records.iter().filter_map(|r| r.rating).collect();
    if rated.is_empty() {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let count = rated.len() as f64;
    Some(rated.iter().sum::<f64>() / count)
}

/// Why pagination stopped for one product.
///
/// Natural exhaustion and soft blocking look the same from the record stream;
/// `SuspectedBlock` is only reported when the empty page carried a captcha
/// marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    MaxPages,
    NoElements,
    NoRetained,
    LastPage,
    SuspectedBlock,
    FetchFailed,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StopReason::MaxPages => "max_pages",
            StopReason::NoElements => "no_elements",
            StopReason::NoRetained => "no_retained",
            StopReason::LastPage => "last_page",
            StopReason::SuspectedBlock => "suspected_block",
            StopReason::FetchFailed => "fetch_failed",
        };
        f.write_str(s)
    }
}

/// Everything extracted for one product, in page-then-in-page order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub reference: ProductReference,
    pub aggregate: ProductAggregate,
    pub reviews: Vec<ReviewRecord>,
    pub pages_fetched: u32,
    pub stop_reason: StopReason,
}

/// Coarse three-way sentiment label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sentiment::Positive => write!(f, "Positive"),
            Sentiment::Negative => write!(f, "Negative"),
            Sentiment::Neutral => write!(f, "Neutral"),
        }
    }
}

/// One exported row: product-level columns joined with one review.
///
/// Field names are the column names consumed by the export stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputRow {
    pub url: String,
    /// Total review count shown on the product page.
    pub nombre_avis: u64,
    /// Number of reviews retrieved for this product.
    pub nombre_commentaires_client: usize,
    /// Average rating rounded to one decimal.
    pub moyenne_avis: Option<f64>,
    pub avis_notation: Option<f64>,
    pub commentaire_associe: String,
    /// `Positive`, `Negative`, `Neutral`, or `N/A` for the sentinel row.
    pub sentiment: String,
    pub auteur: String,
    pub date_avis: String,
    pub titre_avis: String,
    pub achat_verifie: bool,
    pub votes_utiles: u32,
}

impl OutputRow {
    /// Column names in export order.
    pub const COLUMNS: [&'static str; 12] = [
        "url",
        "nombre_avis",
        "nombre_commentaires_client",
        "moyenne_avis",
        "avis_notation",
        "commentaire_associe",
        "sentiment",
        "auteur",
        "date_avis",
        "titre_avis",
        "achat_verifie",
        "votes_utiles",
    ];

    /// The single placeholder row for a product that yielded no reviews.
    ///
    /// Every count is zero and every rating is empty.
    #[must_use]
    pub fn sentinel(url: &str) -> Self {
        Self {
            url: url.to_owned(),
            nombre_avis: 0,
            nombre_commentaires_client: 0,
            moyenne_avis: None,
            avis_notation: None,
            commentaire_associe: NO_REVIEWS_CONTENT.to_owned(),
            sentiment: "N/A".to_owned(),
            auteur: String::new(),
            date_avis: String::new(),
            titre_avis: String::new(),
            achat_verifie: false,
            votes_utiles: 0,
        }
    }
}

/// Rounds half away from zero to one decimal place.
#[must_use]
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
