//! One product, end to end: resolve, read the aggregate, paginate, label.

use revscrape_core::{
    resolve, round_one_decimal, DelayRange, Domain, ExtractionResult, OutputRow,
    ProductAggregate, ProductReference,
};
use revscrape_sentiment::SentimentClassifier;

use crate::backend::RetrievalBackend;
use crate::error::{ExtractError, RetrievalError};
use crate::pagination::PaginationController;
use crate::parse::parse_product_aggregate;

/// Per-run extraction settings.
#[derive(Debug, Clone, Copy)]
pub struct ExtractOptions {
    pub max_pages: u32,
    pub page_delay: DelayRange,
    /// Marketplace assumed when the URL names none.
    pub default_domain: Domain,
}

/// Extracts every reachable review for the product behind `raw_url`.
///
/// The backend session is closed before returning on every path.
///
/// # Errors
///
/// - [`ExtractError::Reference`] if no product identifier is found in `raw_url`.
/// - [`ExtractError::Retrieval`] if the backend cannot be started or fails in
///   a way that is not scoped to one page.
pub async fn extract<B: RetrievalBackend>(
    raw_url: &str,
    options: &ExtractOptions,
    backend: &mut B,
) -> Result<ExtractionResult, ExtractError> {
    let reference = resolve(raw_url, options.default_domain)?;
    tracing::info!(
        product_id = reference.product_id(),
        domain = %reference.domain(),
        "extracting reviews"
    );

    let mut session = backend.open_session(reference.canonical_url()).await?;
    let result = collect(backend, &mut session, &reference, options).await;
    backend.close(session).await;

    Ok(result?)
}

async fn collect<B: RetrievalBackend>(
    backend: &mut B,
    session: &mut B::Session,
    reference: &ProductReference,
    options: &ExtractOptions,
) -> Result<ExtractionResult, RetrievalError> {
    let mut aggregate = match backend.fetch_page(session, reference.canonical_url()).await {
        Ok(page) => parse_product_aggregate(&page.html),
        Err(e) if e.is_page_recoverable() => {
            tracing::warn!(
                url = reference.canonical_url(),
                error = %e,
                "product page unavailable; aggregate left empty"
            );
            ProductAggregate::default()
        }
        Err(e) => return Err(e),
    };

    let reviews_url = match backend.locate_reviews_link(session).await {
        Some(url) => url,
        None => backend.fallback_reviews_url(reference),
    };

    let outcome = PaginationController::new(options.max_pages, options.page_delay)
        .run(backend, session, &reviews_url)
        .await?;

    aggregate.fill_missing_average(&outcome.reviews);
    tracing::info!(
        product_id = reference.product_id(),
        reviews = outcome.reviews.len(),
        pages = outcome.pages_fetched,
        stop_reason = %outcome.stop_reason,
        "extraction finished"
    );

    Ok(ExtractionResult {
        reference: reference.clone(),
        aggregate,
        reviews: outcome.reviews,
        pages_fetched: outcome.pages_fetched,
        stop_reason: outcome.stop_reason,
    })
}

/// Joins each review with its sentiment label and the product-level columns.
///
/// A result with no reviews yields exactly one sentinel row.
#[must_use]
pub fn to_output_rows(
    result: &ExtractionResult,
    classifier: &SentimentClassifier,
) -> Vec<OutputRow> {
    let url = result.reference.canonical_url();
    if result.reviews.is_empty() {
        return vec![OutputRow::sentinel(url)];
    }

    let retrieved = result.reviews.len();
    let moyenne_avis = result.aggregate.avg_rating.map(round_one_decimal);

    result
        .reviews
        .iter()
        .map(|review| OutputRow {
            url: url.to_owned(),
            nombre_avis: result.aggregate.total_review_count,
            nombre_commentaires_client: retrieved,
            moyenne_avis,
            avis_notation: review.rating,
            commentaire_associe: review.content.clone(),
            sentiment: classifier.classify(&review.content).to_string(),
            auteur: review.author.clone(),
            date_avis: review.date.clone(),
            titre_avis: review.title.clone(),
            achat_verifie: review.verified_purchase,
            votes_utiles: review.helpful_votes,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use revscrape_core::{ReviewRecord, StopReason, NO_REVIEWS_CONTENT};

    use super::*;

    fn result(aggregate: ProductAggregate, reviews: Vec<ReviewRecord>) -> ExtractionResult {
        ExtractionResult {
            reference: ProductReference::new(Domain::Fr, "B086CYFSKW").unwrap(),
            aggregate,
            reviews,
            pages_fetched: 1,
            stop_reason: StopReason::NoElements,
        }
    }

    #[test]
    fn empty_result_yields_single_sentinel_row() {
        let aggregate = ProductAggregate {
            avg_rating: Some(4.26),
            total_review_count: 80,
        };
        let rows = to_output_rows(&result(aggregate, Vec::new()), &SentimentClassifier::new());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].commentaire_associe, NO_REVIEWS_CONTENT);
        assert_eq!(rows[0].sentiment, "N/A");
        assert_eq!(rows[0].nombre_avis, 0);
        assert_eq!(rows[0].nombre_commentaires_client, 0);
        assert_eq!(rows[0].moyenne_avis, None);
        assert_eq!(rows[0].avis_notation, None);
        assert_eq!(rows[0].url, "https://www.amazon.fr/dp/B086CYFSKW");
    }

    #[test]
    fn rows_carry_product_columns_and_labels() {
        let reviews = vec![
            ReviewRecord {
                rating: Some(5.0),
                content: "Excellent produit, parfait".to_owned(),
                author: "A".to_owned(),
                verified_purchase: true,
                helpful_votes: 3,
                ..ReviewRecord::default()
            },
            ReviewRecord {
                rating: Some(1.0),
                content: "Terrible, cassé au bout d'une semaine".to_owned(),
                ..ReviewRecord::default()
            },
        ];
        let aggregate = ProductAggregate {
            avg_rating: Some(4.2),
            total_review_count: 500,
        };
        let rows = to_output_rows(&result(aggregate, reviews), &SentimentClassifier::new());

        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.nombre_avis == 500));
        assert!(rows.iter().all(|r| r.nombre_commentaires_client == 2));
        assert!(rows.iter().all(|r| r.moyenne_avis == Some(4.2)));
        assert_eq!(rows[0].avis_notation, Some(5.0));
        assert_eq!(rows[0].sentiment, "Positive");
        assert!(rows[0].achat_verifie);
        assert_eq!(rows[0].votes_utiles, 3);
        assert_eq!(rows[1].sentiment, "Negative");
    }
}
