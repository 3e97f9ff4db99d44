//! Sequential multi-product extraction.
//!
//! Products are processed one after another, each with a freshly built
//! backend. Per-product failures are logged and turned into a sentinel row
//! so a single bad URL does not abort the batch.

use revscrape_core::{AppConfig, BackendKind, Domain, ExtractionResult, OutputRow};
use revscrape_scraper::{
    extract, to_output_rows, BrowserOptions, BrowserSessionBackend, ExtractError, ExtractOptions,
    ProxyRotator, StaticFetchBackend, StaticOptions,
};
use revscrape_sentiment::SentimentClassifier;

/// Per-invocation choices layered over [`AppConfig`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct BatchSettings {
    pub max_pages: u32,
    pub backend: BackendKind,
    pub use_proxies: bool,
}

/// Splits a URL list file into entries, skipping blank lines and `#` comments.
pub(crate) fn parse_url_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_owned)
        .collect()
}

/// Extracts every URL in order and returns the combined output rows.
///
/// # Errors
///
/// Returns an error only if the proxy rotator cannot be constructed.
/// Per-product failures yield a sentinel row instead.
pub(crate) async fn run_batch(
    config: &AppConfig,
    urls: &[String],
    settings: &BatchSettings,
) -> anyhow::Result<Vec<OutputRow>> {
    let classifier = SentimentClassifier::new();
    let mut rotator = if settings.use_proxies {
        Some(ProxyRotator::new(
            &config.proxy_list_url,
            config.request_timeout_secs,
        )?)
    } else {
        None
    };

    let options = ExtractOptions {
        max_pages: settings.max_pages,
        page_delay: config.page_delay,
        default_domain: config.default_domain,
    };

    let total = urls.len();
    let mut rows = Vec::new();
    let mut failed = 0usize;

    for (index, url) in urls.iter().enumerate() {
        let proxy = match rotator.as_mut() {
            Some(rotator) => rotator.next_proxy().await,
            None => None,
        };
        tracing::info!(
            product = index + 1,
            total,
            url = %url,
            backend = %settings.backend,
            proxy = proxy.as_deref().unwrap_or("none"),
            "processing product"
        );

        match extract_one(config, settings.backend, proxy, url, &options).await {
            Ok(result) => rows.extend(to_output_rows(&result, &classifier)),
            Err(e) => {
                failed += 1;
                tracing::error!(url = %url, error = %e, "extraction failed");
                rows.push(OutputRow::sentinel(url));
            }
        }
    }

    tracing::info!(products = total, failed, rows = rows.len(), "batch complete");
    Ok(rows)
}

async fn extract_one(
    config: &AppConfig,
    kind: BackendKind,
    proxy: Option<String>,
    url: &str,
    options: &ExtractOptions,
) -> Result<ExtractionResult, ExtractError> {
    match kind {
        BackendKind::Static => {
            let mut backend = StaticFetchBackend::new(&StaticOptions {
                domain: Domain::detect(url).unwrap_or(config.default_domain),
                timeout_secs: config.request_timeout_secs,
                request_delay: config.request_delay,
                proxy,
            })?;
            extract(url, options, &mut backend).await
        }
        BackendKind::Browser => {
            let mut backend = BrowserSessionBackend::new(BrowserOptions {
                chrome_path: config.chrome_path.clone(),
                headless: config.headless,
                proxy,
                settle_delay: config.settle_delay,
                link_wait_secs: config.link_wait_secs,
                element_wait_secs: config.element_wait_secs,
                navigation_timeout_secs: config.request_timeout_secs,
            });
            extract(url, options, &mut backend).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_list_skips_blanks_and_comments() {
        let text = "\
# produits à suivre
https://www.amazon.fr/dp/B086CYFSKW

   https://www.amazon.de/dp/B07XJ8C8F5
#https://www.amazon.com/dp/B000000000
";
        assert_eq!(
            parse_url_list(text),
            vec![
                "https://www.amazon.fr/dp/B086CYFSKW",
                "https://www.amazon.de/dp/B07XJ8C8F5"
            ]
        );
    }

    #[test]
    fn url_list_empty_input() {
        assert!(parse_url_list("\n\n  \n").is_empty());
    }
}
