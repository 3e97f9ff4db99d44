//! Canonical product references derived from free-form product URLs.
//!
//! A reference pairs a marketplace [`Domain`] with the 10-character product
//! code. Every request URL for one product is derived from that pair, so two
//! input URLs that differ only in tracking parameters or slugs resolve to the
//! same reference.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Marketplaces the resolver recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Domain {
    Fr,
    Com,
    De,
    CoUk,
}

impl Domain {
    /// Detection order for [`Domain::detect`]; the first host found in the
    /// URL wins.
    pub const ALL: [Domain; 4] = [Domain::Fr, Domain::CoUk, Domain::De, Domain::Com];

    /// Host without the `www.` prefix, e.g. `amazon.fr`.
    #[must_use]
    pub fn host(self) -> &'static str {
        match self {
            Domain::Fr => "amazon.fr",
            Domain::Com => "amazon.com",
            Domain::De => "amazon.de",
            Domain::CoUk => "amazon.co.uk",
        }
    }

    /// First known domain whose host appears anywhere in `raw_url`.
    #[must_use]
    pub fn detect(raw_url: &str) -> Option<Domain> {
        let lower = raw_url.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|d| lower.contains(d.host()))
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.host())
    }
}

impl std::str::FromStr for Domain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().trim_start_matches("www.").to_ascii_lowercase();
        match key.as_str() {
            "amazon.fr" | "fr" => Ok(Domain::Fr),
            "amazon.com" | "com" => Ok(Domain::Com),
            "amazon.de" | "de" => Ok(Domain::De),
            "amazon.co.uk" | "co.uk" => Ok(Domain::CoUk),
            other => Err(format!("unsupported domain \"{other}\"")),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReferenceError {
    #[error("no product identifier found in \"{url}\"")]
    NoIdentifierFound { url: String },
}

/// Normalized `{domain, product_id}` pair plus the URLs derived from it.
///
/// Immutable once built; construct through [`resolve`] or [`ProductReference::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductReference {
    domain: Domain,
    product_id: String,
    canonical_url: String,
    reviews_url: String,
}

impl ProductReference {
    /// Builds a reference from an already-validated product code.
    ///
    /// Returns `None` when `product_id` is not exactly ten `[A-Z0-9]` characters.
    #[must_use]
    pub fn new(domain: Domain, product_id: &str) -> Option<Self> {
        if !is_product_code(product_id) {
            return None;
        }
        let host = domain.host();
        Some(Self {
            domain,
            product_id: product_id.to_owned(),
            canonical_url: format!("https://www.{host}/dp/{product_id}"),
            reviews_url: format!("https://www.{host}/product-reviews/{product_id}"),
        })
    }

    #[must_use]
    pub fn domain(&self) -> Domain {
        self.domain
    }

    #[must_use]
    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    /// `https://www.{domain}/dp/{product_id}`.
    #[must_use]
    pub fn canonical_url(&self) -> &str {
        &self.canonical_url
    }

    /// `https://www.{domain}/product-reviews/{product_id}`.
    #[must_use]
    pub fn reviews_url(&self) -> &str {
        &self.reviews_url
    }
}

/// Identifier patterns in priority order. The first capture group is the code.
static ID_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"/dp/([A-Z0-9]{10})(?:[/?#&]|$)",
        r"/product/([A-Z0-9]{10})(?:[/?#&]|$)",
        r"/gp/product/([A-Z0-9]{10})(?:[/?#&]|$)",
        r"(?i:[?&]asin=)([A-Z0-9]{10})(?:[&#]|$)",
        r"/([A-Z0-9]{10})(?:[/?#]|$)",
        r"/product-reviews/([A-Z0-9]{10})(?:[/?#&]|$)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid identifier pattern"))
    .collect()
});

fn is_product_code(s: &str) -> bool {
    s.len() == 10
        && s
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

/// Extracts the product code from `raw_url`, trying each pattern in order.
#[must_use]
pub fn extract_product_id(raw_url: &str) -> Option<&str> {
    ID_PATTERNS.iter().find_map(|re| {
        re.captures(raw_url)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    })
}

/// Resolves a raw product URL into a [`ProductReference`].
///
/// The domain is the first known marketplace host found in the URL, or
/// `default_domain` when none matches.
///
/// # Errors
///
/// Returns [`ReferenceError::NoIdentifierFound`] when no pattern yields a
/// product code. The condition is permanent for that URL.
pub fn resolve(raw_url: &str, default_domain: Domain) -> Result<ProductReference, ReferenceError> {
    let raw_url = raw_url.trim();
    let not_found = || ReferenceError::NoIdentifierFound {
        url: raw_url.to_owned(),
    };

    let product_id = extract_product_id(raw_url).ok_or_else(not_found)?;
    let domain = Domain::detect(raw_url).unwrap_or(default_domain);

    ProductReference::new(domain, product_id).ok_or_else(not_found)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_dp_path_on_every_domain() {
        for domain in Domain::ALL {
            let url = format!(
                "https://www.{}/Casque-Audio-Bluetooth/dp/B086CYFSKW?ref=sr_1_3&th=1",
                domain.host()
            );
            let reference = resolve(&url, Domain::Fr).unwrap();
            assert_eq!(reference.product_id(), "B086CYFSKW");
            assert_eq!(reference.domain(), domain);
            assert_eq!(
                reference.canonical_url(),
                format!("https://www.{}/dp/B086CYFSKW", domain.host())
            );
        }
    }

    #[test]
    fn derives_reviews_url() {
        let reference = resolve("https://www.amazon.de/dp/B086CYFSKW", Domain::Fr).unwrap();
        assert_eq!(
            reference.reviews_url(),
            "https://www.amazon.de/product-reviews/B086CYFSKW"
        );
    }

    #[test]
    fn resolves_gp_product_path() {
        let reference =
            resolve("https://www.amazon.com/gp/product/B07XJ8C8F5/ref=ppx", Domain::Fr).unwrap();
        assert_eq!(reference.product_id(), "B07XJ8C8F5");
        assert_eq!(reference.domain(), Domain::Com);
    }

    #[test]
    fn resolves_asin_query_parameter() {
        let reference = resolve(
            "https://www.amazon.co.uk/some/page?tag=x&ASIN=B01N5IB20Q",
            Domain::Fr,
        )
        .unwrap();
        assert_eq!(reference.product_id(), "B01N5IB20Q");
        assert_eq!(reference.domain(), Domain::CoUk);
    }

    #[test]
    fn resolves_bare_code_segment() {
        let reference = resolve("https://www.amazon.fr/B086CYFSKW", Domain::De).unwrap();
        assert_eq!(reference.product_id(), "B086CYFSKW");
        assert_eq!(reference.domain(), Domain::Fr);
    }

    #[test]
    fn unknown_host_falls_back_to_default_domain() {
        let reference = resolve("https://amzn.example/dp/B086CYFSKW", Domain::De).unwrap();
        assert_eq!(reference.domain(), Domain::De);
        assert_eq!(reference.canonical_url(), "https://www.amazon.de/dp/B086CYFSKW");
    }

    #[test]
    fn dp_pattern_wins_over_later_segments() {
        let reference = resolve(
            "https://www.amazon.fr/dp/B086CYFSKW/ABCDEFGHIJ",
            Domain::Fr,
        )
        .unwrap();
        assert_eq!(reference.product_id(), "B086CYFSKW");
    }

    #[test]
    fn fails_without_any_code() {
        let err = resolve("https://www.amazon.fr/s?k=casque+audio", Domain::Fr).unwrap_err();
        assert_eq!(
            err,
            ReferenceError::NoIdentifierFound {
                url: "https://www.amazon.fr/s?k=casque+audio".to_owned()
            }
        );
    }

    #[test]
    fn lowercase_slug_is_not_a_code() {
        assert!(resolve("https://www.amazon.fr/headphones", Domain::Fr).is_err());
    }

    #[test]
    fn eleven_character_code_is_rejected() {
        assert!(resolve("https://www.amazon.fr/dp/B086CYFSKWX", Domain::Fr).is_err());
    }

    #[test]
    fn empty_input_fails() {
        assert!(matches!(
            resolve("   ", Domain::Fr),
            Err(ReferenceError::NoIdentifierFound { .. })
        ));
    }

    #[test]
    fn new_rejects_malformed_code() {
        assert!(ProductReference::new(Domain::Fr, "b086cyfskw").is_none());
        assert!(ProductReference::new(Domain::Fr, "B086").is_none());
        assert!(ProductReference::new(Domain::Fr, "B086CYFSKW").is_some());
    }

    #[test]
    fn domain_parses_with_or_without_www() {
        assert_eq!("www.amazon.com".parse::<Domain>().unwrap(), Domain::Com);
        assert_eq!("co.uk".parse::<Domain>().unwrap(), Domain::CoUk);
        assert!("amazon.it".parse::<Domain>().is_err());
    }

    #[test]
    fn detect_matches_host_anywhere_in_url() {
        assert_eq!(
            Domain::detect("https://WWW.AMAZON.CO.UK/dp/B01N5IB20Q"),
            Some(Domain::CoUk)
        );
        assert_eq!(Domain::detect("amazon.com/dp/B01N5IB20Q"), Some(Domain::Com));
        assert_eq!(Domain::detect("https://www.amazon.de/x"), Some(Domain::De));
        assert_eq!(Domain::detect("https://amzn.eu/d/abc"), None);
    }
}
