//! Integration tests for `StaticFetchBackend` and `ProxyRotator`.
//!
//! Uses `wiremock` to stand up a local HTTP server for each test so no
//! real network traffic is made.

use revscrape_core::{DelayRange, Domain};
use revscrape_scraper::{
    ProxyRotator, RetrievalBackend, RetrievalError, StaticFetchBackend, StaticOptions,
};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds a backend suitable for tests: 5-second timeout, no pacing, no proxy.
fn test_backend(domain: Domain) -> StaticFetchBackend {
    StaticFetchBackend::new(&StaticOptions {
        domain,
        timeout_secs: 5,
        request_delay: DelayRange::ZERO,
        proxy: None,
    })
    .expect("failed to build test StaticFetchBackend")
}

// ---------------------------------------------------------------------------
// StaticFetchBackend – page fetches
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_page_returns_body_on_200() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/product-reviews/B086CYFSKW"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .mount(&server)
        .await;

    let mut backend = test_backend(Domain::Fr);
    let product_url = format!("{}/dp/B086CYFSKW", server.uri());
    let mut session = backend.open_session(&product_url).await.unwrap();

    let url = format!("{}/product-reviews/B086CYFSKW", server.uri());
    let page = backend.fetch_page(&mut session, &url).await;
    backend.close(session).await;

    let page = page.expect("expected Ok for 200 response");
    assert_eq!(page.html, "<html>ok</html>");
    assert_eq!(page.url, url);
}

#[tokio::test]
async fn fetch_page_reports_non_200_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let mut backend = test_backend(Domain::Fr);
    let mut session = backend.open_session(&server.uri()).await.unwrap();
    let url = format!("{}/product-reviews/X", server.uri());
    let result = backend.fetch_page(&mut session, &url).await;

    match result {
        Err(RetrievalError::HttpStatus { status, url: failed }) => {
            assert_eq!(status, 503);
            assert_eq!(failed, url);
        }
        other => panic!("expected RetrievalError::HttpStatus, got: {other:?}"),
    }
}

#[tokio::test]
async fn fetch_page_sends_localized_browser_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(header("accept-language", "de-DE,de;q=0.9,en-US;q=0.8,en;q=0.7"))
        .and(header("upgrade-insecure-requests", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("matched"))
        .expect(1)
        .mount(&server)
        .await;

    let mut backend = test_backend(Domain::De);
    let mut session = backend.open_session(&server.uri()).await.unwrap();
    let page = backend
        .fetch_page(&mut session, &format!("{}/p", server.uri()))
        .await
        .expect("headers should match the mock");
    assert_eq!(page.html, "matched");
}

// ---------------------------------------------------------------------------
// StaticFetchBackend – reviews link discovery
// ---------------------------------------------------------------------------

#[tokio::test]
async fn locate_reviews_link_reuses_fetched_product_page() {
    let server = MockServer::start().await;

    let product_html = r#"<html><body>
        <a data-hook="see-all-reviews-link-foot" href="/product-reviews/B086CYFSKW/ref=foot">all</a>
    </body></html>"#;

    Mock::given(method("GET"))
        .and(path("/dp/B086CYFSKW"))
        .respond_with(ResponseTemplate::new(200).set_body_string(product_html))
        .expect(1)
        .mount(&server)
        .await;

    let mut backend = test_backend(Domain::Fr);
    let product_url = format!("{}/dp/B086CYFSKW", server.uri());
    let mut session = backend.open_session(&product_url).await.unwrap();

    backend
        .fetch_page(&mut session, &product_url)
        .await
        .expect("product page should load");
    let link = backend.locate_reviews_link(&mut session).await;

    assert_eq!(
        link,
        Some(format!("{}/product-reviews/B086CYFSKW/ref=foot", server.uri()))
    );
}

#[tokio::test]
async fn locate_reviews_link_is_none_when_product_page_fails() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let mut backend = test_backend(Domain::Fr);
    let mut session = backend
        .open_session(&format!("{}/dp/B086CYFSKW", server.uri()))
        .await
        .unwrap();
    assert!(backend.locate_reviews_link(&mut session).await.is_none());
}

#[tokio::test]
async fn failed_product_page_is_requested_only_once() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/dp/B086CYFSKW"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let mut backend = test_backend(Domain::Fr);
    let product_url = format!("{}/dp/B086CYFSKW", server.uri());
    let mut session = backend.open_session(&product_url).await.unwrap();

    let first = backend.fetch_page(&mut session, &product_url).await;
    assert!(matches!(
        first,
        Err(RetrievalError::HttpStatus { status: 503, .. })
    ));
    assert!(backend.locate_reviews_link(&mut session).await.is_none());
}

// ---------------------------------------------------------------------------
// ProxyRotator
// ---------------------------------------------------------------------------

#[tokio::test]
async fn proxy_rotator_uses_list_service_and_rotates() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/proxies"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"[{"ip":"10.0.0.1","port":8080},{"ip":"10.0.0.2","port":"3128"}]"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let mut rotator = ProxyRotator::new(&format!("{}/proxies", server.uri()), 5).unwrap();
    assert_eq!(rotator.next_proxy().await.as_deref(), Some("10.0.0.1:8080"));
    assert_eq!(rotator.next_proxy().await.as_deref(), Some("10.0.0.2:3128"));
    assert_eq!(rotator.next_proxy().await.as_deref(), Some("10.0.0.1:8080"));
}

#[tokio::test]
async fn proxy_rotator_falls_back_when_service_fails() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut rotator = ProxyRotator::new(&format!("{}/proxies", server.uri()), 5).unwrap();
    assert_eq!(rotator.next_proxy().await.as_deref(), Some("8.210.83.33:80"));
    assert_eq!(rotator.next_proxy().await.as_deref(), Some("47.251.5.248:80"));
    assert_eq!(rotator.next_proxy().await.as_deref(), Some("47.88.3.19:8080"));
    assert_eq!(rotator.next_proxy().await.as_deref(), Some("8.210.83.33:80"));
}

#[tokio::test]
async fn proxy_rotator_falls_back_on_malformed_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let mut rotator = ProxyRotator::new(&server.uri(), 5).unwrap();
    assert_eq!(rotator.next_proxy().await.as_deref(), Some("8.210.83.33:80"));
}
