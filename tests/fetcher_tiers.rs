mod helpers;

use helpers::{blocked_html, funda_listing_html, Failing, StaticPage};
use listing_scout::config::RenderProxyCredentials;
use listing_scout::scrapers::{
    DirectFetcher, FetchStrategy, Fetcher, RenderProxyFetcher, ScrapeError,
};
use listing_scout::Site;
use std::sync::atomic::Ordering;
use std::time::Duration;
use url::Url;
use wiremock::{
    matchers::{header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

fn listing_url() -> Url {
    Url::parse("https://www.funda.nl/detail/koop/amsterdam/appartement-aragohof-4-1/43954500/")
        .unwrap()
}

#[tokio::test]
async fn test_render_proxy_sends_expected_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/"))
        .and(query_param("api_key", "test-key"))
        .and(query_param("url", listing_url().as_str()))
        .and(query_param("premium_proxy", "true"))
        .and(query_param("country_code", "nl"))
        .and(query_param("render_js", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_string(funda_listing_html()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let creds = RenderProxyCredentials::new("test-key")
        .with_endpoint(format!("{}/api/v1/", mock_server.uri()));
    let fetcher = RenderProxyFetcher::new(creds, Duration::from_secs(5)).unwrap();

    let html = fetcher.fetch(&listing_url(), Site::Funda).await.unwrap();
    assert!(html.contains("__NEXT_DATA__"));
}

#[tokio::test]
async fn test_render_proxy_retries_with_js() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("render_js", "false"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("render_js", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_string(funda_listing_html()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let creds = RenderProxyCredentials::new("test-key").with_endpoint(mock_server.uri());
    let fetcher = RenderProxyFetcher::new(creds, Duration::from_secs(5)).unwrap();

    let html = fetcher.fetch(&listing_url(), Site::Funda).await.unwrap();
    assert!(html.contains("Aragohof"));
}

#[tokio::test]
async fn test_render_proxy_retries_when_first_page_is_blocked() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("render_js", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_string(blocked_html()))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("render_js", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_string(funda_listing_html()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let creds = RenderProxyCredentials::new("test-key").with_endpoint(mock_server.uri());
    let fetcher = RenderProxyFetcher::new(creds, Duration::from_secs(5)).unwrap();

    let html = fetcher.fetch(&listing_url(), Site::Funda).await.unwrap();
    assert!(!html.contains("Je bent bijna"));
}

#[tokio::test]
async fn test_direct_fetch_sends_site_language() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/inmueble/106396109/"))
        .and(header("accept-language", Site::Idealista.accept_language()))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .mount(&mock_server)
        .await;

    let fetcher = DirectFetcher::new(Duration::from_secs(5)).unwrap();
    let url = Url::parse(&format!("{}/inmueble/106396109/", mock_server.uri())).unwrap();

    let html = fetcher.fetch(&url, Site::Idealista).await.unwrap();
    assert_eq!(html, "<html>ok</html>");
}

#[tokio::test]
async fn test_direct_fetch_403() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&mock_server)
        .await;

    let fetcher = DirectFetcher::new(Duration::from_secs(5)).unwrap();
    let url = Url::parse(&format!("{}/koop/", mock_server.uri())).unwrap();

    match fetcher.fetch(&url, Site::Funda).await {
        Err(ScrapeError::Http { status }) => assert_eq!(status.as_u16(), 403),
        other => panic!("Expected HTTP 403 error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_fetcher_moves_past_failed_and_blocked_tiers() {
    let (timeout, timeout_calls) = Failing::new(|| ScrapeError::NavigationTimeout("60s".into()));
    let (blocked, blocked_calls) = StaticPage::new(blocked_html());
    let (good, good_calls) = StaticPage::new(funda_listing_html());

    let fetcher = Fetcher::with_strategies(vec![Box::new(timeout), Box::new(blocked), Box::new(good)]);
    let page = fetcher.fetch(&listing_url(), Site::Funda).await.unwrap();

    assert!(page.html.contains("__NEXT_DATA__"));
    assert_eq!(timeout_calls.load(Ordering::SeqCst), 1);
    assert_eq!(blocked_calls.load(Ordering::SeqCst), 1);
    assert_eq!(good_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_fetcher_stops_at_first_usable_tier() {
    let (first, _) = StaticPage::new(funda_listing_html());
    let (second, second_calls) = StaticPage::new(funda_listing_html());

    let fetcher = Fetcher::with_strategies(vec![Box::new(first), Box::new(second)]);
    fetcher.fetch(&listing_url(), Site::Funda).await.unwrap();

    assert_eq!(second_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_fetcher_reports_last_error_when_exhausted() {
    let (timeout, _) = Failing::new(|| ScrapeError::NavigationTimeout("60s".into()));
    let (blocked, _) = StaticPage::new(blocked_html());

    let fetcher = Fetcher::with_strategies(vec![Box::new(timeout), Box::new(blocked)]);
    let err = fetcher.fetch(&listing_url(), Site::Funda).await.unwrap_err();

    assert!(matches!(err, ScrapeError::BlockedByAntiBot(_)));
}

#[tokio::test]
async fn test_fetcher_propagates_browser_launch_failure() {
    let (launch, _) = Failing::new(|| ScrapeError::BrowserLaunch("chrome not found".into()));
    let (fallback, fallback_calls) = StaticPage::new(funda_listing_html());

    let fetcher = Fetcher::with_strategies(vec![Box::new(launch), Box::new(fallback)]);
    let err = fetcher.fetch(&listing_url(), Site::Funda).await.unwrap_err();

    assert!(matches!(err, ScrapeError::BrowserLaunch(_)));
    assert_eq!(fallback_calls.load(Ordering::SeqCst), 0);
}
