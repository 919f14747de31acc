// End-to-end tests for the check cycle: fetch a (mock) product page,
// extract title and price, evaluate against the target, and notify.

use std::io::Write;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pricewatch::config::FetcherConfig;
use pricewatch::extract::ListingExtractor;
use pricewatch::fetcher::PageFetcher;
use pricewatch::plugins::{NotificationResult, Notifier, NotifierManager, PriceAlert};
use pricewatch::watcher::{TrackingRequest, Watcher};

/// Captures every alert that reaches it instead of sending anything.
struct RecordingNotifier {
    alerts: Arc<Mutex<Vec<PriceAlert>>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> &str {
        "recording"
    }

    async fn notify(
        &self,
        alert: &PriceAlert,
    ) -> Result<NotificationResult, Box<dyn std::error::Error + Send + Sync>> {
        self.alerts.lock().unwrap().push(alert.clone());
        Ok(NotificationResult::sent())
    }
}

fn test_watcher() -> (Watcher, Arc<Mutex<Vec<PriceAlert>>>) {
    let alerts = Arc::new(Mutex::new(Vec::new()));

    let mut notifiers = NotifierManager::new();
    notifiers.register(Box::new(RecordingNotifier {
        alerts: Arc::clone(&alerts),
    }));

    let config = FetcherConfig {
        user_agent: "Mozilla/5.0".to_string(),
        accept_language: "en-US,en;q=0.9".to_string(),
        request_timeout: 10,
    };

    let watcher = Watcher::new(
        PageFetcher::new(&config).unwrap(),
        ListingExtractor::new(),
        notifiers,
    );

    (watcher, alerts)
}

fn product_page(title: &str, price_text: &str) -> String {
    format!(
        r#"<html><body>
            <span id="productTitle">  {title}  </span>
            <span class="a-price"><span class="a-price-whole">{price_text}</span></span>
        </body></html>"#
    )
}

async fn serve(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_price_drop_sends_exactly_one_alert() {
    let server = MockServer::start().await;
    serve(&server, "/widget", product_page("Widget", "1,499")).await;

    let (watcher, alerts) = test_watcher();
    let request = TrackingRequest {
        url: format!("{}/widget", server.uri()),
        target_price: 1500,
    };

    let report = watcher.check(&request).await;

    assert!(report.success);
    assert!(report.triggered);
    let listing = report.listing.as_ref().unwrap();
    assert_eq!(listing.title, "Widget");
    assert_eq!(listing.price, 1499);
    assert_eq!(report.notifications_sent(), 1);

    let alerts = alerts.lock().unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].subject(), "Price Drop Alert");
    assert!(alerts[0].body().contains("1499"));
    assert!(alerts[0].body().contains(&request.url));
}

#[tokio::test]
async fn test_price_above_target_sends_nothing() {
    let server = MockServer::start().await;
    serve(&server, "/widget", product_page("Widget", "1,700")).await;

    let (watcher, alerts) = test_watcher();
    let request = TrackingRequest {
        url: format!("{}/widget", server.uri()),
        target_price: 1500,
    };

    let report = watcher.check(&request).await;

    assert!(report.success);
    assert!(!report.triggered);
    assert_eq!(report.listing.as_ref().unwrap().price, 1700);
    assert!(alerts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_price_equal_to_target_triggers() {
    let server = MockServer::start().await;
    serve(&server, "/widget", product_page("Widget", "600")).await;

    let (watcher, alerts) = test_watcher();
    let request = TrackingRequest {
        url: format!("{}/widget", server.uri()),
        target_price: 600,
    };

    let report = watcher.check(&request).await;

    assert!(report.triggered);
    assert_eq!(alerts.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_missing_price_element_fails_without_alert() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/widget",
        r#"<html><span id="productTitle">Widget</span></html>"#.to_string(),
    )
    .await;

    let (watcher, alerts) = test_watcher();
    let request = TrackingRequest {
        url: format!("{}/widget", server.uri()),
        target_price: 1500,
    };

    let report = watcher.check(&request).await;

    assert!(!report.success);
    assert!(report.listing.is_none());
    assert!(report
        .error
        .as_ref()
        .unwrap()
        .contains("could not extract product info"));
    assert!(alerts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_every_check_below_target_realerts() {
    let server = MockServer::start().await;
    serve(&server, "/widget", product_page("Widget", "1,499")).await;

    let (watcher, alerts) = test_watcher();
    let request = TrackingRequest {
        url: format!("{}/widget", server.uri()),
        target_price: 1500,
    };

    // No dedup between cycles: the same drop alerts again.
    watcher.check(&request).await;
    watcher.check(&request).await;

    assert_eq!(alerts.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_watchlist_pass_checks_each_well_formed_line() {
    let server = MockServer::start().await;
    serve(&server, "/a", product_page("Gadget A", "90")).await;
    serve(&server, "/b", product_page("Gadget B", "500")).await;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "{}/a,100", server.uri()).unwrap();
    writeln!(file, "just a note without any separator").unwrap();
    writeln!(file, "{}/b,cheap", server.uri()).unwrap();
    writeln!(file, "{}/b,200", server.uri()).unwrap();

    let (watcher, alerts) = test_watcher();
    let report = watcher.check_watchlist(file.path()).await.unwrap();

    // Two well-formed lines -> two checks; one malformed price -> one
    // warning; the comma-less line vanishes silently.
    assert_eq!(report.reports.len(), 2);
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("cheap"));

    // Only the first entry (90 <= 100) is a drop; B stays above 200.
    assert_eq!(alerts.lock().unwrap().len(), 1);
    assert_eq!(alerts.lock().unwrap()[0].body().lines().next(), Some("Gadget A"));
    assert!(report.reports[0].triggered);
    assert!(!report.reports[1].triggered);
}

#[tokio::test]
async fn test_fetch_failure_in_watchlist_does_not_stop_the_pass() {
    let server = MockServer::start().await;
    serve(&server, "/ok", product_page("Gadget", "50")).await;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "http://127.0.0.1:1/unreachable,100").unwrap();
    writeln!(file, "{}/ok,100", server.uri()).unwrap();

    let (watcher, alerts) = test_watcher();
    let report = watcher.check_watchlist(file.path()).await.unwrap();

    assert_eq!(report.reports.len(), 2);
    assert!(!report.reports[0].success);
    assert!(report.reports[1].success);
    assert_eq!(alerts.lock().unwrap().len(), 1);
}
