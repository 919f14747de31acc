use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, USER_AGENT};

use crate::config::FetcherConfig;
use crate::{AppError, Result};

/// Fetches raw product pages over HTTP.
///
/// One GET per check through a shared client. The response body is returned
/// for any HTTP status; a blocked or error page simply fails extraction
/// downstream. Transport failures (DNS, connect, timeout) surface as errors
/// and are not retried.
pub struct PageFetcher {
    client: reqwest::Client,
}

impl PageFetcher {
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| AppError::Validation(format!("invalid user agent: {}", e)))?,
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&config.accept_language)
                .map_err(|e| AppError::Validation(format!("invalid accept-language: {}", e)))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.request_timeout))
            .build()?;

        Ok(Self { client })
    }

    pub async fn fetch(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        let body = response.text().await?;
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config() -> FetcherConfig {
        FetcherConfig {
            user_agent: "Mozilla/5.0".to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
            request_timeout: 10,
        }
    }

    #[test]
    fn test_fetcher_creation() {
        assert!(PageFetcher::new(&test_config()).is_ok());
    }

    #[test]
    fn test_fetcher_rejects_bad_header_value() {
        let mut config = test_config();
        config.user_agent = "bad\nagent".to_string();

        let result = PageFetcher::new(&config);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_fetch_sends_browser_headers() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/product"))
            .and(header("user-agent", "Mozilla/5.0"))
            .and(header("accept-language", "en-US,en;q=0.9"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = PageFetcher::new(&test_config()).unwrap();
        let body = fetcher.fetch(&format!("{}/product", server.uri())).await.unwrap();

        assert_eq!(body, "<html></html>");
    }

    #[tokio::test]
    async fn test_fetch_returns_body_on_error_status() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/blocked"))
            .respond_with(ResponseTemplate::new(503).set_body_string("captcha wall"))
            .mount(&server)
            .await;

        let fetcher = PageFetcher::new(&test_config()).unwrap();
        let body = fetcher.fetch(&format!("{}/blocked", server.uri())).await.unwrap();

        // Status codes are not checked; the body comes back regardless.
        assert_eq!(body, "captcha wall");
    }

    #[tokio::test]
    async fn test_fetch_transport_failure() {
        let fetcher = PageFetcher::new(&test_config()).unwrap();

        // Port 1 on localhost refuses connections.
        let result = fetcher.fetch("http://127.0.0.1:1/product").await;
        assert!(matches!(result, Err(AppError::Http(_))));
    }
}
