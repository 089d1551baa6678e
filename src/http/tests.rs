//! Tests for the HTTP client module

use super::*;
use crate::error::Error;
use crate::types::BackoffType;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config() -> HttpClientConfigBuilder {
    HttpClientConfig::builder().rate_limit(RateLimiterConfig::high_throughput())
}

fn fast_retries(retries: u32) -> HttpClient {
    let config = config()
        .max_retries(retries)
        .backoff(
            BackoffType::Constant,
            Duration::from_millis(10),
            Duration::from_secs(1),
        )
        .build();
    HttpClient::with_config(config).unwrap()
}

fn backoff_client(backoff_type: BackoffType, max: Duration) -> HttpClient {
    let config = config()
        .backoff(backoff_type, Duration::from_millis(100), max)
        .build();
    HttpClient::with_config(config).unwrap()
}

#[test]
fn test_http_client_config_default() {
    let config = HttpClientConfig::default();
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert_eq!(config.max_retries, 3);
    assert_eq!(config.rate_limit, RateLimiterConfig::default());
    assert!(config.user_agent.starts_with("salary-harvest/"));
}

#[test]
fn test_http_client_config_builder() {
    let config = HttpClientConfig::builder()
        .timeout(Duration::from_secs(60))
        .max_retries(5)
        .backoff(
            BackoffType::Linear,
            Duration::from_millis(200),
            Duration::from_secs(30),
        )
        .rate_limit(RateLimiterConfig::new(2, 4))
        .header("Accept-Language", "en-US")
        .user_agent("test-agent/1.0")
        .build();

    assert_eq!(config.timeout, Duration::from_secs(60));
    assert_eq!(config.max_retries, 5);
    assert_eq!(config.backoff_type, BackoffType::Linear);
    assert_eq!(config.initial_backoff, Duration::from_millis(200));
    assert_eq!(config.max_backoff, Duration::from_secs(30));
    assert_eq!(config.rate_limit, RateLimiterConfig::new(2, 4));
    assert_eq!(
        config.default_headers.get("Accept-Language"),
        Some(&"en-US".to_string())
    );
    assert_eq!(config.user_agent, "test-agent/1.0");
}

#[tokio::test]
async fn test_fetch_page_reads_body_and_content_type() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/salaries"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/csv")
                .set_body_string("Name|Title|Annual Wages\n"),
        )
        .mount(&mock_server)
        .await;

    let client = fast_retries(0);
    let url = format!("{}/salaries", mock_server.uri());
    let page = client.fetch_page(&url).await.unwrap();

    assert_eq!(page.url, url);
    assert_eq!(page.content_type.as_deref(), Some("text/csv"));
    assert_eq!(page.body, "Name|Title|Annual Wages\n");
}

#[tokio::test]
async fn test_fetch_page_sends_default_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/salaries"))
        .and(header("Accept-Language", "en-US"))
        .and(header("user-agent", "harvest-test/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = config()
        .header("Accept-Language", "en-US")
        .user_agent("harvest-test/1.0")
        .build();
    let client = HttpClient::with_config(config).unwrap();

    let page = client
        .fetch_page(&format!("{}/salaries", mock_server.uri()))
        .await
        .unwrap();
    assert_eq!(page.body, "ok");
    assert_eq!(page.content_type, None);
}

#[tokio::test]
async fn test_fetch_page_404_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not found"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = fast_retries(3);
    let err = client
        .fetch_page(&format!("{}/missing", mock_server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::HttpStatus { status: 404, .. }));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_fetch_page_retries_on_500() {
    let mock_server = MockServer::start().await;

    // First two calls return 500, third succeeds
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&mock_server)
        .await;

    let client = fast_retries(3);
    let page = client
        .fetch_page(&format!("{}/flaky", mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(page.body, "ok");
}

#[tokio::test]
async fn test_fetch_page_waits_out_429() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/limited"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("retry-after", "1")
                .set_body_string("Rate limited"),
        )
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/limited"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&mock_server)
        .await;

    let client = fast_retries(2);
    let page = client
        .fetch_page(&format!("{}/limited", mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(page.body, "ok");
}

#[tokio::test]
async fn test_fetch_page_max_retries_exceeded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/always-fail"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Server error"))
        .expect(3)
        .mount(&mock_server)
        .await;

    let client = fast_retries(2);
    let err = client
        .fetch_page(&format!("{}/always-fail", mock_server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::HttpStatus { status: 500, .. }));
}

#[tokio::test]
async fn test_fetch_page_timeout_is_retried_then_reported() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .expect(2)
        .mount(&mock_server)
        .await;

    let config = config()
        .timeout(Duration::from_millis(50))
        .max_retries(1)
        .backoff(
            BackoffType::Constant,
            Duration::from_millis(10),
            Duration::from_secs(1),
        )
        .build();
    let client = HttpClient::with_config(config).unwrap();

    let err = client
        .fetch_page(&format!("{}/slow", mock_server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Timeout { timeout_ms: 50 }));
}

#[tokio::test]
async fn test_fetch_page_rate_limited_sequence() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/salaries"))
        .respond_with(ResponseTemplate::new(200))
        .expect(3)
        .mount(&mock_server)
        .await;

    let config = HttpClientConfig::builder()
        .rate_limit(RateLimiterConfig::new(100, 1))
        .build();
    let client = HttpClient::with_config(config).unwrap();
    let url = format!("{}/salaries", mock_server.uri());

    for _ in 0..3 {
        let page = client.fetch_page(&url).await.unwrap();
        assert!(page.body.is_empty());
    }
}

#[test]
fn test_calculate_backoff_constant() {
    let client = backoff_client(BackoffType::Constant, Duration::from_secs(10));

    assert_eq!(client.calculate_backoff(0), Duration::from_millis(100));
    assert_eq!(client.calculate_backoff(1), Duration::from_millis(100));
    assert_eq!(client.calculate_backoff(5), Duration::from_millis(100));
}

#[test]
fn test_calculate_backoff_linear() {
    let client = backoff_client(BackoffType::Linear, Duration::from_secs(10));

    assert_eq!(client.calculate_backoff(0), Duration::from_millis(100));
    assert_eq!(client.calculate_backoff(1), Duration::from_millis(200));
    assert_eq!(client.calculate_backoff(2), Duration::from_millis(300));
}

#[test]
fn test_calculate_backoff_exponential() {
    let client = backoff_client(BackoffType::Exponential, Duration::from_secs(10));

    assert_eq!(client.calculate_backoff(0), Duration::from_millis(100));
    assert_eq!(client.calculate_backoff(1), Duration::from_millis(200));
    assert_eq!(client.calculate_backoff(2), Duration::from_millis(400));
    assert_eq!(client.calculate_backoff(3), Duration::from_millis(800));
}

#[test]
fn test_calculate_backoff_respects_max() {
    let client = backoff_client(BackoffType::Exponential, Duration::from_millis(500));

    assert_eq!(client.calculate_backoff(10), Duration::from_millis(500));
}

#[test]
fn test_http_client_debug() {
    let client = fast_retries(0);
    let debug_str = format!("{client:?}");
    assert!(debug_str.contains("HttpClient"));
    assert!(debug_str.contains("config"));
}
