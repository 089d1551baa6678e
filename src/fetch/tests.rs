//! Tests for the fetch module

use super::*;
use crate::error::Error;
use crate::http::{HttpClient, HttpClientConfig, RateLimiterConfig};
use crate::types::Target;
use regex::Regex;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn target() -> Target {
    Target::new("Kentucky", 2024, "University of Louisville")
}

fn client() -> HttpClient {
    let config = HttpClientConfig::builder()
        .rate_limit(RateLimiterConfig::high_throughput())
        .max_retries(0)
        .build();
    HttpClient::with_config(config).unwrap()
}

fn template(server: &MockServer) -> String {
    format!(
        "{}/{{{{ target.jurisdiction_slug }}}}/salaries?year={{{{ target.year }}}}&page={{{{ page }}}}",
        server.uri()
    )
}

// ============================================================================
// HttpFetcher
// ============================================================================

#[tokio::test]
async fn test_http_fetcher_renders_page_urls() {
    let server = MockServer::start().await;

    for page in ["1", "2"] {
        Mock::given(method("GET"))
            .and(path("/kentucky/salaries"))
            .and(query_param("year", "2024"))
            .and(query_param("page", page))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/csv")
                    .set_body_string(format!("Name,Title,Annual Wages\nA,B,{page}\n")),
            )
            .expect(1)
            .mount(&server)
            .await;
    }

    let mut fetcher = HttpFetcher::new(client(), template(&server));
    fetcher.begin(&target()).await.unwrap();

    let first = fetcher.fetch_current().await.unwrap();
    assert!(first.body.ends_with("A,B,1\n"));
    assert_eq!(first.content_type.as_deref(), Some("text/csv"));
    assert!(first.location.unwrap().contains("page=1"));

    assert!(fetcher.advance().await.unwrap());
    assert_eq!(fetcher.page(), 2);

    let second = fetcher.fetch_current().await.unwrap();
    assert!(second.body.ends_with("A,B,2\n"));
}

#[tokio::test]
async fn test_http_fetcher_begin_resets_page() {
    let server = MockServer::start().await;
    let mut fetcher = HttpFetcher::new(client(), template(&server));

    fetcher.begin(&target()).await.unwrap();
    fetcher.advance().await.unwrap();
    fetcher.advance().await.unwrap();
    assert_eq!(fetcher.page(), 3);

    fetcher.begin(&target()).await.unwrap();
    assert_eq!(fetcher.page(), 1);
}

#[tokio::test]
async fn test_http_fetcher_requires_begin() {
    let server = MockServer::start().await;
    let mut fetcher = HttpFetcher::new(client(), template(&server));

    let err = fetcher.fetch_current().await.unwrap_err();
    assert!(matches!(err, Error::Collaborator { .. }));

    let err = fetcher.advance().await.unwrap_err();
    assert!(err.is_navigation_failure());
}

#[tokio::test]
async fn test_http_fetcher_timeout_is_page_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let config = HttpClientConfig::builder()
        .timeout(Duration::from_millis(50))
        .max_retries(0)
        .rate_limit(RateLimiterConfig::high_throughput())
        .build();
    let mut fetcher = HttpFetcher::new(
        HttpClient::with_config(config).unwrap(),
        template(&server),
    );
    fetcher.begin(&target()).await.unwrap();

    let err = fetcher.fetch_current().await.unwrap_err();
    assert!(matches!(err, Error::FetchTimeout { page: 1, .. }));
    assert!(err.is_soft_page_failure());
}

#[tokio::test]
async fn test_http_fetcher_status_error_is_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
        .mount(&server)
        .await;

    let mut fetcher = HttpFetcher::new(client(), template(&server));
    fetcher.begin(&target()).await.unwrap();

    let err = fetcher.fetch_current().await.unwrap_err();
    assert!(matches!(err, Error::HttpStatus { status: 403, .. }));
    assert!(!err.is_soft_page_failure());
}

#[tokio::test]
async fn test_http_fetcher_next_page_pattern() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("rows <a rel=\"next\">"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string("rows, last page"))
        .mount(&server)
        .await;

    let mut fetcher = HttpFetcher::new(client(), template(&server))
        .with_next_page_pattern(Regex::new(r#"rel="next""#).unwrap());
    fetcher.begin(&target()).await.unwrap();

    // Nothing fetched yet, so there is no marker to follow
    assert!(!fetcher.advance().await.unwrap());

    fetcher.fetch_current().await.unwrap();
    assert!(fetcher.advance().await.unwrap());

    fetcher.fetch_current().await.unwrap();
    assert!(!fetcher.advance().await.unwrap());
    assert_eq!(fetcher.page(), 2);
}

#[tokio::test]
async fn test_http_fetcher_vars() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/mirror/kentucky"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let mut fetcher = HttpFetcher::new(
        client(),
        "{{ vars.base }}/mirror/{{ target.jurisdiction_slug }}",
    )
    .with_vars(serde_json::json!({"base": server.uri()}));
    fetcher.begin(&target()).await.unwrap();

    assert_eq!(fetcher.fetch_current().await.unwrap().body, "ok");
}

#[tokio::test]
async fn test_http_fetcher_rejects_relative_url() {
    let mut fetcher = HttpFetcher::new(client(), "/{{ target.jurisdiction_slug }}?page={{ page }}");
    fetcher.begin(&target()).await.unwrap();

    assert!(matches!(fetcher.current_url(), Err(Error::InvalidUrl(_))));
    let err = fetcher.fetch_current().await.unwrap_err();
    assert!(!err.is_soft_page_failure());
}

// ============================================================================
// ReplayFetcher
// ============================================================================

#[tokio::test]
async fn test_replay_from_bodies() {
    let mut fetcher = ReplayFetcher::from_bodies(["one", "two"]);
    fetcher.begin(&target()).await.unwrap();

    assert_eq!(fetcher.fetch_current().await.unwrap().body, "one");
    assert!(fetcher.advance().await.unwrap());
    assert_eq!(fetcher.fetch_current().await.unwrap().body, "two");
    assert!(!fetcher.advance().await.unwrap());
    assert_eq!(fetcher.fetch_current().await.unwrap().body, "two");

    fetcher.begin(&target()).await.unwrap();
    assert_eq!(fetcher.fetch_current().await.unwrap().body, "one");
}

#[tokio::test]
async fn test_replay_empty_sequence_is_blank() {
    let mut fetcher = ReplayFetcher::from_bodies(Vec::<String>::new());
    fetcher.begin(&target()).await.unwrap();

    assert!(fetcher.fetch_current().await.unwrap().is_blank());
    assert!(!fetcher.advance().await.unwrap());
}

#[tokio::test]
async fn test_replay_from_dir_sorted() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("page_02.csv"), "second").unwrap();
    std::fs::write(dir.path().join("page_01.csv"), "first").unwrap();
    std::fs::write(dir.path().join(".DS_Store"), "junk").unwrap();
    std::fs::create_dir(dir.path().join("nested")).unwrap();

    let mut fetcher = ReplayFetcher::from_dir(dir.path()).unwrap();
    fetcher.begin(&target()).await.unwrap();
    assert_eq!(fetcher.page_count(), 2);

    let first = fetcher.fetch_current().await.unwrap();
    assert_eq!(first.body, "first");
    assert!(first.location.unwrap().ends_with("page_01.csv"));

    assert!(fetcher.advance().await.unwrap());
    assert_eq!(fetcher.fetch_current().await.unwrap().body, "second");
}

#[tokio::test]
async fn test_replay_from_dir_per_target() {
    let dir = TempDir::new().unwrap();
    let stem = target().file_stem();
    std::fs::create_dir(dir.path().join(&stem)).unwrap();
    std::fs::write(dir.path().join(&stem).join("1.csv"), "scoped").unwrap();
    std::fs::write(dir.path().join("1.csv"), "shared").unwrap();

    let mut fetcher = ReplayFetcher::from_dir(dir.path()).unwrap();

    fetcher.begin(&target()).await.unwrap();
    assert_eq!(fetcher.fetch_current().await.unwrap().body, "scoped");

    fetcher
        .begin(&Target::new("Kentucky", 2024, "Murray State University"))
        .await
        .unwrap();
    assert_eq!(fetcher.fetch_current().await.unwrap().body, "shared");
}

#[test]
fn test_replay_from_missing_dir() {
    let err = ReplayFetcher::from_dir("/definitely/not/here").unwrap_err();
    assert!(matches!(err, Error::FileNotFound { .. }));
}

#[test]
fn test_page_content_builders() {
    let content = PageContent::new("  \n")
        .with_location("file.csv")
        .with_content_type("text/csv");
    assert!(content.is_blank());
    assert_eq!(content.location.as_deref(), Some("file.csv"));
    assert_eq!(content.content_type.as_deref(), Some("text/csv"));
}
