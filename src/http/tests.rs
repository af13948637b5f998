//! Tests for the HTTP transport

use super::*;
use crate::config::TapConfig;
use crate::error::Error;
use crate::types::BackoffType;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(server: &MockServer) -> HttpClient {
    let config = HttpClientConfig::builder()
        .base_url(format!("{}/api/v1/", server.uri()))
        .max_retries(2)
        .backoff(
            BackoffType::Constant,
            Duration::from_millis(10),
            Duration::from_secs(1),
        )
        .no_rate_limit()
        .build();
    HttpClient::with_config(config).unwrap()
}

// ============================================================================
// Config Tests
// ============================================================================

#[test]
fn test_http_client_config_default() {
    let config = HttpClientConfig::default();
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert_eq!(config.max_retries, 3);
    assert!(config.base_url.is_none());
    assert!(config.rate_limit.is_some());
    assert!(config.user_agent.starts_with("tap-forecast/"));
}

#[test]
fn test_http_client_config_from_tap_config() {
    let tap = TapConfig::from_value(json!({
        "api_key": "abc",
        "start_date": "2020-01-01T00:00:00Z",
        "requests_per_second": 4,
        "max_retries": 7,
        "user_agent": "acme-etl"
    }))
    .unwrap();

    let config = HttpClientConfig::from_tap_config(&tap);
    assert_eq!(
        config.base_url.as_deref(),
        Some("https://api.forecast.it/api/v1/")
    );
    assert_eq!(
        config.default_headers.get("X-FORECAST-API-KEY"),
        Some(&"abc".to_string())
    );
    assert_eq!(config.max_retries, 7);
    assert_eq!(config.rate_limit.unwrap().requests_per_second, 4);
    assert_eq!(config.user_agent, "acme-etl");
}

// ============================================================================
// Transport Tests
// ============================================================================

#[tokio::test]
async fn test_get_joins_base_url_and_sends_api_key() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/projects/3/milestones"))
        .and(header("X-FORECAST-API-KEY", "secret123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
        .expect(1)
        .mount(&server)
        .await;

    let tap = TapConfig::from_value(json!({
        "api_key": "secret123",
        "start_date": "2020-01-01",
        "api_url": format!("{}/api/v1", server.uri())
    }))
    .unwrap();
    let client = HttpClient::from_tap_config(&tap).unwrap();

    let body = client.get("projects/3/milestones").await.unwrap();
    assert_eq!(body, json!([{"id": 1}]));
}

#[tokio::test]
async fn test_401_and_403_are_auth_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/projects"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/persons"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let client = test_client(&server);

    let err = client.get("projects").await.unwrap_err();
    assert!(matches!(err, Error::Auth { status: 401, ref message } if message == "bad key"));

    let err = client.get("persons").await.unwrap_err();
    assert!(matches!(err, Error::Auth { status: 403, .. }));
}

#[tokio::test]
async fn test_404_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/projects/9/sprints"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not found"))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let err = client.get("projects/9/sprints").await.unwrap_err();

    assert!(err.is_not_found());
    assert!(matches!(err, Error::NotFound { ref path } if path == "projects/9/sprints"));
}

#[tokio::test]
async fn test_other_client_errors_are_distinct() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/cards"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let err = client.get("cards").await.unwrap_err();

    assert!(matches!(err, Error::HttpStatus { status: 400, .. }));
    assert!(!err.is_auth());
    assert!(!err.is_not_found());
}

#[tokio::test]
async fn test_retry_on_500_then_success() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/clients"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/clients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let client = test_client(&server);
    assert_eq!(client.get("clients").await.unwrap(), json!([]));
}

#[tokio::test]
async fn test_exhausted_retries_surface_http_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/clients"))
        .respond_with(ResponseTemplate::new(503).set_body_string("down"))
        .expect(3)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let err = client.get("clients").await.unwrap_err();

    assert!(matches!(err, Error::HttpStatus { status: 503, .. }));
    assert!(err.is_fatal());
}

#[tokio::test]
async fn test_rate_limit_retry() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/roles"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "1"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/roles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 4}])))
        .mount(&server)
        .await;

    let client = test_client(&server);
    assert_eq!(client.get("roles").await.unwrap(), json!([{"id": 4}]));
}

#[tokio::test]
async fn test_invalid_json_is_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/projects"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let err = client.get("projects").await.unwrap_err();
    assert!(matches!(err, Error::Decode { ref path, .. } if path == "projects"));
}

// ============================================================================
// Backoff Tests
// ============================================================================

fn client_with_backoff(backoff: BackoffType, max: Duration) -> HttpClient {
    let config = HttpClientConfig::builder()
        .backoff(backoff, Duration::from_millis(100), max)
        .no_rate_limit()
        .build();
    HttpClient::with_config(config).unwrap()
}

#[test]
fn test_calculate_backoff_constant() {
    let client = client_with_backoff(BackoffType::Constant, Duration::from_secs(10));
    assert_eq!(client.calculate_backoff(0), Duration::from_millis(100));
    assert_eq!(client.calculate_backoff(5), Duration::from_millis(100));
}

#[test]
fn test_calculate_backoff_linear() {
    let client = client_with_backoff(BackoffType::Linear, Duration::from_secs(10));
    assert_eq!(client.calculate_backoff(0), Duration::from_millis(100));
    assert_eq!(client.calculate_backoff(2), Duration::from_millis(300));
}

#[test]
fn test_calculate_backoff_exponential_capped() {
    let client = client_with_backoff(BackoffType::Exponential, Duration::from_millis(500));
    assert_eq!(client.calculate_backoff(1), Duration::from_millis(200));
    assert_eq!(client.calculate_backoff(2), Duration::from_millis(400));
    assert_eq!(client.calculate_backoff(10), Duration::from_millis(500));
}

#[test]
fn test_http_client_debug_hides_headers() {
    let config = HttpClientConfig::builder()
        .header("X-FORECAST-API-KEY", "do-not-print")
        .build();
    let client = HttpClient::with_config(config).unwrap();

    let debug_str = format!("{client:?}");
    assert!(debug_str.contains("HttpClient"));
    assert!(!debug_str.contains("do-not-print"));
    assert!(client.has_rate_limiter());
}
