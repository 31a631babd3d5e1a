//! Tests for the HTTP transport module

use super::*;
use crate::error::Error;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[test]
fn test_transport_config_default() {
    let config = HttpTransportConfig::default();
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert!(config.default_headers.is_empty());
    assert!(config.user_agent.starts_with("rest-ingest/"));
}

#[test]
fn test_transport_config_builder() {
    let config = HttpTransportConfig::builder()
        .timeout(Duration::from_secs(5))
        .header("Accept", "application/json")
        .headers([("X-Api-Key", "k")])
        .user_agent("test-agent/1.0")
        .build();

    assert_eq!(config.timeout, Duration::from_secs(5));
    assert_eq!(config.default_headers.len(), 2);
    assert_eq!(
        config.default_headers.get("X-Api-Key"),
        Some(&"k".to_string())
    );
    assert_eq!(config.user_agent, "test-agent/1.0");
}

#[test]
fn test_invalid_header_rejected() {
    let config = HttpTransportConfig::builder()
        .header("bad header", "x")
        .build();
    let err = HttpTransport::with_config(config).unwrap_err();
    assert!(matches!(err, Error::InvalidConfigValue { .. }));
}

#[test]
fn test_set_target_url_validates() {
    let mut transport = HttpTransport::new().unwrap();
    assert!(matches!(
        transport.set_target_url("not a url"),
        Err(Error::InvalidUrl(_))
    ));
    assert!(transport.current_url().is_none());

    transport.set_target_url("https://api.test/a?b=1").unwrap();
    assert_eq!(transport.current_url(), Some("https://api.test/a?b=1"));
}

#[tokio::test]
async fn test_fetch_without_target_fails() {
    let mut transport = HttpTransport::new().unwrap();
    let err = transport.fetch().await.unwrap_err();
    assert!(matches!(err, Error::Transport { .. }));
}

#[tokio::test]
async fn test_fetch_returns_body_with_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/awards"))
        .and(query_param("agency", "NSF"))
        .and(header("Accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"results":[]}"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = HttpTransportConfig::builder()
        .header("Accept", "application/json")
        .build();
    let mut transport = HttpTransport::with_config(config).unwrap();
    transport
        .set_target_url(&format!("{}/awards?agency=NSF", mock_server.uri()))
        .unwrap();

    let body = transport.fetch().await.unwrap();
    assert_eq!(&body[..], br#"{"results":[]}"#);
    assert_eq!(transport.last_status(), Some(200));
}

#[tokio::test]
async fn test_error_status_is_not_interpreted() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500).set_body_string(r#"{"error":"boom"}"#))
        .mount(&mock_server)
        .await;

    let mut transport = HttpTransport::new().unwrap();
    transport
        .set_target_url(&format!("{}/broken", mock_server.uri()))
        .unwrap();

    let body = transport.fetch().await.unwrap();
    assert_eq!(&body[..], br#"{"error":"boom"}"#);
    assert_eq!(transport.last_status(), Some(500));
}

#[tokio::test]
async fn test_redirect_updates_current_url() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("Location", format!("{}/new", mock_server.uri()).as_str()),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(&mock_server)
        .await;

    let mut transport = HttpTransport::new().unwrap();
    transport
        .set_target_url(&format!("{}/old", mock_server.uri()))
        .unwrap();
    transport.fetch().await.unwrap();

    assert_eq!(
        transport.current_url(),
        Some(format!("{}/new", mock_server.uri()).as_str())
    );
}

#[tokio::test]
async fn test_connection_failure_is_http_error() {
    let uri = {
        let mock_server = MockServer::start().await;
        mock_server.uri()
    };

    let config = HttpTransportConfig::builder()
        .timeout(Duration::from_secs(2))
        .build();
    let mut transport = HttpTransport::with_config(config).unwrap();
    transport.set_target_url(&format!("{uri}/gone")).unwrap();

    let err = transport.fetch().await.unwrap_err();
    assert!(matches!(err, Error::Http(_)));
    assert!(err.is_fatal());
}
