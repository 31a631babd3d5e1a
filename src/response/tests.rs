//! Tests for response module

use super::*;
use crate::error::Error;
use serde_json::json;

fn body(value: serde_json::Value) -> Vec<u8> {
    serde_json::to_vec(&value).unwrap()
}

fn default_layout() -> ResponseLayout {
    ResponseLayout::new()
        .with_results("results")
        .with_count("count")
        .with_next("next")
        .with_prev("previous")
}

#[test]
fn test_unwrap_results_and_tokens() {
    let raw = body(json!({
        "count": 2,
        "next": "https://api.test/?page=2",
        "previous": null,
        "results": [{"id": 1}, {"id": 2}]
    }));
    let outcome = unwrap_response(&raw, &default_layout()).unwrap();
    let page = outcome.page().unwrap();

    assert_eq!(page.len(), 2);
    assert_eq!(page.count, Some(json!(2)));
    assert_eq!(page.next.as_deref(), Some("https://api.test/?page=2"));
    assert!(page.prev.is_none());
    assert_eq!(outcome.next(), Some("https://api.test/?page=2"));
}

#[test]
fn test_unwrap_descends_into_envelope() {
    let layout = ResponseLayout::new()
        .with_response("response")
        .with_results("award")
        .with_next("next");
    let raw = body(json!({
        "response": {"award": [{"id": "A"}], "next": "n2"}
    }));
    let outcome = unwrap_response(&raw, &layout).unwrap();
    let page = outcome.page().unwrap();
    assert_eq!(page.results, vec![json!({"id": "A"})]);
    assert_eq!(page.next.as_deref(), Some("n2"));
}

#[test]
fn test_unwrap_without_results_key_uses_whole_document() {
    let layout = ResponseLayout::new().with_response("data");
    let raw = body(json!({"data": [{"id": 1}, {"id": 2}, {"id": 3}]}));
    let outcome = unwrap_response(&raw, &layout).unwrap();
    assert_eq!(outcome.page().unwrap().len(), 3);
}

#[test]
fn test_empty_results_is_distinguishable() {
    let raw = body(json!({"results": [], "next": "more"}));
    let outcome = unwrap_response(&raw, &default_layout()).unwrap();
    let page = outcome.page().unwrap();
    assert!(page.is_empty());
    assert_eq!(page.next.as_deref(), Some("more"));
}

#[test]
fn test_missing_results_without_error_key_is_config_error() {
    let raw = body(json!({"items": [], "other": 1}));
    let err = unwrap_response(&raw, &default_layout()).unwrap_err();
    assert!(err.is_config());
    let msg = err.to_string();
    assert!(msg.contains("'results'"));
    assert!(msg.contains("items"));
}

#[test]
fn test_missing_results_with_error_key_is_upstream_error() {
    let layout = default_layout().with_error("error");
    let raw = body(json!({"error": {"code": 500}, "next": "retry-page"}));
    let outcome = unwrap_response(&raw, &layout).unwrap();
    assert_eq!(
        outcome,
        UnwrapOutcome::UpstreamError {
            payload: json!({"code": 500}),
            next: Some("retry-page".to_string()),
        }
    );
}

#[test]
fn test_missing_envelope_with_error_key_is_upstream_error() {
    let layout = default_layout().with_response("response").with_error("error");
    let raw = body(json!({"error": "quota exceeded"}));
    let outcome = unwrap_response(&raw, &layout).unwrap();
    assert!(matches!(outcome, UnwrapOutcome::UpstreamError { next: None, .. }));
}

#[test]
fn test_missing_envelope_without_error_key_is_config_error() {
    let layout = default_layout().with_response("response");
    let raw = body(json!({"results": []}));
    let err = unwrap_response(&raw, &layout).unwrap_err();
    assert!(matches!(err, Error::Config { .. }));
}

#[test]
fn test_configured_error_key_absent_is_still_config_error() {
    let layout = default_layout().with_error("error");
    let raw = body(json!({"nothing": true}));
    assert!(unwrap_response(&raw, &layout).unwrap_err().is_config());
}

#[test]
fn test_non_array_results_is_config_error() {
    let raw = body(json!({"results": {"id": 1}}));
    let err = unwrap_response(&raw, &default_layout()).unwrap_err();
    assert!(err.to_string().contains("array"));
}

#[test]
fn test_invalid_json_is_malformed() {
    let err = unwrap_response(b"<html>oops</html>", &default_layout()).unwrap_err();
    assert!(matches!(err, Error::MalformedResponse { .. }));
}

#[test]
fn test_non_object_document_is_malformed() {
    let err = unwrap_response(b"[1, 2, 3]", &ResponseLayout::new()).unwrap_err();
    assert!(matches!(err, Error::MalformedResponse { .. }));
}

#[test]
fn test_numeric_next_token_is_stringified() {
    let raw = body(json!({"results": [], "next": 3}));
    let outcome = unwrap_response(&raw, &default_layout()).unwrap();
    assert_eq!(outcome.next(), Some("3"));
}
