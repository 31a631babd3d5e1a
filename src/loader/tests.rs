//! Tests for YAML loader module

use super::*;
use crate::config::ParameterEntry;
use crate::error::Error;
use indexmap::IndexMap;
use std::io::Write;
use std::time::Duration;

const FULL: &str = r#"
name: awards
source:
  base_url: https://api.example.org/awards.json
  sleep_ms: 250
  headers:
    Accept: application/json
destination:
  database: warehouse.duckdb
  table: awards
utility:
  database: aux.duckdb
source_query: "SELECT id FROM ${UTILITY_SCHEMA}.ids"
variables:
  AGENCY: NSF
rest_request:
  format: "?${^REMAINING}"
  parameters:
    agency: "${AGENCY}"
    startDate:
      value: "2020-01-01"
      transform:
        type: datetime
        format: "%m/%d/%Y"
rest_response:
  response: response
  results: award
  error: error
  field_map:
    award_id: id
    title:
      name: title
      verify:
        type: regex
        format: "/\\S/"
"#;

const MINIMAL: &str = r#"
name: minimal
source:
  base_url: https://api.example.org/items
destination:
  table: items
rest_request: {}
rest_response: {}
"#;

// ============================================================================
// Basic Loading Tests
// ============================================================================

#[test]
fn test_load_full_definition() {
    let def = load_definition_from_str(FULL).unwrap();
    assert_eq!(def.name, "awards");
    assert_eq!(def.source.base_url, "https://api.example.org/awards.json");
    assert_eq!(def.source.timeout_secs, 30);
    assert_eq!(def.source.request_delay(), Duration::from_millis(250));
    assert_eq!(def.destination.table, "awards");
    assert_eq!(def.utility_database(), "aux.duckdb");
    assert_eq!(def.variables["AGENCY"], "NSF");

    let request = def.request().unwrap();
    assert_eq!(request.format.as_deref(), Some("?${^REMAINING}"));
    assert_eq!(request.parameters["agency"], ParameterEntry::plain("${AGENCY}"));

    let response = def.response().unwrap();
    assert_eq!(response.results.as_deref(), Some("award"));
    assert_eq!(response.next.as_deref(), Some("next"));
    assert_eq!(response.field_map.as_ref().map(IndexMap::len), Some(2));
}

#[test]
fn test_load_minimal_definition_defaults() {
    let def = load_definition_from_str(MINIMAL).unwrap();
    assert_eq!(def.destination.database, ":memory:");
    assert_eq!(def.utility_database(), ":memory:");
    assert!(def.source_query.is_none());
    assert!(def.variables.is_empty());
    assert_eq!(def.source.request_delay(), Duration::ZERO);
}

#[test]
fn test_transport_config_from_source() {
    let def = load_definition_from_str(FULL).unwrap();
    let config = def.source.transport_config();
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert_eq!(
        config.default_headers.get("Accept").map(String::as_str),
        Some("application/json")
    );
}

// ============================================================================
// Validation Tests
// ============================================================================

#[test]
fn test_missing_rest_response_is_rejected() {
    let yaml = MINIMAL.replace("rest_response: {}\n", "");
    let err = load_definition_from_str(&yaml).unwrap_err();
    assert!(matches!(err, Error::MissingConfigField { ref field } if field == "rest_response"));
}

#[test]
fn test_missing_rest_request_is_rejected() {
    let yaml = MINIMAL.replace("rest_request: {}\n", "");
    let err = load_definition_from_str(&yaml).unwrap_err();
    assert!(matches!(err, Error::MissingConfigField { ref field } if field == "rest_request"));
}

#[test]
fn test_invalid_base_url_is_rejected() {
    let yaml = MINIMAL.replace("https://api.example.org/items", "not a url");
    let err = load_definition_from_str(&yaml).unwrap_err();
    assert!(matches!(err, Error::InvalidConfigValue { .. }));
}

#[test]
fn test_zero_timeout_is_rejected() {
    let yaml = MINIMAL.replace(
        "  base_url: https://api.example.org/items\n",
        "  base_url: https://api.example.org/items\n  timeout_secs: 0\n",
    );
    assert!(load_definition_from_str(&yaml).unwrap_err().is_config());
}

#[test]
fn test_invalid_yaml_is_config_error() {
    let err = load_definition_from_str("name: [unterminated").unwrap_err();
    assert!(err.is_config());
}

// ============================================================================
// File Loading Tests
// ============================================================================

#[test]
fn test_load_definition_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(FULL.as_bytes()).unwrap();

    let def = load_definition(file.path()).unwrap();
    assert_eq!(def.name, "awards");
}

#[test]
fn test_load_definition_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_definition(dir.path().join("missing.yaml")).unwrap_err();
    assert!(matches!(err, Error::FileNotFound { .. }));
}
