//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: YAML definition → HTTP requests → DuckDB table

use rest_ingest::cli::build_engine;
use rest_ingest::database::DuckDbSink;
use rest_ingest::engine::IngestConfig;
use rest_ingest::loader::load_definition_from_str;
use rest_ingest::pagination::Phase;
use rest_ingest::Error;
use serde_json::json;
use std::path::Path;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Helpers
// ============================================================================

/// Create a warehouse file with an `items` table and optional driver ids
fn create_warehouse(dir: &Path, ids: &[i64]) -> String {
    let database = dir.join("warehouse.duckdb").to_string_lossy().to_string();
    let sink = DuckDbSink::open(&database, "items").unwrap();
    sink.execute_script(
        "CREATE TABLE items (id INTEGER PRIMARY KEY, name VARCHAR);
         CREATE TABLE ids (id INTEGER);",
    )
    .unwrap();
    for id in ids {
        sink.execute_script(&format!("INSERT INTO ids VALUES ({id});"))
            .unwrap();
    }
    database
}

fn item_count(database: &str) -> i64 {
    let sink = DuckDbSink::open(database, "items").unwrap();
    sink.connection()
        .query_row("SELECT COUNT(*) FROM items", [], |row| row.get(0))
        .unwrap()
}

fn definition(base_url: &str, database: &str, extra: &str) -> String {
    format!(
        r#"
name: items
source:
  base_url: {base_url}
destination:
  database: "{database}"
  table: items
{extra}
"#
    )
}

// ============================================================================
// Next Link Pagination
// ============================================================================

#[tokio::test]
async fn test_two_page_ingestion() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/items"))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": 1, "name": "x"}],
            "next_url": "PAGE2"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/PAGE2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": 2, "name": "y"}],
            "next_url": null
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let database = create_warehouse(dir.path(), &[]);
    let yaml = definition(
        &format!("{}/items", mock_server.uri()),
        &database,
        r"
rest_request:
  parameters:
    limit: 1
rest_response:
  results: data
  next: next_url
",
    );

    let def = load_definition_from_str(&yaml).unwrap();
    let mut engine = build_engine(&def, IngestConfig::new()).unwrap();
    let report = engine.run().await.unwrap();
    drop(engine);

    assert_eq!(report.records_processed(), 2);
    assert_eq!(report.requests_made(), 2);
    assert_eq!(report.phase(), Phase::Exhausted);
    assert_eq!(
        report.first_url,
        Some(format!("{}/items?limit=1", mock_server.uri()))
    );
    assert_eq!(item_count(&database), 2);
}

#[tokio::test]
async fn test_without_next_key_fetches_one_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"id": 1, "name": "x"}, {"id": 2, "name": "y"}],
            "next": "/items?page=2"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let database = create_warehouse(dir.path(), &[]);
    let yaml = definition(
        &format!("{}/items", mock_server.uri()),
        &database,
        "rest_request: {}\nrest_response:\n  next: ~\n",
    );

    let def = load_definition_from_str(&yaml).unwrap();
    let mut engine = build_engine(&def, IngestConfig::new()).unwrap();
    let report = engine.run().await.unwrap();
    drop(engine);

    assert_eq!(report.requests_made(), 1);
    assert_eq!(report.records_processed(), 2);
    assert_eq!(item_count(&database), 2);
}

// ============================================================================
// Row Source Iteration
// ============================================================================

#[tokio::test]
async fn test_row_source_iteration() {
    let mock_server = MockServer::start().await;

    for (id, name) in [(10, "ten"), (20, "twenty")] {
        Mock::given(method("GET"))
            .and(path(format!("/items/{id}")))
            .and(query_param("agency", "NSF"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{"id": id, "name": name}]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let dir = tempfile::tempdir().unwrap();
    let database = create_warehouse(dir.path(), &[10, 20]);
    let yaml = definition(
        &format!("{}/items", mock_server.uri()),
        &database,
        r#"
source_query: "SELECT id FROM ${UTILITY_SCHEMA}.ids ORDER BY id"
variables:
  AGENCY: NSF
rest_request:
  format: "/${id}?${^REMAINING}"
  parameters:
    agency: "${AGENCY}"
rest_response: {}
"#,
    );

    let def = load_definition_from_str(&yaml).unwrap();
    let mut engine = build_engine(&def, IngestConfig::new()).unwrap();
    let report = engine.run().await.unwrap();
    drop(engine);

    assert_eq!(report.requests_made(), 2);
    assert_eq!(report.records_processed(), 2);
    assert_eq!(item_count(&database), 2);
}

// ============================================================================
// Dry Run
// ============================================================================

#[tokio::test]
async fn test_dry_run_touches_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let database = create_warehouse(dir.path(), &[]);
    let yaml = definition(
        &format!("{}/items", mock_server.uri()),
        &database,
        "rest_request:\n  parameters:\n    limit: 50\nrest_response: {}\n",
    );

    let def = load_definition_from_str(&yaml).unwrap();
    let mut engine = build_engine(&def, IngestConfig::new().with_dry_run(true)).unwrap();
    let report = engine.run().await.unwrap();
    drop(engine);

    assert!(report.dry_run);
    assert_eq!(report.requests_made(), 0);
    assert_eq!(report.records_processed(), 0);
    assert_eq!(
        report.first_url,
        Some(format!("{}/items?limit=50", mock_server.uri()))
    );
    assert_eq!(item_count(&database), 0);
}

// ============================================================================
// Configuration Errors
// ============================================================================

#[tokio::test]
async fn test_missing_results_key_is_config_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": 1, "name": "x"}]
        })))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let database = create_warehouse(dir.path(), &[]);
    let yaml = definition(
        &format!("{}/items", mock_server.uri()),
        &database,
        "rest_request: {}\nrest_response: {}\n",
    );

    let def = load_definition_from_str(&yaml).unwrap();
    let mut engine = build_engine(&def, IngestConfig::new()).unwrap();
    let err = engine.run().await.unwrap_err();

    assert!(err.is_config());
    assert!(err.to_string().contains("'results' not found"));
}

#[tokio::test]
async fn test_invalid_directive_fails_before_any_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let database = create_warehouse(dir.path(), &[]);
    let yaml = definition(
        &format!("{}/items", mock_server.uri()),
        &database,
        r#"
rest_request:
  parameters:
    since:
      value: "2020-01-01"
      transform: { type: datetime }
rest_response: {}
"#,
    );

    let def = load_definition_from_str(&yaml).unwrap();
    let err = build_engine(&def, IngestConfig::new()).unwrap_err();
    assert!(matches!(err, Error::Config { .. }));
    assert!(err.to_string().contains("must specify a type and format"));
}

#[test]
fn test_missing_rest_response_section() {
    let yaml = definition("https://api.example.org/items", ":memory:", "rest_request: {}\n");
    let err = load_definition_from_str(&yaml).unwrap_err();
    assert!(matches!(err, Error::MissingConfigField { .. }));
}
