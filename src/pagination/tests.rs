//! Tests for pagination module

use super::*;
use crate::database::VecCursor;
use crate::directive::{compile_table, DirectiveDef, RuleSet};
use crate::request::{ParameterSet, RequestBuilder};
use crate::types::Row;
use indexmap::IndexMap;
use serde_json::json;

fn rows(ids: &[serde_json::Value]) -> Box<VecCursor> {
    let rows = ids
        .iter()
        .map(|id| {
            let mut row = Row::new();
            row.insert("id".to_string(), id.clone());
            row
        })
        .collect();
    Box::new(VecCursor::new(rows))
}

fn numeric_id_builder() -> RequestBuilder {
    let mut raw = IndexMap::new();
    raw.insert(
        "id".to_string(),
        RuleSet::new().verify(DirectiveDef::regex("/^\\d+$/")),
    );
    RequestBuilder::new("https://api.test/awards")
        .with_format(Some("/${id}.json".to_string()))
        .with_parameters(ParameterSet::new().with("id", ""))
        .with_directives(compile_table(&raw).unwrap())
}

// ============================================================================
// State Tests
// ============================================================================

#[test]
fn test_state_transitions() {
    let mut state = PaginationState::new();
    assert_eq!(state.phase, Phase::Fetching);
    assert!(!state.is_exhausted());

    state.begin_fetch("https://api.test/1");
    state.enter(Phase::Unwrapping);
    state.enter(Phase::Collecting);
    state.add_records(3);
    state.enter(Phase::Advancing);
    state.begin_fetch("https://api.test/2");
    state.mark_exhausted();

    assert_eq!(state.request_count, 2);
    assert_eq!(state.records_processed, 3);
    assert_eq!(state.current_url.as_deref(), Some("https://api.test/2"));
    assert!(state.is_exhausted());
    assert_eq!(state.phase.to_string(), "exhausted");
}

// ============================================================================
// Next Link Tests
// ============================================================================

#[test]
fn test_next_link_absolute() {
    let link = NextLink::new("next");
    let next = link.follow(Some("https://api.test/?page=2"), Some("https://api.test/?page=1"));
    assert_eq!(next.url(), Some("https://api.test/?page=2"));
}

#[test]
fn test_next_link_relative_is_resolved() {
    let link = NextLink::new("next");
    let next = link.follow(Some("/items?page=3"), Some("https://api.test/v1/items?page=2"));
    assert_eq!(next.url(), Some("https://api.test/items?page=3"));
}

#[test]
fn test_next_link_missing_or_empty_is_done() {
    let link = NextLink::new("next");
    assert!(link.follow(None, Some("https://api.test/")).is_done());
    assert!(link.follow(Some(""), Some("https://api.test/")).is_done());
}

#[test]
fn test_next_link_opaque_token_without_base() {
    let link = NextLink::new("next");
    assert_eq!(link.follow(Some("PAGE2"), None).url(), Some("PAGE2"));
}

// ============================================================================
// Row Source Tests
// ============================================================================

#[test]
fn test_row_source_skips_rejected_rows() {
    let mut builder = numeric_id_builder();
    let mut iterator = RowSourceIterator::new(rows(&[json!("x"), json!(7), json!("bad"), json!(9)]));

    assert!(iterator.advance(&mut builder).unwrap());
    assert_eq!(builder.current_url(), Some("https://api.test/awards/7.json"));

    assert!(iterator.advance(&mut builder).unwrap());
    assert_eq!(builder.current_url(), Some("https://api.test/awards/9.json"));

    assert!(!iterator.advance(&mut builder).unwrap());
    assert!(!iterator.has_next());
    assert_eq!(iterator.rows_read(), 4);
    assert_eq!(iterator.rows_skipped(), 2);

    // Stays exhausted
    assert!(!iterator.advance(&mut builder).unwrap());
}

#[test]
fn test_row_source_with_no_rows() {
    let mut builder = numeric_id_builder();
    let mut advancer = PageAdvancer::select(Some(RowSourceIterator::new(rows(&[]))), Some("next"));
    assert!(advancer.first(&mut builder).unwrap().is_done());
}

// ============================================================================
// Advancer Tests
// ============================================================================

#[test]
fn test_select_prefers_row_source() {
    let advancer = PageAdvancer::select(Some(RowSourceIterator::new(rows(&[]))), Some("next"));
    assert!(advancer.row_source().is_some());

    let advancer = PageAdvancer::select(None, Some("next"));
    assert!(matches!(advancer, PageAdvancer::NextLink(_)));

    let advancer = PageAdvancer::select(None, None);
    assert!(matches!(advancer, PageAdvancer::SinglePage));
}

#[test]
fn test_row_source_ignores_next_token() {
    let mut builder = numeric_id_builder();
    let mut advancer =
        PageAdvancer::select(Some(RowSourceIterator::new(rows(&[json!(1), json!(2)]))), Some("next"));

    let first = advancer.first(&mut builder).unwrap();
    assert_eq!(first.url(), Some("https://api.test/awards/1.json"));

    let second = advancer
        .advance(Some("https://elsewhere.test/"), first.url(), &mut builder)
        .unwrap();
    assert_eq!(second.url(), Some("https://api.test/awards/2.json"));

    let done = advancer
        .advance(Some("https://elsewhere.test/"), second.url(), &mut builder)
        .unwrap();
    assert!(done.is_done());
}

#[test]
fn test_single_page_stops_after_first() {
    let mut builder = RequestBuilder::new("https://api.test/list");
    let mut advancer = PageAdvancer::select(None, None);
    let first = advancer.first(&mut builder).unwrap();
    assert_eq!(first.url(), Some("https://api.test/list"));
    assert!(advancer
        .advance(Some("https://api.test/list?page=2"), first.url(), &mut builder)
        .unwrap()
        .is_done());
}

#[test]
fn test_first_request_rejected_is_done() {
    let mut builder = numeric_id_builder();
    builder.parameters_mut().set("id", "abc");
    let mut advancer = PageAdvancer::select(None, Some("next"));
    assert!(advancer.first(&mut builder).unwrap().is_done());
}
