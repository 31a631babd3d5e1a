//! Common types used throughout rest-ingest
//!
//! This module contains shared type definitions, type aliases,
//! and utility functions used across multiple modules.

use indexmap::IndexMap;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type (insertion ordered)
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// A row pulled from an auxiliary query, columns in select order
pub type Row = IndexMap<String, JsonValue>;

// ============================================================================
// Utilities
// ============================================================================

/// Convert a JSON value to the string used in URLs and directives
///
/// Null becomes the empty string. Arrays and objects are serialized as JSON.
pub fn value_to_string(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
