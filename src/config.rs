//! Configuration types for the REST request and response
//!
//! This module contains the `rest_request` and `rest_response` sections of an
//! ingestion definition, and the step that splits directive-annotated entries
//! into plain values plus a parallel table of rules.

use crate::directive::RuleSet;
use crate::error::{Error, Result};
use crate::request::ParameterSet;
use crate::response::ResponseLayout;
use crate::types::{value_to_string, JsonValue};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

// ============================================================================
// Request Config
// ============================================================================

/// The `rest_request` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RestRequestConfig {
    /// Optional format appended to the base URL, e.g. `/${id}?${^REMAINING}`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Request parameters in configuration order
    #[serde(default)]
    pub parameters: IndexMap<String, ParameterEntry>,
}

/// A request parameter: a plain value or a value with directives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterEntry {
    /// `{ value: ..., transform: ..., verify: ... }`
    Directived {
        /// Parameter value
        value: JsonValue,
        /// Rules applied before the value is sent
        #[serde(flatten)]
        rules: RuleSet,
    },
    /// A plain scalar
    Plain(JsonValue),
}

impl ParameterEntry {
    /// Create a plain parameter
    pub fn plain(value: impl Into<JsonValue>) -> Self {
        Self::Plain(value.into())
    }

    /// Create a parameter with rules
    pub fn directived(value: impl Into<JsonValue>, rules: RuleSet) -> Self {
        Self::Directived {
            value: value.into(),
            rules,
        }
    }
}

impl RestRequestConfig {
    /// Create an empty request config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the request format
    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Add a parameter
    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, entry: ParameterEntry) -> Self {
        self.parameters.insert(name.into(), entry);
        self
    }

    /// Split parameters into plain values and a table of rules keyed by parameter
    ///
    /// An object without a `value` key, or with a null one, cannot be sent; it
    /// is logged and dropped. An object that has a `value` but did not parse
    /// as a directived entry carries malformed directives and is rejected.
    pub fn split(&self) -> Result<(ParameterSet, IndexMap<String, RuleSet>)> {
        let mut parameters = ParameterSet::new();
        let mut rules = IndexMap::new();

        for (name, entry) in &self.parameters {
            match entry {
                ParameterEntry::Directived {
                    value: JsonValue::Null,
                    ..
                } => {
                    warn!("Parameter '{name}' object does not specify a 'value' key, skipping");
                }
                ParameterEntry::Directived { value, rules: r } => {
                    parameters.set(name.clone(), value_to_string(value));
                    if !r.is_empty() {
                        rules.insert(name.clone(), r.clone());
                    }
                }
                ParameterEntry::Plain(JsonValue::Object(object)) if object.contains_key("value") => {
                    return Err(Error::config(format!(
                        "Transformation and verification directives for '{name}' must be objects \
                         or lists of objects"
                    )));
                }
                ParameterEntry::Plain(JsonValue::Object(_)) => {
                    warn!("Parameter '{name}' object does not specify a 'value' key, skipping");
                }
                ParameterEntry::Plain(value) => {
                    parameters.set(name.clone(), value_to_string(value));
                }
            }
        }

        Ok((parameters, rules))
    }
}

// ============================================================================
// Response Config
// ============================================================================

/// The `rest_response` section
///
/// Defaults: `results` = "results", `count` = "count", `next` = "next",
/// `prev` = "previous"; `response` and `error` unset. An explicit null turns
/// a key off.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestResponseConfig {
    /// Top-level envelope to descend into first
    #[serde(default)]
    pub response: Option<String>,

    /// Key holding the results array
    #[serde(default = "default_results")]
    pub results: Option<String>,

    /// Key holding the total result count
    #[serde(default = "default_count")]
    pub count: Option<String>,

    /// Key holding the next page URL
    #[serde(default = "default_next")]
    pub next: Option<String>,

    /// Key holding the previous page URL
    #[serde(default = "default_prev")]
    pub prev: Option<String>,

    /// Key holding an upstream error payload
    #[serde(default)]
    pub error: Option<String>,

    /// Destination column to response field, in column order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_map: Option<IndexMap<String, FieldMapEntry>>,
}

fn default_results() -> Option<String> {
    Some("results".to_string())
}

fn default_count() -> Option<String> {
    Some("count".to_string())
}

fn default_next() -> Option<String> {
    Some("next".to_string())
}

fn default_prev() -> Option<String> {
    Some("previous".to_string())
}

impl Default for RestResponseConfig {
    fn default() -> Self {
        Self {
            response: None,
            results: default_results(),
            count: default_count(),
            next: default_next(),
            prev: default_prev(),
            error: None,
            field_map: None,
        }
    }
}

/// A field map entry: a response field name or a name with directives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldMapEntry {
    /// `{ name: ..., transform: ..., verify: ... }`
    Directived {
        /// Response field name
        name: String,
        /// Rules applied to the response value
        #[serde(flatten)]
        rules: RuleSet,
    },
    /// A plain response field name
    Plain(String),
}

impl FieldMapEntry {
    /// Response field name for this entry
    pub fn field(&self) -> &str {
        match self {
            Self::Directived { name, .. } | Self::Plain(name) => name,
        }
    }
}

impl RestResponseConfig {
    /// Create a response config with the default keys
    pub fn new() -> Self {
        Self::default()
    }

    /// The key layout used to unwrap responses
    pub fn layout(&self) -> ResponseLayout {
        ResponseLayout {
            response: self.response.clone(),
            results: self.results.clone(),
            count: self.count.clone(),
            next: self.next.clone(),
            prev: self.prev.clone(),
            error: self.error.clone(),
        }
    }

    /// Split the field map into column -> field names and rules keyed by field
    ///
    /// Rules are keyed by the response field name, not the destination column,
    /// so they can be looked up directly on a response record.
    pub fn split(&self) -> (Option<IndexMap<String, String>>, IndexMap<String, RuleSet>) {
        let Some(field_map) = &self.field_map else {
            return (None, IndexMap::new());
        };

        let mut columns = IndexMap::with_capacity(field_map.len());
        let mut rules = IndexMap::new();

        for (column, entry) in field_map {
            if let FieldMapEntry::Directived { name, rules: r } = entry {
                if !r.is_empty() {
                    rules.insert(name.clone(), r.clone());
                }
            }
            columns.insert(column.clone(), entry.field().to_string());
        }

        (Some(columns), rules)
    }
}
