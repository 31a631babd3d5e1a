//! Request types

use crate::template::substitute;
use crate::types::{value_to_string, Row};
use indexmap::IndexMap;

// ============================================================================
// Parameter Set
// ============================================================================

/// Request parameter values keyed by name, in configuration order
///
/// Only plain strings live here; rules are kept in a separate
/// [`DirectiveTable`](crate::directive::DirectiveTable).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterSet {
    values: IndexMap<String, String>,
}

impl ParameterSet {
    /// Create an empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, keeping the original position of an existing key
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Builder-style [`set`](Self::set)
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Get a value
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Remove a value, preserving the order of the rest
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.values.shift_remove(name)
    }

    /// Assign every column of an auxiliary row as a parameter
    ///
    /// Null columns become empty strings.
    pub fn assign_row(&mut self, row: &Row) {
        for (column, value) in row {
            self.values.insert(column.clone(), value_to_string(value));
        }
    }

    /// Substitute `${NAME}` macros inside every value
    pub fn substitute_variables(&mut self, variables: &IndexMap<String, String>) {
        if variables.is_empty() {
            return;
        }
        for value in self.values.values_mut() {
            *value = substitute(value, variables).expanded;
        }
    }

    /// Iterate values in order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.values.iter()
    }

    /// Underlying ordered map
    pub fn as_map(&self) -> &IndexMap<String, String> {
        &self.values
    }

    /// Number of parameters
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<IndexMap<String, String>> for ParameterSet {
    fn from(values: IndexMap<String, String>) -> Self {
        Self { values }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

// ============================================================================
// Build Outcome
// ============================================================================

/// Result of building one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    /// Full URL to fetch
    Url(String),
    /// A parameter failed verification; this request must be skipped
    Rejected {
        /// Offending parameter
        parameter: String,
        /// Failure message
        reason: String,
    },
}

impl BuildOutcome {
    /// The URL, if the build succeeded
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Url(url) => Some(url),
            Self::Rejected { .. } => None,
        }
    }

    /// Check if the build was rejected
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}
