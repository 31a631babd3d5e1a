//! Directive types
//!
//! Raw directive definitions as they appear in configuration, and the
//! compiled form produced once they have been verified.

use super::sprintf::SprintfFormat;
use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

// ============================================================================
// Configuration Types
// ============================================================================

/// A single transform or verify rule as written in configuration
///
/// `type` and `format` are optional here so a malformed rule survives loading
/// and is reported by verification instead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectiveDef {
    /// Directive type (datetime, sprintf, regex)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Format string, meaning depends on the type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// strptime-style input format for datetime directives
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_format: Option<String>,
}

impl DirectiveDef {
    /// Create a directive with a type and format
    pub fn new(kind: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            kind: Some(kind.into()),
            format: Some(format.into()),
            input_format: None,
        }
    }

    /// Create a datetime directive
    pub fn datetime(format: impl Into<String>) -> Self {
        Self::new("datetime", format)
    }

    /// Create a sprintf directive
    pub fn sprintf(format: impl Into<String>) -> Self {
        Self::new("sprintf", format)
    }

    /// Create a regex directive
    pub fn regex(pattern: impl Into<String>) -> Self {
        Self::new("regex", pattern)
    }

    /// Set the datetime input format
    #[must_use]
    pub fn with_input_format(mut self, input_format: impl Into<String>) -> Self {
        self.input_format = Some(input_format.into());
        self
    }
}

/// Transform and verify rules attached to one parameter or response field
///
/// Either key may hold a single directive object or a list of them; both are
/// normalized to a list when loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    /// Transformations, applied in order
    #[serde(
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub transform: Vec<DirectiveDef>,
    /// Verifications, applied in order after every transformation
    #[serde(
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub verify: Vec<DirectiveDef>,
}

impl RuleSet {
    /// Create an empty rule set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a transform directive
    #[must_use]
    pub fn transform(mut self, directive: DirectiveDef) -> Self {
        self.transform.push(directive);
        self
    }

    /// Add a verify directive
    #[must_use]
    pub fn verify(mut self, directive: DirectiveDef) -> Self {
        self.verify.push(directive);
        self
    }

    /// Check if there is nothing to apply
    pub fn is_empty(&self) -> bool {
        self.transform.is_empty() && self.verify.is_empty()
    }
}

fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<DirectiveDef>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        Many(Vec<DirectiveDef>),
        One(DirectiveDef),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::Many(list)) => list,
        Some(OneOrMany::One(one)) => vec![one],
        None => Vec::new(),
    })
}

// ============================================================================
// Directive Kinds
// ============================================================================

/// Supported directive types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    /// Reformat a date/time value
    DateTime,
    /// printf-style formatting
    Sprintf,
    /// Regular expression extract or match
    Regex,
}

impl DirectiveKind {
    /// Parse a configured type name
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "datetime" => Some(Self::DateTime),
            "sprintf" => Some(Self::Sprintf),
            "regex" => Some(Self::Regex),
            _ => None,
        }
    }

    /// Whether this kind may appear under `verify`
    pub fn is_verify(self) -> bool {
        matches!(self, Self::Regex)
    }
}

impl fmt::Display for DirectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DateTime => write!(f, "datetime"),
            Self::Sprintf => write!(f, "sprintf"),
            Self::Regex => write!(f, "regex"),
        }
    }
}

// ============================================================================
// Compiled Directives
// ============================================================================

/// A verified transformation, ready to run
#[derive(Debug, Clone)]
pub enum Transform {
    /// Parse the value as a date/time and render it with `output`
    DateTime {
        /// Explicit strptime input format
        input: Option<String>,
        /// strftime output format
        output: String,
    },
    /// printf-style formatting of the value
    Sprintf(SprintfFormat),
    /// Replace the value with its first match (unchanged if none)
    Regex(Regex),
}

/// A verified verification, ready to run
#[derive(Debug, Clone)]
pub enum Verification {
    /// The value must match
    Regex(Regex),
}

/// A rule set whose directives all passed verification
#[derive(Debug, Clone)]
pub struct CompiledRuleSet {
    /// Parameter or field name, for error messages
    pub(crate) name: String,
    pub(crate) transforms: Vec<Transform>,
    pub(crate) verifications: Vec<Verification>,
}

impl CompiledRuleSet {
    /// Name of the parameter or field these rules belong to
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of transformations
    pub fn transform_count(&self) -> usize {
        self.transforms.len()
    }

    /// Number of verifications
    pub fn verify_count(&self) -> usize {
        self.verifications.len()
    }
}

/// Compiled rule sets keyed by parameter name or response field name
///
/// Built once at initialization and immutable afterwards.
#[derive(Debug, Clone, Default)]
pub struct DirectiveTable {
    pub(crate) entries: IndexMap<String, CompiledRuleSet>,
}

impl DirectiveTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the rules for a name
    pub fn get(&self, name: &str) -> Option<&CompiledRuleSet> {
        self.entries.get(name)
    }

    /// Check whether rules exist for a name
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in configuration order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &CompiledRuleSet)> {
        self.entries.iter()
    }
}
