//! Directive verification and application
//!
//! Verification turns a configured `RuleSet` into a `CompiledRuleSet`
//! without touching any data: every directive must carry a type and a format,
//! the type must be supported in its position, and regex patterns, strftime
//! formats and sprintf formats must parse. Application then runs every
//! transform in order followed by every verification in order.

use super::sprintf::SprintfFormat;
use super::types::{
    CompiledRuleSet, DirectiveDef, DirectiveKind, DirectiveTable, RuleSet, Transform,
    Verification,
};
use crate::error::{Error, Result};
use crate::types::{value_to_string, JsonValue};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use indexmap::IndexMap;
use regex::{Regex, RegexBuilder};
use std::fmt::Write as _;

/// Input formats tried for datetime directives without an `input_format`
const DATETIME_INPUTS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const DATE_INPUTS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d %B %Y", "%B %d, %Y"];

/// Which list a directive came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    Transform,
    Verify,
}

impl Position {
    fn label(self) -> &'static str {
        match self {
            Self::Transform => "Transform",
            Self::Verify => "Verify",
        }
    }
}

// ============================================================================
// Verification
// ============================================================================

/// Verify a rule set without executing it
pub fn verify(name: &str, rules: &RuleSet) -> Result<()> {
    compile(name, rules).map(|_| ())
}

/// Verify a rule set and compile it for repeated application
pub fn compile(name: &str, rules: &RuleSet) -> Result<CompiledRuleSet> {
    let transforms = rules
        .transform
        .iter()
        .map(|directive| compile_transform(name, directive))
        .collect::<Result<Vec<_>>>()?;

    let verifications = rules
        .verify
        .iter()
        .map(|directive| compile_verification(name, directive))
        .collect::<Result<Vec<_>>>()?;

    Ok(CompiledRuleSet {
        name: name.to_string(),
        transforms,
        verifications,
    })
}

/// Verify and compile every rule set of a table, in configuration order
pub fn compile_table(rules: &IndexMap<String, RuleSet>) -> Result<DirectiveTable> {
    let mut entries = IndexMap::with_capacity(rules.len());
    for (name, rule_set) in rules {
        entries.insert(name.clone(), compile(name, rule_set)?);
    }
    Ok(DirectiveTable { entries })
}

fn require_parts<'a>(
    name: &str,
    directive: &'a DirectiveDef,
    position: Position,
) -> Result<(DirectiveKind, &'a str)> {
    let (Some(kind), Some(format)) = (directive.kind.as_deref(), directive.format.as_deref())
    else {
        return Err(Error::config(format!(
            "{} directive for '{name}' must specify a type and format",
            position.label()
        )));
    };

    let supported = DirectiveKind::parse(kind)
        .filter(|k| position == Position::Transform || k.is_verify())
        .ok_or_else(|| {
            Error::config(format!(
                "Unsupported {} type '{kind}' for key '{name}'",
                position.label().to_lowercase()
            ))
        })?;

    Ok((supported, format))
}

fn compile_transform(name: &str, directive: &DirectiveDef) -> Result<Transform> {
    let (kind, format) = require_parts(name, directive, Position::Transform)?;

    match kind {
        DirectiveKind::DateTime => {
            check_strftime(name, format)?;
            Ok(Transform::DateTime {
                input: directive.input_format.clone(),
                output: format.to_string(),
            })
        }
        DirectiveKind::Sprintf => SprintfFormat::parse(format)
            .map(Transform::Sprintf)
            .map_err(|e| Error::config(format!("Invalid sprintf format '{format}' for key '{name}': {e}"))),
        DirectiveKind::Regex => compile_pattern(name, format).map(Transform::Regex),
    }
}

fn compile_verification(name: &str, directive: &DirectiveDef) -> Result<Verification> {
    let (kind, format) = require_parts(name, directive, Position::Verify)?;

    match kind {
        DirectiveKind::Regex => compile_pattern(name, format).map(Verification::Regex),
        other => Err(Error::config(format!(
            "Unsupported verify type '{other}' for key '{name}'"
        ))),
    }
}

fn check_strftime(name: &str, format: &str) -> Result<()> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(Error::config(format!(
            "Invalid datetime format '{format}' for key '{name}'"
        )));
    }
    Ok(())
}

/// Compile a regex, accepting PCRE-style delimiters such as `/^\d+$/i`
pub fn compile_pattern(name: &str, pattern: &str) -> Result<Regex> {
    let (body, flags) = split_delimited(pattern).unwrap_or((pattern, ""));

    let mut builder = RegexBuilder::new(body);
    for flag in flags.chars() {
        match flag {
            'i' => builder.case_insensitive(true),
            'm' => builder.multi_line(true),
            's' => builder.dot_matches_new_line(true),
            'x' => builder.ignore_whitespace(true),
            'u' => builder.unicode(true),
            other => {
                return Err(Error::config(format!(
                    "Invalid regex flag '{other}' in '{pattern}' for key '{name}'"
                )))
            }
        };
    }

    builder
        .build()
        .map_err(|e| Error::config(format!("Invalid regex format '{pattern}' for key '{name}': {e}")))
}

/// Split `/body/flags` into its parts; `None` for a bare pattern
fn split_delimited(pattern: &str) -> Option<(&str, &str)> {
    let delimiter = pattern.chars().next().filter(|c| "/#~@!%|".contains(*c))?;
    let end = pattern.rfind(delimiter).filter(|&end| end > 0)?;
    let flags = &pattern[end + 1..];
    if flags.chars().all(|c| c.is_ascii_alphabetic()) {
        Some((&pattern[1..end], flags))
    } else {
        None
    }
}

// ============================================================================
// Application
// ============================================================================

/// Apply a compiled rule set to a value
pub fn apply(value: &JsonValue, rules: &CompiledRuleSet) -> Result<JsonValue> {
    rules.apply(value)
}

impl CompiledRuleSet {
    /// Run every transform, then every verification
    ///
    /// A value with no transforms is returned unchanged (type included).
    /// Transformed values are strings.
    pub fn apply(&self, value: &JsonValue) -> Result<JsonValue> {
        let result = if self.transforms.is_empty() {
            value.clone()
        } else {
            let mut current = value_to_string(value);
            for transform in &self.transforms {
                current = self.run_transform(transform, &current)?;
            }
            JsonValue::String(current)
        };

        if !self.verifications.is_empty() {
            let text = value_to_string(&result);
            for verification in &self.verifications {
                self.run_verification(verification, &text)?;
            }
        }

        Ok(result)
    }

    /// Apply to a plain string, returning a string
    pub fn apply_str(&self, value: &str) -> Result<String> {
        self.apply(&JsonValue::String(value.to_string()))
            .map(|v| value_to_string(&v))
    }

    fn run_transform(&self, transform: &Transform, value: &str) -> Result<String> {
        match transform {
            Transform::DateTime { input, output } => {
                let parsed = parse_datetime(value, input.as_deref()).ok_or_else(|| {
                    Error::directive(&self.name, format!("'{value}' is not a recognizable date/time"))
                })?;
                let mut out = String::new();
                write!(out, "{}", parsed.format(output)).map_err(|_| {
                    Error::directive(&self.name, format!("Failed to format '{value}' with '{output}'"))
                })?;
                Ok(out)
            }
            Transform::Sprintf(format) => format
                .render(value)
                .map_err(|e| Error::directive(&self.name, format!("sprintf '{format}': {e}"))),
            Transform::Regex(regex) => Ok(regex
                .find(value)
                .map_or_else(|| value.to_string(), |m| m.as_str().to_string())),
        }
    }

    fn run_verification(&self, verification: &Verification, value: &str) -> Result<()> {
        match verification {
            Verification::Regex(regex) => {
                if regex.is_match(value) {
                    Ok(())
                } else {
                    Err(Error::directive(
                        &self.name,
                        format!("Failed regex ({}) verification for '{value}'", regex.as_str()),
                    ))
                }
            }
        }
    }
}

/// Parse a date/time with an explicit format or a list of common ones
///
/// Offsets are normalized to UTC; date-only input is midnight.
pub fn parse_datetime(value: &str, input_format: Option<&str>) -> Option<NaiveDateTime> {
    let value = value.trim();

    if let Some(format) = input_format {
        return NaiveDateTime::parse_from_str(value, format)
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(value, format)
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
            .or_else(|| {
                DateTime::parse_from_str(value, format)
                    .ok()
                    .map(|dt| dt.with_timezone(&Utc).naive_utc())
            });
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc).naive_utc());
    }

    DATETIME_INPUTS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            DATE_INPUTS.iter().find_map(|format| {
                NaiveDate::parse_from_str(value, format)
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
        })
        .or_else(|| {
            value
                .parse::<i64>()
                .ok()
                .and_then(|secs| DateTime::from_timestamp(secs, 0))
                .map(|dt| dt.naive_utc())
        })
}
