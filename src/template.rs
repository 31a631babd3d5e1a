//! Macro substitution for request formats and parameters
//!
//! Handles `${NAME}` interpolation against a key/value map. The reserved
//! `${^REMAINING}` macro expands to a query string holding every variable the
//! template did not consume explicitly, in the map's insertion order.

use indexmap::IndexMap;
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Regex for matching macros: ${NAME} or ${^NAME}
static MACRO_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{(\^?[A-Za-z0-9_]+)\}").unwrap());

/// Name of the reserved "remaining parameters" macro
pub const REMAINING: &str = "^REMAINING";

/// The reserved macro as it appears in a template
pub const REMAINING_MACRO: &str = "${^REMAINING}";

/// Result of a substitution pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    /// Template with every known macro replaced
    pub expanded: String,
    /// Variables consumed, in order of first use
    pub used: Vec<String>,
}

/// Replace `${NAME}` tokens with values from `variables`
///
/// Unknown macros are left untouched so a later pass can still fill them.
pub fn substitute(template: &str, variables: &IndexMap<String, String>) -> Substitution {
    let mut used: Vec<String> = Vec::new();

    let expanded = MACRO_REGEX.replace_all(template, |cap: &Captures<'_>| {
        let name = &cap[1];
        match variables.get(name) {
            Some(value) => {
                if !used.iter().any(|u| u == name) {
                    used.push(name.to_string());
                }
                value.clone()
            }
            None => cap[0].to_string(),
        }
    });

    Substitution {
        expanded: expanded.into_owned(),
        used,
    }
}

/// Substitute a request format, expanding `${^REMAINING}` with unused parameters
pub fn expand_format(format: &str, parameters: &IndexMap<String, String>) -> String {
    let first = substitute(format, parameters);
    if !first.expanded.contains(REMAINING_MACRO) {
        return first.expanded;
    }

    let remaining = encode_query(
        parameters
            .iter()
            .filter(|(key, _)| !first.used.iter().any(|u| u == *key)),
    );

    let mut vars = IndexMap::new();
    vars.insert(REMAINING.to_string(), remaining);
    substitute(&first.expanded, &vars).expanded
}

/// URL-encode key/value pairs and join them with `&`
pub fn encode_query<'a, I>(pairs: I) -> String
where
    I: IntoIterator<Item = (&'a String, &'a String)>,
{
    pairs
        .into_iter()
        .map(|(key, value)| format!("{}={}", url_encode(key), url_encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Form-style URL encoding (space becomes `+`)
pub fn url_encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Check if a string contains macros
pub fn has_macros(s: &str) -> bool {
    MACRO_REGEX.is_match(s)
}

/// Extract all macro names from a template
pub fn extract_variables(template: &str) -> Vec<String> {
    MACRO_REGEX
        .captures_iter(template)
        .map(|cap| cap[1].to_string())
        .collect()
}
