//! Request builder implementation

use super::types::{BuildOutcome, ParameterSet};
use crate::directive::DirectiveTable;
use crate::error::{Error, Result};
use crate::template::{encode_query, expand_format};
use indexmap::IndexMap;
use tracing::{debug, error};

/// Builds request URLs from parameters, directives and an optional format
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    base_url: String,
    format: Option<String>,
    parameters: ParameterSet,
    directives: DirectiveTable,
    current_url: Option<String>,
}

impl RequestBuilder {
    /// Create a builder for a base URL with no parameters
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            format: None,
            parameters: ParameterSet::new(),
            directives: DirectiveTable::new(),
            current_url: None,
        }
    }

    /// Set the request format
    #[must_use]
    pub fn with_format(mut self, format: Option<String>) -> Self {
        self.format = format;
        self
    }

    /// Set the parameters
    #[must_use]
    pub fn with_parameters(mut self, parameters: ParameterSet) -> Self {
        self.parameters = parameters;
        self
    }

    /// Set the parameter directives
    #[must_use]
    pub fn with_directives(mut self, directives: DirectiveTable) -> Self {
        self.directives = directives;
        self
    }

    /// Base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Request format, if any
    pub fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    /// Current parameter values (before directives)
    pub fn parameters(&self) -> &ParameterSet {
        &self.parameters
    }

    /// Mutable access for row-driven rebinding
    pub fn parameters_mut(&mut self) -> &mut ParameterSet {
        &mut self.parameters
    }

    /// Parameter directives
    pub fn directives(&self) -> &DirectiveTable {
        &self.directives
    }

    /// URL produced by the last successful build
    pub fn current_url(&self) -> Option<&str> {
        self.current_url.as_deref()
    }

    /// Build the next request URL
    ///
    /// Directives run on a copy of the parameters so the configured values are
    /// never transformed twice. A failed verification yields
    /// [`BuildOutcome::Rejected`] and leaves the current URL untouched; any
    /// other directive error is returned.
    pub fn build(&mut self) -> Result<BuildOutcome> {
        let resolved = match self.resolve() {
            Ok(resolved) => resolved,
            Err((parameter, err)) if err.is_recoverable() => {
                error!("Request parameter '{parameter}' rejected: {err}");
                return Ok(BuildOutcome::Rejected {
                    parameter,
                    reason: err.to_string(),
                });
            }
            Err((_, err)) => return Err(err),
        };

        let query = match &self.format {
            _ if resolved.is_empty() => String::new(),
            Some(format) => expand_format(format, &resolved),
            None => format!("?{}", encode_query(&resolved)),
        };

        let url = format!("{}{}", self.base_url, query);
        debug!("Built request URL: {url}");
        self.current_url = Some(url.clone());
        Ok(BuildOutcome::Url(url))
    }

    /// Apply directives to every parameter that has them
    fn resolve(&self) -> std::result::Result<IndexMap<String, String>, (String, Error)> {
        let mut resolved = IndexMap::with_capacity(self.parameters.len());
        for (name, value) in self.parameters.iter() {
            let value = match self.directives.get(name) {
                Some(rules) => rules.apply_str(value).map_err(|e| (name.clone(), e))?,
                None => value.clone(),
            };
            resolved.insert(name.clone(), value);
        }
        Ok(resolved)
    }
}
