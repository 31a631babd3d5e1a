//! Response types

use crate::types::JsonValue;

/// Key names used to pick a response apart
///
/// Every key is optional; `None` means "not configured".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseLayout {
    /// Envelope to descend into first
    pub response: Option<String>,
    /// Results array key; when unset the whole document is the results array
    pub results: Option<String>,
    /// Total count key
    pub count: Option<String>,
    /// Next page token key
    pub next: Option<String>,
    /// Previous page token key
    pub prev: Option<String>,
    /// Upstream error payload key
    pub error: Option<String>,
}

impl ResponseLayout {
    /// Create a layout with no keys configured
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the envelope key
    #[must_use]
    pub fn with_response(mut self, key: impl Into<String>) -> Self {
        self.response = Some(key.into());
        self
    }

    /// Set the results key
    #[must_use]
    pub fn with_results(mut self, key: impl Into<String>) -> Self {
        self.results = Some(key.into());
        self
    }

    /// Set the count key
    #[must_use]
    pub fn with_count(mut self, key: impl Into<String>) -> Self {
        self.count = Some(key.into());
        self
    }

    /// Set the next key
    #[must_use]
    pub fn with_next(mut self, key: impl Into<String>) -> Self {
        self.next = Some(key.into());
        self
    }

    /// Set the previous key
    #[must_use]
    pub fn with_prev(mut self, key: impl Into<String>) -> Self {
        self.prev = Some(key.into());
        self
    }

    /// Set the error key
    #[must_use]
    pub fn with_error(mut self, key: impl Into<String>) -> Self {
        self.error = Some(key.into());
        self
    }
}

/// A successfully unwrapped page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnwrappedPage {
    /// Result records in response order
    pub results: Vec<JsonValue>,
    /// Total count reported by the API
    pub count: Option<JsonValue>,
    /// Next page token
    pub next: Option<String>,
    /// Previous page token
    pub prev: Option<String>,
}

impl UnwrappedPage {
    /// A well-formed page with no results
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Number of results
    pub fn len(&self) -> usize {
        self.results.len()
    }
}

/// What a response turned out to be
#[derive(Debug, Clone, PartialEq)]
pub enum UnwrapOutcome {
    /// Results were found (possibly none)
    Page(UnwrappedPage),
    /// The configured error key was present instead of the expected data
    UpstreamError {
        /// Error payload as returned
        payload: JsonValue,
        /// Next token found alongside the error
        next: Option<String>,
    },
}

impl UnwrapOutcome {
    /// Next page token, whichever way the response went
    pub fn next(&self) -> Option<&str> {
        match self {
            Self::Page(page) => page.next.as_deref(),
            Self::UpstreamError { next, .. } => next.as_deref(),
        }
    }

    /// The page, if this was not an upstream error
    pub fn page(&self) -> Option<&UnwrappedPage> {
        match self {
            Self::Page(page) => Some(page),
            Self::UpstreamError { .. } => None,
        }
    }
}
