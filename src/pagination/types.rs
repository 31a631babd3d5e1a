//! Pagination types

use std::fmt;

/// Where to go after a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextPage {
    /// Fetch this URL next
    Continue {
        /// Next URL
        url: String,
    },
    /// No more pages
    Done,
}

impl NextPage {
    /// Create a continuation with a new URL
    pub fn with_url(url: impl Into<String>) -> Self {
        Self::Continue { url: url.into() }
    }

    /// Check if this is a done result
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// The next URL, if any
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Continue { url } => Some(url),
            Self::Done => None,
        }
    }
}

/// Engine state machine phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    /// Issuing the request at the current URL
    #[default]
    Fetching,
    /// Picking the response apart
    Unwrapping,
    /// Writing the page's records
    Collecting,
    /// Page had no results
    Skipping,
    /// Upstream reported an error for the page
    Erroring,
    /// Deciding on the next request
    Advancing,
    /// Run finished
    Exhausted,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Fetching => "fetching",
            Self::Unwrapping => "unwrapping",
            Self::Collecting => "collecting",
            Self::Skipping => "skipping",
            Self::Erroring => "erroring",
            Self::Advancing => "advancing",
            Self::Exhausted => "exhausted",
        };
        f.write_str(name)
    }
}

/// Live state of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaginationState {
    /// URL of the current request
    pub current_url: Option<String>,
    /// Requests issued so far
    pub request_count: usize,
    /// Records written so far
    pub records_processed: usize,
    /// Current phase
    pub phase: Phase,
}

impl PaginationState {
    /// Create a new pagination state
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fetch of `url`
    pub fn begin_fetch(&mut self, url: impl Into<String>) {
        self.current_url = Some(url.into());
        self.request_count += 1;
        self.phase = Phase::Fetching;
    }

    /// Move to another phase
    pub fn enter(&mut self, phase: Phase) {
        self.phase = phase;
    }

    /// Add to records processed
    pub fn add_records(&mut self, count: usize) {
        self.records_processed += count;
    }

    /// Mark the run as finished
    pub fn mark_exhausted(&mut self) {
        self.phase = Phase::Exhausted;
    }

    /// Is the run finished?
    pub fn is_exhausted(&self) -> bool {
        self.phase == Phase::Exhausted
    }
}
