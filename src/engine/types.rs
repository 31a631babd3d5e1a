//! Engine types
//!
//! Configuration, statistics and the final report of an ingestion run.

use crate::pagination::{PaginationState, Phase};
use std::time::Duration;

/// Configuration for an ingestion run
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Build the first request and stop, without network I/O or writes
    pub dry_run: bool,
    /// Sleep between requests
    pub request_delay: Option<Duration>,
    /// Log progress every this many records
    pub log_every: usize,
    /// Maximum requests to make (0 = unlimited)
    pub max_requests: usize,
    /// Abort the whole run after this long
    pub deadline: Option<Duration>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            request_delay: None,
            log_every: 10_000,
            max_requests: 0,
            deadline: None,
        }
    }
}

impl IngestConfig {
    /// Create a new ingest config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set dry run mode
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Set the delay between requests
    #[must_use]
    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = (!delay.is_zero()).then_some(delay);
        self
    }

    /// Set the progress log interval
    #[must_use]
    pub fn with_log_every(mut self, records: usize) -> Self {
        self.log_every = records.max(1);
        self
    }

    /// Set max requests
    #[must_use]
    pub fn with_max_requests(mut self, max: usize) -> Self {
        self.max_requests = max;
        self
    }

    /// Set a run deadline
    #[must_use]
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Statistics from an ingestion run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestStats {
    /// Records written
    pub records_processed: usize,
    /// Requests made
    pub requests_made: usize,
    /// Well-formed pages with no results
    pub empty_pages: usize,
    /// Pages where the upstream reported an error
    pub upstream_errors: usize,
    /// Records that supplied fewer fields than there are columns
    pub column_mismatches: usize,
    /// Response fields dropped because a directive failed
    pub field_directive_failures: usize,
    /// Source rows skipped because a parameter failed verification
    pub rows_skipped: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl IngestStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Add records
    pub fn add_records(&mut self, count: usize) {
        self.records_processed += count;
    }

    /// Add a request
    pub fn add_request(&mut self) {
        self.requests_made += 1;
    }

    /// Set duration
    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }
}

/// Outcome of a completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    /// Run statistics
    pub stats: IngestStats,
    /// Final pagination state
    pub state: PaginationState,
    /// First request URL
    pub first_url: Option<String>,
    /// Whether this was a dry run
    pub dry_run: bool,
}

impl IngestReport {
    /// Records written
    pub fn records_processed(&self) -> usize {
        self.stats.records_processed
    }

    /// Requests made
    pub fn requests_made(&self) -> usize {
        self.stats.requests_made
    }

    /// Final phase
    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    /// Did the run end normally?
    pub fn is_exhausted(&self) -> bool {
        self.state.is_exhausted()
    }
}
