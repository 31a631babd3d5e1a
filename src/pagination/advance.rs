//! Advancing between pages

use super::types::NextPage;
use crate::database::RowCursor;
use crate::error::{Error, Result};
use crate::request::{BuildOutcome, RequestBuilder};
use tracing::{debug, info, warn};
use url::Url;

// ============================================================================
// Next Link
// ============================================================================

/// Follows the next token found in each response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextLink {
    /// Response key holding the token
    pub key: String,
}

impl NextLink {
    /// Create a next link follower
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// Decide the next page from a response token
    ///
    /// Relative tokens are resolved against the current URL.
    pub fn follow(&self, token: Option<&str>, current_url: Option<&str>) -> NextPage {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            info!(
                "Next property '{}' not present or has null value in response, finished",
                self.key
            );
            return NextPage::Done;
        };

        let resolved = current_url
            .and_then(|current| Url::parse(current).ok())
            .and_then(|base| base.join(token).ok())
            .map_or_else(|| token.to_string(), String::from);

        NextPage::with_url(resolved)
    }
}

// ============================================================================
// Row Source Iterator
// ============================================================================

/// Drives requests from the rows of an auxiliary query
///
/// Each row's columns are bound as request parameters. Rows whose parameters
/// fail verification are skipped until one builds or the cursor runs out.
pub struct RowSourceIterator {
    cursor: Box<dyn RowCursor>,
    rows_read: usize,
    rows_skipped: usize,
    exhausted: bool,
}

impl RowSourceIterator {
    /// Wrap a cursor
    pub fn new(cursor: Box<dyn RowCursor>) -> Self {
        Self {
            cursor,
            rows_read: 0,
            rows_skipped: 0,
            exhausted: false,
        }
    }

    /// Bind the next usable row and build its request
    ///
    /// Returns `false` once the cursor is exhausted; the builder's current URL
    /// holds the request when it returns `true`.
    pub fn advance(&mut self, builder: &mut RequestBuilder) -> Result<bool> {
        if self.exhausted {
            return Ok(false);
        }

        while let Some(row) = self.cursor.fetch_row()? {
            self.rows_read += 1;
            builder.parameters_mut().assign_row(&row);

            match builder.build()? {
                BuildOutcome::Url(_) => return Ok(true),
                BuildOutcome::Rejected { parameter, .. } => {
                    debug!("Skipping source row {}: parameter '{parameter}' rejected", self.rows_read);
                    self.rows_skipped += 1;
                }
            }
        }

        self.exhausted = true;
        Ok(false)
    }

    /// Whether the cursor may still yield rows
    pub fn has_next(&self) -> bool {
        !self.exhausted
    }

    /// Rows pulled from the cursor
    pub fn rows_read(&self) -> usize {
        self.rows_read
    }

    /// Rows skipped because a parameter failed verification
    pub fn rows_skipped(&self) -> usize {
        self.rows_skipped
    }
}

impl std::fmt::Debug for RowSourceIterator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowSourceIterator")
            .field("rows_read", &self.rows_read)
            .field("rows_skipped", &self.rows_skipped)
            .field("exhausted", &self.exhausted)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Page Advancer
// ============================================================================

/// How a run moves from one page to the next
#[derive(Debug)]
pub enum PageAdvancer {
    /// Rows of an auxiliary query; response tokens are ignored
    RowSource(RowSourceIterator),
    /// The response's next token
    NextLink(NextLink),
    /// Stop after one page
    SinglePage,
}

impl PageAdvancer {
    /// Choose the strategy for a run
    pub fn select(row_source: Option<RowSourceIterator>, next_key: Option<&str>) -> Self {
        match (row_source, next_key) {
            (Some(iterator), _) => Self::RowSource(iterator),
            (None, Some(key)) => Self::NextLink(NextLink::new(key)),
            (None, None) => Self::SinglePage,
        }
    }

    /// Produce the URL of the first request
    pub fn first(&mut self, builder: &mut RequestBuilder) -> Result<NextPage> {
        match self {
            Self::RowSource(iterator) => {
                if iterator.advance(builder)? {
                    current(builder)
                } else {
                    warn!("Source query produced no usable rows");
                    Ok(NextPage::Done)
                }
            }
            Self::NextLink(_) | Self::SinglePage => match builder.build()? {
                BuildOutcome::Url(url) => Ok(NextPage::with_url(url)),
                BuildOutcome::Rejected { .. } => Ok(NextPage::Done),
            },
        }
    }

    /// Decide the next request after a page
    pub fn advance(
        &mut self,
        next_token: Option<&str>,
        current_url: Option<&str>,
        builder: &mut RequestBuilder,
    ) -> Result<NextPage> {
        match self {
            Self::RowSource(iterator) => {
                if iterator.advance(builder)? {
                    current(builder)
                } else {
                    debug!("Source query rows exhausted");
                    Ok(NextPage::Done)
                }
            }
            Self::NextLink(link) => Ok(link.follow(next_token, current_url)),
            Self::SinglePage => Ok(NextPage::Done),
        }
    }

    /// The row source, if one drives this run
    pub fn row_source(&self) -> Option<&RowSourceIterator> {
        match self {
            Self::RowSource(iterator) => Some(iterator),
            _ => None,
        }
    }
}

fn current(builder: &RequestBuilder) -> Result<NextPage> {
    builder
        .current_url()
        .map(NextPage::with_url)
        .ok_or_else(|| Error::Other("Request builder has no current URL".to_string()))
}
