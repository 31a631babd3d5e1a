//! Pagination module
//!
//! Supports: Next link, Row source, Single page
//!
//! # Overview
//!
//! After every page the engine asks a [`PageAdvancer`] where to go next. A
//! row source (rows of an auxiliary query bound as request parameters) takes
//! precedence over any next token in the response; otherwise the configured
//! next key is followed until it is missing or null; with neither, the run
//! stops after one page.

mod advance;
mod types;

pub use advance::{NextLink, PageAdvancer, RowSourceIterator};
pub use types::{NextPage, PaginationState, Phase};

#[cfg(test)]
mod tests;
