//! Request building
//!
//! Assembles the outgoing URL for each page or auxiliary row: parameter
//! directives are applied to a copy of the current values, then the values
//! are either macro-substituted into the configured format or rendered as a
//! standard `?key=value&...` query string.

mod builder;
mod types;

pub use builder::RequestBuilder;
pub use types::{BuildOutcome, ParameterSet};
