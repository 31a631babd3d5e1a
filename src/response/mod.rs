//! Response unwrapping
//!
//! Locates the results array, total count, next/previous tokens and an
//! optional upstream error payload inside a JSON response, using key names
//! from the `rest_response` configuration.

mod types;
mod unwrap;

pub use types::{ResponseLayout, UnwrapOutcome, UnwrappedPage};
pub use unwrap::unwrap_response;

#[cfg(test)]
mod tests;
