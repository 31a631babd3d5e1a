//! Batch record building
//!
//! Maps result records onto destination columns and assembles one multi-row
//! upsert per page. Column order is fixed once per run by the [`FieldMapping`]
//! so every VALUES tuple lines up with the same column list, whatever order
//! the keys of each record arrive in.

mod builder;
mod types;

pub use builder::BatchBuilder;
pub use types::{BatchStatement, BoundParam, FieldMapping, PlaceholderStyle};
