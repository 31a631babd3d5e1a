//! YAML Loader module
//!
//! Parse ingestion definitions from YAML files.
//!
//! # Overview
//!
//! The loader module provides:
//! - `IngestDefinition` - Source, destination and REST sections of one ingestion
//! - YAML parsing with validation of required sections

mod parser;
mod types;

pub use parser::{load_definition, load_definition_from_str};
pub use types::{DestinationDefinition, IngestDefinition, SourceDefinition, UtilityDefinition};

#[cfg(test)]
mod tests;
