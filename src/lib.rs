// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # rest-ingest
//!
//! Pagination-driven ingestion of REST API results into warehouse tables.
//!
//! ## Features
//!
//! - **Declarative definitions**: request parameters, response layout and field
//!   map in one YAML file
//! - **Directives**: `datetime`, `sprintf` and `regex` transforms plus `regex`
//!   verification on parameters and response fields, checked before any I/O
//! - **Two pagination modes**: follow the response's next link, or issue one
//!   request per row of an auxiliary query
//! - **Batched upserts**: one multi-row statement per page
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rest_ingest::cli::build_engine;
//! use rest_ingest::engine::IngestConfig;
//! use rest_ingest::{load_definition, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let definition = load_definition("definitions/awards.yaml")?;
//!     let mut engine = build_engine(&definition, IngestConfig::new())?;
//!
//!     let report = engine.run().await?;
//!     println!("{} records in {} requests", report.records_processed(), report.requests_made());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         IngestEngine                            │
//! │  fetch → unwrap → collect/skip/error → advance → ... exhausted  │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌───────────┬───────────┬──────┴──────┬────────────┬─────────────┐
//! │  Request  │ Transport │  Response   │ Pagination │    Batch    │
//! ├───────────┼───────────┼─────────────┼────────────┼─────────────┤
//! │ Params    │ reqwest   │ Envelope    │ Next link  │ Field map   │
//! │ Macros    │ Redirects │ Results     │ Row source │ Directives  │
//! │ Directives│           │ Error key   │ Single     │ Upsert SQL  │
//! └───────────┴───────────┴─────────────┴────────────┴─────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)] // TODO: Document error variants and CLI fields, then drop this allow

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Request and response configuration sections
pub mod config;

/// Transform and verify directives
pub mod directive;

/// Macro substitution
pub mod template;

/// Request parameters and URL building
pub mod request;

/// Response unwrapping
pub mod response;

/// Page advancing strategies and run state
pub mod pagination;

/// Batch statement building
pub mod batch;

/// HTTP transport
pub mod http;

/// Destination and auxiliary database support via DuckDB
pub mod database;

/// Main execution engine
pub mod engine;

/// YAML loader for ingestion definitions
pub mod loader;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use engine::{IngestConfig, IngestEngine, IngestReport, IngestStats};
pub use loader::{load_definition, load_definition_from_str, IngestDefinition};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
