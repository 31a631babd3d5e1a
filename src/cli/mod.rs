//! CLI module
//!
//! Command-line interface for running ingestions.
//!
//! # Commands
//!
//! - `run` - Ingest an endpoint into its destination table
//! - `validate` - Check a definition and print the first request

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::{build_engine, Runner};
