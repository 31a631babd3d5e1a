//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Paginated REST API ingestion into warehouse tables
#[derive(Parser, Debug)]
#[command(name = "rest-ingest")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format for reports
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run an ingestion
    Run {
        /// Ingestion definition file (YAML)
        definition: PathBuf,

        /// Build the first request only; no requests, no writes
        #[arg(long)]
        dry_run: bool,

        /// Stop after this many requests (0 = unlimited)
        #[arg(long, default_value = "0")]
        max_requests: usize,

        /// Abort the whole run after this many seconds
        #[arg(long)]
        timeout_secs: Option<u64>,
    },

    /// Load a definition, verify its directives and print the first request
    Validate {
        /// Ingestion definition file (YAML)
        definition: PathBuf,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Indented JSON
    Pretty,
}
