//! Loader types
//!
//! Declarative ingestion definition types for YAML parsing.

use crate::config::{RestRequestConfig, RestResponseConfig};
use crate::error::{Error, Result};
use crate::http::HttpTransportConfig;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::time::Duration;

// ============================================================================
// Ingest Definition
// ============================================================================

/// Top-level ingestion definition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct IngestDefinition {
    /// Definition name, used in logs
    pub name: String,
    /// REST endpoint
    pub source: SourceDefinition,
    /// Destination table
    pub destination: DestinationDefinition,
    /// Auxiliary database for the source query (defaults to the destination)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utility: Option<UtilityDefinition>,
    /// Query whose rows drive one request each
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_query: Option<String>,
    /// Macro variables for parameter values and the source query
    #[serde(default)]
    pub variables: IndexMap<String, String>,
    /// Request parameters
    #[serde(default)]
    pub rest_request: Option<RestRequestConfig>,
    /// Response layout and field map
    #[serde(default)]
    pub rest_response: Option<RestResponseConfig>,
}

impl IngestDefinition {
    /// Check required sections and values
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::config("Definition name cannot be empty"));
        }
        if self.source.base_url.is_empty() {
            return Err(Error::missing_field("source.base_url"));
        }
        url::Url::parse(&self.source.base_url)
            .map_err(|e| Error::invalid_value("source.base_url", e.to_string()))?;
        if self.destination.table.is_empty() {
            return Err(Error::missing_field("destination.table"));
        }
        if self.rest_request.is_none() {
            return Err(Error::missing_field("rest_request"));
        }
        if self.rest_response.is_none() {
            return Err(Error::missing_field("rest_response"));
        }
        if self.source.timeout_secs == 0 {
            return Err(Error::invalid_value(
                "source.timeout_secs",
                "must be greater than zero",
            ));
        }
        Ok(())
    }

    /// The `rest_request` section
    pub fn request(&self) -> Result<&RestRequestConfig> {
        self.rest_request
            .as_ref()
            .ok_or_else(|| Error::missing_field("rest_request"))
    }

    /// The `rest_response` section
    pub fn response(&self) -> Result<&RestResponseConfig> {
        self.rest_response
            .as_ref()
            .ok_or_else(|| Error::missing_field("rest_response"))
    }

    /// Database holding the source query's rows
    pub fn utility_database(&self) -> &str {
        self.utility
            .as_ref()
            .map_or(&self.destination.database, |u| &u.database)
    }
}

// ============================================================================
// Sections
// ============================================================================

/// REST endpoint definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDefinition {
    /// Base URL that the request format and query are appended to
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Delay between requests in milliseconds
    #[serde(default)]
    pub sleep_ms: u64,
    /// Extra request headers
    #[serde(default)]
    pub headers: IndexMap<String, String>,
}

fn default_timeout_secs() -> u64 {
    30
}

impl SourceDefinition {
    /// Transport configuration for this source
    pub fn transport_config(&self) -> HttpTransportConfig {
        HttpTransportConfig::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .headers(self.headers.clone())
            .build()
    }

    /// Delay between requests
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.sleep_ms)
    }
}

/// Destination definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationDefinition {
    /// DuckDB database path or ":memory:"
    #[serde(default = "default_database")]
    pub database: String,
    /// Table name
    pub table: String,
}

fn default_database() -> String {
    ":memory:".to_string()
}

/// Auxiliary database definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UtilityDefinition {
    /// DuckDB database path or ":memory:"
    #[serde(default = "default_database")]
    pub database: String,
}
