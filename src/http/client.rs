//! reqwest-backed transport
//!
//! Wraps a `reqwest::Client` configured with a timeout, user agent and
//! default headers. There are no retries: a failed fetch ends the run.

use super::transport::Transport;
use crate::error::{Error, Result};
use async_trait::async_trait;
use bytes::Bytes;
use indexmap::IndexMap;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Configuration for the HTTP transport
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    /// Request timeout
    pub timeout: Duration,
    /// Headers sent with every request
    pub default_headers: IndexMap<String, String>,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            default_headers: IndexMap::new(),
            user_agent: format!("rest-ingest/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpTransportConfig {
    /// Create a new config builder
    pub fn builder() -> HttpTransportConfigBuilder {
        HttpTransportConfigBuilder::default()
    }
}

/// Builder for HTTP transport config
#[derive(Default)]
pub struct HttpTransportConfigBuilder {
    config: HttpTransportConfig,
}

impl HttpTransportConfigBuilder {
    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Add several default headers
    pub fn headers<K, V>(mut self, headers: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in headers {
            self.config.default_headers.insert(key.into(), value.into());
        }
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpTransportConfig {
        self.config
    }
}

/// HTTP transport
pub struct HttpTransport {
    client: Client,
    config: HttpTransportConfig,
    target: Option<Url>,
    effective: Option<Url>,
    last_status: Option<u16>,
}

impl HttpTransport {
    /// Create a transport with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(HttpTransportConfig::default())
    }

    /// Create a transport with custom configuration
    pub fn with_config(config: HttpTransportConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .default_headers(header_map(&config.default_headers)?)
            .build()?;

        Ok(Self {
            client,
            config,
            target: None,
            effective: None,
            last_status: None,
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &HttpTransportConfig {
        &self.config
    }

    /// Status code of the last response
    pub fn last_status(&self) -> Option<u16> {
        self.last_status
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn set_target_url(&mut self, url: &str) -> Result<()> {
        self.target = Some(Url::parse(url)?);
        self.effective = None;
        Ok(())
    }

    fn current_url(&self) -> Option<&str> {
        self.effective
            .as_ref()
            .or(self.target.as_ref())
            .map(Url::as_str)
    }

    async fn fetch(&mut self) -> Result<Bytes> {
        let target = self
            .target
            .clone()
            .ok_or_else(|| Error::transport("No target URL set before fetch"))?;

        debug!("GET {target}");
        let response = self.client.get(target).send().await?;

        let status = response.status();
        if status.is_success() {
            debug!("Response status {}", status.as_u16());
        } else {
            warn!("Response status {} from {}", status.as_u16(), response.url());
        }

        self.last_status = Some(status.as_u16());
        self.effective = Some(response.url().clone());
        Ok(response.bytes().await?)
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("config", &self.config)
            .field("target", &self.target.as_ref().map(Url::as_str))
            .field("last_status", &self.last_status)
            .finish_non_exhaustive()
    }
}

fn header_map(headers: &IndexMap<String, String>) -> Result<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (key, value) in headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|e| Error::invalid_value("headers", format!("'{key}': {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| Error::invalid_value("headers", format!("'{key}': {e}")))?;
        map.insert(name, value);
    }
    Ok(map)
}
