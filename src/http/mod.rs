//! HTTP transport module
//!
//! Provides the transport the ingestion engine fetches pages through.
//!
//! # Features
//!
//! - **Target URL**: the engine points the transport at each page in turn
//! - **Effective URL**: redirects are followed and the final URL is kept
//! - **No status interpretation**: any response that arrives is handed back
//!   as bytes; only network-level failures are errors

mod client;
mod transport;

pub use client::{HttpTransport, HttpTransportConfig, HttpTransportConfigBuilder};
pub use transport::Transport;

#[cfg(test)]
mod tests;
