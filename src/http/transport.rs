//! Transport trait

use crate::error::Result;
use async_trait::async_trait;
use bytes::Bytes;

/// A single-target fetcher owned by the engine for the duration of a run
#[async_trait]
pub trait Transport: Send {
    /// Point the transport at a new URL
    fn set_target_url(&mut self, url: &str) -> Result<()>;

    /// The URL the last fetch ended up at, or the target if none was made
    fn current_url(&self) -> Option<&str>;

    /// Fetch the raw body at the target URL
    async fn fetch(&mut self) -> Result<Bytes>;
}
