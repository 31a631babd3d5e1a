//! No-op backend for dry runs

use super::types::{DestinationSink, RowCursor, RowSource, VecCursor};
use crate::batch::{BoundParam, PlaceholderStyle};
use crate::error::Result;
use tracing::debug;

/// Sink that reports no columns, writes nothing and queries nothing
#[derive(Debug, Clone, Default)]
pub struct NullSink {
    table: String,
}

impl NullSink {
    /// Create a null sink standing in for a table
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
        }
    }
}

impl DestinationSink for NullSink {
    fn table_name(&self) -> &str {
        &self.table
    }

    fn column_names(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    fn storage_engine(&self) -> &str {
        "null"
    }

    fn placeholder_style(&self) -> PlaceholderStyle {
        PlaceholderStyle::Named
    }

    fn execute_batch(&mut self, sql: &str, params: &[BoundParam]) -> Result<usize> {
        debug!("NullSink: discarding batch with {} parameters", params.len());
        debug!("{sql}");
        Ok(0)
    }

    fn execute_sql(&mut self, sql: &str) -> Result<usize> {
        debug!("NullSink: discarding {sql}");
        Ok(0)
    }
}

impl RowSource for NullSink {
    fn query(&mut self, sql: &str) -> Result<Box<dyn RowCursor>> {
        debug!("NullSink: returning no rows for {sql}");
        Ok(Box::new(VecCursor::default()))
    }

    fn schema_name(&self) -> &str {
        "main"
    }
}
