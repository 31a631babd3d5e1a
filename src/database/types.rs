//! Database traits

use crate::batch::{BoundParam, PlaceholderStyle};
use crate::error::Result;
use crate::types::Row;

/// Where batches are written
pub trait DestinationSink: Send {
    /// Destination table name as used in SQL
    fn table_name(&self) -> &str;

    /// Column names of the destination table, in table order
    fn column_names(&self) -> Result<Vec<String>>;

    /// Storage engine kind, e.g. "duckdb" or "myisam"
    fn storage_engine(&self) -> &str;

    /// Placeholder style the backend binds
    fn placeholder_style(&self) -> PlaceholderStyle;

    /// Execute a batch statement, returning the number of rows affected
    fn execute_batch(&mut self, sql: &str, params: &[BoundParam]) -> Result<usize>;

    /// Execute a statement with no parameters
    fn execute_sql(&mut self, sql: &str) -> Result<usize>;
}

/// An auxiliary database that can be queried for driver rows
pub trait RowSource: Send {
    /// Run a query and return a forward-only cursor over its rows
    fn query(&mut self, sql: &str) -> Result<Box<dyn RowCursor>>;

    /// Schema name exposed to definitions as `${UTILITY_SCHEMA}`
    fn schema_name(&self) -> &str;
}

/// Forward-only cursor over query rows
pub trait RowCursor: Send {
    /// Next row, with columns in select order
    fn fetch_row(&mut self) -> Result<Option<Row>>;
}

/// Cursor over rows already in memory
#[derive(Debug, Default)]
pub struct VecCursor {
    rows: std::vec::IntoIter<Row>,
}

impl VecCursor {
    /// Create a cursor over rows
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows: rows.into_iter(),
        }
    }

    /// Rows not yet fetched
    pub fn remaining(&self) -> usize {
        self.rows.len()
    }
}

impl RowCursor for VecCursor {
    fn fetch_row(&mut self) -> Result<Option<Row>> {
        Ok(self.rows.next())
    }
}
