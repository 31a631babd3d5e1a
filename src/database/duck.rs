//! DuckDB destination and row source
//!
//! Batches run inside a transaction so a page is either fully written or not
//! at all. Query rows are exported with DuckDB's native JSON writer, which
//! keeps column order and type conversions in DuckDB's hands.

use super::types::{DestinationSink, RowCursor, RowSource, VecCursor};
use crate::batch::{BoundParam, PlaceholderStyle};
use crate::error::{Error, Result};
use crate::types::{JsonValue, Row};
use duckdb::types::Value;
use duckdb::{params_from_iter, Connection};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

static EXPORT_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// DuckDB-backed sink and row source
pub struct DuckDbSink {
    conn: Connection,
    database: String,
    table: String,
}

impl DuckDbSink {
    /// Open a database file, or an in-memory database for ":memory:"
    pub fn open(database: &str, table: impl Into<String>) -> Result<Self> {
        let conn = if database == ":memory:" {
            Connection::open_in_memory()
        } else {
            Connection::open(database)
        }
        .map_err(|e| Error::destination(format!("Failed to open DuckDB '{database}': {e}")))?;

        Ok(Self {
            conn,
            database: database.to_string(),
            table: table.into(),
        })
    }

    /// Wrap an existing connection
    pub fn from_connection(conn: Connection, table: impl Into<String>) -> Self {
        Self {
            conn,
            database: ":memory:".to_string(),
            table: table.into(),
        }
    }

    /// Another handle on the same database
    pub fn try_clone(&self) -> Result<Self> {
        Ok(Self {
            conn: self.conn.try_clone()?,
            database: self.database.clone(),
            table: self.table.clone(),
        })
    }

    /// Underlying connection
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Database path or ":memory:"
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Run statements that return nothing (DDL, fixtures)
    pub fn execute_script(&self, sql: &str) -> Result<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    /// Unqualified table name, as stored in information_schema
    fn bare_table(&self) -> &str {
        self.table.rsplit('.').next().unwrap_or(&self.table)
    }
}

impl DestinationSink for DuckDbSink {
    fn table_name(&self) -> &str {
        &self.table
    }

    fn column_names(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT column_name FROM information_schema.columns \
             WHERE table_name = ? ORDER BY ordinal_position",
        )?;
        let columns = stmt
            .query_map([self.bare_table()], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        if columns.is_empty() {
            return Err(Error::destination(format!(
                "Destination table '{}' does not exist",
                self.table
            )));
        }
        Ok(columns)
    }

    fn storage_engine(&self) -> &str {
        "duckdb"
    }

    fn placeholder_style(&self) -> PlaceholderStyle {
        PlaceholderStyle::Positional
    }

    fn execute_batch(&mut self, sql: &str, params: &[BoundParam]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let affected = tx.execute(sql, params_from_iter(params.iter().map(|p| to_duckdb(&p.value))))?;
        tx.commit()?;
        Ok(affected)
    }

    fn execute_sql(&mut self, sql: &str) -> Result<usize> {
        Ok(self.conn.execute(sql, [])?)
    }
}

impl RowSource for DuckDbSink {
    fn query(&mut self, sql: &str) -> Result<Box<dyn RowCursor>> {
        let query = sql.trim().trim_end_matches(';');
        let temp_file = std::env::temp_dir().join(format!(
            "rest_ingest_rows_{}_{}.json",
            std::process::id(),
            EXPORT_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        let temp_path = temp_file
            .to_str()
            .ok_or_else(|| Error::destination("Invalid temp path"))?
            .replace('\'', "''");

        debug!("Exporting source query rows: {query}");
        let copy_sql = format!("COPY ({query}) TO '{temp_path}' (FORMAT JSON, ARRAY true);");
        self.conn.execute_batch(&copy_sql)?;

        let content = std::fs::read_to_string(&temp_file);
        let _ = std::fs::remove_file(&temp_file);
        let content = content?;

        let records: Vec<JsonValue> = if content.trim().is_empty() {
            Vec::new()
        } else {
            serde_json::from_str(&content)?
        };

        let rows = records
            .into_iter()
            .map(|record| match record {
                JsonValue::Object(map) => Ok(map.into_iter().collect::<Row>()),
                other => Err(Error::destination(format!(
                    "Source query produced a non-object row: {other}"
                ))),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Box::new(VecCursor::new(rows)))
    }

    fn schema_name(&self) -> &str {
        "main"
    }
}

impl std::fmt::Debug for DuckDbSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuckDbSink")
            .field("database", &self.database)
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

/// Convert a JSON value to a DuckDB value for binding
///
/// Nested arrays and objects are bound as their JSON text.
pub(crate) fn to_duckdb(value: &JsonValue) -> Value {
    match value {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Boolean(*b),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::BigInt(i)
            } else if let Some(u) = n.as_u64() {
                Value::UBigInt(u)
            } else {
                n.as_f64().map_or(Value::Null, Value::Double)
            }
        }
        JsonValue::String(s) => Value::Text(s.clone()),
        other => Value::Text(other.to_string()),
    }
}
