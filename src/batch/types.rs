//! Batch types

use crate::error::{Error, Result};
use crate::types::JsonValue;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// ============================================================================
// Field Mapping
// ============================================================================

/// Destination column to response field, in column order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMapping {
    columns: IndexMap<String, String>,
}

impl FieldMapping {
    /// Use a configured field map
    ///
    /// Every column must exist in `table_columns`. An empty column list
    /// (a sink that cannot report its schema) skips the check.
    pub fn configured(columns: IndexMap<String, String>, table_columns: &[String]) -> Result<Self> {
        let unknown = unknown_columns(columns.keys(), table_columns);
        if !unknown.is_empty() {
            return Err(Error::config(format!(
                "Field map references columns not found in destination table: {}",
                unknown.join(",")
            )));
        }
        Ok(Self { columns })
    }

    /// Build an identity mapping from the keys of the first result record
    ///
    /// Every key must be a destination column.
    pub fn discover(first: &JsonValue, table_columns: &[String]) -> Result<Self> {
        let Some(record) = first.as_object() else {
            return Err(Error::config(
                "Cannot discover fields: first result is not an object",
            ));
        };

        let unknown = unknown_columns(record.keys(), table_columns);
        if !unknown.is_empty() {
            return Err(Error::config(format!(
                "Result keys not found in destination table: {}",
                unknown.join(",")
            )));
        }

        Ok(Self {
            columns: record.keys().map(|k| (k.clone(), k.clone())).collect(),
        })
    }

    /// Response field for a column
    pub fn field(&self, column: &str) -> Option<&str> {
        self.columns.get(column).map(String::as_str)
    }

    /// Column names in order
    pub fn columns(&self) -> impl Iterator<Item = &String> {
        self.columns.keys()
    }

    /// (column, field) pairs in order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.columns.iter()
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

fn unknown_columns<'a>(
    names: impl Iterator<Item = &'a String>,
    table_columns: &[String],
) -> Vec<String> {
    if table_columns.is_empty() {
        return Vec::new();
    }
    names
        .filter(|name| !table_columns.contains(name))
        .cloned()
        .collect()
}

// ============================================================================
// Statement
// ============================================================================

/// How placeholders are written into the SQL
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceholderStyle {
    /// `:column_row`
    Named,
    /// `?`
    #[default]
    Positional,
}

/// One bound value of a batch
#[derive(Debug, Clone, PartialEq)]
pub struct BoundParam {
    /// Placeholder name, unique per batch (`:column_row`)
    pub name: String,
    /// Value to bind
    pub value: JsonValue,
}

/// A multi-row upsert for one page of results
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchStatement {
    pub(crate) table: String,
    pub(crate) columns: Vec<String>,
    pub(crate) params: Vec<BoundParam>,
    pub(crate) rows: usize,
    pub(crate) column_mismatches: usize,
    pub(crate) field_failures: usize,
}

impl BatchStatement {
    /// Destination table
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Column list
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Bound parameters in tuple order
    pub fn params(&self) -> &[BoundParam] {
        &self.params
    }

    /// Values in tuple order
    pub fn values(&self) -> impl Iterator<Item = &JsonValue> {
        self.params.iter().map(|p| &p.value)
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows
    }

    /// Check if there is nothing to insert
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Records whose supplied field count differed from the column count
    pub fn column_mismatches(&self) -> usize {
        self.column_mismatches
    }

    /// Fields dropped because a directive failed
    pub fn field_failures(&self) -> usize {
        self.field_failures
    }

    /// Render the full statement
    pub fn sql(&self, style: PlaceholderStyle) -> String {
        let tuples: Vec<String> = (0..self.rows).map(|row| self.tuple(row, style)).collect();
        format!("{}{}", self.head(), tuples.join(",\n"))
    }

    /// The statement cut down to its first tuple, for logging
    pub fn debug_sql(&self, style: PlaceholderStyle) -> String {
        let mut sql = self.head();
        if self.rows > 0 {
            sql.push_str(&self.tuple(0, style));
        }
        if self.rows > 1 {
            sql.push_str("\n...");
        }
        sql
    }

    fn head(&self) -> String {
        format!(
            "INSERT OR REPLACE INTO {} ({}) VALUES\n",
            self.table,
            self.columns.join(", ")
        )
    }

    fn tuple(&self, row: usize, style: PlaceholderStyle) -> String {
        let mut out = String::from("(");
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            match style {
                PlaceholderStyle::Named => out.push_str(&placeholder_name(column, row)),
                PlaceholderStyle::Positional => out.push('?'),
            }
        }
        out.push(')');
        out
    }
}

/// Placeholder name for a cell
pub(crate) fn placeholder_name(column: &str, row: usize) -> String {
    format!(":{column}_{row}")
}
