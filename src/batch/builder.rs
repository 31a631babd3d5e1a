//! Batch builder implementation

use super::types::{placeholder_name, BatchStatement, BoundParam, FieldMapping};
use crate::directive::DirectiveTable;
use crate::error::Result;
use crate::types::JsonValue;
use tracing::warn;

/// Turns pages of result records into batch statements
#[derive(Debug, Clone, Copy)]
pub struct BatchBuilder<'a> {
    table: &'a str,
    mapping: &'a FieldMapping,
    directives: &'a DirectiveTable,
}

impl<'a> BatchBuilder<'a> {
    /// Create a builder for one destination table
    ///
    /// `directives` are keyed by response field name.
    pub fn new(table: &'a str, mapping: &'a FieldMapping, directives: &'a DirectiveTable) -> Self {
        Self {
            table,
            mapping,
            directives,
        }
    }

    /// Build one statement covering every record, in response order
    ///
    /// Missing fields bind as null. A field whose directives fail binds as
    /// null and does not count as supplied; records that supply fewer fields
    /// than there are columns are logged but still included.
    pub fn build(&self, results: &[JsonValue]) -> Result<BatchStatement> {
        let columns: Vec<String> = self.mapping.columns().cloned().collect();
        let expected = columns.len();

        let mut statement = BatchStatement {
            table: self.table.to_string(),
            columns,
            params: Vec::with_capacity(results.len() * expected),
            rows: results.len(),
            ..Default::default()
        };

        for (row, record) in results.iter().enumerate() {
            let mut supplied = 0;

            for (column, field) in self.mapping.iter() {
                let value = match record.get(field.as_str()) {
                    Some(value) => match self.apply_directives(field, value) {
                        Ok(value) => {
                            supplied += 1;
                            value
                        }
                        Err(err) if err.is_recoverable() => {
                            warn!("Record {row}: dropping field '{field}': {err}");
                            statement.field_failures += 1;
                            JsonValue::Null
                        }
                        Err(err) => return Err(err),
                    },
                    None => JsonValue::Null,
                };

                statement.params.push(BoundParam {
                    name: placeholder_name(column, row),
                    value,
                });
            }

            if supplied != expected {
                warn!("Record counts do not match (expected {expected} but received {supplied}) for record {row}");
                statement.column_mismatches += 1;
            }
        }

        Ok(statement)
    }

    fn apply_directives(&self, field: &str, value: &JsonValue) -> Result<JsonValue> {
        match self.directives.get(field) {
            Some(rules) if !value.is_null() => rules.apply(value),
            _ => Ok(value.clone()),
        }
    }
}
