use std::sync::Arc;

use super::{
    row::Row,
    schema::{Schema, SchemaRef},
};
use crate::common::error::Result;

/// An immutable, ordered collection of rows sharing one schema.
///
/// Cloning a table is cheap: rows and schema are shared. Nothing hands out
/// mutable access, so a table never changes once built.
#[derive(Debug, Clone)]
pub struct Table {
    schema: SchemaRef,
    rows: Arc<[Row]>,
}

impl Table {
    /// Builds a table, checking every row against the schema.
    pub fn try_new(schema: impl Into<SchemaRef>, rows: Vec<Row>) -> Result<Self> {
        let schema = schema.into();
        for row in &rows {
            schema.validate_row(row)?;
        }

        Ok(Self::new_unchecked(schema, rows))
    }

    /// Builds a table whose rows are already known to fit the schema.
    pub(crate) fn new_unchecked(schema: SchemaRef, rows: Vec<Row>) -> Self {
        Self {
            schema,
            rows: rows.into(),
        }
    }

    /// A table with no rows.
    pub fn empty(schema: impl Into<SchemaRef>) -> Self {
        Self::new_unchecked(schema.into(), Vec::new())
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub(crate) fn schema_ref(&self) -> SchemaRef {
        Arc::clone(&self.schema)
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    /// Values of one column, top to bottom.
    pub fn column_values(&self, name: &str) -> Result<Vec<crate::Value>> {
        let idx = self.schema.index_of(name)?;
        Ok(self.rows.iter().map(|row| row.value_or_null(idx)).collect())
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
