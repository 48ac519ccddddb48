use std::sync::Arc;

use super::{column_def::ColumnDef, row::Row};
use crate::{
    common::error::{FrameError, Result},
    core::types::Value,
};

/// Shared handle to a schema.
pub type SchemaRef = Arc<Schema>;

/// A table schema defining the structure of rows.
///
/// A schema is an ordered list of column definitions. All rows in a table
/// must conform to the table's schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    /// The ordered list of column definitions.
    pub columns: Vec<ColumnDef>,
}

impl Schema {
    /// Creates a new schema from a vector of column definitions.
    pub fn new(columns: Vec<ColumnDef>) -> Self {
        Self { columns }
    }

    /// Finds the index of a column by name.
    pub fn get_column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|col| col.name == name)
    }

    /// Finds the index of a column by name, failing with
    /// [`FrameError::UnknownColumn`] when it is absent.
    pub fn index_of(&self, name: &str) -> Result<usize> {
        self.get_column_index(name)
            .ok_or_else(|| FrameError::UnknownColumn(name.to_owned()))
    }

    pub fn column(&self, index: usize) -> Option<&ColumnDef> {
        self.columns.get(index)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|col| col.name.as_str())
    }

    /// Schema made of the columns at `indices`, in that order.
    pub(crate) fn project(&self, indices: &[usize]) -> Schema {
        Schema::new(
            indices
                .iter()
                .filter_map(|&idx| self.columns.get(idx).cloned())
                .collect(),
        )
    }

    /// Checks a row against this schema.
    ///
    /// The row must have one value per column, each compatible with the
    /// column type, and `NULL` only where the column is nullable.
    pub fn validate_row(&self, row: &Row) -> Result<()> {
        if row.values.len() != self.columns.len() {
            return Err(FrameError::TypeMismatch(format!(
                "Row has {} values but the schema has {} columns",
                row.values.len(),
                self.columns.len()
            )));
        }

        for (value, column) in row.values.iter().zip(self.columns.iter()) {
            match value {
                Value::Null => {
                    if !column.nullable {
                        return Err(FrameError::TypeMismatch(format!(
                            "Column {} cannot be null",
                            column.name
                        )));
                    }
                }
                _ => value
                    .is_compatible_with(column.data_type)
                    .map_err(FrameError::TypeMismatch)?,
            }
        }

        Ok(())
    }
}

impl FromIterator<ColumnDef> for Schema {
    fn from_iter<T: IntoIterator<Item = ColumnDef>>(iter: T) -> Self {
        Schema::new(iter.into_iter().collect())
    }
}
