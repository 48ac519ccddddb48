use crate::core::types::Value;

/// A row of data containing values for each column.
///
/// Rows are ordered collections of values that correspond to a schema's columns.
/// The number and types of values must match the schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Row {
    /// The ordered values in this row.
    pub values: Vec<Value>,
}

impl Row {
    /// Creates a new row from a vector of values.
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// Gets a reference to the value at the given column index.
    pub fn get_value(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Value at a bound column index, `Null` when out of range.
    pub(crate) fn value_or_null(&self, index: usize) -> Value {
        self.values.get(index).cloned().unwrap_or(Value::Null)
    }

    /// Keeps only the values at `indices`, in that order.
    pub(crate) fn project(&self, indices: &[usize]) -> Row {
        Row::new(indices.iter().map(|&idx| self.value_or_null(idx)).collect())
    }

    /// Concatenates two rows (used by joins).
    pub(crate) fn concat(&self, other: &Row) -> Row {
        let mut values = Vec::with_capacity(self.values.len() + other.values.len());
        values.extend_from_slice(&self.values);
        values.extend_from_slice(&other.values);
        Row::new(values)
    }

    pub(crate) fn nulls(width: usize) -> Row {
        Row::new(vec![Value::Null; width])
    }
}

impl<V: Into<Value>> FromIterator<V> for Row {
    fn from_iter<T: IntoIterator<Item = V>>(iter: T) -> Self {
        Row::new(iter.into_iter().map(Into::into).collect())
    }
}
