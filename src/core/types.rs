use std::{
    cmp::Ordering,
    hash::{Hash, Hasher},
};

use serde::Serialize;

/// Column types supported by skiff.
///
/// These types define the kind of data a column can hold and how
/// raw text is converted when a table is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// 64-bit signed integer.
    Int64,

    /// 64-bit floating point number.
    Float64,

    /// UTF-8 text.
    Text,

    /// Boolean true/false value.
    ///
    /// Loaded from text with [`parse_bool`].
    Bool,
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataType::Int64 => write!(f, "long"),
            DataType::Float64 => write!(f, "double"),
            DataType::Text => write!(f, "string"),
            DataType::Bool => write!(f, "boolean"),
        }
    }
}

impl DataType {
    /// If two types are able to be compared with each other
    pub fn can_coerce(from: DataType, to: DataType) -> bool {
        if from == to {
            return true;
        }

        matches!(
            (from, to),
            (DataType::Int64, DataType::Float64) | (DataType::Float64, DataType::Int64)
        )
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, DataType::Int64 | DataType::Float64)
    }
}

/// Parses a boolean field.
///
/// Only the exact literal `True` is true. Every other token, including
/// `true`, `TRUE` and the empty string, is false.
pub fn parse_bool(token: &str) -> bool {
    token == "True"
}

/// A single scalar value held in a row.
///
/// Values order totally: `Null` first, then by type rank, except that
/// integers and floats compare numerically with each other. Equality and
/// hashing are type-strict, so `Int64(1)` and `Float64(1.0)` are distinct
/// group and join keys.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// A 64-bit signed integer value.
    Int64(i64),

    /// A 64-bit floating point number.
    Float64(f64),

    /// A UTF-8 text string.
    Text(String),

    /// A boolean value (true/false).
    Bool(bool),

    /// Absence of data.
    Null,
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int64(i) => write!(f, "{i}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Float64(fl) => write!(f, "{fl}"),
            Value::Null => write!(f, "NULL"),
        }
    }
}

impl Value {
    /// Returns the type of this value, or `None` for `Null`.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Int64(_) => Some(DataType::Int64),
            Value::Float64(_) => Some(DataType::Float64),
            Value::Text(_) => Some(DataType::Text),
            Value::Bool(_) => Some(DataType::Bool),
            Value::Null => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int64(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Checks if this value can be stored in a column of the given type.
    pub fn is_compatible_with(&self, data_type: DataType) -> Result<(), String> {
        match (self, data_type) {
            (Value::Int64(_), DataType::Int64)
            | (Value::Bool(_), DataType::Bool)
            | (Value::Float64(_), DataType::Float64)
            | (Value::Null, _)
            | (Value::Text(_), DataType::Text) => Ok(()),

            _ => Err(format!("{self:?} cannot be stored as {data_type}")),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Int64(_) | Value::Float64(_) => 2,
            Value::Text(_) => 3,
        }
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int64(a), Value::Int64(b)) => a.cmp(b),
            (Value::Float64(a), Value::Float64(b)) => a.total_cmp(b),
            // Ties between an integer and an equal float put the integer first
            (Value::Int64(a), Value::Float64(b)) => {
                (*a as f64).total_cmp(b).then(Ordering::Less)
            }
            (Value::Float64(a), Value::Int64(b)) => {
                a.total_cmp(&(*b as f64)).then(Ordering::Greater)
            }
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Int64(i) => i.hash(state),
            Value::Float64(f) => f.to_bits().hash(state),
            Value::Text(s) => s.hash(state),
            Value::Bool(b) => b.hash(state),
            Value::Null => {}
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int64(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int64(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float64(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_exact_literal() {
        assert!(parse_bool("True"));
        assert!(!parse_bool("False"));
        assert!(!parse_bool("true"));
        assert!(!parse_bool("TRUE"));
        assert!(!parse_bool(""));
        assert!(!parse_bool(" True"));
        assert!(!parse_bool("yes"));
    }

    #[test]
    fn test_null_sorts_first() {
        let mut values = vec![
            Value::Text("b".to_string()),
            Value::Null,
            Value::Int64(3),
            Value::Bool(false),
        ];
        values.sort();
        assert_eq!(
            values,
            vec![
                Value::Null,
                Value::Bool(false),
                Value::Int64(3),
                Value::Text("b".to_string()),
            ]
        );
    }

    #[test]
    fn test_numeric_ordering_across_types() {
        assert!(Value::Int64(2) < Value::Float64(2.5));
        assert!(Value::Float64(1.5) < Value::Int64(2));
        assert_ne!(Value::Int64(1), Value::Float64(1.0));
    }

    #[test]
    fn test_equal_values_hash_equal() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(Value::Text("EDP".to_string()));
        set.insert(Value::Text("EDP".to_string()));
        set.insert(Value::Float64(0.5));
        set.insert(Value::Float64(0.5));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_compatibility() {
        assert!(Value::Int64(1).is_compatible_with(DataType::Int64).is_ok());
        assert!(Value::Null.is_compatible_with(DataType::Text).is_ok());
        assert!(Value::Text("x".into()).is_compatible_with(DataType::Bool).is_err());
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("GA")), Value::Text("GA".to_string()));
    }
}
