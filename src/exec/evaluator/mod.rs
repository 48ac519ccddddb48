use crate::{
    common::error::{FrameError, Result},
    core::types::Value,
    frame::row::Row,
    plan::analyzer::AnalyzedExpression,
};

pub mod expression;
pub mod predicate;

/// The core trait that both evaluators must implement.
///
/// - `T = Value` for `ExpressionEvaluator` (computed columns)
/// - `T = bool` for `PredicateEvaluator` (filters)
pub trait Evaluator<T> {
    fn evaluate(&self, analyzed_expr: &AnalyzedExpression, row: &Row) -> Result<T>;
}

fn overflow(op: &str, left: &Value, right: &Value) -> FrameError {
    FrameError::TypeMismatch(format!("integer overflow in {left} {op} {right}"))
}

pub fn values_add(left: &Value, right: &Value) -> Result<Value> {
    match (left, right) {
        (Value::Int64(a), Value::Int64(b)) => a
            .checked_add(*b)
            .map(Value::Int64)
            .ok_or_else(|| overflow("+", left, right)),
        (Value::Float64(a), Value::Float64(b)) => Ok(Value::Float64(a + b)),
        (Value::Int64(a), Value::Float64(b)) => Ok(Value::Float64(*a as f64 + *b)),
        (Value::Float64(a), Value::Int64(b)) => Ok(Value::Float64(*a + *b as f64)),
        (Value::Null, _) | (_, Value::Null) => Ok(Value::Null),
        _ => Err(FrameError::TypeMismatch(format!(
            "Cannot add {left:?} and {right:?}"
        ))),
    }
}

pub fn values_subtract(left: &Value, right: &Value) -> Result<Value> {
    match (left, right) {
        (Value::Int64(a), Value::Int64(b)) => a
            .checked_sub(*b)
            .map(Value::Int64)
            .ok_or_else(|| overflow("-", left, right)),
        (Value::Float64(a), Value::Float64(b)) => Ok(Value::Float64(a - b)),
        (Value::Int64(a), Value::Float64(b)) => Ok(Value::Float64(*a as f64 - *b)),
        (Value::Float64(a), Value::Int64(b)) => Ok(Value::Float64(*a - *b as f64)),
        (Value::Null, _) | (_, Value::Null) => Ok(Value::Null),
        _ => Err(FrameError::TypeMismatch(format!(
            "Cannot subtract {left:?} and {right:?}"
        ))),
    }
}

pub fn values_multiply(left: &Value, right: &Value) -> Result<Value> {
    match (left, right) {
        (Value::Int64(a), Value::Int64(b)) => a
            .checked_mul(*b)
            .map(Value::Int64)
            .ok_or_else(|| overflow("*", left, right)),
        (Value::Float64(a), Value::Float64(b)) => Ok(Value::Float64(a * b)),
        (Value::Int64(a), Value::Float64(b)) => Ok(Value::Float64(*a as f64 * *b)),
        (Value::Float64(a), Value::Int64(b)) => Ok(Value::Float64(*a * *b as f64)),
        (Value::Null, _) | (_, Value::Null) => Ok(Value::Null),
        _ => Err(FrameError::TypeMismatch(format!(
            "Cannot multiply {left:?} and {right:?}"
        ))),
    }
}

/// Divides two values. A zero divisor is an error, never an infinity or NaN.
pub fn values_divide(left: &Value, right: &Value) -> Result<Value> {
    match (left, right) {
        (Value::Null, _) | (_, Value::Null) => Ok(Value::Null),
        (Value::Int64(_), Value::Int64(0)) => Err(FrameError::DivisionByZero),
        (Value::Int64(_) | Value::Float64(_), Value::Float64(b)) if *b == 0.0 => {
            Err(FrameError::DivisionByZero)
        }
        (Value::Float64(_), Value::Int64(0)) => Err(FrameError::DivisionByZero),
        (Value::Int64(a), Value::Int64(b)) => a
            .checked_div(*b)
            .map(Value::Int64)
            .ok_or_else(|| overflow("/", left, right)),
        (Value::Float64(a), Value::Float64(b)) => Ok(Value::Float64(a / b)),
        (Value::Int64(a), Value::Float64(b)) => Ok(Value::Float64(*a as f64 / *b)),
        (Value::Float64(a), Value::Int64(b)) => Ok(Value::Float64(*a / *b as f64)),
        _ => Err(FrameError::TypeMismatch(format!(
            "Cannot divide {left:?} and {right:?}"
        ))),
    }
}

/// Ratio of two counts, e.g. students per supervisor.
pub fn ratio(numerator: usize, denominator: usize) -> Result<f64> {
    if denominator == 0 {
        return Err(FrameError::DivisionByZero);
    }

    Ok(numerator as f64 / denominator as f64)
}

pub fn values_equal(left: &Value, right: &Value) -> Value {
    if matches!(left, Value::Null) || matches!(right, Value::Null) {
        return Value::Null;
    }

    let result = match (left, right) {
        (Value::Int64(a), Value::Int64(b)) => a == b,
        (Value::Float64(a), Value::Float64(b)) => (a - b).abs() < f64::EPSILON,
        (Value::Int64(a), Value::Float64(b)) => (*a as f64 - b).abs() < f64::EPSILON,
        (Value::Float64(a), Value::Int64(b)) => (a - *b as f64).abs() < f64::EPSILON,
        (Value::Text(a), Value::Text(b)) => a == b,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        _ => false,
    };
    Value::Bool(result)
}

fn compare_values(left: &Value, right: &Value) -> Result<Option<std::cmp::Ordering>> {
    let ordering = match (left, right) {
        (Value::Null, _) | (_, Value::Null) => return Ok(None),
        (Value::Int64(a), Value::Int64(b)) => a.partial_cmp(b),
        (Value::Float64(a), Value::Float64(b)) => a.partial_cmp(b),
        (Value::Int64(a), Value::Float64(b)) => (*a as f64).partial_cmp(b),
        (Value::Float64(a), Value::Int64(b)) => a.partial_cmp(&(*b as f64)),
        (Value::Text(a), Value::Text(b)) => a.partial_cmp(b),
        (Value::Bool(a), Value::Bool(b)) => a.partial_cmp(b),
        _ => {
            return Err(FrameError::TypeMismatch(format!(
                "Invalid comparison between {left:?} and {right:?}"
            )));
        }
    };
    Ok(ordering)
}

fn compare_with(
    left: &Value,
    right: &Value,
    accept: impl Fn(std::cmp::Ordering) -> bool,
) -> Result<Value> {
    if matches!(left, Value::Null) || matches!(right, Value::Null) {
        return Ok(Value::Null);
    }

    // NaN is unordered, so every ordering test on it is false
    let result = compare_values(left, right)?.is_some_and(accept);
    Ok(Value::Bool(result))
}

pub fn values_greater_than(left: &Value, right: &Value) -> Result<Value> {
    compare_with(left, right, std::cmp::Ordering::is_gt)
}

pub fn values_greater_than_equal(left: &Value, right: &Value) -> Result<Value> {
    compare_with(left, right, std::cmp::Ordering::is_ge)
}

pub fn values_less_than(left: &Value, right: &Value) -> Result<Value> {
    compare_with(left, right, std::cmp::Ordering::is_lt)
}

pub fn values_less_than_equal(left: &Value, right: &Value) -> Result<Value> {
    compare_with(left, right, std::cmp::Ordering::is_le)
}
