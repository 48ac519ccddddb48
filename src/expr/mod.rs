//! Column expressions used by `filter` and `with_column`.
//!
//! Expressions are plain trees of column names and literals. They are bound
//! to column indices when a step is added to a plan, see
//! [`crate::plan::analyzer`].

use std::{fmt, ops};

use crate::core::types::Value;

pub use operator::Operator;

pub mod operator;

/// Predicates to the `IS` postfix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsPredicate {
    True,
    False,
    Null,
}

impl fmt::Display for IsPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IsPredicate::True => write!(f, "TRUE"),
            IsPredicate::False => write!(f, "FALSE"),
            IsPredicate::Null => write!(f, "NULL"),
        }
    }
}

/// An unbound expression over the columns of a frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Column reference (e.g. `organization`)
    Column(String),

    /// Literal value (e.g. `"R2"`, `0`)
    Literal(Value),

    BinaryOp {
        left: Box<Expression>,
        op: Operator,
        right: Box<Expression>,
    },

    /// Logical negation
    Not(Box<Expression>),

    Is {
        expr: Box<Expression>,
        predicate: IsPredicate,
        is_negated: bool,
    },
}

/// Reference to a column by name.
pub fn col(name: &str) -> Expression {
    Expression::Column(name.to_owned())
}

/// A literal value.
pub fn lit(value: impl Into<Value>) -> Expression {
    Expression::Literal(value.into())
}

impl Expression {
    fn binary(self, op: Operator, right: impl Into<Expression>) -> Expression {
        Expression::BinaryOp {
            left: Box::new(self),
            op,
            right: Box::new(right.into()),
        }
    }

    fn is(self, predicate: IsPredicate, is_negated: bool) -> Expression {
        Expression::Is {
            expr: Box::new(self),
            predicate,
            is_negated,
        }
    }

    pub fn eq(self, other: impl Into<Expression>) -> Expression {
        self.binary(Operator::Equal, other)
    }

    pub fn not_eq(self, other: impl Into<Expression>) -> Expression {
        self.binary(Operator::NotEqual, other)
    }

    pub fn gt(self, other: impl Into<Expression>) -> Expression {
        self.binary(Operator::GreaterThan, other)
    }

    pub fn gt_eq(self, other: impl Into<Expression>) -> Expression {
        self.binary(Operator::GreaterThanEqual, other)
    }

    pub fn lt(self, other: impl Into<Expression>) -> Expression {
        self.binary(Operator::LessThan, other)
    }

    pub fn lt_eq(self, other: impl Into<Expression>) -> Expression {
        self.binary(Operator::LessThanEqual, other)
    }

    pub fn and(self, other: impl Into<Expression>) -> Expression {
        self.binary(Operator::And, other)
    }

    pub fn or(self, other: impl Into<Expression>) -> Expression {
        self.binary(Operator::Or, other)
    }

    pub fn is_null(self) -> Expression {
        self.is(IsPredicate::Null, false)
    }

    pub fn is_not_null(self) -> Expression {
        self.is(IsPredicate::Null, true)
    }

    pub fn is_true(self) -> Expression {
        self.is(IsPredicate::True, false)
    }

    pub fn is_false(self) -> Expression {
        self.is(IsPredicate::False, false)
    }

    /// Name given to the output column when none is supplied.
    pub fn to_column_name(&self) -> String {
        match self {
            Expression::Column(name) => name.clone(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::BinaryOp { left, op, right } => write!(f, "({left} {op} {right})"),
            Expression::Column(name) => write!(f, "{name}"),
            Expression::Literal(value) => match value {
                Value::Text(s) => write!(f, "'{s}'"),
                Value::Bool(b) => write!(f, "{}", b.to_string().to_uppercase()),
                other => write!(f, "{other}"),
            },
            Expression::Not(expr) => write!(f, "(NOT {expr})"),
            Expression::Is {
                expr,
                predicate,
                is_negated,
            } => write!(
                f,
                "{expr} {} {predicate}",
                if *is_negated { "IS NOT" } else { "IS" }
            ),
        }
    }
}

impl From<Value> for Expression {
    fn from(value: Value) -> Self {
        Expression::Literal(value)
    }
}

impl From<&str> for Expression {
    fn from(value: &str) -> Self {
        lit(value)
    }
}

impl From<i32> for Expression {
    fn from(value: i32) -> Self {
        lit(value)
    }
}

impl From<i64> for Expression {
    fn from(value: i64) -> Self {
        lit(value)
    }
}

impl From<bool> for Expression {
    fn from(value: bool) -> Self {
        lit(value)
    }
}

impl From<f64> for Expression {
    fn from(value: f64) -> Self {
        lit(value)
    }
}

macro_rules! binary_op_impl {
    ($trait:ident, $method:ident, $op:expr) => {
        impl ops::$trait for Expression {
            type Output = Expression;

            fn $method(self, rhs: Expression) -> Expression {
                self.binary($op, rhs)
            }
        }
    };
}

binary_op_impl!(BitAnd, bitand, Operator::And);
binary_op_impl!(BitOr, bitor, Operator::Or);
binary_op_impl!(Add, add, Operator::Add);
binary_op_impl!(Sub, sub, Operator::Subtract);
binary_op_impl!(Mul, mul, Operator::Multiply);
binary_op_impl!(Div, div, Operator::Divide);

impl ops::Not for Expression {
    type Output = Expression;

    fn not(self) -> Expression {
        Expression::Not(Box::new(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operators_build_trees() {
        let expr = col("team1").eq("STAT") | col("team2").eq("STAT");
        assert_eq!(
            expr,
            Expression::BinaryOp {
                left: Box::new(Expression::BinaryOp {
                    left: Box::new(col("team1")),
                    op: Operator::Equal,
                    right: Box::new(lit("STAT")),
                }),
                op: Operator::Or,
                right: Box::new(Expression::BinaryOp {
                    left: Box::new(col("team2")),
                    op: Operator::Equal,
                    right: Box::new(lit("STAT")),
                }),
            }
        );
    }

    #[test]
    fn test_display() {
        let expr = col("position").not_eq("DR") & col("position").not_eq("CR");
        assert_eq!(
            expr.to_string(),
            "((position != 'DR') AND (position != 'CR'))"
        );
        assert_eq!(col("hdr").is_not_null().to_string(), "hdr IS NOT NULL");
        assert_eq!((!col("hdr")).to_string(), "(NOT hdr)");
    }

    #[test]
    fn test_column_name() {
        assert_eq!(col("count1").to_column_name(), "count1");
        assert_eq!(
            (col("count1") + col("count2")).to_column_name(),
            "(count1 + count2)"
        );
    }
}
