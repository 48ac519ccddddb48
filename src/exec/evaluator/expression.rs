use crate::{
    common::error::Result,
    core::types::Value,
    exec::evaluator::{
        Evaluator, values_add, values_divide, values_equal, values_greater_than,
        values_greater_than_equal, values_less_than, values_less_than_equal, values_multiply,
        values_subtract,
    },
    expr::{IsPredicate, Operator},
    frame::row::Row,
    plan::analyzer::AnalyzedExpression,
};

pub struct ExpressionEvaluator;

impl Evaluator<Value> for ExpressionEvaluator {
    fn evaluate(&self, expression: &AnalyzedExpression, row: &Row) -> Result<Value> {
        match expression {
            AnalyzedExpression::Literal(value) => Ok(value.clone()),
            AnalyzedExpression::Column(col_ref, _) => Ok(row.value_or_null(col_ref.index)),
            AnalyzedExpression::BinaryExpr {
                left, op, right, ..
            } => match op {
                // AND / OR short-circuit, so the right side may never run
                Operator::And => self.evaluate_and(left, right, row),
                Operator::Or => self.evaluate_or(left, right, row),
                _ => {
                    let left_val = self.evaluate(left, row)?;
                    let right_val = self.evaluate(right, row)?;
                    apply_operator(*op, &left_val, &right_val)
                }
            },
            AnalyzedExpression::Not(inner) => Ok(match self.evaluate(inner, row)? {
                Value::Bool(b) => Value::Bool(!b),
                other => other,
            }),
            AnalyzedExpression::IsPredicate {
                expr,
                predicate,
                negated,
            } => {
                let value = self.evaluate(expr, row)?;
                let matched = match predicate {
                    IsPredicate::Null => value.is_null(),
                    IsPredicate::True => value == Value::Bool(true),
                    IsPredicate::False => value == Value::Bool(false),
                };

                Ok(Value::Bool(matched != *negated))
            }
        }
    }
}

/// Applies `op` to two already evaluated operands.
fn apply_operator(op: Operator, left: &Value, right: &Value) -> Result<Value> {
    match op {
        Operator::Add => values_add(left, right),
        Operator::Subtract => values_subtract(left, right),
        Operator::Multiply => values_multiply(left, right),
        Operator::Divide => values_divide(left, right),

        Operator::Equal => Ok(values_equal(left, right)),
        Operator::NotEqual => Ok(match values_equal(left, right) {
            Value::Bool(b) => Value::Bool(!b),
            other => other,
        }),
        Operator::GreaterThan => values_greater_than(left, right),
        Operator::GreaterThanEqual => values_greater_than_equal(left, right),
        Operator::LessThan => values_less_than(left, right),
        Operator::LessThanEqual => values_less_than_equal(left, right),

        // null operands count as false, like the short-circuit path
        Operator::And => Ok(Value::Bool(
            left.as_bool() == Some(true) && right.as_bool() == Some(true),
        )),
        Operator::Or => Ok(Value::Bool(
            left.as_bool() == Some(true) || right.as_bool() == Some(true),
        )),
    }
}

impl ExpressionEvaluator {
    /// Helper to determine if a Value is "True" in boolean logic
    fn is_truthy(&self, val: &Value) -> bool {
        match val {
            Value::Bool(b) => *b,
            _ => false, // Null is false in strict boolean logic
        }
    }

    fn evaluate_and(
        &self,
        left: &AnalyzedExpression,
        right: &AnalyzedExpression,
        row: &Row,
    ) -> Result<Value> {
        let left_val = self.evaluate(left, row)?;
        if !self.is_truthy(&left_val) {
            return Ok(Value::Bool(false));
        }

        let right_val = self.evaluate(right, row)?;
        Ok(Value::Bool(self.is_truthy(&right_val)))
    }

    fn evaluate_or(
        &self,
        left: &AnalyzedExpression,
        right: &AnalyzedExpression,
        row: &Row,
    ) -> Result<Value> {
        let left_val = self.evaluate(left, row)?;
        if self.is_truthy(&left_val) {
            return Ok(Value::Bool(true));
        }

        let right_val = self.evaluate(right, row)?;
        Ok(Value::Bool(self.is_truthy(&right_val)))
    }
}
