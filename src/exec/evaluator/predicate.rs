use crate::{
    common::error::{FrameError, Result},
    core::types::Value,
    exec::evaluator::{Evaluator, expression::ExpressionEvaluator},
    frame::row::Row,
    plan::analyzer::AnalyzedExpression,
};

pub struct PredicateEvaluator;

impl Evaluator<bool> for PredicateEvaluator {
    fn evaluate(&self, expression: &AnalyzedExpression, row: &Row) -> Result<bool> {
        let expr_evaluator = ExpressionEvaluator;
        let value = expr_evaluator.evaluate(expression, row)?;

        // Convert the result to a strict Boolean
        match value {
            Value::Bool(b) => Ok(b),
            Value::Null => Ok(false),
            _ => Err(FrameError::TypeMismatch(format!(
                "filter must evaluate to a boolean, got {value:?}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::analyzer::ColumnRef;
    use crate::{DataType, expr::Operator};

    #[test]
    fn test_null_is_false() {
        let expr = AnalyzedExpression::Column(ColumnRef { index: 0 }, DataType::Bool);
        let row = Row::new(vec![Value::Null]);
        assert!(!PredicateEvaluator.evaluate(&expr, &row).unwrap());
    }

    #[test]
    fn test_comparison() {
        let expr = AnalyzedExpression::BinaryExpr {
            left: Box::new(AnalyzedExpression::Column(
                ColumnRef { index: 0 },
                DataType::Text,
            )),
            op: Operator::Equal,
            right: Box::new(AnalyzedExpression::Literal(Value::from("R2"))),
            return_type: DataType::Bool,
        };
        assert!(PredicateEvaluator
            .evaluate(&expr, &Row::new(vec![Value::from("R2")]))
            .unwrap());
        assert!(!PredicateEvaluator
            .evaluate(&expr, &Row::new(vec![Value::from("R1")]))
            .unwrap());
    }

    #[test]
    fn test_non_boolean_is_error() {
        let expr = AnalyzedExpression::Literal(Value::Int64(1));
        assert!(PredicateEvaluator.evaluate(&expr, &Row::new(vec![])).is_err());
    }
}
