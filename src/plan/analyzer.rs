use crate::{
    common::error::{FrameError, Result},
    core::types::{DataType, Value},
    expr::{Expression, IsPredicate, Operator},
    frame::schema::Schema,
};

/// A column reference resolved against an input schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnRef {
    pub index: usize,
}

/// An expression whose column references have been resolved to indices and
/// whose result type is known.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalyzedExpression {
    Literal(Value),
    Column(ColumnRef, DataType),
    BinaryExpr {
        left: Box<AnalyzedExpression>,
        op: Operator,
        right: Box<AnalyzedExpression>,
        return_type: DataType,
    },
    Not(Box<AnalyzedExpression>),
    IsPredicate {
        expr: Box<AnalyzedExpression>,
        predicate: IsPredicate,
        negated: bool,
    },
}

impl AnalyzedExpression {
    /// Get the type of the expression
    pub fn get_type(&self) -> DataType {
        match self {
            AnalyzedExpression::Literal(value) => value.data_type().unwrap_or(DataType::Text),
            AnalyzedExpression::Column(_, column_type) => *column_type,
            AnalyzedExpression::BinaryExpr { return_type, .. } => *return_type,
            AnalyzedExpression::Not(_) | AnalyzedExpression::IsPredicate { .. } => DataType::Bool,
        }
    }

    /// Determines whether this expression can produce NULL given the input schema.
    pub fn is_nullable(&self, input_schema: &Schema) -> bool {
        match self {
            // Literals are never null (null literals are rejected during analysis)
            AnalyzedExpression::Literal(_) => false,
            AnalyzedExpression::Column(col_ref, _) => input_schema
                .column(col_ref.index)
                .map(|col| col.nullable)
                .unwrap_or(true),
            AnalyzedExpression::BinaryExpr { left, right, .. } => {
                left.is_nullable(input_schema) || right.is_nullable(input_schema)
            }
            AnalyzedExpression::Not(expr) => expr.is_nullable(input_schema),
            // IS TRUE / IS NULL / etc. always returns a definite bool, never null
            AnalyzedExpression::IsPredicate { .. } => false,
        }
    }
}

/// Resolves expressions against a schema.
pub struct Analyzer<'a> {
    schema: &'a Schema,
}

impl<'a> Analyzer<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self { schema }
    }

    /// Binds an expression used as a row filter. The result must be boolean.
    pub fn bind_predicate(&self, expr: &Expression) -> Result<AnalyzedExpression> {
        let analyzed = self.bind_expression(expr)?;
        if analyzed.get_type() != DataType::Bool {
            return Err(FrameError::TypeMismatch(format!(
                "filter condition {expr} must be boolean, got {}",
                analyzed.get_type()
            )));
        }

        Ok(analyzed)
    }

    pub fn bind_expression(&self, expr: &Expression) -> Result<AnalyzedExpression> {
        match expr {
            Expression::BinaryOp { left, op, right } => {
                let left = self.bind_expression(left)?;
                let right = self.bind_expression(right)?;

                let return_type = self.resolve_binary_op(left.get_type(), *op, right.get_type())?;

                Ok(AnalyzedExpression::BinaryExpr {
                    left: Box::new(left),
                    op: *op,
                    right: Box::new(right),
                    return_type,
                })
            }
            Expression::Column(name) => {
                let index = self.schema.index_of(name)?;
                let data_type = self.schema.columns[index].data_type;

                Ok(AnalyzedExpression::Column(ColumnRef { index }, data_type))
            }
            Expression::Literal(value) => match value {
                Value::Null => Err(FrameError::TypeMismatch(
                    "NULL literal cannot be used in this context, use is_null() instead"
                        .to_string(),
                )),
                value => Ok(AnalyzedExpression::Literal(value.clone())),
            },
            Expression::Not(inner) => {
                let inner = self.bind_expression(inner)?;
                if inner.get_type() != DataType::Bool {
                    return Err(FrameError::TypeMismatch(
                        "NOT requires boolean input".to_string(),
                    ));
                }

                Ok(AnalyzedExpression::Not(Box::new(inner)))
            }
            Expression::Is {
                expr,
                predicate,
                is_negated,
            } => {
                let inner_analyzed = self.bind_expression(expr)?;

                match predicate {
                    IsPredicate::True | IsPredicate::False => {
                        if inner_analyzed.get_type() != DataType::Bool {
                            return Err(FrameError::TypeMismatch(
                                "IS TRUE/FALSE requires boolean input".to_string(),
                            ));
                        }
                    }
                    IsPredicate::Null => {}
                }

                Ok(AnalyzedExpression::IsPredicate {
                    expr: Box::new(inner_analyzed),
                    predicate: *predicate,
                    negated: *is_negated,
                })
            }
        }
    }

    fn resolve_binary_op(&self, left: DataType, op: Operator, right: DataType) -> Result<DataType> {
        match op {
            op if op.is_comparison() && DataType::can_coerce(left, right) => Ok(DataType::Bool),
            op if op.is_arithmetic() => Self::get_common_numeric_type(left, right),
            op if op.is_logical() && left == DataType::Bool && right == DataType::Bool => {
                Ok(DataType::Bool)
            }
            _ => Err(FrameError::TypeMismatch(format!(
                "cannot apply {op} to {left} and {right}"
            ))),
        }
    }

    fn get_common_numeric_type(left: DataType, right: DataType) -> Result<DataType> {
        match (left, right) {
            (DataType::Int64, DataType::Int64) => Ok(DataType::Int64),
            (l, r) if l.is_numeric() && r.is_numeric() => Ok(DataType::Float64),
            _ => Err(FrameError::TypeMismatch(format!(
                "cannot perform arithmetic between {left} and {right}"
            ))),
        }
    }
}
