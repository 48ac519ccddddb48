use std::{fmt, sync::Arc};

use strum::{Display, EnumString};

use crate::{
    common::error::{FrameError, JoinSide, Result},
    core::types::{DataType, Value},
    expr::Expression,
    frame::{
        column_def::ColumnDef,
        row::Row,
        schema::{Schema, SchemaRef},
        table::Table,
    },
    plan::analyzer::{AnalyzedExpression, Analyzer},
};

/// A user supplied row filter.
pub type RowPredicate = Arc<dyn Fn(&Row) -> bool + Send + Sync>;

/// Join flavours.
///
/// Parses from the usual spellings, case-insensitively:
///
/// ```
/// use skiff::JoinType;
///
/// assert_eq!("left".parse::<JoinType>().unwrap(), JoinType::Left);
/// assert_eq!("LEFT_OUTER".parse::<JoinType>().unwrap(), JoinType::Left);
/// assert_eq!(JoinType::Full.to_string(), "full");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum JoinType {
    #[strum(to_string = "inner")]
    Inner,
    #[strum(to_string = "left", serialize = "left_outer", serialize = "leftouter")]
    Left,
    #[strum(to_string = "right", serialize = "right_outer", serialize = "rightouter")]
    Right,
    #[strum(
        to_string = "full",
        serialize = "outer",
        serialize = "full_outer",
        serialize = "fullouter"
    )]
    Full,
}

impl JoinType {
    pub(crate) fn keeps_unmatched_left(self) -> bool {
        matches!(self, JoinType::Left | JoinType::Full)
    }

    pub(crate) fn keeps_unmatched_right(self) -> bool {
        matches!(self, JoinType::Right | JoinType::Full)
    }
}

/// Reductions available to `group_by(..).agg(..)`.
///
/// All of them are associative and commutative, so groups can be folded in
/// any order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum AggregateFunction {
    /// Number of non-null values, or of rows when no column is given.
    Count,
    Sum,
    Min,
    Max,
}

/// An aggregate over an optional input column, with its output name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregation {
    pub function: AggregateFunction,
    pub column: Option<String>,
    pub alias: String,
}

impl Aggregation {
    pub fn new(function: AggregateFunction, column: &str) -> Self {
        Self {
            function,
            column: Some(column.to_owned()),
            alias: format!("{function}({column})"),
        }
    }

    /// Row count, named `count`.
    pub fn count_rows() -> Self {
        Self {
            function: AggregateFunction::Count,
            column: None,
            alias: "count".to_owned(),
        }
    }

    /// Renames the output column.
    #[must_use]
    pub fn alias(mut self, alias: &str) -> Self {
        alias.clone_into(&mut self.alias);
        self
    }
}

/// Count of non-null values in `column`.
pub fn count(column: &str) -> Aggregation {
    Aggregation::new(AggregateFunction::Count, column)
}

pub fn sum(column: &str) -> Aggregation {
    Aggregation::new(AggregateFunction::Sum, column)
}

pub fn min(column: &str) -> Aggregation {
    Aggregation::new(AggregateFunction::Min, column)
}

pub fn max(column: &str) -> Aggregation {
    Aggregation::new(AggregateFunction::Max, column)
}

/// An [`Aggregation`] with its input column resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundAggregate {
    pub function: AggregateFunction,
    pub column: Option<usize>,
}

#[derive(Clone)]
pub enum Predicate {
    Expression(AnalyzedExpression),
    Function(RowPredicate),
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Expression(expr) => f.debug_tuple("Expression").field(expr).finish(),
            Predicate::Function(_) => f.debug_tuple("Function").finish_non_exhaustive(),
        }
    }
}

/// One deferred transformation.
#[derive(Debug, Clone)]
pub enum Step {
    Projection {
        indices: Vec<usize>,
    },
    Filter(Predicate),
    WithColumn {
        expr: AnalyzedExpression,
        replace: Option<usize>,
    },
    Aggregate {
        key: usize,
        aggregates: Vec<BoundAggregate>,
    },
    Join {
        right: Box<Plan>,
        left_key: usize,
        right_key: usize,
        how: JoinType,
    },
    Sort {
        index: usize,
        ascending: bool,
    },
    FillNull {
        value: Value,
        columns: Vec<usize>,
    },
    Limit(usize),
}

/// A step together with the schema it produces and a label for `explain`.
#[derive(Debug, Clone)]
pub struct PlanNode {
    pub step: Step,
    pub schema: SchemaRef,
    pub label: String,
}

/// A base table and the steps to apply to it, in order.
///
/// Building a plan never touches rows. Every builder validates column names
/// and types against the current output schema and returns a new plan.
#[derive(Debug, Clone)]
pub struct Plan {
    source: Table,
    nodes: Vec<PlanNode>,
}

impl Plan {
    pub fn scan(source: Table) -> Self {
        Self {
            source,
            nodes: Vec::new(),
        }
    }

    pub fn source(&self) -> &Table {
        &self.source
    }

    pub fn nodes(&self) -> &[PlanNode] {
        &self.nodes
    }

    /// Output schema of the whole plan.
    pub fn schema(&self) -> &Schema {
        match self.nodes.last() {
            Some(node) => &node.schema,
            None => self.source.schema(),
        }
    }

    pub fn schema_ref(&self) -> SchemaRef {
        match self.nodes.last() {
            Some(node) => Arc::clone(&node.schema),
            None => self.source.schema_ref(),
        }
    }

    fn push(&self, step: Step, schema: Schema, label: String) -> Plan {
        let mut nodes = self.nodes.clone();
        nodes.push(PlanNode {
            step,
            schema: Arc::new(schema),
            label,
        });

        Plan {
            source: self.source.clone(),
            nodes,
        }
    }

    fn indices_of(&self, names: &[&str]) -> Result<Vec<usize>> {
        let schema = self.schema();
        names.iter().map(|name| schema.index_of(name)).collect()
    }

    pub fn project(&self, names: &[&str]) -> Result<Plan> {
        let indices = self.indices_of(names)?;
        let schema = self.schema().project(&indices);
        let label = format!("Projection: {}", names.join(", "));

        Ok(self.push(Step::Projection { indices }, schema, label))
    }

    pub fn drop_columns(&self, names: &[&str]) -> Result<Plan> {
        let dropped = self.indices_of(names)?;
        let indices: Vec<usize> = (0..self.schema().len())
            .filter(|idx| !dropped.contains(idx))
            .collect();
        let schema = self.schema().project(&indices);
        let label = format!("Drop: {}", names.join(", "));

        Ok(self.push(Step::Projection { indices }, schema, label))
    }

    pub fn filter(&self, expr: &Expression) -> Result<Plan> {
        let analyzed = Analyzer::new(self.schema()).bind_predicate(expr)?;
        let schema = self.schema().clone();

        Ok(self.push(
            Step::Filter(Predicate::Expression(analyzed)),
            schema,
            format!("Filter: {expr}"),
        ))
    }

    pub fn filter_fn(&self, name: &str, func: RowPredicate) -> Plan {
        let schema = self.schema().clone();
        self.push(
            Step::Filter(Predicate::Function(func)),
            schema,
            format!("Filter: <fn {name}>"),
        )
    }

    pub fn with_column(&self, name: &str, expr: &Expression) -> Result<Plan> {
        let input = self.schema();
        let analyzed = Analyzer::new(input).bind_expression(expr)?;
        let column = ColumnDef::new(name, analyzed.get_type(), analyzed.is_nullable(input));

        let mut schema = input.clone();
        let replace = schema.get_column_index(name);
        match replace {
            Some(idx) => schema.columns[idx] = column,
            None => schema.columns.push(column),
        }

        Ok(self.push(
            Step::WithColumn {
                expr: analyzed,
                replace,
            },
            schema,
            format!("WithColumn: {name} = {expr}"),
        ))
    }

    pub fn aggregate(&self, key: &str, aggregations: &[Aggregation]) -> Result<Plan> {
        let input = self.schema();
        let key_index = input.index_of(key)?;

        let mut columns = vec![input.columns[key_index].clone()];
        let mut bound = Vec::with_capacity(aggregations.len());
        for aggregation in aggregations {
            let column = aggregation
                .column
                .as_deref()
                .map(|name| input.index_of(name))
                .transpose()?;
            let data_type = aggregate_type(aggregation, column.map(|idx| &input.columns[idx]))?;
            let nullable = aggregation.function != AggregateFunction::Count;

            columns.push(ColumnDef::new(&aggregation.alias, data_type, nullable));
            bound.push(BoundAggregate {
                function: aggregation.function,
                column,
            });
        }
        let schema = Schema::new(columns);
        ensure_unique_names(&schema)?;

        let label = format!(
            "Aggregate: key={key} [{}]",
            aggregations
                .iter()
                .map(|agg| agg.alias.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(self.push(
            Step::Aggregate {
                key: key_index,
                aggregates: bound,
            },
            schema,
            label,
        ))
    }

    pub fn join(&self, right: &Plan, left_on: &str, right_on: &str, how: JoinType) -> Result<Plan> {
        let left_schema = self.schema();
        let right_schema = right.schema();

        let left_key = left_schema
            .get_column_index(left_on)
            .ok_or_else(|| FrameError::JoinKeyMismatch {
                column: left_on.to_owned(),
                side: JoinSide::Left,
            })?;
        let right_key = right_schema
            .get_column_index(right_on)
            .ok_or_else(|| FrameError::JoinKeyMismatch {
                column: right_on.to_owned(),
                side: JoinSide::Right,
            })?;

        let left_type = left_schema.columns[left_key].data_type;
        let right_type = right_schema.columns[right_key].data_type;
        if left_type != right_type {
            return Err(FrameError::TypeMismatch(format!(
                "join keys {left_on} ({left_type}) and {right_on} ({right_type}) differ"
            )));
        }

        let left_columns = left_schema.columns.iter().map(|col| {
            if how.keeps_unmatched_right() {
                col.as_nullable()
            } else {
                col.clone()
            }
        });
        let right_columns = right_schema.columns.iter().map(|col| {
            if how.keeps_unmatched_left() {
                col.as_nullable()
            } else {
                col.clone()
            }
        });
        let schema: Schema = left_columns.chain(right_columns).collect();
        ensure_unique_names(&schema)?;

        Ok(self.push(
            Step::Join {
                right: Box::new(right.clone()),
                left_key,
                right_key,
                how,
            },
            schema,
            format!("Join({how}): {left_on} = {right_on}"),
        ))
    }

    pub fn sort(&self, column: &str, ascending: bool) -> Result<Plan> {
        let index = self.schema().index_of(column)?;
        let schema = self.schema().clone();
        let direction = if ascending { "ASC" } else { "DESC" };

        Ok(self.push(
            Step::Sort { index, ascending },
            schema,
            format!("Sort: {column} {direction}"),
        ))
    }

    pub fn fill_null(&self, value: Value) -> Result<Plan> {
        let Some(value_type) = value.data_type() else {
            return Err(FrameError::TypeMismatch(
                "cannot fill nulls with NULL".to_string(),
            ));
        };

        let mut schema = self.schema().clone();
        let mut columns = Vec::new();
        for (idx, column) in schema.columns.iter_mut().enumerate() {
            let fills = column.data_type == value_type
                || (value_type == DataType::Int64 && column.data_type == DataType::Float64);
            if fills {
                column.nullable = false;
                columns.push(idx);
            }
        }

        let label = format!("FillNull: {value}");
        Ok(self.push(Step::FillNull { value, columns }, schema, label))
    }

    pub fn limit(&self, n: usize) -> Plan {
        let schema = self.schema().clone();
        self.push(Step::Limit(n), schema, format!("Limit: {n}"))
    }

    /// One line per step, starting from the scan.
    pub fn explain(&self) -> String {
        let mut out = format!(
            "Scan: [{}] ({} rows)",
            self.source.schema().names().collect::<Vec<_>>().join(", "),
            self.source.num_rows()
        );
        for node in &self.nodes {
            out.push_str("\n  -> ");
            out.push_str(&node.label);
        }

        out
    }
}

fn aggregate_type(aggregation: &Aggregation, input: Option<&ColumnDef>) -> Result<DataType> {
    match (aggregation.function, input) {
        (AggregateFunction::Count, _) => Ok(DataType::Int64),
        (AggregateFunction::Sum, Some(col)) if col.data_type.is_numeric() => Ok(col.data_type),
        (AggregateFunction::Min | AggregateFunction::Max, Some(col)) => Ok(col.data_type),
        (function, Some(col)) => Err(FrameError::TypeMismatch(format!(
            "{function} is not defined for column {} of type {}",
            col.name, col.data_type
        ))),
        (function, None) => Err(FrameError::TypeMismatch(format!(
            "{function} needs an input column"
        ))),
    }
}

fn ensure_unique_names(schema: &Schema) -> Result<()> {
    for (idx, column) in schema.columns.iter().enumerate() {
        if schema.columns[..idx].iter().any(|c| c.name == column.name) {
            return Err(FrameError::DuplicateColumn(column.name.clone()));
        }
    }

    Ok(())
}
