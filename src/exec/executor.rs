use std::collections::HashMap;

use tracing::{debug, debug_span, trace};

use crate::{
    common::error::Result,
    core::types::{DataType, Value},
    exec::{
        aggregate::group_rows,
        evaluator::{Evaluator, expression::ExpressionEvaluator, predicate::PredicateEvaluator},
    },
    frame::{row::Row, schema::Schema, table::Table},
    plan::logical::{JoinType, Plan, PlanNode, Predicate, Step},
};

/// Lifecycle of one evaluation of a plan.
///
/// Every action creates a fresh [`Execution`], so running two actions on the
/// same plan evaluates it twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum PlanState {
    Unevaluated,
    Evaluating,
    Evaluated,
}

/// A single evaluation of a [`Plan`] against its base table.
#[derive(Debug)]
pub struct Execution<'a> {
    plan: &'a Plan,
    state: PlanState,
}

impl<'a> Execution<'a> {
    pub fn new(plan: &'a Plan) -> Self {
        Self {
            plan,
            state: PlanState::Unevaluated,
        }
    }

    pub fn state(&self) -> PlanState {
        self.state
    }

    fn transition(&mut self, next: PlanState) {
        trace!(from = %self.state, to = %next, "plan state");
        self.state = next;
    }

    /// Evaluates every step, starting from the base table.
    pub fn run(&mut self) -> Result<Table> {
        let plan = self.plan;
        let span = debug_span!("execute", steps = plan.nodes().len());
        let _enter = span.enter();

        self.transition(PlanState::Evaluating);

        let mut rows = plan.source().rows().to_vec();
        let mut input_schema = plan.source().schema();
        for node in plan.nodes() {
            let rows_in = rows.len();
            rows = apply(node, input_schema, rows)?;
            debug!(step = %node.label, rows_in, rows_out = rows.len(), "step done");
            input_schema = node.schema.as_ref();
        }

        self.transition(PlanState::Evaluated);

        Ok(Table::new_unchecked(plan.schema_ref(), rows))
    }
}

/// Evaluates a plan once and returns its rows.
pub fn execute(plan: &Plan) -> Result<Table> {
    Execution::new(plan).run()
}

fn apply(node: &PlanNode, input_schema: &Schema, rows: Vec<Row>) -> Result<Vec<Row>> {
    match &node.step {
        Step::Projection { indices } => Ok(rows.iter().map(|row| row.project(indices)).collect()),
        Step::Filter(predicate) => filter_rows(predicate, rows),
        Step::WithColumn { expr, replace } => rows
            .into_iter()
            .map(|mut row| {
                let value = ExpressionEvaluator.evaluate(expr, &row)?;
                match replace {
                    Some(idx) => row.values[*idx] = value,
                    None => row.values.push(value),
                }
                Ok(row)
            })
            .collect(),
        Step::Aggregate { key, aggregates } => group_rows(&rows, *key, aggregates),
        Step::Join {
            right,
            left_key,
            right_key,
            how,
        } => {
            let right_table = execute(right)?;
            Ok(hash_join(
                &rows,
                input_schema.len(),
                &right_table,
                *left_key,
                *right_key,
                *how,
            ))
        }
        Step::Sort { index, ascending } => {
            let mut rows = rows;
            // sort_by is stable, so equal keys keep their order either way
            rows.sort_by(|a, b| {
                let ordering = a.get_value(*index).cmp(&b.get_value(*index));
                if *ascending {
                    ordering
                } else {
                    ordering.reverse()
                }
            });
            Ok(rows)
        }
        Step::FillNull { value, columns } => Ok(rows
            .into_iter()
            .map(|mut row| {
                for &idx in columns {
                    if row.values[idx].is_null() {
                        row.values[idx] = fill_value(value, node.schema.columns[idx].data_type);
                    }
                }
                row
            })
            .collect()),
        Step::Limit(n) => {
            let mut rows = rows;
            rows.truncate(*n);
            Ok(rows)
        }
    }
}

fn filter_rows(predicate: &Predicate, rows: Vec<Row>) -> Result<Vec<Row>> {
    let mut kept = Vec::with_capacity(rows.len());
    for row in rows {
        let keep = match predicate {
            Predicate::Expression(expr) => PredicateEvaluator.evaluate(expr, &row)?,
            Predicate::Function(func) => func(&row),
        };
        if keep {
            kept.push(row);
        }
    }

    Ok(kept)
}

fn fill_value(value: &Value, column_type: DataType) -> Value {
    match (value, column_type) {
        (Value::Int64(i), DataType::Float64) => Value::Float64(*i as f64),
        _ => value.clone(),
    }
}

/// Equi-join on one key column. Null keys never match.
///
/// Output order follows the left input; matches for a left row come in
/// right-input order. Unmatched right rows (right and full joins) are
/// appended at the end.
fn hash_join(
    left: &[Row],
    left_width: usize,
    right: &Table,
    left_key: usize,
    right_key: usize,
    how: JoinType,
) -> Vec<Row> {
    let right_width = right.schema().len();

    let mut index: HashMap<&Value, Vec<usize>> = HashMap::new();
    for (position, row) in right.rows().iter().enumerate() {
        match row.get_value(right_key) {
            Some(Value::Null) | None => {}
            Some(key) => index.entry(key).or_default().push(position),
        }
    }

    let mut matched_right = vec![false; right.num_rows()];
    let mut output = Vec::new();

    for row in left {
        let matches = match row.get_value(left_key) {
            Some(Value::Null) | None => None,
            Some(key) => index.get(key),
        };

        match matches {
            Some(positions) => {
                for &position in positions {
                    matched_right[position] = true;
                    output.push(row.concat(&right.rows()[position]));
                }
            }
            None if how.keeps_unmatched_left() => {
                output.push(row.concat(&Row::nulls(right_width)));
            }
            None => {}
        }
    }

    if how.keeps_unmatched_right() {
        for (position, row) in right.rows().iter().enumerate() {
            if !matched_right[position] {
                output.push(Row::nulls(left_width).concat(row));
            }
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use super::*;
    use crate::{
        ColumnDef,
        expr::{col, lit},
        plan::logical::Aggregation,
    };

    fn teams() -> Table {
        let schema = Schema::new(vec![
            ColumnDef::new("name", DataType::Text, false),
            ColumnDef::new("team1", DataType::Text, false),
            ColumnDef::new("hdr", DataType::Bool, false),
        ]);
        Table::try_new(
            schema,
            vec![
                Row::new(vec![Value::from("a"), Value::from("EDP"), Value::Bool(true)]),
                Row::new(vec![Value::from("b"), Value::from("EDP"), Value::Bool(false)]),
                Row::new(vec![Value::from("c"), Value::from("GA"), Value::Bool(true)]),
            ],
        )
        .unwrap()
    }

    fn counts(pairs: &[(&str, i64)], key: &str, alias: &str) -> Table {
        let schema = Schema::new(vec![
            ColumnDef::new(key, DataType::Text, false),
            ColumnDef::new(alias, DataType::Int64, false),
        ]);
        let rows = pairs
            .iter()
            .map(|(k, n)| Row::new(vec![Value::from(*k), Value::Int64(*n)]))
            .collect();
        Table::try_new(schema, rows).unwrap()
    }

    #[test]
    fn test_state_transitions() {
        let plan = Plan::scan(teams());
        let mut execution = Execution::new(&plan);
        assert_eq!(execution.state(), PlanState::Unevaluated);
        execution.run().unwrap();
        assert_eq!(execution.state(), PlanState::Evaluated);
    }

    #[test]
    fn test_filter_then_group() {
        let plan = Plan::scan(teams())
            .filter(&col("hdr"))
            .unwrap()
            .aggregate("team1", &[Aggregation::count_rows()])
            .unwrap();
        let table = execute(&plan).unwrap();
        assert_eq!(
            table.rows(),
            &[
                Row::new(vec![Value::from("EDP"), Value::Int64(1)]),
                Row::new(vec![Value::from("GA"), Value::Int64(1)]),
            ]
        );
    }

    #[test]
    fn test_with_column_replaces_existing() {
        let plan = Plan::scan(teams())
            .with_column("hdr", &col("hdr").is_false())
            .unwrap();
        let table = execute(&plan).unwrap();
        assert_eq!(table.schema().len(), 3);
        assert_eq!(
            table.column_values("hdr").unwrap(),
            vec![Value::Bool(false), Value::Bool(true), Value::Bool(false)]
        );
    }

    #[test]
    fn test_left_join_with_fill() {
        let left = Plan::scan(counts(&[("EDP", 3), ("GA", 2), ("STAT", 1)], "team1", "count1"));
        let right = Plan::scan(counts(&[("GA", 4)], "team2", "count2"));

        let plan = left
            .join(&right, "team1", "team2", JoinType::Left)
            .unwrap()
            .fill_null(Value::Int64(0))
            .unwrap();
        let table = execute(&plan).unwrap();

        assert_eq!(table.num_rows(), 3);
        assert_eq!(
            table.column_values("count2").unwrap(),
            vec![Value::Int64(0), Value::Int64(4), Value::Int64(0)]
        );
        // Text columns are untouched by an integer fill
        assert_eq!(
            table.column_values("team2").unwrap(),
            vec![Value::Null, Value::from("GA"), Value::Null]
        );
    }

    #[test]
    fn test_inner_right_full_joins() {
        let left = Plan::scan(counts(&[("EDP", 3), ("GA", 2)], "team1", "count1"));
        let right = Plan::scan(counts(&[("GA", 4), ("ANANUM", 1)], "team2", "count2"));

        let inner = execute(&left.join(&right, "team1", "team2", JoinType::Inner).unwrap()).unwrap();
        assert_eq!(inner.num_rows(), 1);

        let right_join =
            execute(&left.join(&right, "team1", "team2", JoinType::Right).unwrap()).unwrap();
        assert_eq!(right_join.num_rows(), 2);
        assert_eq!(
            right_join.rows()[1].values,
            vec![Value::Null, Value::Null, Value::from("ANANUM"), Value::Int64(1)]
        );

        let full = execute(&left.join(&right, "team1", "team2", JoinType::Full).unwrap()).unwrap();
        assert_eq!(full.num_rows(), 3);
    }

    #[test]
    fn test_join_duplicates_matches() {
        let left = Plan::scan(counts(&[("GA", 1)], "team1", "count1"));
        let right = Plan::scan(counts(&[("GA", 4), ("GA", 5)], "team2", "count2"));
        let table = execute(&left.join(&right, "team1", "team2", JoinType::Left).unwrap()).unwrap();
        assert_eq!(
            table.column_values("count2").unwrap(),
            vec![Value::Int64(4), Value::Int64(5)]
        );
    }

    #[test]
    fn test_sort_descending_is_stable() {
        let plan = Plan::scan(teams()).sort("team1", false).unwrap();
        let table = execute(&plan).unwrap();
        assert_eq!(
            table.column_values("name").unwrap(),
            vec![Value::from("c"), Value::from("a"), Value::from("b")]
        );
    }

    #[test]
    fn test_limit() {
        let plan = Plan::scan(teams()).limit(2);
        assert_eq!(execute(&plan).unwrap().num_rows(), 2);
    }

    #[test]
    fn test_closure_filter_runs_per_execution() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let plan = Plan::scan(teams()).filter_fn(
            "count",
            Arc::new(move |_row: &Row| {
                counter.fetch_add(1, Ordering::SeqCst);
                true
            }),
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        execute(&plan).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        execute(&plan).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 6);
    }

    #[test]
    fn test_runtime_error_propagates() {
        let plan = Plan::scan(counts(&[("GA", 0)], "team1", "count1"))
            .with_column("ratio", &(lit(1) / col("count1")))
            .unwrap();
        assert!(matches!(
            execute(&plan),
            Err(crate::FrameError::DivisionByZero)
        ));
    }
}
