use std::{collections::BTreeMap, sync::Arc};

use tracing::debug_span;

use crate::{
    common::error::Result,
    core::types::Value,
    display,
    exec::{evaluator::ratio, executor::execute, reduce},
    expr::Expression,
    frame::{row::Row, schema::Schema, table::Table},
    plan::logical::{Aggregation, JoinType, Plan},
};

/// A lazy view over a table.
///
/// Transformations return a new frame and never touch rows. Actions
/// (`count`, `collect`, `show`, ...) evaluate the whole chain from the base
/// table each time they are called; nothing is cached unless
/// [`DataFrame::materialize`] is used.
#[derive(Debug, Clone)]
pub struct DataFrame {
    plan: Plan,
}

impl From<Table> for DataFrame {
    fn from(table: Table) -> Self {
        Self::new(table)
    }
}

impl DataFrame {
    pub fn new(table: Table) -> Self {
        Self {
            plan: Plan::scan(table),
        }
    }

    fn with_plan(plan: Plan) -> Self {
        Self { plan }
    }

    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    pub fn schema(&self) -> &Schema {
        self.plan.schema()
    }

    // Transformations

    /// Keeps the named columns, in the given order.
    pub fn select(&self, columns: &[&str]) -> Result<DataFrame> {
        self.plan.project(columns).map(Self::with_plan)
    }

    pub fn drop(&self, columns: &[&str]) -> Result<DataFrame> {
        self.plan.drop_columns(columns).map(Self::with_plan)
    }

    /// Keeps rows where `predicate` is true. Null counts as false.
    ///
    /// ```
    /// use skiff::{ColumnDef, DataFrame, DataType, Row, Schema, Table, col};
    ///
    /// let schema = Schema::new(vec![ColumnDef::new("organization", DataType::Text, false)]);
    /// let rows = vec![Row::from_iter(["R2"]), Row::from_iter(["INSA"])];
    /// let df = DataFrame::new(Table::try_new(schema, rows).unwrap());
    ///
    /// let r2 = df.filter(col("organization").eq("R2")).unwrap();
    /// assert_eq!(r2.count().unwrap(), 1);
    /// ```
    pub fn filter(&self, predicate: Expression) -> Result<DataFrame> {
        self.plan.filter(&predicate).map(Self::with_plan)
    }

    /// Keeps rows for which `func` returns true.
    ///
    /// `name` only shows up in [`DataFrame::explain`]. The closure runs once
    /// per row on every action.
    pub fn filter_fn<F>(&self, name: &str, func: F) -> DataFrame
    where
        F: Fn(&Row) -> bool + Send + Sync + 'static,
    {
        Self::with_plan(self.plan.filter_fn(name, Arc::new(func)))
    }

    /// Adds a computed column, or replaces the column of the same name.
    pub fn with_column(&self, name: &str, expr: Expression) -> Result<DataFrame> {
        self.plan.with_column(name, &expr).map(Self::with_plan)
    }

    pub fn group_by(&self, key: &str) -> Result<GroupedData> {
        self.schema().index_of(key)?;

        Ok(GroupedData {
            frame: self.clone(),
            key: key.to_owned(),
        })
    }

    pub fn join(
        &self,
        right: &DataFrame,
        left_on: &str,
        right_on: &str,
        how: JoinType,
    ) -> Result<DataFrame> {
        self.plan
            .join(&right.plan, left_on, right_on, how)
            .map(Self::with_plan)
    }

    /// Replaces nulls in every column whose type matches `value`.
    ///
    /// An integer also fills floating point columns.
    pub fn fill_null(&self, value: impl Into<Value>) -> Result<DataFrame> {
        self.plan.fill_null(value.into()).map(Self::with_plan)
    }

    /// Stable sort on one column. Nulls come first ascending, last descending.
    pub fn order_by(&self, column: &str, ascending: bool) -> Result<DataFrame> {
        self.plan.sort(column, ascending).map(Self::with_plan)
    }

    pub fn limit(&self, n: usize) -> DataFrame {
        Self::with_plan(self.plan.limit(n))
    }

    /// Evaluates the chain once and starts a new one from the result.
    pub fn materialize(&self) -> Result<DataFrame> {
        self.collect().map(Self::new)
    }

    pub fn explain(&self) -> String {
        self.plan.explain()
    }

    pub fn schema_string(&self) -> String {
        display::render_schema(self.schema())
    }

    pub fn print_schema(&self) {
        println!("{}", self.schema_string());
    }

    // Actions

    pub fn collect(&self) -> Result<Table> {
        let span = debug_span!("action", action = "collect");
        let _enter = span.enter();

        execute(&self.plan)
    }

    pub fn count(&self) -> Result<usize> {
        let span = debug_span!("action", action = "count");
        let _enter = span.enter();

        Ok(execute(&self.plan)?.num_rows())
    }

    /// The first `n` rows.
    pub fn head(&self, n: usize) -> Result<Vec<Row>> {
        let span = debug_span!("action", action = "head", n);
        let _enter = span.enter();

        Ok(execute(&self.plan.limit(n))?.rows().to_vec())
    }

    pub fn take(&self, n: usize) -> Result<Vec<Row>> {
        self.head(n)
    }

    pub fn first(&self) -> Result<Option<Row>> {
        Ok(self.head(1)?.into_iter().next())
    }

    /// Renders up to `n` rows as text.
    pub fn render(&self, n: usize) -> Result<String> {
        let span = debug_span!("action", action = "show", n);
        let _enter = span.enter();

        let table = execute(&self.plan)?;
        Ok(display::render_table(&table, n))
    }

    pub fn show(&self, n: usize) -> Result<()> {
        println!("{}", self.render(n)?);
        Ok(())
    }

    /// Expands each row into values with `extractor`, then counts them.
    ///
    /// Returns `(value, count)` pairs sorted by count descending and value
    /// ascending. Nulls and values in `exclude` are not counted.
    pub fn flat_map_reduce_sort<F, I>(&self, extractor: F, exclude: &[Value]) -> Result<Vec<(Value, i64)>>
    where
        F: Fn(&Row) -> I,
        I: IntoIterator<Item = Value>,
    {
        let span = debug_span!("action", action = "flat_map_reduce_sort");
        let _enter = span.enter();

        let table = execute(&self.plan)?;
        Ok(reduce::flat_map_reduce_sort(&table, extractor, exclude))
    }

    /// [`DataFrame::flat_map_reduce_sort`] over the values of `columns`.
    pub fn value_counts(&self, columns: &[&str], exclude: &[Value]) -> Result<Vec<(Value, i64)>> {
        let indices = columns
            .iter()
            .map(|name| self.schema().index_of(name))
            .collect::<Result<Vec<_>>>()?;

        self.flat_map_reduce_sort(
            |row| {
                indices
                    .iter()
                    .map(|&idx| row.value_or_null(idx))
                    .collect::<Vec<_>>()
            },
            exclude,
        )
    }
}

/// Row count of `numerator` over row count of `denominator`.
pub fn count_ratio(numerator: &DataFrame, denominator: &DataFrame) -> Result<f64> {
    ratio(numerator.count()?, denominator.count()?)
}

/// A frame waiting for an aggregation on `key`.
#[derive(Debug, Clone)]
pub struct GroupedData {
    frame: DataFrame,
    key: String,
}

impl GroupedData {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Number of rows per key, in a column named `count`.
    pub fn count(&self) -> Result<GroupedResult> {
        self.agg(&[Aggregation::count_rows()])
    }

    /// One output column per aggregation, after the key column.
    pub fn agg(&self, aggregations: &[Aggregation]) -> Result<GroupedResult> {
        let plan = self.frame.plan.aggregate(&self.key, aggregations)?;

        Ok(GroupedResult {
            frame: DataFrame::with_plan(plan),
        })
    }
}

/// The lazy result of a grouping: one row per distinct key, in order of
/// first appearance.
#[derive(Debug, Clone)]
pub struct GroupedResult {
    frame: DataFrame,
}

impl GroupedResult {
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn into_frame(self) -> DataFrame {
        self.frame
    }

    /// Key -> first aggregate value.
    pub fn collect_map(&self) -> Result<BTreeMap<Value, Value>> {
        let table = self.frame.collect()?;

        Ok(table
            .iter()
            .map(|row| (row.value_or_null(0), row.value_or_null(1)))
            .collect())
    }
}

impl std::ops::Deref for GroupedResult {
    type Target = DataFrame;

    fn deref(&self) -> &DataFrame {
        &self.frame
    }
}
