use std::collections::HashMap;

use crate::{
    common::error::Result,
    core::types::Value,
    exec::evaluator::values_add,
    frame::row::Row,
    plan::logical::{AggregateFunction, BoundAggregate},
};

/// Running state of one aggregate within one group.
#[derive(Debug, Clone)]
enum Accumulator {
    Count(i64),
    Sum(Value),
    Min(Value),
    Max(Value),
}

impl Accumulator {
    fn new(function: AggregateFunction) -> Self {
        match function {
            AggregateFunction::Count => Accumulator::Count(0),
            AggregateFunction::Sum => Accumulator::Sum(Value::Null),
            AggregateFunction::Min => Accumulator::Min(Value::Null),
            AggregateFunction::Max => Accumulator::Max(Value::Null),
        }
    }

    /// Folds one input in. `None` means "count this row" for `count()`.
    fn update(&mut self, input: Option<&Value>) -> Result<()> {
        match (self, input) {
            (Accumulator::Count(n), None) => *n += 1,
            (_, Some(Value::Null)) | (_, None) => {}
            (Accumulator::Count(n), Some(_)) => *n += 1,
            (Accumulator::Sum(acc), Some(value)) => {
                *acc = if acc.is_null() {
                    value.clone()
                } else {
                    values_add(acc, value)?
                };
            }
            (Accumulator::Min(acc), Some(value)) => {
                if acc.is_null() || *value < *acc {
                    *acc = value.clone();
                }
            }
            (Accumulator::Max(acc), Some(value)) => {
                if acc.is_null() || *value > *acc {
                    *acc = value.clone();
                }
            }
        }

        Ok(())
    }

    fn finish(self) -> Value {
        match self {
            Accumulator::Count(n) => Value::Int64(n),
            Accumulator::Sum(v) | Accumulator::Min(v) | Accumulator::Max(v) => v,
        }
    }
}

/// Groups `rows` on the value at `key` and folds every aggregate per group.
///
/// Output rows are `[key, agg1, agg2, ...]`, one per distinct key, in order
/// of first appearance. Null keys form their own group.
pub(crate) fn group_rows(
    rows: &[Row],
    key: usize,
    aggregates: &[BoundAggregate],
) -> Result<Vec<Row>> {
    let mut positions: HashMap<Value, usize> = HashMap::new();
    let mut groups: Vec<(Value, Vec<Accumulator>)> = Vec::new();

    for row in rows {
        let key_value = row.value_or_null(key);
        let position = match positions.get(&key_value) {
            Some(&position) => position,
            None => {
                let accumulators = aggregates
                    .iter()
                    .map(|agg| Accumulator::new(agg.function))
                    .collect();
                groups.push((key_value.clone(), accumulators));
                positions.insert(key_value, groups.len() - 1);
                groups.len() - 1
            }
        };

        let accumulators = &mut groups[position].1;
        for (accumulator, aggregate) in accumulators.iter_mut().zip(aggregates) {
            let input = match aggregate.column {
                None => None,
                Some(idx) => match row.get_value(idx) {
                    Some(value) => Some(value),
                    None => continue,
                },
            };
            accumulator.update(input)?;
        }
    }

    Ok(groups
        .into_iter()
        .map(|(key_value, accumulators)| {
            let mut values = Vec::with_capacity(accumulators.len() + 1);
            values.push(key_value);
            values.extend(accumulators.into_iter().map(Accumulator::finish));
            Row::new(values)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<Row> {
        vec![
            Row::new(vec![Value::from("EDP"), Value::Int64(2)]),
            Row::new(vec![Value::from("GA"), Value::Null]),
            Row::new(vec![Value::from("EDP"), Value::Int64(5)]),
            Row::new(vec![Value::from("GA"), Value::Int64(1)]),
        ]
    }

    fn aggregate(function: AggregateFunction, column: Option<usize>) -> BoundAggregate {
        BoundAggregate { function, column }
    }

    #[test]
    fn test_count_rows_and_values() {
        let grouped = group_rows(
            &rows(),
            0,
            &[
                aggregate(AggregateFunction::Count, None),
                aggregate(AggregateFunction::Count, Some(1)),
            ],
        )
        .unwrap();

        assert_eq!(
            grouped,
            vec![
                Row::new(vec![Value::from("EDP"), Value::Int64(2), Value::Int64(2)]),
                Row::new(vec![Value::from("GA"), Value::Int64(2), Value::Int64(1)]),
            ]
        );
    }

    #[test]
    fn test_sum_min_max_skip_nulls() {
        let grouped = group_rows(
            &rows(),
            0,
            &[
                aggregate(AggregateFunction::Sum, Some(1)),
                aggregate(AggregateFunction::Min, Some(1)),
                aggregate(AggregateFunction::Max, Some(1)),
            ],
        )
        .unwrap();

        assert_eq!(
            grouped[0].values,
            vec![
                Value::from("EDP"),
                Value::Int64(7),
                Value::Int64(2),
                Value::Int64(5)
            ]
        );
        assert_eq!(
            grouped[1].values,
            vec![
                Value::from("GA"),
                Value::Int64(1),
                Value::Int64(1),
                Value::Int64(1)
            ]
        );
    }

    #[test]
    fn test_sum_of_only_nulls_is_null() {
        let rows = vec![Row::new(vec![Value::from("X"), Value::Null])];
        let grouped = group_rows(&rows, 0, &[aggregate(AggregateFunction::Sum, Some(1))]).unwrap();
        assert_eq!(grouped[0].values[1], Value::Null);
    }

    #[test]
    fn test_empty_input() {
        let grouped = group_rows(&[], 0, &[aggregate(AggregateFunction::Count, None)]).unwrap();
        assert!(grouped.is_empty());
    }
}
