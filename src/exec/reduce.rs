use std::collections::HashMap;

use crate::{core::types::Value, frame::row::Row};

/// Expands every row into zero or more values, counts each distinct value
/// and sorts by count descending, then by value ascending.
///
/// Values found in `exclude` and nulls are dropped before counting.
pub(crate) fn flat_map_reduce_sort<'r, F, I>(
    rows: impl IntoIterator<Item = &'r Row>,
    extractor: F,
    exclude: &[Value],
) -> Vec<(Value, i64)>
where
    F: Fn(&Row) -> I,
    I: IntoIterator<Item = Value>,
{
    let mut counts: HashMap<Value, i64> = HashMap::new();
    for row in rows {
        for value in extractor(row) {
            if value.is_null() || exclude.contains(&value) {
                continue;
            }
            *counts.entry(value).or_insert(0) += 1;
        }
    }

    let mut counted: Vec<(Value, i64)> = counts.into_iter().collect();
    counted.sort_by(|(a_value, a_count), (b_value, b_count)| {
        b_count.cmp(a_count).then_with(|| a_value.cmp(b_value))
    });

    counted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn teams(pairs: &[(&str, &str)]) -> Vec<Row> {
        pairs
            .iter()
            .map(|(t1, t2)| Row::new(vec![Value::from(*t1), Value::from(*t2)]))
            .collect()
    }

    fn both(row: &Row) -> Vec<Value> {
        row.values.clone()
    }

    #[test]
    fn test_counts_and_excludes() {
        let rows = teams(&[("STAT", "NA"), ("STAT", "GA")]);
        let counted = flat_map_reduce_sort(&rows, both, &[Value::from("NA")]);
        assert_eq!(
            counted,
            vec![(Value::from("STAT"), 2), (Value::from("GA"), 1)]
        );
    }

    #[test]
    fn test_ties_sort_by_value() {
        let rows = teams(&[("GA", "EDP"), ("ANANUM", "STAT")]);
        let counted = flat_map_reduce_sort(&rows, both, &[]);
        let order: Vec<_> = counted.iter().map(|(v, _)| v.to_string()).collect();
        assert_eq!(order, vec!["ANANUM", "EDP", "GA", "STAT"]);
    }

    #[test]
    fn test_nulls_are_not_counted() {
        let rows = vec![Row::new(vec![Value::Null, Value::from("GA")])];
        let counted = flat_map_reduce_sort(&rows, both, &[]);
        assert_eq!(counted, vec![(Value::from("GA"), 1)]);
    }

    #[test]
    fn test_extractor_may_yield_nothing() {
        let rows = teams(&[("GA", "EDP")]);
        let counted = flat_map_reduce_sort(&rows, |_row: &Row| Vec::new(), &[]);
        assert!(counted.is_empty());
    }
}
