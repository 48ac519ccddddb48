//! Text rendering of tables and schemas for `show` and `print_schema`.

use std::fmt::Write;

use comfy_table::{Cell, CellAlignment, Table as TextTable, presets::ASCII_FULL_CONDENSED};

use crate::frame::{schema::Schema, table::Table};

/// Renders at most `max_rows` rows of `table` as an ASCII grid.
///
/// When rows are left out a `only showing top N rows` footer follows the
/// grid.
pub fn render_table(table: &Table, max_rows: usize) -> String {
    let mut grid = TextTable::new();
    grid.load_preset(ASCII_FULL_CONDENSED);
    grid.set_header(table.schema().names().map(Cell::new));

    for row in table.iter().take(max_rows) {
        grid.add_row(row.values.iter().map(|value| Cell::new(value)));
    }

    for index in 0..table.schema().len() {
        if let Some(column) = grid.column_mut(index) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }

    let mut out = grid.to_string();
    if table.num_rows() > max_rows {
        let _ = write!(out, "\nonly showing top {max_rows} rows");
    }

    out
}

/// Tree view of a schema, one line per column.
pub fn render_schema(schema: &Schema) -> String {
    let mut out = String::from("root");
    for column in &schema.columns {
        let _ = write!(
            out,
            "\n |-- {}: {} (nullable = {})",
            column.name, column.data_type, column.nullable
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ColumnDef, DataType, Row, Value};

    fn positions(n: usize) -> Table {
        let schema = Schema::new(vec![
            ColumnDef::new("position", DataType::Text, false),
            ColumnDef::new("count", DataType::Int64, false),
        ]);
        let rows = (0..n)
            .map(|i| Row::new(vec![Value::from(format!("P{i}")), Value::Int64(i as i64)]))
            .collect();
        Table::try_new(schema, rows).unwrap()
    }

    #[test]
    fn test_render_table_all_rows() {
        let text = render_table(&positions(2), 20);
        assert!(text.contains("position"));
        assert!(text.contains("P1"));
        assert!(!text.contains("only showing"));
    }

    #[test]
    fn test_render_table_footer() {
        let text = render_table(&positions(5), 3);
        assert!(text.contains("P2"));
        assert!(!text.contains("P3"));
        assert!(text.ends_with("only showing top 3 rows"));
    }

    #[test]
    fn test_render_schema() {
        let schema = Schema::new(vec![
            ColumnDef::new("name", DataType::Text, false),
            ColumnDef::new("hdr", DataType::Bool, true),
        ]);
        assert_eq!(
            render_schema(&schema),
            "root\n |-- name: string (nullable = false)\n |-- hdr: boolean (nullable = true)"
        );
    }
}
