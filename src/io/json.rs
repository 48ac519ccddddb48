//! JSON Lines: one object per line, typed by a caller supplied schema.

use std::io::{BufRead, Write};

use serde_json::{Map, Value as JsonValue};
use tracing::info;

use crate::{
    common::error::{FrameError, Result},
    core::types::{DataType, Value},
    frame::{
        column_def::ColumnDef,
        row::Row,
        schema::{Schema, SchemaRef},
        table::Table,
    },
};

/// Reads one row per non-blank line.
///
/// Missing or `null` fields become null in nullable columns. Anything else
/// that does not fit the schema is a parse error for that line.
pub fn load<R: BufRead>(reader: R, schema: impl Into<SchemaRef>) -> Result<Table> {
    let schema = schema.into();

    let mut rows = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        rows.push(parse_line(&line, &schema, idx as u64 + 1)?);
    }

    info!(rows = rows.len(), columns = schema.len(), "loaded json table");

    Ok(Table::new_unchecked(schema, rows))
}

fn parse_line(line: &str, schema: &Schema, line_no: u64) -> Result<Row> {
    let record: JsonValue =
        serde_json::from_str(line).map_err(|err| FrameError::parse(line_no, err.to_string()))?;
    let JsonValue::Object(fields) = record else {
        return Err(FrameError::parse(line_no, "expected a JSON object"));
    };

    schema
        .columns
        .iter()
        .map(|column| {
            convert(fields.get(&column.name), column)
                .map_err(|message| FrameError::parse(line_no, message))
        })
        .collect::<Result<Vec<_>>>()
        .map(Row::new)
}

fn convert(field: Option<&JsonValue>, column: &ColumnDef) -> Result<Value, String> {
    let value = match (field, column.data_type) {
        (None | Some(JsonValue::Null), _) => Value::Null,
        (Some(JsonValue::String(s)), DataType::Text) => Value::Text(s.clone()),
        (Some(JsonValue::Bool(b)), DataType::Bool) => Value::Bool(*b),
        (Some(JsonValue::Number(n)), DataType::Int64) if n.is_i64() => {
            n.as_i64().map_or(Value::Null, Value::Int64)
        }
        (Some(JsonValue::Number(n)), DataType::Float64) => {
            n.as_f64().map_or(Value::Null, Value::Float64)
        }
        (Some(other), data_type) => {
            return Err(format!(
                "column {}: expected {data_type}, found {other}",
                column.name
            ));
        }
    };

    if value.is_null() && !column.nullable {
        return Err(format!("column {} is not nullable", column.name));
    }

    Ok(value)
}

/// Writes each row as one JSON object keyed by column name.
pub fn write<W: Write>(table: &Table, mut writer: W) -> Result<()> {
    for row in table {
        let object: Map<String, JsonValue> = table
            .schema()
            .names()
            .zip(&row.values)
            .map(|(name, value)| -> Result<(String, JsonValue)> {
                Ok((name.to_owned(), serde_json::to_value(value)?))
            })
            .collect::<Result<_>>()?;
        serde_json::to_writer(&mut writer, &object)?;
        writer.write_all(b"\n")?;
    }

    Ok(())
}
