//! Delimited text loader.
//!
//! Fields are split on a single byte with no quote processing, so a field
//! may contain quote characters verbatim.

use std::io::Read;

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::info;

use crate::{
    common::error::{FrameError, Result},
    core::types::{DataType, Value, parse_bool},
    frame::{
        row::Row,
        schema::{Schema, SchemaRef},
        table::Table,
    },
};

/// Parsing options for [`load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelimitedOptions {
    pub delimiter: u8,
    /// Skip the first line.
    pub has_headers: bool,
}

impl Default for DelimitedOptions {
    fn default() -> Self {
        Self {
            delimiter: b';',
            has_headers: false,
        }
    }
}

/// Reads every line of `reader` into a row of `schema`.
///
/// A line with fewer fields than the schema fails with a parse error naming
/// the 1-based line, and so does a blank line. Extra fields are ignored.
pub fn load<R: Read>(
    reader: R,
    schema: impl Into<SchemaRef>,
    options: DelimitedOptions,
) -> Result<Table> {
    let schema = schema.into();
    let mut reader = ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(options.has_headers)
        .quoting(false)
        .flexible(true)
        .trim(Trim::None)
        .from_reader(reader);

    if options.has_headers {
        reader
            .byte_headers()
            .map_err(|err| read_error(err, 1))?;
    }

    // The reader drops empty lines, so they are spotted as gaps in line numbers.
    let mut next_line = reader.position().line();
    let mut record = StringRecord::new();
    let mut rows = Vec::new();
    while reader
        .read_record(&mut record)
        .map_err(|err| read_error(err, next_line))?
    {
        let end = reader.position().line();
        if end > next_line + 1 && !schema.is_empty() {
            return Err(blank_line(next_line, &schema));
        }
        rows.push(parse_record(&record, &schema, next_line)?);
        next_line = end;
    }
    if reader.position().line() > next_line && !schema.is_empty() {
        return Err(blank_line(next_line, &schema));
    }

    info!(
        rows = rows.len(),
        columns = schema.len(),
        delimiter = %char::from(options.delimiter),
        "loaded delimited table"
    );

    Ok(Table::new_unchecked(schema, rows))
}

fn blank_line(line: u64, schema: &Schema) -> FrameError {
    FrameError::parse(line, format!("expected {} fields, found a blank line", schema.len()))
}

/// Malformed bytes become a parse error on their line; only I/O failures stay I/O errors.
fn read_error(err: csv::Error, line: u64) -> FrameError {
    let line = err.position().map_or(line, |pos| pos.line());
    let message = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(err) => FrameError::Io(err),
        _ => FrameError::parse(line, message),
    }
}

fn parse_record(record: &StringRecord, schema: &Schema, line: u64) -> Result<Row> {
    if record.len() < schema.len() {
        return Err(FrameError::parse(
            line,
            format!(
                "expected {} fields, found {}",
                schema.len(),
                record.len()
            ),
        ));
    }

    schema
        .columns
        .iter()
        .zip(record.iter())
        .map(|(column, field)| {
            parse_field(field, column.data_type, column.nullable).map_err(|message| {
                FrameError::parse(line, format!("column {}: {message}", column.name))
            })
        })
        .collect::<Result<Vec<_>>>()
        .map(Row::new)
}

/// Converts one field. Empty fields in nullable non-text columns are null.
fn parse_field(field: &str, data_type: DataType, nullable: bool) -> Result<Value, String> {
    if field.is_empty() && nullable && data_type != DataType::Text {
        return Ok(Value::Null);
    }

    match data_type {
        DataType::Text => Ok(Value::Text(field.to_owned())),
        DataType::Bool => Ok(Value::Bool(parse_bool(field))),
        DataType::Int64 => field
            .parse::<i64>()
            .map(Value::Int64)
            .map_err(|_| format!("invalid integer '{field}'")),
        DataType::Float64 => field
            .parse::<f64>()
            .map(Value::Float64)
            .map_err(|_| format!("invalid float '{field}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ColumnDef;

    fn schema() -> Schema {
        Schema::new(vec![
            ColumnDef::new("name", DataType::Text, false),
            ColumnDef::new("hdr", DataType::Bool, false),
            ColumnDef::new("office", DataType::Int64, true),
        ])
    }

    fn load_str(input: &str) -> Result<Table> {
        load(input.as_bytes(), schema(), DelimitedOptions::default())
    }

    #[test]
    fn test_load_rows() {
        let table = load_str("Ada;True;12\nBo;False;7\n").unwrap();
        assert_eq!(table.num_rows(), 2);
        assert_eq!(
            table.rows()[0].values,
            vec![Value::from("Ada"), Value::Bool(true), Value::Int64(12)]
        );
    }

    #[test]
    fn test_only_exact_true_is_true() {
        let table = load_str("a;true;1\nb;TRUE;1\nc;;1\nd;True;1\n").unwrap();
        assert_eq!(
            table.column_values("hdr").unwrap(),
            vec![
                Value::Bool(false),
                Value::Bool(false),
                Value::Bool(false),
                Value::Bool(true)
            ]
        );
    }

    #[test]
    fn test_short_line_names_line_number() {
        let err = load_str("Ada;True;12\nBo;False\n").unwrap_err();
        assert!(matches!(err, FrameError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_extra_fields_ignored() {
        let table = load_str("Ada;True;12;spare;fields\n").unwrap();
        assert_eq!(table.rows()[0].values.len(), 3);
    }

    #[test]
    fn test_bad_integer() {
        let err = load_str("Ada;True;twelve\n").unwrap_err();
        assert!(matches!(err, FrameError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_empty_nullable_number_is_null() {
        let table = load_str("Ada;True;\n").unwrap();
        assert_eq!(table.rows()[0].values[2], Value::Null);
    }

    #[test]
    fn test_quotes_are_literal() {
        let table = load_str("\"Ada;True;1\n").unwrap();
        assert_eq!(table.rows()[0].values[0], Value::from("\"Ada"));
    }

    #[test]
    fn test_header_and_delimiter() {
        let options = DelimitedOptions {
            delimiter: b',',
            has_headers: true,
        };
        let table = load("name,hdr,office\nAda,True,3\n".as_bytes(), schema(), options).unwrap();
        assert_eq!(table.num_rows(), 1);
        assert_eq!(table.rows()[0].values[2], Value::Int64(3));
    }

    #[test]
    fn test_blank_line_is_parse_error() {
        let err = load_str("Ada;True;12\n\nBo;False;7\n").unwrap_err();
        assert!(matches!(err, FrameError::Parse { line: 2, .. }));

        let err = load_str("\nAda;True;12\n").unwrap_err();
        assert!(matches!(err, FrameError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_trailing_blank_line_is_parse_error() {
        let err = load_str("Ada;True;12\n\n").unwrap_err();
        assert!(matches!(err, FrameError::Parse { line: 2, .. }));

        assert_eq!(load_str("Ada;True;12").unwrap().num_rows(), 1);
    }

    #[test]
    fn test_blank_line_after_header() {
        let options = DelimitedOptions {
            delimiter: b';',
            has_headers: true,
        };
        let err = load("name;hdr;office\n\nAda;True;3\n".as_bytes(), schema(), options)
            .unwrap_err();
        assert!(matches!(err, FrameError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_invalid_utf8_is_parse_error() {
        let input: &[u8] = b"Ada;True;12\nB\xffo;False;7\n";
        let err = load(input, schema(), DelimitedOptions::default()).unwrap_err();
        assert!(matches!(err, FrameError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_empty_input() {
        assert!(load_str("").unwrap().is_empty());
    }
}
