use std::io::Write;

use anyhow::Result;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::data::table::CsvTable;
use crate::data::type_inference::{ColumnSchema, ColumnType};
use crate::output::{column_order, display_rows, table_row};

/// Encode one cell per the column's inferred type: empty cells are null,
/// Bool becomes a JSON boolean, Int64/Float64 become numbers when they
/// parse, everything else stays a string.
fn typed_value(val: &str, column_type: ColumnType) -> Value {
    if val.is_empty() {
        return Value::Null;
    }
    match column_type {
        ColumnType::Bool => {
            let lower = val.to_ascii_lowercase();
            Value::Bool(lower == "true" || lower == "yes" || lower == "1")
        }
        ColumnType::Int64 => val
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(val.to_string())),
        ColumnType::Float64 => val
            .parse::<f64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(val.to_string())),
        _ => Value::String(val.to_string()),
    }
}

/// Render the selected rows as an array of JSON objects keyed by header.
pub fn render_json<W: Write>(
    out: &mut W,
    table: &CsvTable,
    schema: &[ColumnSchema],
    rows: Option<&[usize]>,
    cols: Option<&[usize]>,
    max_rows: usize,
) -> Result<()> {
    let display_cols = column_order(table, cols);
    let nrows = display_rows(table, rows, max_rows);

    let names: Vec<String> = display_cols
        .iter()
        .map(|&c| table.unquoted(table.headers()[c]).into_owned())
        .collect();

    let mut records = Vec::with_capacity(nrows);
    for r in 0..nrows {
        let row = table.row(table_row(rows, r));
        let mut obj = Map::new();
        for (pos, &c) in display_cols.iter().enumerate() {
            let column_type = schema
                .get(c)
                .map(|s| s.column_type)
                .unwrap_or(ColumnType::Text);
            let val = table.unquoted(row[c]);
            obj.insert(names[pos].clone(), typed_value(&val, column_type));
        }
        records.push(Value::Object(obj));
    }

    serde_json::to_writer_pretty(&mut *out, &records)?;
    writeln!(out)?;
    Ok(())
}

#[derive(Serialize)]
struct SchemaReport<'a> {
    row_count: usize,
    file_size: usize,
    columns: Vec<&'a ColumnSchema>,
}

/// Render the inferred schema (restricted to selected columns when a
/// selection is active) plus row count and input size.
pub fn render_schema<W: Write>(
    out: &mut W,
    schema: &[ColumnSchema],
    cols: Option<&[usize]>,
    row_count: usize,
    file_size: usize,
) -> Result<()> {
    let columns: Vec<&ColumnSchema> = match cols {
        Some(c) => c.iter().map(|&i| &schema[i]).collect(),
        None => schema.iter().collect(),
    };

    let report = SchemaReport {
        row_count,
        file_size,
        columns,
    };
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)?;
    Ok(())
}
