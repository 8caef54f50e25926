use std::io::Write;

use anyhow::Result;
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, ContentArrangement, Table};

use crate::data::table::CsvTable;
use crate::data::type_inference::ColumnSchema;
use crate::output::{column_order, display_rows, format_count, format_size, table_row};

/// Render a boxed table: bold header row, a type-name row beneath it,
/// then up to `max_rows` data rows, followed by a count/size footer.
pub fn render_table<W: Write>(
    out: &mut W,
    table: &CsvTable,
    schema: &[ColumnSchema],
    rows: Option<&[usize]>,
    cols: Option<&[usize]>,
    max_rows: usize,
    match_count: usize,
) -> Result<()> {
    let display_cols = column_order(table, cols);
    let nrows = display_rows(table, rows, max_rows);

    let mut t = Table::new();
    t.load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    if let Ok((width, _)) = crossterm::terminal::size() {
        t.set_width(width);
    }

    t.set_header(
        display_cols
            .iter()
            .map(|&c| Cell::new(table.unquoted(table.headers()[c])).add_attribute(Attribute::Bold)),
    );

    t.add_row(display_cols.iter().map(|&c| {
        schema
            .get(c)
            .map(|s| s.column_type.name())
            .unwrap_or("text")
    }));

    for r in 0..nrows {
        let row = table.row(table_row(rows, r));
        t.add_row(display_cols.iter().map(|&c| table.unquoted(row[c])));
    }

    writeln!(out, "{t}")?;

    write!(out, "{} rows", format_count(match_count))?;
    if nrows < match_count {
        write!(out, " (showing {nrows})")?;
    }
    writeln!(
        out,
        " | {} cols | {}",
        display_cols.len(),
        format_size(table.size())
    )?;

    Ok(())
}
