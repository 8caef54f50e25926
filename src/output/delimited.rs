use std::io::Write;

use anyhow::Result;
use csv::WriterBuilder;

use crate::data::table::CsvTable;
use crate::output::{column_order, display_rows, table_row};

/// Write the selected rows/columns as delimited text (comma for CSV, tab
/// for TSV). Values are unquoted first; the writer re-quotes whatever
/// the output delimiter requires.
pub fn render_delimited<W: Write>(
    out: &mut W,
    table: &CsvTable,
    rows: Option<&[usize]>,
    cols: Option<&[usize]>,
    max_rows: usize,
    delimiter: u8,
) -> Result<()> {
    let display_cols = column_order(table, cols);
    let nrows = display_rows(table, rows, max_rows);

    let mut wtr = WriterBuilder::new().delimiter(delimiter).from_writer(out);

    wtr.write_record(
        display_cols
            .iter()
            .map(|&c| table.unquoted(table.headers()[c]).into_owned()),
    )?;

    for r in 0..nrows {
        let row = table.row(table_row(rows, r));
        wtr.write_record(
            display_cols
                .iter()
                .map(|&c| table.unquoted(row[c]).into_owned()),
        )?;
    }

    wtr.flush()?;
    Ok(())
}
