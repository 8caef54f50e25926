//! Static renderers. Each consumes a table, the inferred schema and
//! optional row/column index lists, and writes to any `io::Write`; none
//! contain parsing or inference logic.

pub mod delimited;
pub mod json;
pub mod table;

use crate::data::table::CsvTable;

/// Columns to display, in display order.
pub(crate) fn column_order(table: &CsvTable, cols: Option<&[usize]>) -> Vec<usize> {
    match cols {
        Some(c) => c.to_vec(),
        None => (0..table.column_count()).collect(),
    }
}

/// Map a display row position to the canonical table row.
pub(crate) fn table_row(rows: Option<&[usize]>, display_idx: usize) -> usize {
    match rows {
        Some(r) => r[display_idx],
        None => display_idx,
    }
}

/// Number of rows actually rendered.
pub(crate) fn display_rows(table: &CsvTable, rows: Option<&[usize]>, max_rows: usize) -> usize {
    rows.map(|r| r.len()).unwrap_or(table.row_count()).min(max_rows)
}

/// Human-readable byte size: `496 B`, `1.2 MB`, ...
pub fn format_size(bytes: usize) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut val = bytes as f64;
    let mut idx = 0;
    while val >= 1024.0 && idx < UNITS.len() - 1 {
        val /= 1024.0;
        idx += 1;
    }
    if idx == 0 {
        format!("{bytes} B")
    } else {
        format!("{val:.1} {}", UNITS[idx])
    }
}

/// Compact row count: `950`, `1.5K`, `2.0M`.
pub fn format_count(count: usize) -> String {
    if count >= 1_000_000 {
        format!("{:.1}M", count as f64 / 1_000_000.0)
    } else if count >= 1_000 {
        format!("{:.1}K", count as f64 / 1_000.0)
    } else {
        count.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes() {
        assert_eq!(format_size(496), "496 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn counts() {
        assert_eq!(format_count(950), "950");
        assert_eq!(format_count(1500), "1.5K");
        assert_eq!(format_count(2_000_000), "2.0M");
    }
}
