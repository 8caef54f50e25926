//! Filter, sort and column-selection over a parsed table. Everything
//! here produces index lists into the canonical table; cell data is read
//! through unquoted views and never copied into a secondary store.

use std::cmp::Ordering;

use tracing::debug;

use crate::data::error::{DataError, Result};
use crate::data::table::CsvTable;
use crate::data::type_inference::{ColumnSchema, ColumnType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Neq,
    Gt,
    Lt,
    Gte,
    Lte,
    Contains,
    StartsWith,
    EndsWith,
}

/// One parsed filter expression. The value stays an unparsed string;
/// it is interpreted per-row against the resolved column's type.
#[derive(Debug, Clone)]
pub struct Filter {
    pub column: String,
    pub op: FilterOp,
    pub value: String,
}

/// Word operators, whole-token matched, in priority order.
const WORD_OPS: [(&str, FilterOp); 3] = [
    ("starts_with", FilterOp::StartsWith),
    ("ends_with", FilterOp::EndsWith),
    ("contains", FilterOp::Contains),
];

/// Symbolic operators in priority order; two-character operators first so
/// `>=` is never read as `>`.
const SYMBOL_OPS: [(&str, FilterOp); 6] = [
    (">=", FilterOp::Gte),
    ("<=", FilterOp::Lte),
    ("!=", FilterOp::Neq),
    ("==", FilterOp::Eq),
    (">", FilterOp::Gt),
    ("<", FilterOp::Lt),
];

/// Parse `column OP value`. A backslash before `!`, `>`, `<` or `=` is
/// dropped first (zsh/bash escape artifact).
pub fn parse_filter(expr: &str) -> Result<Filter> {
    let expr = expr.trim();
    if expr.is_empty() {
        return Err(DataError::Parse("empty filter expression".to_string()));
    }

    let mut normalized = String::with_capacity(expr.len());
    let mut chars = expr.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' && matches!(chars.peek(), Some('!' | '>' | '<' | '=')) {
            continue;
        }
        normalized.push(c);
    }

    for (token, op) in WORD_OPS {
        let needle = format!(" {token} ");
        if let Some(pos) = normalized.find(&needle) {
            let column = normalized[..pos].trim();
            let value = normalized[pos + needle.len()..].trim();
            if column.is_empty() || value.is_empty() {
                return Err(DataError::Parse(format!(
                    "column and value required around '{token}'"
                )));
            }
            return Ok(Filter {
                column: column.to_string(),
                op,
                value: value.to_string(),
            });
        }
    }

    for (token, op) in SYMBOL_OPS {
        if let Some(pos) = normalized.find(token) {
            let column = normalized[..pos].trim();
            let value = normalized[pos + token.len()..].trim();
            if column.is_empty() || value.is_empty() {
                return Err(DataError::Parse(format!(
                    "column and value required around '{token}'"
                )));
            }
            return Ok(Filter {
                column: column.to_string(),
                op,
                value: value.to_string(),
            });
        }
    }

    Err(DataError::Parse(format!(
        "no operator found in '{normalized}' \
         (supported: ==, !=, >, <, >=, <=, contains, starts_with, ends_with)"
    )))
}

/// Strip currency/grouping characters and parse the whole remainder as a
/// number. `None` means "compare as strings instead".
fn parse_numeric(s: &str) -> Option<f64> {
    let cleaned: String = s.chars().filter(|&c| c != '$' && c != ',').collect();
    cleaned.parse().ok()
}

fn compare_numeric(cell: f64, op: FilterOp, value: f64) -> bool {
    match op {
        FilterOp::Eq => cell == value,
        FilterOp::Neq => cell != value,
        FilterOp::Gt => cell > value,
        FilterOp::Lt => cell < value,
        FilterOp::Gte => cell >= value,
        FilterOp::Lte => cell <= value,
        FilterOp::Contains | FilterOp::StartsWith | FilterOp::EndsWith => false,
    }
}

fn compare_strings(cell: &str, op: FilterOp, value: &str, case_insensitive: bool) -> bool {
    if case_insensitive {
        return compare_strings(&cell.to_lowercase(), op, &value.to_lowercase(), false);
    }
    match op {
        FilterOp::Eq => cell == value,
        FilterOp::Neq => cell != value,
        FilterOp::Gt => cell > value,
        FilterOp::Lt => cell < value,
        FilterOp::Gte => cell >= value,
        FilterOp::Lte => cell <= value,
        FilterOp::Contains => cell.contains(value),
        FilterOp::StartsWith => cell.starts_with(value),
        FilterOp::EndsWith => cell.ends_with(value),
    }
}

/// Resolve a column name against the unquoted headers.
fn find_column(table: &CsvTable, name: &str, case_insensitive: bool) -> Result<usize> {
    let target = if case_insensitive {
        name.to_lowercase()
    } else {
        name.to_string()
    };
    for (i, span) in table.headers().iter().enumerate() {
        let header = table.unquoted(*span);
        let header = if case_insensitive {
            header.to_lowercase()
        } else {
            header.into_owned()
        };
        if header == target {
            return Ok(i);
        }
    }
    Err(DataError::UnknownColumn {
        column: name.to_string(),
        available: table.header_names(),
    })
}

struct ResolvedFilter<'a> {
    filter: &'a Filter,
    col_idx: usize,
    col_type: ColumnType,
}

fn row_matches(table: &CsvTable, row: usize, rf: &ResolvedFilter, case_insensitive: bool) -> bool {
    let cell = table.unquoted(table.row(row)[rf.col_idx]);
    let op = rf.filter.op;

    // Numeric columns compare numerically unless the operator is a
    // substring test; a failed parse on either side falls back silently
    // to string comparison.
    if rf.col_type.is_numeric()
        && !matches!(
            op,
            FilterOp::Contains | FilterOp::StartsWith | FilterOp::EndsWith
        )
    {
        if let (Some(cell_val), Some(filter_val)) =
            (parse_numeric(&cell), parse_numeric(&rf.filter.value))
        {
            return compare_numeric(cell_val, op, filter_val);
        }
    }

    compare_strings(&cell, op, &rf.filter.value, case_insensitive)
}

/// Evaluate all filters against every row, combining per-row results with
/// AND (default) or OR. Returns the ascending list of matching row
/// indices. With no filters, AND matches every row and OR matches none.
pub fn apply_filters(
    filters: &[Filter],
    table: &CsvTable,
    schema: &[ColumnSchema],
    case_insensitive: bool,
    or_logic: bool,
) -> Result<Vec<usize>> {
    let mut resolved = Vec::with_capacity(filters.len());
    for filter in filters {
        let col_idx = find_column(table, &filter.column, case_insensitive)?;
        let col_type = schema
            .get(col_idx)
            .map(|c| c.column_type)
            .unwrap_or(ColumnType::Text);
        resolved.push(ResolvedFilter {
            filter,
            col_idx,
            col_type,
        });
    }

    let mut result = Vec::new();
    for r in 0..table.row_count() {
        let matched = if or_logic {
            resolved
                .iter()
                .any(|rf| row_matches(table, r, rf, case_insensitive))
        } else {
            resolved
                .iter()
                .all(|rf| row_matches(table, r, rf, case_insensitive))
        };
        if matched {
            result.push(r);
        }
    }

    debug!("{} of {} rows matched", result.len(), table.row_count());
    Ok(result)
}

/// Stable sort of `indices` by one column. Numeric columns compare
/// parsed values when both sides parse, otherwise (and for every other
/// type) unquoted strings compare byte-wise. Equal keys keep their
/// original relative order.
pub fn sort_indices(
    indices: &mut [usize],
    table: &CsvTable,
    schema: &[ColumnSchema],
    column: &str,
    descending: bool,
) -> Result<()> {
    let col_idx = find_column(table, column, false)?;
    let numeric = schema
        .get(col_idx)
        .map(|c| c.column_type.is_numeric())
        .unwrap_or(false);

    indices.sort_by(|&a, &b| {
        let va = table.unquoted(table.row(a)[col_idx]);
        let vb = table.unquoted(table.row(b)[col_idx]);

        let ord = if numeric {
            match (parse_numeric(&va), parse_numeric(&vb)) {
                (Some(da), Some(db)) => da.partial_cmp(&db).unwrap_or(Ordering::Equal),
                _ => va.cmp(&vb),
            }
        } else {
            va.cmp(&vb)
        };

        if descending {
            ord.reverse()
        } else {
            ord
        }
    });

    Ok(())
}

/// Resolve a comma-separated selection against the headers, preserving
/// the caller's order. Whitespace-only tokens are skipped; an empty
/// result is an error.
pub fn resolve_columns(select: &str, table: &CsvTable) -> Result<Vec<usize>> {
    let mut indices = Vec::new();
    for token in select.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        indices.push(find_column(table, token, false)?);
    }
    if indices.is_empty() {
        return Err(DataError::NoColumnsSelected);
    }
    Ok(indices)
}
