//! Column type inference over a parsed table.
//!
//! Each column is classified from a bounded sample of unquoted non-empty
//! values; the column's type is the first predicate that holds for every
//! sampled value, checked in a fixed priority order.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::data::table::CsvTable;

/// Rows sampled per column when the caller does not override.
pub const DEFAULT_SAMPLE_SIZE: usize = 100;

/// Strict positional patterns: exactly `YYYY-MM-DD` / `MM-DD-YYYY` shapes
/// with `-` or `/` at the separator positions. ASCII digit classes keep
/// ID-like strings and Unicode digits out.
static DATE_PATTERNS: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(r"^[0-9]{4}[-/][0-9]{2}[-/][0-9]{2}$").unwrap(),
        Regex::new(r"^[0-9]{2}[-/][0-9]{2}[-/][0-9]{4}$").unwrap(),
    ]
});

/// Inferred type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Int64,
    Float64,
    Date,
    Currency,
    Bool,
    Enum,
    Text,
}

impl ColumnType {
    /// Display name, matching the serialized form.
    pub fn name(&self) -> &'static str {
        match self {
            ColumnType::Int64 => "int64",
            ColumnType::Float64 => "float64",
            ColumnType::Date => "date",
            ColumnType::Currency => "currency",
            ColumnType::Bool => "bool",
            ColumnType::Enum => "enum",
            ColumnType::Text => "text",
        }
    }

    /// Types whose cells are compared numerically by the query layer.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ColumnType::Int64 | ColumnType::Float64 | ColumnType::Currency
        )
    }
}

/// One column of the inferred schema: unquoted header name + type.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

fn is_bool(s: &str) -> bool {
    if s.is_empty() || s.len() > 5 {
        return false;
    }
    matches!(
        s.to_ascii_lowercase().as_str(),
        "true" | "false" | "yes" | "no" | "1" | "0"
    )
}

// Only a literal `$` qualifies; other currency-symbol lead bytes are
// scanned past but never satisfy the final check.
fn is_currency(s: &str) -> bool {
    let b = s.as_bytes();
    if b.len() < 2 {
        return false;
    }
    let mut i = 0;
    if b[0] == b'$' || b[0] == 0xc2 {
        i = 1;
        if i < b.len() && (b[i] == 0xa3 || b[i] == 0xa5) {
            i += 1;
        }
    }
    if i == b.len() {
        return false;
    }
    if b[i] == b'-' || b[i] == b'+' {
        i += 1;
    }
    let mut has_digit = false;
    let mut has_dot = false;
    while i < b.len() {
        match b[i] {
            b'0'..=b'9' => has_digit = true,
            b',' => {}
            b'.' => {
                if has_dot {
                    return false;
                }
                has_dot = true;
            }
            _ => return false,
        }
        i += 1;
    }
    has_digit && b[0] == b'$'
}

fn is_date(s: &str) -> bool {
    s.len() == 10 && DATE_PATTERNS.iter().any(|p| p.is_match(s))
}

fn is_int64(s: &str) -> bool {
    let digits = s.strip_prefix(['-', '+']).unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

// Requires a decimal point or an exponent; plain integers classify as
// Int64 earlier in the priority chain.
fn is_float64(s: &str) -> bool {
    let b = s.as_bytes();
    if b.is_empty() {
        return false;
    }
    let mut i = 0;
    if b[0] == b'-' || b[0] == b'+' {
        i = 1;
    }
    if i == b.len() {
        return false;
    }
    let mut has_dot = false;
    let mut has_digit = false;
    while i < b.len() {
        match b[i] {
            b'.' => {
                if has_dot {
                    return false;
                }
                has_dot = true;
            }
            b'0'..=b'9' => has_digit = true,
            b'e' | b'E' => {
                if !has_digit {
                    return false;
                }
                i += 1;
                if i < b.len() && (b[i] == b'+' || b[i] == b'-') {
                    i += 1;
                }
                if i == b.len() {
                    return false;
                }
                return b[i..].iter().all(|c| c.is_ascii_digit());
            }
            _ => return false,
        }
        i += 1;
    }
    has_digit && has_dot
}

/// Infer the schema of a parsed table from up to `sample_size` rows per
/// column. Empty cells are skipped; a column with no non-empty samples is
/// Text. Recompute after any reparse — the schema is a snapshot.
pub fn infer_schema(table: &CsvTable, sample_size: usize) -> Vec<ColumnSchema> {
    let ncols = table.column_count();
    let nrows = table.row_count().min(sample_size);
    let mut schema = Vec::with_capacity(ncols);

    for col in 0..ncols {
        let name = table.unquoted(table.headers()[col]).into_owned();

        let mut values: Vec<String> = Vec::new();
        let mut unique: HashSet<String> = HashSet::new();
        for r in 0..nrows {
            let val = table.unquoted(table.row(r)[col]);
            if !val.is_empty() {
                unique.insert(val.clone().into_owned());
                values.push(val.into_owned());
            }
        }

        let column_type = if values.is_empty() {
            ColumnType::Text
        } else if values.iter().all(|v| is_bool(v)) {
            ColumnType::Bool
        } else if values.iter().all(|v| is_currency(v)) {
            ColumnType::Currency
        } else if values.iter().all(|v| is_date(v)) {
            ColumnType::Date
        } else if values.iter().all(|v| is_int64(v)) {
            ColumnType::Int64
        } else if values.iter().all(|v| is_float64(v)) {
            ColumnType::Float64
        } else if unique.len() < 2.max(values.len() / 10) {
            ColumnType::Enum
        } else {
            ColumnType::Text
        };

        schema.push(ColumnSchema { name, column_type });
    }

    schema
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_values() {
        for v in ["true", "FALSE", "yes", "No", "1", "0"] {
            assert!(is_bool(v), "{v} should be bool");
        }
        assert!(!is_bool("truthy"));
        assert!(!is_bool("maybe"));
        assert!(!is_bool(""));
    }

    #[test]
    fn currency_requires_literal_dollar() {
        assert!(is_currency("$5"));
        assert!(is_currency("$1,234.56"));
        assert!(is_currency("$-10"));
        // Pound sign is scanned past but never qualifies.
        assert!(!is_currency("£5"));
        assert!(!is_currency("5.00"));
        assert!(!is_currency("$"));
        assert!(!is_currency("$1.2.3"));
    }

    #[test]
    fn date_shapes() {
        assert!(is_date("2024-01-15"));
        assert!(is_date("2024/01/15"));
        assert!(is_date("01/15/2024"));
        assert!(is_date("01-15-2024"));
        assert!(!is_date("2024-1-15"));
        assert!(!is_date("ORDER-2024"));
        assert!(!is_date("2024-01-15T10:30:00"));
    }

    #[test]
    fn int_and_float() {
        assert!(is_int64("42"));
        assert!(is_int64("-42"));
        assert!(is_int64("+7"));
        assert!(!is_int64("4.2"));
        assert!(!is_int64("-"));

        assert!(is_float64("4.2"));
        assert!(is_float64("-0.5"));
        assert!(is_float64("1e10"));
        assert!(is_float64("1.5E-3"));
        assert!(!is_float64("42")); // plain integers are Int64
        assert!(!is_float64("1e"));
        assert!(!is_float64("."));
        assert!(!is_float64("1.2.3"));
    }
}
