use std::borrow::Cow;
use std::path::Path;

use memchr::memchr;
use tracing::debug;

use crate::data::error::Result;
use crate::data::scan::{self, FieldSpan};
use crate::data::source::DataSource;

/// Fallback bytes-per-row guess when the header line is empty.
const DEFAULT_LINE_LEN_ESTIMATE: usize = 50;

/// A parsed delimited file: the backing bytes plus a flat, row-major
/// store of field spans with stride `ncols`.
///
/// `parse` tokenizes the whole input; `parse_head` tokenizes a bounded
/// prefix and estimates the remaining row count with a newline scan, so a
/// preview costs `max_rows` of field work plus one linear pass.
///
/// Rebuilding clears all prior state first; spans from an earlier parse
/// are invalid after either parse call returns.
pub struct CsvTable {
    source: DataSource,
    headers: Vec<FieldSpan>,
    fields: Vec<FieldSpan>,
    ncols: usize,
    parsed_rows: usize,
    total_rows: usize,
}

impl CsvTable {
    /// Open `path` (or stdin for `-`) without parsing anything yet.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            source: DataSource::open(path)?,
            headers: Vec::new(),
            fields: Vec::new(),
            ncols: 0,
            parsed_rows: 0,
            total_rows: 0,
        })
    }

    pub fn bytes(&self) -> &[u8] {
        self.source.as_bytes()
    }

    /// Total size of the backing bytes.
    pub fn size(&self) -> usize {
        self.source.len()
    }

    /// Rows actually tokenized.
    pub fn row_count(&self) -> usize {
        self.parsed_rows
    }

    /// Rows known to exist; estimated (not tokenized) past a head parse.
    pub fn total_rows(&self) -> usize {
        self.total_rows
    }

    pub fn column_count(&self) -> usize {
        self.ncols
    }

    pub fn headers(&self) -> &[FieldSpan] {
        &self.headers
    }

    /// Unquoted header names, in column order.
    pub fn header_names(&self) -> Vec<String> {
        self.headers
            .iter()
            .map(|s| self.unquoted(*s).into_owned())
            .collect()
    }

    /// The `ncols` field spans of row `i`.
    pub fn row(&self, i: usize) -> &[FieldSpan] {
        &self.fields[i * self.ncols..(i + 1) * self.ncols]
    }

    /// Raw bytes of one field, quotes included.
    pub fn raw(&self, span: FieldSpan) -> &[u8] {
        span.slice(self.source.as_bytes())
    }

    /// Unquoted text of one field.
    pub fn unquoted(&self, span: FieldSpan) -> Cow<'_, str> {
        scan::unquote(self.raw(span))
    }

    fn clear(&mut self) {
        self.headers.clear();
        self.fields.clear();
        self.ncols = 0;
        self.parsed_rows = 0;
        self.total_rows = 0;
    }

    /// Parse line 0 as the header, fixing `ncols`. Returns the offset of
    /// the first body line.
    fn parse_header(&mut self, delimiter: u8) -> usize {
        let bytes = self.source.as_bytes();
        let total = bytes.len();
        if total == 0 {
            return 0;
        }

        let line_end = scan::find_line_end(bytes, 0);
        let mut actual_end = line_end;
        if actual_end > 0 && bytes[actual_end - 1] == b'\r' {
            actual_end -= 1;
        }

        self.headers = scan::split_fields(bytes, 0, actual_end, delimiter);
        self.ncols = self.headers.len();

        if line_end < total {
            line_end + 1
        } else {
            total
        }
    }

    /// Assemble one body line into the flat store: stop at `ncols` fields
    /// (excess raw fields are silently dropped), count a trailing
    /// delimiter as one empty field, pad short rows with empty spans.
    fn append_row_fields(
        fields: &mut Vec<FieldSpan>,
        bytes: &[u8],
        start: usize,
        end: usize,
        delim: u8,
        ncols: usize,
    ) {
        let mut added = 0;
        let mut i = start;

        while i < end && added < ncols {
            if bytes[i] == b'"' {
                let fs = i;
                i += 1;
                while i < end {
                    if bytes[i] == b'"' {
                        if i + 1 < end && bytes[i + 1] == b'"' {
                            i += 2;
                        } else {
                            break;
                        }
                    } else {
                        i += 1;
                    }
                }
                if i < end {
                    i += 1;
                }
                fields.push(FieldSpan::new(fs, i - fs));
                added += 1;
                if i < end && bytes[i] == delim {
                    i += 1;
                }
            } else {
                let fs = i;
                while i < end && bytes[i] != delim {
                    i += 1;
                }
                fields.push(FieldSpan::new(fs, i - fs));
                added += 1;
                if i < end {
                    i += 1;
                }
            }
        }

        if added < ncols && end > start && bytes[end - 1] == delim {
            fields.push(FieldSpan::default());
            added += 1;
        }

        while added < ncols {
            fields.push(FieldSpan::default());
            added += 1;
        }
    }

    /// Tokenize the whole input. Blank lines are skipped without
    /// counting; `total_rows == row_count` afterwards.
    pub fn parse(&mut self, delimiter: u8) {
        self.clear();
        let mut pos = self.parse_header(delimiter);
        if self.ncols == 0 {
            return;
        }

        let bytes = self.source.as_bytes();
        let total = bytes.len();

        // Pre-reserve from a header-length estimate to avoid reallocation.
        let est_line_len = if pos > 0 {
            pos
        } else {
            DEFAULT_LINE_LEN_ESTIMATE
        };
        let est_rows = if total > pos {
            (total - pos) / est_line_len + 1
        } else {
            0
        };
        self.fields.reserve(est_rows * self.ncols);

        while pos < total {
            let line_end = scan::find_line_end(bytes, pos);
            let mut actual_end = line_end;
            if actual_end > pos && bytes[actual_end - 1] == b'\r' {
                actual_end -= 1;
            }

            if actual_end == pos {
                pos = if line_end < total { line_end + 1 } else { total };
                continue;
            }

            Self::append_row_fields(&mut self.fields, bytes, pos, actual_end, delimiter, self.ncols);
            self.parsed_rows += 1;
            pos = if line_end < total { line_end + 1 } else { total };
        }

        self.total_rows = self.parsed_rows;
        debug!("parsed {} rows x {} cols", self.parsed_rows, self.ncols);
    }

    /// Tokenize at most `max_rows` body rows, then estimate the rest with
    /// a newline count instead of field-level parsing.
    pub fn parse_head(&mut self, delimiter: u8, max_rows: usize) {
        self.clear();
        let mut pos = self.parse_header(delimiter);
        if self.ncols == 0 {
            return;
        }

        let bytes = self.source.as_bytes();
        let total = bytes.len();

        self.fields.reserve(max_rows * self.ncols);

        while pos < total && self.parsed_rows < max_rows {
            let line_end = scan::find_line_end(bytes, pos);
            let mut actual_end = line_end;
            if actual_end > pos && bytes[actual_end - 1] == b'\r' {
                actual_end -= 1;
            }

            if actual_end == pos {
                pos = if line_end < total { line_end + 1 } else { total };
                continue;
            }

            Self::append_row_fields(&mut self.fields, bytes, pos, actual_end, delimiter, self.ncols);
            self.parsed_rows += 1;
            pos = if line_end < total { line_end + 1 } else { total };
        }

        self.total_rows = self.parsed_rows + self.count_rows_from(pos);
        debug!(
            "head-parsed {} rows x {} cols ({} total)",
            self.parsed_rows, self.ncols, self.total_rows
        );
    }

    /// Count rows in `bytes[offset..]` without tokenizing fields. With no
    /// quote in the remainder this is a pure newline count; otherwise a
    /// quote-state scan counts unescaped newlines. A final byte that is
    /// not a newline means one more (unterminated) row.
    fn count_rows_from(&self, offset: usize) -> usize {
        let all = self.source.as_bytes();
        if offset >= all.len() {
            return 0;
        }
        let bytes = &all[offset..];

        if memchr(b'"', bytes).is_none() {
            let mut count = scan::count_newlines(bytes);
            if bytes[bytes.len() - 1] != b'\n' {
                count += 1;
            }
            return count;
        }

        let mut count = 0;
        let mut in_quotes = false;
        for &b in bytes {
            if b == b'"' {
                in_quotes = !in_quotes;
            } else if b == b'\n' && !in_quotes {
                count += 1;
            }
        }
        if bytes[bytes.len() - 1] != b'\n' {
            count += 1;
        }
        count
    }
}
