//! Byte-level scanner primitives shared by the delimiter detector and the
//! table builder: quote-aware line boundaries, field splitting, newline
//! counting and quote stripping.

use std::borrow::Cow;

use memchr::{memchr, memchr_iter};

/// A borrowed view of one raw field: offset + length into the backing
/// bytes. Quotes and doubled-quote escapes are kept verbatim; `unquote`
/// is applied on demand by consumers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldSpan {
    pub start: usize,
    pub len: usize,
}

impl FieldSpan {
    pub fn new(start: usize, len: usize) -> Self {
        Self { start, len }
    }

    pub fn slice<'a>(&self, bytes: &'a [u8]) -> &'a [u8] {
        &bytes[self.start..self.start + self.len]
    }
}

/// Offset of the newline ending the line that starts at `start`, or
/// `bytes.len()` if the data ends first.
///
/// Fast path: locate the next `\n` directly; if no quote occurs before it
/// the newline is the boundary. Otherwise rescan with quote-state
/// toggling so newlines inside quoted fields do not end the line.
pub fn find_line_end(bytes: &[u8], start: usize) -> usize {
    let nl_pos = memchr(b'\n', &bytes[start..])
        .map(|i| start + i)
        .unwrap_or(bytes.len());

    if memchr(b'"', &bytes[start..nl_pos]).is_none() {
        return nl_pos;
    }

    let mut in_quotes = false;
    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if b == b'"' {
            in_quotes = !in_quotes;
        } else if b == b'\n' && !in_quotes {
            return i;
        }
    }
    bytes.len()
}

/// Split `bytes[start..end]` (one logical line, CR already trimmed) into
/// raw field spans.
///
/// A field opening with a quote runs to the first quote not followed by
/// another quote; doubled quotes are consumed as escapes and the span
/// keeps the outer quotes. Any other field runs to the next delimiter.
/// A line ending in the delimiter yields one extra empty field.
pub fn split_fields(bytes: &[u8], start: usize, end: usize, delim: u8) -> Vec<FieldSpan> {
    let mut fields = Vec::new();
    if start == end {
        return fields;
    }

    let mut i = start;
    while i < end {
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
                i += 1; // closing quote
            }
            fields.push(FieldSpan::new(fs, i - fs));
            if i < end && bytes[i] == delim {
                i += 1;
            }
        } else {
            let fs = i;
            while i < end && bytes[i] != delim {
                i += 1;
            }
            fields.push(FieldSpan::new(fs, i - fs));
            if i < end {
                i += 1;
            }
        }
    }
    if end > start && bytes[end - 1] == delim {
        fields.push(FieldSpan::new(end, 0));
    }

    fields
}

/// Count newline bytes. `memchr` vectorizes the inner loop; the result is
/// identical to a plain byte-by-byte count.
pub fn count_newlines(bytes: &[u8]) -> usize {
    memchr_iter(b'\n', bytes).count()
}

/// Strip one layer of bookending quotes and collapse doubled quotes.
/// A value not bookended by quotes (including a lone `"`) passes through
/// unchanged. Borrows whenever no rewrite is needed.
pub fn unquote(raw: &[u8]) -> Cow<'_, str> {
    if raw.len() >= 2 && raw[0] == b'"' && raw[raw.len() - 1] == b'"' {
        let inner = &raw[1..raw.len() - 1];
        if memchr(b'"', inner).is_none() {
            return String::from_utf8_lossy(inner);
        }
        let mut out = Vec::with_capacity(inner.len());
        let mut i = 0;
        while i < inner.len() {
            if inner[i] == b'"' && i + 1 < inner.len() && inner[i + 1] == b'"' {
                out.push(b'"');
                i += 2;
            } else {
                out.push(inner[i]);
                i += 1;
            }
        }
        return Cow::Owned(String::from_utf8_lossy(&out).into_owned());
    }
    String::from_utf8_lossy(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unq(s: &str) -> String {
        unquote(s.as_bytes()).into_owned()
    }

    #[test]
    fn unquote_plain_field_passes_through() {
        assert_eq!(unq("hello"), "hello");
        assert_eq!(unq("some data"), "some data");
        assert_eq!(unq(""), "");
    }

    #[test]
    fn unquote_strips_surrounding_quotes() {
        assert_eq!(unq("\"hello\""), "hello");
        assert_eq!(unq("\"\""), "");
        assert_eq!(unq("\"Smith, John\""), "Smith, John");
    }

    #[test]
    fn unquote_collapses_doubled_quotes() {
        assert_eq!(unq("\"He said \"\"hi\"\"\""), "He said \"hi\"");
        assert_eq!(unq("\"a\"\"b\""), "a\"b");
        assert_eq!(unq("\"\"\"\""), "\"");
    }

    #[test]
    fn unquote_lone_quote_not_stripped() {
        assert_eq!(unq("\""), "\"");
    }

    #[test]
    fn line_end_without_quotes() {
        let data = b"a,b,c\nd,e,f\n";
        assert_eq!(find_line_end(data, 0), 5);
        assert_eq!(find_line_end(data, 6), 11);
    }

    #[test]
    fn line_end_skips_quoted_newline() {
        let data = b"a,\"x\ny\",c\nnext\n";
        assert_eq!(find_line_end(data, 0), 9);
    }

    #[test]
    fn line_end_at_end_of_data() {
        let data = b"no newline";
        assert_eq!(find_line_end(data, 0), data.len());
    }

    #[test]
    fn split_plain_fields() {
        let data = b"a,b,c";
        let fields = split_fields(data, 0, data.len(), b',');
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].slice(data), b"a");
        assert_eq!(fields[2].slice(data), b"c");
    }

    #[test]
    fn split_keeps_raw_quotes() {
        let data = b"\"x,y\",z";
        let fields = split_fields(data, 0, data.len(), b',');
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].slice(data), b"\"x,y\"");
        assert_eq!(fields[1].slice(data), b"z");
    }

    #[test]
    fn split_trailing_delimiter_adds_empty_field() {
        let data = b"a,b,";
        let fields = split_fields(data, 0, data.len(), b',');
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[2].len, 0);
    }

    #[test]
    fn split_doubled_quotes_stay_in_one_field() {
        let data = b"\"a\"\"b\",c";
        let fields = split_fields(data, 0, data.len(), b',');
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].slice(data), b"\"a\"\"b\"");
    }

    #[test]
    fn count_newlines_matches_scalar() {
        let data = b"a\nb\nc\nno trailing";
        assert_eq!(count_newlines(data), 3);
        assert_eq!(
            count_newlines(data),
            data.iter().filter(|&&b| b == b'\n').count()
        );
    }
}
