use std::io::Write;

use tempfile::NamedTempFile;

use csvpeek::data::scan::unquote;
use csvpeek::data::table::CsvTable;

fn write_csv(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// Wrap a value in quotes, doubling embedded quotes (the inverse of
/// `unquote`).
fn quote_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

#[test]
fn parses_basic_csv() {
    let file = write_csv("name,age\nAlice,30\nBob,25\n");
    let mut table = CsvTable::open(file.path()).unwrap();
    table.parse(b',');

    assert_eq!(table.column_count(), 2);
    assert_eq!(table.row_count(), 2);
    assert_eq!(table.total_rows(), 2);
    assert_eq!(table.header_names(), vec!["name", "age"]);

    let row0 = table.row(0);
    assert_eq!(table.unquoted(row0[0]), "Alice");
    assert_eq!(table.unquoted(row0[1]), "30");
    let row1 = table.row(1);
    assert_eq!(table.unquoted(row1[0]), "Bob");
    assert_eq!(table.unquoted(row1[1]), "25");
}

#[test]
fn head_parse_reports_true_total() {
    let mut content = String::from("id,value\n");
    for i in 0..10 {
        content.push_str(&format!("{i},{}\n", i * 10));
    }
    let file = write_csv(&content);

    let mut table = CsvTable::open(file.path()).unwrap();
    table.parse_head(b',', 3);
    assert_eq!(table.row_count(), 3);
    assert_eq!(table.total_rows(), 10);
}

#[test]
fn head_parse_beyond_end_parses_everything() {
    let file = write_csv("a,b\n1,2\n3,4\n");
    let mut table = CsvTable::open(file.path()).unwrap();
    table.parse_head(b',', 50);
    assert_eq!(table.row_count(), 2);
    assert_eq!(table.total_rows(), 2);
}

#[test]
fn head_parse_counts_unterminated_final_row() {
    let file = write_csv("a,b\n1,2\n3,4\n5,6"); // no trailing newline
    let mut table = CsvTable::open(file.path()).unwrap();
    table.parse_head(b',', 1);
    assert_eq!(table.row_count(), 1);
    assert_eq!(table.total_rows(), 3);
}

#[test]
fn head_parse_estimates_through_quoted_newlines() {
    // Quoted newlines after the parse cutoff must not inflate the total.
    let file = write_csv("name,note\na,plain\nb,\"line one\nline two\"\nc,last\n");
    let mut table = CsvTable::open(file.path()).unwrap();
    table.parse_head(b',', 1);
    assert_eq!(table.row_count(), 1);
    assert_eq!(table.total_rows(), 3);

    table.parse(b',');
    assert_eq!(table.row_count(), 3);
}

#[test]
fn short_rows_are_padded() {
    let file = write_csv("a,b,c\n1,2,3\nonly_one\n4,5\n");
    let mut table = CsvTable::open(file.path()).unwrap();
    table.parse(b',');

    assert_eq!(table.row_count(), 3);
    let row1 = table.row(1);
    assert_eq!(table.unquoted(row1[0]), "only_one");
    assert_eq!(table.unquoted(row1[1]), "");
    assert_eq!(table.unquoted(row1[2]), "");
    let row2 = table.row(2);
    assert_eq!(table.unquoted(row2[2]), "");
}

#[test]
fn long_rows_are_truncated() {
    let file = write_csv("a,b\n1,2,3,4,5\n");
    let mut table = CsvTable::open(file.path()).unwrap();
    table.parse(b',');

    assert_eq!(table.row_count(), 1);
    let row = table.row(0);
    assert_eq!(row.len(), 2);
    assert_eq!(table.unquoted(row[0]), "1");
    assert_eq!(table.unquoted(row[1]), "2");
}

#[test]
fn trailing_delimiter_yields_empty_field() {
    let file = write_csv("a,b,c\n1,2,\n");
    let mut table = CsvTable::open(file.path()).unwrap();
    table.parse(b',');

    let row = table.row(0);
    assert_eq!(table.unquoted(row[1]), "2");
    assert_eq!(table.unquoted(row[2]), "");
}

#[test]
fn blank_lines_are_skipped() {
    let file = write_csv("a,b\n1,2\n\n\n3,4\n");
    let mut table = CsvTable::open(file.path()).unwrap();
    table.parse(b',');

    assert_eq!(table.row_count(), 2);
    assert_eq!(table.unquoted(table.row(1)[0]), "3");
}

#[test]
fn crlf_line_endings_are_trimmed() {
    let file = write_csv("a,b\r\n1,2\r\n3,4\r\n");
    let mut table = CsvTable::open(file.path()).unwrap();
    table.parse(b',');

    assert_eq!(table.column_count(), 2);
    assert_eq!(table.row_count(), 2);
    assert_eq!(table.unquoted(table.row(0)[1]), "2");
    assert_eq!(table.unquoted(table.row(1)[1]), "4");
}

#[test]
fn quoted_field_keeps_embedded_newline() {
    let file = write_csv("name,description\n\"Doe, Jane\",\"first line\nsecond line\"\nplain,ok\n");
    let mut table = CsvTable::open(file.path()).unwrap();
    table.parse(b',');

    assert_eq!(table.row_count(), 2);
    let desc = table.unquoted(table.row(0)[1]);
    assert!(desc.contains('\n'));
    assert_eq!(table.unquoted(table.row(0)[0]), "Doe, Jane");
}

#[test]
fn escaped_quotes_survive_round_trip() {
    let file = write_csv("name,comment\nx,\"He said \"\"hello\"\"\"\n");
    let mut table = CsvTable::open(file.path()).unwrap();
    table.parse(b',');

    assert_eq!(table.unquoted(table.row(0)[1]), "He said \"hello\"");
}

#[test]
fn raw_spans_keep_quotes_verbatim() {
    let file = write_csv("a|b|c\n\"x,y\"|d|e\n1|2|3\n");
    let mut table = CsvTable::open(file.path()).unwrap();
    table.parse(b'|');

    let row = table.row(0);
    assert_eq!(table.raw(row[0]), b"\"x,y\"");
    assert_eq!(table.unquoted(row[0]), "x,y");
}

#[test]
fn empty_file_yields_empty_table() {
    let file = write_csv("");
    let mut table = CsvTable::open(file.path()).unwrap();
    table.parse(b',');

    assert_eq!(table.column_count(), 0);
    assert_eq!(table.row_count(), 0);
    assert_eq!(table.total_rows(), 0);
}

#[test]
fn reparse_clears_previous_state() {
    let file = write_csv("a,b\n1,2\n3,4\n5,6\n");
    let mut table = CsvTable::open(file.path()).unwrap();
    table.parse_head(b',', 2);
    assert_eq!(table.row_count(), 2);
    assert_eq!(table.total_rows(), 3);

    table.parse(b',');
    assert_eq!(table.row_count(), 3);
    assert_eq!(table.total_rows(), 3);
    assert_eq!(table.column_count(), 2);
}

#[test]
fn nonexistent_file_is_an_error() {
    assert!(CsvTable::open("nonexistent_file_xyz.csv").is_err());
}

#[test]
fn unquote_inverts_quote_field() {
    for value in [
        "plain",
        "",
        "with \"quotes\"",
        "comma, separated",
        "line\nbreak",
        "\"",
        "a\"\"b",
    ] {
        let quoted = quote_field(value);
        assert_eq!(unquote(quoted.as_bytes()), value, "value: {value:?}");
    }
}

#[test]
fn header_only_file_has_zero_rows() {
    let file = write_csv("name,age\n");
    let mut table = CsvTable::open(file.path()).unwrap();
    table.parse(b',');

    assert_eq!(table.column_count(), 2);
    assert_eq!(table.row_count(), 0);
    assert_eq!(table.total_rows(), 0);
}
