use std::io::Write;

use tempfile::NamedTempFile;

use csvpeek::data::delimiter::{detect_delimiter, detect_delimiter_sampled};
use csvpeek::data::table::CsvTable;

fn write_csv(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn detects_each_candidate() {
    assert_eq!(detect_delimiter(b"a,b,c\n1,2,3\n4,5,6\n"), b',');
    assert_eq!(detect_delimiter(b"a\tb\tc\n1\t2\t3\n4\t5\t6\n"), b'\t');
    assert_eq!(detect_delimiter(b"a|b|c\n1|2|3\n4|5|6\n"), b'|');
    assert_eq!(detect_delimiter(b"a;b;c\n1;2;3\n4;5;6\n"), b';');
}

#[test]
fn empty_input_defaults_to_comma() {
    assert_eq!(detect_delimiter(b""), b',');
}

#[test]
fn single_line_is_sufficient() {
    assert_eq!(detect_delimiter(b"a,b,c\n"), b',');
}

#[test]
fn quoted_commas_do_not_fool_pipe_detection() {
    let file = write_csv("a|b|c\n\"x,y\"|d|e\n1|2|3\n");
    let table = CsvTable::open(file.path()).unwrap();
    assert_eq!(detect_delimiter(table.bytes()), b'|');
}

#[test]
fn quoted_newline_does_not_end_a_sample_line() {
    // The embedded newline sits inside quotes; both physical rows must be
    // sampled as one logical line.
    let data = b"a;b;c\n\"x\ny\";2;3\n4;5;6\n";
    assert_eq!(detect_delimiter(data), b';');
}

#[test]
fn sample_limit_restricts_detection_window() {
    // 3 tab-delimited lines followed by 10 comma-delimited lines:
    // sampling only the first 3 must pick tab.
    let mut content = String::from("a\tb\tc\n1\t2\t3\n4\t5\t6\n");
    for _ in 0..10 {
        content.push_str("x,y,z\n");
    }
    assert_eq!(detect_delimiter_sampled(content.as_bytes(), 3), b'\t');
}

#[test]
fn consistent_split_beats_spiky_split() {
    // Commas split every line evenly; semicolons split only the first.
    let data = b"a,b;c;d;e;f\n1,2\n3,4\n5,6\n7,8\n";
    assert_eq!(detect_delimiter(data), b',');
}

#[test]
fn no_qualifying_candidate_defaults_to_comma() {
    let file = write_csv("single\ncolumn\nvalues\n");
    let table = CsvTable::open(file.path()).unwrap();
    assert_eq!(detect_delimiter(table.bytes()), b',');
}
