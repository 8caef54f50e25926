use tracing::debug;

use crate::data::scan;

/// Separator candidates, checked in this order.
pub const CANDIDATES: [u8; 4] = [b',', b'\t', b'|', b';'];

/// How many leading lines the detector samples by default.
pub const DEFAULT_SAMPLE_LINES: usize = 10;

/// Detect the field separator by sampling the first
/// [`DEFAULT_SAMPLE_LINES`] lines.
pub fn detect_delimiter(bytes: &[u8]) -> u8 {
    detect_delimiter_sampled(bytes, DEFAULT_SAMPLE_LINES)
}

/// Detect the field separator from up to `sample_lines` leading lines.
///
/// Lines are split with the quote-aware boundary rule, so newlines inside
/// quoted fields do not end a sample line; blank lines are discarded and
/// a trailing CR is trimmed. For each candidate the per-line field count
/// uses the same quote toggling as field parsing. A candidate whose mean
/// field count is below 2 is disqualified; the rest score
/// `mean / (1 + stddev)`, rewarding consistent multi-field splits.
/// No qualifying candidate, or empty input, yields comma.
pub fn detect_delimiter_sampled(bytes: &[u8], sample_lines: usize) -> u8 {
    if bytes.is_empty() {
        return b',';
    }

    let mut lines: Vec<(usize, usize)> = Vec::with_capacity(sample_lines);
    let mut pos = 0;
    while pos < bytes.len() && lines.len() < sample_lines {
        let line_end = scan::find_line_end(bytes, pos);
        let mut end = line_end;
        if end > pos && bytes[end - 1] == b'\r' {
            end -= 1;
        }
        if end > pos {
            lines.push((pos, end));
        }
        pos = if line_end < bytes.len() {
            line_end + 1
        } else {
            bytes.len()
        };
    }

    if lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = -1.0f64;

    for candidate in CANDIDATES {
        let counts: Vec<f64> = lines
            .iter()
            .map(|&(start, end)| count_fields(&bytes[start..end], candidate) as f64)
            .collect();

        let mean = counts.iter().sum::<f64>() / counts.len() as f64;
        if mean < 2.0 {
            continue;
        }

        let var = counts.iter().map(|c| (c - mean) * (c - mean)).sum::<f64>()
            / counts.len() as f64;
        let stddev = var.sqrt();

        let score = mean / (1.0 + stddev);
        if score > best_score {
            best_score = score;
            best = candidate;
        }
    }

    debug!("detected delimiter {:?}", best as char);
    best
}

/// Field count of one line for a candidate delimiter; delimiter bytes
/// inside open quotes do not count.
fn count_fields(line: &[u8], delim: u8) -> usize {
    let mut count = 1;
    let mut in_quotes = false;
    for &b in line {
        if b == b'"' {
            in_quotes = !in_quotes;
        } else if b == delim && !in_quotes {
            count += 1;
        }
    }
    count
}
