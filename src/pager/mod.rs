//! Interactive pager: raw-mode terminal, alternate screen, vim-style
//! scrolling and `/` search. Reads keys from the controlling terminal so
//! piped stdin still pages. All table access is read-only through the
//! row/column index lists.

use std::io::{self, Stdout, Write};

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute, queue,
    style::{Print, Stylize},
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};

use crate::data::table::CsvTable;
use crate::data::type_inference::ColumnSchema;
use crate::output::{format_count, format_size};

/// Hard cap on a single column's width before terminal fitting.
const MAX_COL_WIDTH: usize = 60;

/// Rows sampled when sizing columns.
const WIDTH_SAMPLE_ROWS: usize = 1000;

/// Fixed chrome: top border, header, type row, separator, bottom border,
/// status bar.
const CHROME_ROWS: usize = 6;

/// Owned terminal session: raw mode + alternate screen + hidden cursor,
/// restored in `Drop` on every exit path including panics.
struct TerminalSession;

impl TerminalSession {
    fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        // Constructed before the screen switch so a partial setup is
        // still torn down by Drop.
        let session = Self;
        execute!(io::stdout(), EnterAlternateScreen, Hide)?;
        Ok(session)
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), LeaveAlternateScreen, Show);
        let _ = terminal::disable_raw_mode();
    }
}

struct PagerState {
    scroll_row: usize,
    scroll_col: usize,
    term_rows: usize,
    term_cols: usize,
    data_rows: usize,
    searching: bool,
    query: String,
    hits: Vec<usize>,
    current_hit: Option<usize>,
    status: String,
}

impl PagerState {
    fn viewport_rows(&self) -> usize {
        self.term_rows.saturating_sub(CHROME_ROWS).max(1)
    }
}

/// Display width of a cell string (characters, after control stripping).
fn display_width(s: &str) -> usize {
    s.chars().count()
}

fn truncate_cell(s: &str, max_w: usize) -> String {
    if display_width(s) <= max_w {
        return s.to_string();
    }
    if max_w <= 3 {
        return ".".repeat(max_w);
    }
    let head: String = s.chars().take(max_w - 3).collect();
    format!("{head}...")
}

/// Squeeze per-column widths into the terminal, keeping a floor of 5.
fn fit_widths(base: &[usize], term_cols: usize) -> Vec<usize> {
    let mut widths = base.to_vec();
    let padding = widths.len() * 3 + 1;
    if padding < term_cols {
        let available = term_cols - padding;
        let content: usize = widths.iter().sum();
        if content > available {
            let max_per_col = 5.max(available / widths.len().max(1));
            for w in &mut widths {
                *w = (*w).min(max_per_col);
            }
        }
    }
    widths
}

/// Number of columns that fit starting at `start_col`.
fn visible_cols(widths: &[usize], start_col: usize, term_cols: usize) -> usize {
    let mut used = 1; // left border
    let mut count = 0;
    for &w in &widths[start_col..] {
        let needed = w + 3;
        if used + needed > term_cols && count > 0 {
            break;
        }
        used += needed;
        count += 1;
    }
    count.max(1)
}

/// Run the pager over the (possibly filtered/sorted/selected) view.
pub fn run_pager(
    table: &CsvTable,
    schema: &[ColumnSchema],
    rows: Option<&[usize]>,
    cols: Option<&[usize]>,
    match_count: usize,
) -> io::Result<()> {
    let display_cols: Vec<usize> = match cols {
        Some(c) => c.to_vec(),
        None => (0..table.column_count()).collect(),
    };

    let mut st = PagerState {
        scroll_row: 0,
        scroll_col: 0,
        term_rows: 24,
        term_cols: 80,
        data_rows: rows.map(|r| r.len()).unwrap_or(table.row_count()),
        searching: false,
        query: String::new(),
        hits: Vec::new(),
        current_hit: None,
        status: String::new(),
    };

    // Column widths from header, type name and a bounded row sample.
    let mut base_widths: Vec<usize> = display_cols
        .iter()
        .map(|&c| {
            let header = display_width(&table.unquoted(table.headers()[c]));
            let type_name = schema.get(c).map(|s| s.column_type.name().len()).unwrap_or(4);
            header.max(type_name)
        })
        .collect();
    let sample = st.data_rows.min(WIDTH_SAMPLE_ROWS);
    for r in 0..sample {
        let row = table.row(rows.map(|ri| ri[r]).unwrap_or(r));
        for (pos, &c) in display_cols.iter().enumerate() {
            base_widths[pos] = base_widths[pos].max(display_width(&table.unquoted(row[c])));
        }
    }
    for w in &mut base_widths {
        *w = (*w).min(MAX_COL_WIDTH);
    }

    let _session = TerminalSession::enter()?;
    let mut out = io::stdout();
    let mut widths = base_widths.clone();
    let mut needs_layout = true;

    loop {
        if needs_layout {
            let (w, h) = terminal::size()?;
            st.term_cols = w as usize;
            st.term_rows = h as usize;
            widths = fit_widths(&base_widths, st.term_cols);
            needs_layout = false;
        }

        let vp = st.viewport_rows();
        if st.data_rows <= vp {
            st.scroll_row = 0;
        } else {
            st.scroll_row = st.scroll_row.min(st.data_rows - vp);
        }
        if !display_cols.is_empty() {
            st.scroll_col = st.scroll_col.min(display_cols.len() - 1);
        }

        draw(
            &mut out,
            &st,
            table,
            schema,
            rows,
            &display_cols,
            &widths,
            match_count,
        )?;

        match event::read()? {
            Event::Resize(..) => needs_layout = true,
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                if st.searching {
                    match key.code {
                        KeyCode::Esc => {
                            st.searching = false;
                            st.query.clear();
                            st.status.clear();
                            execute!(out, Hide)?;
                        }
                        KeyCode::Enter => {
                            st.searching = false;
                            run_search(&mut st, table, rows, &display_cols);
                            execute!(out, Hide)?;
                        }
                        KeyCode::Backspace => {
                            st.query.pop();
                        }
                        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            st.searching = false;
                            st.query.clear();
                            st.status.clear();
                            execute!(out, Hide)?;
                        }
                        KeyCode::Char(c) => st.query.push(c),
                        _ => {}
                    }
                    continue;
                }

                st.status.clear();
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break,

                    KeyCode::Char('k') | KeyCode::Up => {
                        st.scroll_row = st.scroll_row.saturating_sub(1);
                    }
                    KeyCode::Char('j') | KeyCode::Down | KeyCode::Enter => {
                        if st.scroll_row + vp < st.data_rows {
                            st.scroll_row += 1;
                        }
                    }
                    KeyCode::Char(' ') | KeyCode::PageDown => {
                        st.scroll_row =
                            (st.scroll_row + vp).min(st.data_rows.saturating_sub(vp));
                    }
                    KeyCode::Char('b') | KeyCode::PageUp => {
                        st.scroll_row = st.scroll_row.saturating_sub(vp);
                    }
                    KeyCode::Char('g') | KeyCode::Home => st.scroll_row = 0,
                    KeyCode::Char('G') | KeyCode::End => {
                        st.scroll_row = st.data_rows.saturating_sub(vp);
                    }
                    KeyCode::Char('h') | KeyCode::Left => {
                        st.scroll_col = st.scroll_col.saturating_sub(1);
                    }
                    KeyCode::Char('l') | KeyCode::Right => {
                        if st.scroll_col + 1 < display_cols.len() {
                            st.scroll_col += 1;
                        }
                    }
                    KeyCode::Char('/') => {
                        st.searching = true;
                        st.query.clear();
                        execute!(out, Show)?;
                    }
                    KeyCode::Char('n') => cycle_hit(&mut st, 1),
                    KeyCode::Char('N') => cycle_hit(&mut st, -1),
                    _ => {}
                }
            }
            _ => {}
        }
    }

    Ok(())
}

fn cycle_hit(st: &mut PagerState, dir: isize) {
    if st.hits.is_empty() {
        return;
    }
    let len = st.hits.len();
    let cur = st.current_hit.unwrap_or(0);
    let next = if dir > 0 {
        (cur + 1) % len
    } else if cur == 0 {
        len - 1
    } else {
        cur - 1
    };
    st.current_hit = Some(next);
    st.scroll_row = st.hits[next];
    st.status = format!("Match {} of {}", next + 1, len);
}

/// Case-insensitive substring search over the visible columns; hits are
/// display-row indices.
fn run_search(
    st: &mut PagerState,
    table: &CsvTable,
    rows: Option<&[usize]>,
    display_cols: &[usize],
) {
    st.hits.clear();
    st.current_hit = None;
    if st.query.is_empty() {
        return;
    }

    let needle = st.query.to_lowercase();
    for d in 0..st.data_rows {
        let row = table.row(rows.map(|r| r[d]).unwrap_or(d));
        let hit = display_cols
            .iter()
            .any(|&c| table.unquoted(row[c]).to_lowercase().contains(&needle));
        if hit {
            st.hits.push(d);
        }
    }

    if st.hits.is_empty() {
        st.status = format!("No matches for '{}'", st.query);
        return;
    }

    // First hit at or below the current scroll position.
    let start = st
        .hits
        .iter()
        .position(|&h| h >= st.scroll_row)
        .unwrap_or(0);
    st.current_hit = Some(start);
    st.scroll_row = st.hits[start];
    st.status = format!("Match {} of {}", start + 1, st.hits.len());
}

fn horizontal_line(widths: &[usize], start: usize, end: usize, left: &str, mid: &str, right: &str) -> String {
    let mut line = String::from(left);
    for c in start..end {
        for _ in 0..widths[c] + 2 {
            line.push('─');
        }
        if c + 1 < end {
            line.push_str(mid);
        }
    }
    line.push_str(right);
    line
}

#[allow(clippy::too_many_arguments)]
fn draw(
    out: &mut Stdout,
    st: &PagerState,
    table: &CsvTable,
    schema: &[ColumnSchema],
    rows: Option<&[usize]>,
    display_cols: &[usize],
    widths: &[usize],
    match_count: usize,
) -> io::Result<()> {
    let vis = visible_cols(widths, st.scroll_col, st.term_cols);
    let end_col = (st.scroll_col + vis).min(display_cols.len());
    let vp = st.viewport_rows();
    let vis_end = (st.scroll_row + vp).min(st.data_rows);

    let mut lines: Vec<String> = Vec::with_capacity(st.term_rows);

    lines.push(horizontal_line(widths, st.scroll_col, end_col, "┌", "┬", "┐"));

    // Header row, bold.
    let mut header_line = String::from("│");
    for c in st.scroll_col..end_col {
        let name = table.unquoted(table.headers()[display_cols[c]]);
        let cell = truncate_cell(&name, widths[c]);
        let pad = widths[c] - display_width(&cell);
        header_line.push(' ');
        header_line.push_str(&format!("{}", cell.bold()));
        header_line.push_str(&" ".repeat(pad));
        header_line.push_str(" │");
    }
    lines.push(header_line);

    // Type row.
    let mut type_line = String::from("│");
    for c in st.scroll_col..end_col {
        let ac = display_cols[c];
        let name = schema.get(ac).map(|s| s.column_type.name()).unwrap_or("text");
        let cell = truncate_cell(name, widths[c]);
        let pad = widths[c] - display_width(&cell);
        type_line.push(' ');
        type_line.push_str(&cell);
        type_line.push_str(&" ".repeat(pad));
        type_line.push_str(" │");
    }
    lines.push(type_line);

    lines.push(horizontal_line(widths, st.scroll_col, end_col, "├", "┼", "┤"));

    // Data rows.
    for d in st.scroll_row..vis_end {
        let row = table.row(rows.map(|r| r[d]).unwrap_or(d));
        let is_hit = st
            .current_hit
            .map(|h| st.hits.get(h) == Some(&d))
            .unwrap_or(false);

        let mut line = String::from("│");
        for c in st.scroll_col..end_col {
            let val = table.unquoted(row[display_cols[c]]);
            let flat: String = val
                .chars()
                .map(|ch| if ch == '\n' || ch == '\r' { ' ' } else { ch })
                .collect();
            let cell = truncate_cell(&flat, widths[c]);
            let pad = widths[c] - display_width(&cell);
            line.push(' ');
            if is_hit {
                line.push_str(&format!("{}", cell.as_str().yellow()));
            } else {
                line.push_str(&cell);
            }
            line.push_str(&" ".repeat(pad));
            line.push_str(" │");
        }
        lines.push(line);
    }

    // Fill the rest of the viewport.
    for _ in vis_end.saturating_sub(st.scroll_row)..vp {
        let mut line = String::from("│");
        for c in st.scroll_col..end_col {
            line.push_str(&" ".repeat(widths[c] + 2));
            line.push('│');
        }
        lines.push(line);
    }

    lines.push(horizontal_line(widths, st.scroll_col, end_col, "└", "┴", "┘"));

    // Status bar, reverse video.
    let left = if st.searching {
        format!("/{}▋", st.query)
    } else if !st.status.is_empty() {
        st.status.clone()
    } else {
        format!(
            "rows {}-{} of {}",
            st.scroll_row + 1,
            vis_end,
            format_count(match_count)
        )
    };
    let right = format!(
        "{} cols | {} | ↑↓ scroll  ←→ cols  / search  q quit",
        display_cols.len(),
        format_size(table.size())
    );
    let left_len = display_width(&left) + 2;
    let right_len = display_width(&right) + 1;
    let mut status = format!(" {left}");
    if left_len + right_len < st.term_cols {
        status.push_str(&" ".repeat(st.term_cols - left_len - right_len));
        status.push_str(&right);
    }
    status.push(' ');
    lines.push(format!("{}", status.negative()));

    for (i, line) in lines.iter().enumerate() {
        queue!(
            out,
            MoveTo(0, i as u16),
            Clear(ClearType::CurrentLine),
            Print(line)
        )?;
    }
    out.flush()
}
