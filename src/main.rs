use std::io::{self, Write};

use anyhow::{bail, Context, Result};
use clap::Parser;
use crossterm::tty::IsTty;

use csvpeek::cli::{Args, FilterLogic, OutputFormat};
use csvpeek::config::Config;
use csvpeek::data::{delimiter, query, table::CsvTable, type_inference};
use csvpeek::{logging, output, pager};

/// Head parses always tokenize at least this many rows so the schema
/// sample has material to work with.
const MIN_HEAD_PARSE_ROWS: usize = 100;

fn main() {
    logging::init();
    let args = Args::parse();
    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!("ignoring unreadable config: {e}");
        Config::default()
    });
    if let Err(e) = run(args, config) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(args: Args, config: Config) -> Result<()> {
    let path = match args.path.clone() {
        Some(p) => p,
        None if !io::stdin().is_tty() => "-".to_string(),
        None => bail!("no input file (pass a path, or pipe data and use '-')"),
    };

    let default_rows = config.display.default_rows;
    let ignore_case = args.ignore_case || config.behavior.ignore_case;
    let no_pager = args.no_pager || config.behavior.no_pager;

    let mut table =
        CsvTable::open(&path).with_context(|| format!("failed to open '{path}'"))?;
    let delim = delimiter::detect_delimiter_sampled(
        table.bytes(),
        config.behavior.delimiter_sample_lines,
    );

    let interactive = io::stdout().is_tty()
        && !args.schema
        && !args.count
        && args.format == OutputFormat::Table
        && !no_pager;

    // Filters, sorting, tail and the pager all need every row; a plain
    // head/preview only needs a bounded prefix plus the row estimate.
    let needs_full = interactive
        || !args.where_exprs.is_empty()
        || args.sort.is_some()
        || args.sort_desc.is_some()
        || args.tail.is_some();

    if needs_full {
        table.parse(delim);
    } else {
        let limit = args.head.unwrap_or(default_rows);
        table.parse_head(delim, limit.max(MIN_HEAD_PARSE_ROWS));
    }

    if table.column_count() == 0 {
        bail!("no columns found in input");
    }

    let schema = type_inference::infer_schema(&table, type_inference::DEFAULT_SAMPLE_SIZE);

    let col_indices = match &args.select {
        Some(sel) => Some(query::resolve_columns(sel, &table)?),
        None => None,
    };

    let mut row_indices: Option<Vec<usize>> = None;
    let mut match_count = table.total_rows();

    if !args.where_exprs.is_empty() {
        let filters = args
            .where_exprs
            .iter()
            .map(|e| query::parse_filter(e))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let matched = query::apply_filters(
            &filters,
            &table,
            &schema,
            ignore_case,
            args.logic == FilterLogic::Or,
        )?;
        match_count = matched.len();
        row_indices = Some(matched);
    }

    if let Some(col) = args.sort.as_deref().or(args.sort_desc.as_deref()) {
        let descending = args.sort_desc.is_some();
        let indices = row_indices.get_or_insert_with(|| (0..table.row_count()).collect());
        query::sort_indices(indices, &table, &schema, col, descending)?;
    }

    if let Some(n) = args.tail {
        let indices = row_indices.get_or_insert_with(|| (0..table.row_count()).collect());
        if indices.len() > n {
            indices.drain(..indices.len() - n);
        }
        match_count = indices.len();
    }

    let display_total = row_indices
        .as_ref()
        .map(|r| r.len())
        .unwrap_or(table.row_count());
    let max_rows = if let Some(n) = args.head {
        n
    } else if args.tail.is_some() || interactive {
        display_total
    } else {
        default_rows
    };

    let rows = row_indices.as_deref();
    let cols = col_indices.as_deref();
    let mut stdout = io::stdout();

    if args.count {
        writeln!(stdout, "{match_count}")?;
        return Ok(());
    }
    if args.schema {
        output::json::render_schema(&mut stdout, &schema, cols, match_count, table.size())?;
        return Ok(());
    }

    match args.format {
        OutputFormat::Csv => {
            output::delimited::render_delimited(&mut stdout, &table, rows, cols, max_rows, b',')?
        }
        OutputFormat::Tsv => {
            output::delimited::render_delimited(&mut stdout, &table, rows, cols, max_rows, b'\t')?
        }
        OutputFormat::Json => {
            output::json::render_json(&mut stdout, &table, &schema, rows, cols, max_rows)?
        }
        OutputFormat::Table => {
            let rows_to_show = display_total.min(max_rows);
            let (_, term_rows) = crossterm::terminal::size().unwrap_or((80, 24));
            let should_page =
                interactive && rows_to_show > (term_rows as usize).saturating_sub(6);

            if should_page {
                // Head-limited paging works off a truncated index list.
                let truncated: Option<Vec<usize>> =
                    if args.head.is_some() && display_total > max_rows {
                        Some(match rows {
                            Some(r) => r[..max_rows].to_vec(),
                            None => (0..max_rows).collect(),
                        })
                    } else {
                        None
                    };
                let page_rows = truncated.as_deref().or(rows);

                if pager::run_pager(&table, &schema, page_rows, cols, match_count).is_err() {
                    // No controlling terminal; fall back to a static dump.
                    output::table::render_table(
                        &mut stdout,
                        &table,
                        &schema,
                        rows,
                        cols,
                        max_rows,
                        match_count,
                    )?;
                }
            } else {
                output::table::render_table(
                    &mut stdout,
                    &table,
                    &schema,
                    rows,
                    cols,
                    max_rows,
                    match_count,
                )?;
            }
        }
    }

    Ok(())
}
