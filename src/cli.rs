use clap::{Parser, ValueEnum};

/// Output format for non-interactive runs
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// Boxed table (default; pages when interactive)
    Table,
    /// Comma-separated values
    Csv,
    /// Tab-separated values
    Tsv,
    /// Array of JSON objects, typed per the inferred schema
    Json,
}

/// How multiple --where filters combine
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum FilterLogic {
    /// Every filter must match (default)
    And,
    /// Any filter may match
    Or,
}

/// Command-line arguments for csvpeek
#[derive(Parser, Debug)]
#[command(
    name = "csvpeek",
    version,
    about = "Explore delimited data: detect, filter, sort, page",
    after_help = "Filter operators: ==, !=, >, <, >=, <=, contains, starts_with, ends_with\n\
                  Example: csvpeek data.csv --where \"age > 30\" --where \"name contains Al\"\n\
                  Stdin:   cat data.csv | csvpeek - --format json"
)]
pub struct Args {
    /// Input file, or "-" for standard input (implied when piped)
    pub path: Option<String>,

    /// Show first N rows
    #[arg(short = 'n', long = "head", value_name = "N")]
    pub head: Option<usize>,

    /// Show last N rows
    #[arg(short = 't', long = "tail", value_name = "N", conflicts_with = "head")]
    pub tail: Option<usize>,

    /// Output inferred schema as JSON
    #[arg(short = 's', long = "schema")]
    pub schema: bool,

    /// Filter rows (repeatable)
    #[arg(short = 'w', long = "where", value_name = "EXPR")]
    pub where_exprs: Vec<String>,

    /// Case-insensitive filtering
    #[arg(short = 'i', long = "ignore-case")]
    pub ignore_case: bool,

    /// Filter combination logic
    #[arg(long = "logic", value_enum, default_value_t = FilterLogic::And)]
    pub logic: FilterLogic,

    /// Show only the given columns, in the given order
    #[arg(long = "select", value_name = "COL1,COL2,...")]
    pub select: Option<String>,

    /// Sort by column, ascending
    #[arg(long = "sort", value_name = "COL")]
    pub sort: Option<String>,

    /// Sort by column, descending
    #[arg(long = "sort-desc", value_name = "COL", conflicts_with = "sort")]
    pub sort_desc: Option<String>,

    /// Output only the count of matching rows
    #[arg(long = "count")]
    pub count: bool,

    /// Output format
    #[arg(long = "format", value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Disable the interactive pager
    #[arg(long = "no-pager")]
    pub no_pager: bool,
}
