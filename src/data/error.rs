use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no data on stdin")]
    EmptyInput,

    #[error("invalid filter: {0}")]
    Parse(String),

    #[error("column '{column}' not found. Available columns: {}", .available.join(", "))]
    UnknownColumn {
        column: String,
        available: Vec<String>,
    },

    #[error("no valid columns selected")]
    NoColumnsSelected,
}

pub type Result<T> = std::result::Result<T, DataError>;
