use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// More records were requested than the dataset holds.
    #[error("cannot sample {requested} records out of {available}")]
    InvalidSize { requested: usize, available: usize },

    /// A row does not have the width of the rows before it.
    #[error("malformed record at line {line}: expected {expected} fields, found {found}")]
    MalformedRecord { line: usize, expected: usize, found: usize },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
