//! Error taxonomy for the ingestion and table pipeline.
//!
//! Per-file decode failures and registry I/O failures are deliberately not
//! represented here: they are logged and skipped so a single bad input can
//! never abort a run. Only structural preconditions and unrecoverable table
//! operations surface as errors.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The configured data directory does not exist or is not a directory.
    #[error("directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    /// The data directory exists but contains no `*.json` files at all.
    /// Distinct from "no *new* files", which is a normal empty result.
    #[error("no JSON input files found in {0}")]
    NoInputFiles(PathBuf),

    /// A field name normalized to the empty string (it consisted entirely
    /// of stripped characters). Surfaced rather than producing an
    /// unaddressable column.
    #[error("column name {0:?} is empty after sanitizing")]
    EmptyColumnName(String),

    /// A column selection that the caller requires matched nothing.
    #[error("no column matches selection {0}")]
    AmbiguousSelection(String),

    /// Reading or writing the persisted Parquet table failed.
    #[error("table storage error: {0}")]
    Storage(String),

    /// The live-feed collaborator failed or is not wired up.
    #[error("live feed error: {0}")]
    Feed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<parquet::errors::ParquetError> for Error {
    fn from(err: parquet::errors::ParquetError) -> Self {
        Error::Storage(err.to_string())
    }
}

impl From<arrow::error::ArrowError> for Error {
    fn from(err: arrow::error::ArrowError) -> Self {
        Error::Storage(err.to_string())
    }
}
