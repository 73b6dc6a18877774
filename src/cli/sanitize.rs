//! Sanitize command implementation
//!
//! One-off cleanup for Parquet files written straight from the feed with
//! raw column names (`@`, spaces, dashes and the rest).

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use crate::table::storage::sanitize_parquet_columns;

#[derive(Args)]
pub struct SanitizeArgs {
    /// Parquet file with raw feed column names
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Where to write the sanitized copy
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,
}

pub fn run(args: SanitizeArgs) -> Result<()> {
    sanitize_parquet_columns(&args.input, &args.output)
        .with_context(|| format!("sanitizing {}", args.input.display()))?;
    println!("Sanitized table written to {}", args.output.display());
    Ok(())
}
