//! fpds-savings: ETL and savings reporting for FPDS contract records.
//!
//! The pipeline ingests semi-structured contract records from JSON feed
//! exports (or a live-feed collaborator), flattens them into a table with
//! hierarchical column paths, merges with the previously persisted
//! zstd-compressed Parquet table, and computes savings metrics over
//! contracts terminated for convenience.

pub mod cli;
pub mod config;
pub mod error;
pub mod ingest;
pub mod metrics;
pub mod pipeline;
pub mod report;
pub mod table;

pub use config::Config;
pub use error::{Error, Result};
pub use pipeline::{run_pipeline, PipelineOutcome};
pub use table::{ColumnPath, Table};
