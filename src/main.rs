//! fpds-savings: contract-feed ETL and savings reporting
//!
//! This tool ingests FPDS contract records, maintains a persisted columnar
//! table of everything seen so far, and reports how much money contracts
//! terminated for convenience left on the table.

use anyhow::Result;

fn main() -> Result<()> {
    fpds_savings::cli::run()
}
