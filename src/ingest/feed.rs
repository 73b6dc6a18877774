//! Live-feed collaborator seam.
//!
//! The network client itself is outside this crate; anything returning
//! records in the same shape as the file-based path can plug in here.

use chrono::{Local, NaiveDate};
use serde_json::Value;

use crate::error::Result;

/// Inclusive modification-date range for a feed request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn single_day(day: NaiveDate) -> Self {
        DateRange { start: day, end: day }
    }

    /// Today's records only, in local time.
    pub fn today() -> Self {
        DateRange::single_day(Local::now().date_naive())
    }

    /// Render the range in the feed's query syntax, e.g.
    /// `[2026/08/26, 2026/08/26]` with the default `%Y/%m/%d` format.
    pub fn to_query(&self, date_format: &str) -> String {
        format!(
            "[{}, {}]",
            self.start.format(date_format),
            self.end.format(date_format)
        )
    }
}

/// A source of raw records fetched by modification-date range.
///
/// Implementations block until the fetch completes; the pipeline proper is
/// synchronous and starts only once all records are in hand.
pub trait LiveFeed {
    fn fetch(&self, range: &DateRange) -> Result<Vec<Value>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_feed_query_syntax() {
        let day = NaiveDate::from_ymd_opt(2026, 8, 26).unwrap();
        let range = DateRange::single_day(day);
        assert_eq!(range.to_query("%Y/%m/%d"), "[2026/08/26, 2026/08/26]");
    }
}
