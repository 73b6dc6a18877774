//! Column selection and aggregate financial metrics.
//!
//! Selection works over the ragged hierarchical column space with
//! positional wildcards. Where several columns satisfy a selection the
//! first in declared column order wins and the collapse is logged, rather
//! than being squeezed away silently.

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::table::{ColumnPath, Table};

/// Modification reason marking a contract terminated for convenience.
pub const TERMINATED_FOR_CONVENIENCE: &str =
    "TERMINATE FOR CONVENIENCE (COMPLETE OR PARTIAL)";

/// Column holding the modification reason in the FPDS feed layout.
const REASON_PATH: [&str; 7] = [
    "entry",
    "content",
    "award",
    "contractData",
    "reasonForModification",
    "attributes",
    "description",
];

/// Aggregates over the cancelled-contract rows.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContractMetrics {
    pub total_value: f64,
    pub obligated: f64,
}

impl ContractMetrics {
    /// Contract value minus what was already obligated.
    pub fn savings(&self) -> f64 {
        self.total_value - self.obligated
    }
}

/// All columns matching `pattern`, in declared column order.
pub fn select_by_path<'a>(table: &'a Table, pattern: &[Option<&str>]) -> Vec<&'a ColumnPath> {
    table.paths().filter(|path| path.matches(pattern)).collect()
}

/// The single column a caller requires for `pattern`.
///
/// Zero matches is an error; several matches collapse deterministically to
/// the first declared column, with a warning.
pub fn select_one<'a>(table: &'a Table, pattern: &[Option<&str>]) -> Result<&'a ColumnPath> {
    let matches = select_by_path(table, pattern);
    let describe = || {
        pattern
            .iter()
            .map(|step| step.unwrap_or("*"))
            .collect::<Vec<_>>()
            .join("/")
    };
    match matches.as_slice() {
        [] => Err(Error::AmbiguousSelection(describe())),
        [only] => Ok(*only),
        [first, ..] => {
            warn!(
                "{} columns match selection {}; collapsing to {first}",
                matches.len(),
                describe()
            );
            Ok(*first)
        }
    }
}

/// Coerce one cell to a number, if it holds one.
///
/// Numbers pass through, numeric strings parse, booleans count as 0/1;
/// everything else (including null) is excluded rather than treated as
/// zero or an error.
pub fn coerce_numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(f64::from(*b)),
        _ => None,
    }
}

/// Sum the coercible values of a column; an empty selection sums to 0.0.
pub fn sum_numeric<'a>(values: impl IntoIterator<Item = &'a Value>) -> f64 {
    values.into_iter().filter_map(coerce_numeric).sum()
}

/// Rows whose modification reason is a termination for convenience.
///
/// Missing values never match. The result is re-indexed densely from 0.
pub fn filter_cancelled_for_convenience(table: &Table) -> Result<Table> {
    let reason_col = {
        let matches: Vec<_> =
            table.paths().filter(|path| path.starts_with(&REASON_PATH)).collect();
        match matches.as_slice() {
            [] => return Err(Error::AmbiguousSelection(REASON_PATH.join("/"))),
            [only] => (*only).clone(),
            [first, ..] => {
                warn!(
                    "{} columns share the modification-reason prefix; using {first}",
                    matches.len()
                );
                (*first).clone()
            }
        }
    };

    let values = table.column(&reason_col).expect("selected path exists");
    let keep: Vec<bool> = values
        .iter()
        .map(|value| matches!(value, Value::String(s) if s == TERMINATED_FOR_CONVENIENCE))
        .collect();
    let filtered = table.filter_rows(&keep);
    debug!(
        "{} of {} rows are terminations for convenience",
        filtered.num_rows(),
        table.num_rows()
    );
    Ok(filtered)
}

/// Total contract value and obligated amount over `table`.
///
/// Both figures come from award-level columns selected by position:
/// segment 3 must be `award` and segment 5 the amount field, with the
/// in-between segments wildcarded to tolerate feed layout drift.
pub fn contract_metrics(table: &Table) -> Result<ContractMetrics> {
    let obligated_col = select_one(
        table,
        &[None, None, Some("award"), None, Some("totalObligatedAmount")],
    )?;
    let value_col = select_one(
        table,
        &[None, None, Some("award"), None, Some("totalBaseAndExercisedOptionsValue")],
    )?;

    let obligated = sum_numeric(table.column(obligated_col).expect("selected path exists"));
    let total_value = sum_numeric(table.column(value_col).expect("selected path exists"));
    Ok(ContractMetrics { total_value, obligated })
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use serde_json::json;

    fn reason_path() -> ColumnPath {
        ColumnPath::new(REASON_PATH)
    }

    fn contracts_table() -> Table {
        let mut columns = IndexMap::new();
        columns.insert(
            reason_path(),
            vec![json!(TERMINATED_FOR_CONVENIENCE), json!("OTHER"), Value::Null],
        );
        columns.insert(
            ColumnPath::new(["entry", "content", "award", "x", "totalObligatedAmount"]),
            vec![json!("100.5"), json!("7"), json!("3")],
        );
        columns.insert(
            ColumnPath::new([
                "entry",
                "content",
                "award",
                "x",
                "totalBaseAndExercisedOptionsValue",
            ]),
            vec![json!("400"), json!("1"), Value::Null],
        );
        Table::from_columns(columns)
    }

    #[test]
    fn sums_exclude_non_numeric_and_missing() {
        let values = vec![json!(10), json!("bad"), Value::Null, json!(5)];
        assert_eq!(sum_numeric(&values), 15.0);

        let hopeless = vec![json!("x"), Value::Null, json!({"nested": 1})];
        assert_eq!(sum_numeric(&hopeless), 0.0);
    }

    #[test]
    fn numeric_strings_coerce() {
        assert_eq!(coerce_numeric(&json!(" 12.5 ")), Some(12.5));
        assert_eq!(coerce_numeric(&json!(true)), Some(1.0));
        assert_eq!(coerce_numeric(&json!("12x")), None);
    }

    #[test]
    fn filter_keeps_only_matching_rows_and_reindexes() {
        let filtered = filter_cancelled_for_convenience(&contracts_table()).unwrap();
        assert_eq!(filtered.num_rows(), 1);
        assert_eq!(
            filtered.cell(&reason_path(), 0),
            Some(&json!(TERMINATED_FOR_CONVENIENCE))
        );
    }

    #[test]
    fn filter_without_reason_column_is_an_error() {
        let mut columns = IndexMap::new();
        columns.insert(ColumnPath::new(["a"]), vec![json!(1)]);
        let table = Table::from_columns(columns);
        assert!(matches!(
            filter_cancelled_for_convenience(&table),
            Err(Error::AmbiguousSelection(_))
        ));
    }

    #[test]
    fn metrics_over_filtered_rows() {
        let filtered = filter_cancelled_for_convenience(&contracts_table()).unwrap();
        let metrics = contract_metrics(&filtered).unwrap();
        assert_eq!(metrics.obligated, 100.5);
        assert_eq!(metrics.total_value, 400.0);
        assert_eq!(metrics.savings(), 299.5);
    }

    #[test]
    fn selection_requires_a_match() {
        let table = contracts_table();
        let missing = select_one(&table, &[Some("nope")]);
        assert!(matches!(missing, Err(Error::AmbiguousSelection(_))));
    }

    #[test]
    fn multiple_matches_collapse_to_first_declared() {
        let mut columns = IndexMap::new();
        columns.insert(
            ColumnPath::new(["a", "b", "award", "c", "totalObligatedAmount"]),
            vec![json!(1)],
        );
        columns.insert(
            ColumnPath::new(["z", "b", "award", "c", "totalObligatedAmount"]),
            vec![json!(2)],
        );
        let table = Table::from_columns(columns);
        let chosen = select_one(
            &table,
            &[None, None, Some("award"), None, Some("totalObligatedAmount")],
        )
        .unwrap();
        assert_eq!(chosen.segments()[0], "a");
    }
}
