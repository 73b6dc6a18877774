//! In-memory table with hierarchical column paths.
//!
//! A [`Table`] is a rectangular set of JSON-scalar cells: every column has
//! the same length, rows keep insertion order, and columns are addressed by
//! [`ColumnPath`] rather than flat strings. Missing cells are
//! `serde_json::Value::Null`.

use indexmap::IndexMap;
use serde_json::Value;

pub mod builder;
pub mod column;
pub mod merge;
pub mod storage;

pub use builder::build_table;
pub use column::{normalize_segment, ColumnPath};
pub use merge::merge_tables;
pub use storage::{read_table, write_table};

/// Rectangular row/column data addressed by hierarchical column paths.
///
/// Column order is first-seen order and is preserved through merge and
/// persistence, which is what makes "first matching column" selection
/// deterministic across runs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    columns: IndexMap<ColumnPath, Vec<Value>>,
    rows: usize,
}

impl Table {
    pub fn new() -> Self {
        Table::default()
    }

    /// Build a table from pre-assembled columns.
    ///
    /// All columns must share one length; this is an internal invariant of
    /// every producer in this crate.
    pub fn from_columns(columns: IndexMap<ColumnPath, Vec<Value>>) -> Self {
        let rows = columns.first().map(|(_, v)| v.len()).unwrap_or(0);
        for (path, values) in &columns {
            assert_eq!(values.len(), rows, "ragged column {path}");
        }
        Table { columns, rows }
    }

    pub fn num_rows(&self) -> usize {
        self.rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Column paths in declared order.
    pub fn paths(&self) -> impl Iterator<Item = &ColumnPath> {
        self.columns.keys()
    }

    pub fn column(&self, path: &ColumnPath) -> Option<&[Value]> {
        self.columns.get(path).map(Vec::as_slice)
    }

    pub fn cell(&self, path: &ColumnPath, row: usize) -> Option<&Value> {
        self.columns.get(path).and_then(|values| values.get(row))
    }

    pub(crate) fn columns(&self) -> &IndexMap<ColumnPath, Vec<Value>> {
        &self.columns
    }

    /// Keep the rows where `keep` is true, re-indexed densely from 0.
    ///
    /// `keep` must have one entry per row.
    pub fn filter_rows(&self, keep: &[bool]) -> Table {
        assert_eq!(keep.len(), self.rows, "row mask length mismatch");
        let columns = self
            .columns
            .iter()
            .map(|(path, values)| {
                let filtered = values
                    .iter()
                    .zip(keep)
                    .filter(|(_, keep)| **keep)
                    .map(|(value, _)| value.clone())
                    .collect::<Vec<_>>();
                (path.clone(), filtered)
            })
            .collect();
        Table::from_columns(columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn two_column_table() -> Table {
        let mut columns = IndexMap::new();
        columns.insert(ColumnPath::new(["a"]), vec![json!(1), json!(2), json!(3)]);
        columns.insert(ColumnPath::new(["b", "c"]), vec![json!("x"), Value::Null, json!("z")]);
        Table::from_columns(columns)
    }

    #[test]
    fn dimensions() {
        let table = two_column_table();
        assert_eq!(table.num_rows(), 3);
        assert_eq!(table.num_columns(), 2);
        assert!(!table.is_empty());
        assert!(Table::new().is_empty());
    }

    #[test]
    fn filter_rows_reindexes_densely() {
        let table = two_column_table();
        let filtered = table.filter_rows(&[true, false, true]);
        assert_eq!(filtered.num_rows(), 2);
        let a = filtered.column(&ColumnPath::new(["a"])).unwrap();
        assert_eq!(a, &[json!(1), json!(3)]);
    }

    #[test]
    #[should_panic(expected = "ragged column")]
    fn ragged_columns_are_rejected() {
        let mut columns = IndexMap::new();
        columns.insert(ColumnPath::new(["a"]), vec![json!(1)]);
        columns.insert(ColumnPath::new(["b"]), vec![json!(1), json!(2)]);
        Table::from_columns(columns);
    }
}
