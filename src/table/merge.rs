//! Combining a freshly built table with the previously persisted one.

use indexmap::IndexMap;
use serde_json::Value;

use crate::table::Table;

/// Append `incoming` rows after `existing` rows.
///
/// With no existing table the incoming table is the result. Otherwise the
/// result keeps the existing table's column order, appends columns only the
/// incoming table has, and fills one-sided columns with nulls. Rows are
/// re-indexed densely, existing first. Legacy persisted files with flat
/// column names are already rebuilt into hierarchical paths by the storage
/// reader, so both sides arrive here with path-addressed columns.
pub fn merge_tables(existing: Option<Table>, incoming: Table) -> Table {
    let Some(existing) = existing else {
        return incoming;
    };

    let existing_rows = existing.num_rows();
    let incoming_rows = incoming.num_rows();
    let mut columns: IndexMap<_, Vec<Value>> = IndexMap::new();

    for (path, values) in existing.columns() {
        let mut merged = values.clone();
        match incoming.column(path) {
            Some(tail) => merged.extend_from_slice(tail),
            None => merged.extend(std::iter::repeat(Value::Null).take(incoming_rows)),
        }
        columns.insert(path.clone(), merged);
    }
    for (path, values) in incoming.columns() {
        if columns.contains_key(path) {
            continue;
        }
        let mut merged = vec![Value::Null; existing_rows];
        merged.extend_from_slice(values);
        columns.insert(path.clone(), merged);
    }

    Table::from_columns(columns)
}
