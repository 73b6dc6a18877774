//! Flattening raw feed records into a table.
//!
//! Nested objects are flattened with `_` joining the key path, the flat key
//! is split back on `_`, and each piece is sanitized into a [`ColumnPath`]
//! segment. Arrays are not descended into: a list-valued field stays whole
//! as a single cell, matching the normalized-JSON layout the persisted
//! tables were originally written with.

use indexmap::{IndexMap, IndexSet};
use serde_json::Value;
use tracing::warn;

use crate::error::Result;
use crate::table::{ColumnPath, Table};

/// Flatten `records` into one rectangular table.
///
/// Each record becomes one row; cells absent from a given record are null.
/// Column order is first-seen order across records. A record whose top
/// level is not an object cannot be flattened and is skipped with a
/// warning.
pub fn build_table(records: &[Value]) -> Result<Table> {
    let mut rows: Vec<IndexMap<ColumnPath, Value>> = Vec::with_capacity(records.len());
    let mut order: IndexSet<ColumnPath> = IndexSet::new();

    for record in records {
        let Value::Object(map) = record else {
            warn!("skipping non-object record: {record}");
            continue;
        };
        let mut flat = IndexMap::new();
        flatten_into(None, map, &mut flat);

        let mut row = IndexMap::with_capacity(flat.len());
        for (key, value) in flat {
            let path = ColumnPath::from_flat(&key)?;
            if row.contains_key(&path) {
                warn!("fields collide on column {path} after sanitizing; keeping the first");
                continue;
            }
            order.insert(path.clone());
            row.insert(path, value);
        }
        rows.push(row);
    }

    let mut columns: IndexMap<ColumnPath, Vec<Value>> = IndexMap::with_capacity(order.len());
    for path in order {
        let values = rows
            .iter()
            .map(|row| row.get(&path).cloned().unwrap_or(Value::Null))
            .collect();
        columns.insert(path, values);
    }
    Ok(Table::from_columns(columns))
}

/// Depth-first flatten of nested objects, joining key paths with `_`.
fn flatten_into(
    prefix: Option<&str>,
    map: &serde_json::Map<String, Value>,
    out: &mut IndexMap<String, Value>,
) {
    for (key, value) in map {
        let flat_key = match prefix {
            Some(prefix) => format!("{prefix}_{key}"),
            None => key.clone(),
        };
        match value {
            Value::Object(inner) => flatten_into(Some(&flat_key), inner, out),
            other => {
                out.insert(flat_key, other.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flattens_nested_objects_with_ragged_depth() {
        let records = vec![json!({"a-b": 1, "c.d": {"e": 2}})];
        let table = build_table(&records).unwrap();

        let shallow = ColumnPath::new(["a_b"]);
        let deep = ColumnPath::new(["c_d", "e"]);
        let paths: Vec<_> = table.paths().cloned().collect();
        assert_eq!(paths, vec![shallow.clone(), deep.clone()]);
        assert_eq!(table.cell(&shallow, 0), Some(&json!(1)));
        assert_eq!(table.cell(&deep, 0), Some(&json!(2)));
    }

    #[test]
    fn fills_missing_cells_with_null() {
        let records = vec![json!({"a": 1}), json!({"b": 2})];
        let table = build_table(&records).unwrap();
        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.cell(&ColumnPath::new(["a"]), 1), Some(&Value::Null));
        assert_eq!(table.cell(&ColumnPath::new(["b"]), 0), Some(&Value::Null));
    }

    #[test]
    fn arrays_stay_whole_cells() {
        let records = vec![json!({"tags": [1, 2, 3]})];
        let table = build_table(&records).unwrap();
        assert_eq!(table.cell(&ColumnPath::new(["tags"]), 0), Some(&json!([1, 2, 3])));
    }

    #[test]
    fn underscored_keys_split_into_deeper_paths() {
        // Known lossiness of the flat-name scheme: an underscore inside a
        // raw key is indistinguishable from a nesting boundary.
        let records = vec![json!({"contract_data": 7})];
        let table = build_table(&records).unwrap();
        assert!(table.column(&ColumnPath::new(["contract", "data"])).is_some());
    }

    #[test]
    fn skips_non_object_records() {
        let records = vec![json!(42), json!({"a": 1})];
        let table = build_table(&records).unwrap();
        assert_eq!(table.num_rows(), 1);
    }

    #[test]
    fn fully_stripped_field_name_is_fatal_for_the_build() {
        let records = vec![json!({"$%": 1})];
        assert!(build_table(&records).is_err());
    }
}
