//! Parquet persistence for tables.
//!
//! Flat column names are the `_`-joined [`ColumnPath`] segments; the reader
//! splits them back to rebuild the hierarchy, which also upgrades files
//! written before columns were hierarchical. Data pages are
//! zstd-compressed.
//!
//! Column physical types are inferred per column: all-integer cells become
//! Int64, other all-numeric columns Float64, all-boolean columns Boolean,
//! and everything else Utf8 with non-string cells stored as their compact
//! JSON text. A column mixing numbers and strings therefore reloads as
//! strings; the numeric coercion in metrics handles that downcast.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray,
};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use indexmap::IndexMap;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, ZstdLevel};
use parquet::file::properties::WriterProperties;
use serde_json::Value;
use tracing::warn;

use crate::error::{Error, Result};
use crate::table::{normalize_segment, ColumnPath, Table};

/// Write `table` to `path` as a zstd-compressed Parquet file.
pub fn write_table(table: &Table, path: &Path) -> Result<()> {
    if table.num_columns() == 0 {
        warn!("table has no columns; not writing {}", path.display());
        return Ok(());
    }

    let mut fields = Vec::with_capacity(table.num_columns());
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(table.num_columns());
    for (col_path, values) in table.columns() {
        let (data_type, array) = encode_column(values);
        fields.push(Field::new(col_path.to_flat(), data_type, true));
        arrays.push(array);
    }

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), arrays)?;

    let props = WriterProperties::builder()
        .set_compression(Compression::ZSTD(ZstdLevel::default()))
        .build();
    let file = File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, schema, Some(props))?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

/// Read a persisted table, rebuilding hierarchical column paths from the
/// flat `_`-joined names.
pub fn read_table(path: &Path) -> Result<Table> {
    let file = File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let schema = builder.schema().clone();
    let reader = builder.build()?;

    let mut paths = Vec::with_capacity(schema.fields().len());
    let mut columns: IndexMap<ColumnPath, Vec<Value>> = IndexMap::new();
    for field in schema.fields() {
        let col_path = ColumnPath::from_flat(field.name())?;
        if columns.contains_key(&col_path) {
            warn!(
                "flat names collide on column {col_path} in {}; keeping the first",
                path.display()
            );
            paths.push(None);
            continue;
        }
        columns.insert(col_path.clone(), Vec::new());
        paths.push(Some(col_path));
    }

    for batch in reader {
        let batch = batch?;
        for (i, col_path) in paths.iter().enumerate() {
            let Some(col_path) = col_path else { continue };
            let values = columns.get_mut(col_path).expect("path registered above");
            decode_column(batch.column(i), values)?;
        }
    }
    Ok(Table::from_columns(columns))
}

enum ColumnKind {
    Int64,
    Float64,
    Boolean,
    Utf8,
}

/// Pick the narrowest physical type holding every non-null cell.
fn infer_kind(values: &[Value]) -> ColumnKind {
    let mut kind: Option<ColumnKind> = None;
    for value in values {
        let this = match value {
            Value::Null => continue,
            Value::Number(n) if n.as_i64().is_some() => ColumnKind::Int64,
            Value::Number(_) => ColumnKind::Float64,
            Value::Bool(_) => ColumnKind::Boolean,
            _ => ColumnKind::Utf8,
        };
        kind = Some(match (kind, this) {
            (None, this) => this,
            (Some(ColumnKind::Int64), ColumnKind::Int64) => ColumnKind::Int64,
            (Some(ColumnKind::Int64 | ColumnKind::Float64), ColumnKind::Float64)
            | (Some(ColumnKind::Float64), ColumnKind::Int64) => ColumnKind::Float64,
            (Some(ColumnKind::Boolean), ColumnKind::Boolean) => ColumnKind::Boolean,
            _ => ColumnKind::Utf8,
        });
        if matches!(kind, Some(ColumnKind::Utf8)) {
            break;
        }
    }
    kind.unwrap_or(ColumnKind::Utf8)
}

fn encode_column(values: &[Value]) -> (DataType, ArrayRef) {
    match infer_kind(values) {
        ColumnKind::Int64 => {
            let array: Int64Array = values.iter().map(Value::as_i64).collect();
            (DataType::Int64, Arc::new(array))
        }
        ColumnKind::Float64 => {
            let array: Float64Array = values.iter().map(Value::as_f64).collect();
            (DataType::Float64, Arc::new(array))
        }
        ColumnKind::Boolean => {
            let array: BooleanArray = values.iter().map(Value::as_bool).collect();
            (DataType::Boolean, Arc::new(array))
        }
        ColumnKind::Utf8 => {
            let array: StringArray = values
                .iter()
                .map(|value| match value {
                    Value::Null => None,
                    Value::String(s) => Some(s.clone()),
                    other => Some(other.to_string()),
                })
                .collect();
            (DataType::Utf8, Arc::new(array))
        }
    }
}

fn decode_column(array: &ArrayRef, out: &mut Vec<Value>) -> Result<()> {
    macro_rules! push_all {
        ($array_ty:ty, $to_value:expr) => {{
            let array = array
                .as_any()
                .downcast_ref::<$array_ty>()
                .expect("array type matches schema");
            for i in 0..array.len() {
                if array.is_null(i) {
                    out.push(Value::Null);
                } else {
                    out.push($to_value(array.value(i)));
                }
            }
        }};
    }

    match array.data_type() {
        DataType::Int64 => push_all!(Int64Array, |v: i64| Value::from(v)),
        DataType::Float64 => {
            push_all!(Float64Array, |v: f64| {
                serde_json::Number::from_f64(v).map(Value::Number).unwrap_or(Value::Null)
            })
        }
        DataType::Boolean => push_all!(BooleanArray, Value::from),
        DataType::Utf8 => push_all!(StringArray, |v: &str| Value::from(v)),
        DataType::Null => {
            out.extend(std::iter::repeat(Value::Null).take(array.len()));
        }
        other => {
            return Err(Error::Storage(format!("unsupported column type {other}")));
        }
    }
    Ok(())
}

/// Rewrite a Parquet file sanitizing every raw flat column name in place.
///
/// Used for files written straight from the feed before any sanitizing.
/// Data is carried over untouched; only the schema names change.
pub fn sanitize_parquet_columns(input: &Path, output: &Path) -> Result<()> {
    let file = File::open(input)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let schema = builder.schema().clone();
    let reader = builder.build()?;

    let renamed = schema
        .fields()
        .iter()
        .map(|field| {
            let name = normalize_segment(field.name())?;
            Ok(Field::new(name, field.data_type().clone(), field.is_nullable()))
        })
        .collect::<Result<Vec<_>>>()?;
    let renamed = Arc::new(Schema::new(renamed));

    let props = WriterProperties::builder()
        .set_compression(Compression::ZSTD(ZstdLevel::default()))
        .build();
    let out_file = File::create(output)?;
    let mut writer = ArrowWriter::try_new(out_file, renamed.clone(), Some(props))?;
    for batch in reader {
        let batch = batch?;
        let batch = RecordBatch::try_new(renamed.clone(), batch.columns().to_vec())?;
        writer.write(&batch)?;
    }
    writer.close()?;
    Ok(())
}
