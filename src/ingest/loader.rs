//! Reading raw contract records from a directory of JSON files.

use std::path::Path;

use serde_json::Value;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::ingest::registry::ContentHashRegistry;

/// Load every record from the new `*.json` files under `dir`.
///
/// Files are processed in name order for reproducible runs. Files whose
/// content hash is already in the registry are skipped; all-skipped is a
/// normal empty result. A top-level array contributes one record per
/// element, an object one record; anything else is logged and dropped.
///
/// A file joins the persisted hash set iff it parsed: a file that fails to
/// decode is skipped *without* being marked processed, so it is retried on
/// the next run instead of silently dropped forever. The registry is
/// rewritten at most once, and only when something new was parsed.
pub fn ingest(dir: &Path, registry: &ContentHashRegistry) -> Result<Vec<Value>> {
    if !dir.is_dir() {
        return Err(Error::DirectoryNotFound(dir.to_path_buf()));
    }

    let mut json_files: Vec<_> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file() && path.extension().and_then(|ext| ext.to_str()) == Some("json")
        })
        .collect();
    json_files.sort();

    if json_files.is_empty() {
        return Err(Error::NoInputFiles(dir.to_path_buf()));
    }

    let processed = registry.load();
    let mut queued = std::collections::BTreeSet::new();
    let mut to_process = Vec::new();
    for path in json_files {
        let hash = match ContentHashRegistry::hash_of(&path) {
            Ok(hash) => hash,
            Err(err) => {
                warn!("error hashing {}: {err}; skipping", path.display());
                continue;
            }
        };
        if processed.contains(&hash) {
            continue;
        }
        // Two files with identical bytes in one run are one ingestion; the
        // name-sorted walk makes the first one win.
        if !queued.insert(hash.clone()) {
            warn!("{} duplicates already-queued content; skipping", path.display());
            continue;
        }
        to_process.push((path, hash));
    }

    if to_process.is_empty() {
        info!("no new JSON files to process based on content hashes");
        return Ok(Vec::new());
    }

    let mut records = Vec::new();
    let mut newly_processed = std::collections::BTreeSet::new();
    for (path, hash) in to_process {
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) => {
                warn!("error reading {}: {err}; skipping", path.display());
                continue;
            }
        };
        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Array(items)) => {
                records.extend(items);
                newly_processed.insert(hash);
            }
            Ok(object @ Value::Object(_)) => {
                records.push(object);
                newly_processed.insert(hash);
            }
            Ok(other) => {
                // Parsed fine, just not a shape we ingest; still counts as
                // processed so it is not re-read every run.
                warn!(
                    "unexpected top-level {} in {}; expected array or object",
                    value_kind(&other),
                    path.display()
                );
                newly_processed.insert(hash);
            }
            Err(err) => {
                warn!("error decoding {}: {err}; will retry next run", path.display());
            }
        }
    }

    if !newly_processed.is_empty() {
        let union: std::collections::BTreeSet<_> =
            processed.union(&newly_processed).cloned().collect();
        registry.save(&union);
    }

    Ok(records)
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn registry_in(dir: &TempDir) -> ContentHashRegistry {
        ContentHashRegistry::new(dir.path().join("processed_hashes.txt"))
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        let registry = registry_in(&dir);
        let missing = dir.path().join("nope");
        assert!(matches!(ingest(&missing, &registry), Err(Error::DirectoryNotFound(_))));
    }

    #[test]
    fn empty_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        let registry = registry_in(&dir);
        let data = dir.path().join("data");
        fs::create_dir(&data).unwrap();
        assert!(matches!(ingest(&data, &registry), Err(Error::NoInputFiles(_))));
    }

    #[test]
    fn arrays_and_objects_both_yield_records() {
        let dir = TempDir::new().unwrap();
        let registry = registry_in(&dir);
        fs::write(dir.path().join("a.json"), r#"[{"x": 1}, {"x": 2}]"#).unwrap();
        fs::write(dir.path().join("b.json"), r#"{"y": 3}"#).unwrap();

        let records = ingest(dir.path(), &registry).unwrap();
        assert_eq!(records, vec![json!({"x": 1}), json!({"x": 2}), json!({"y": 3})]);
    }

    #[test]
    fn second_run_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let registry = registry_in(&dir);
        fs::write(dir.path().join("a.json"), r#"[{"x": 1}]"#).unwrap();

        assert_eq!(ingest(dir.path(), &registry).unwrap().len(), 1);
        assert_eq!(registry.load().len(), 1);
        assert!(ingest(dir.path(), &registry).unwrap().is_empty());
    }

    #[test]
    fn duplicate_content_is_ingested_once() {
        let dir = TempDir::new().unwrap();
        let registry = registry_in(&dir);
        fs::write(dir.path().join("a.json"), r#"[{"x": 1}]"#).unwrap();
        fs::write(dir.path().join("b.json"), r#"[{"x": 1}]"#).unwrap();
        fs::write(dir.path().join("c.json"), r#"[{"x": 2}]"#).unwrap();

        // b.json duplicates a.json byte-for-byte within the same run; only
        // one of the pair may contribute records or a registry entry.
        let records = ingest(dir.path(), &registry).unwrap();
        assert_eq!(records, vec![json!({"x": 1}), json!({"x": 2})]);
        assert_eq!(registry.load().len(), 2);
    }

    #[test]
    fn malformed_files_are_skipped_and_retried() {
        let dir = TempDir::new().unwrap();
        let registry = registry_in(&dir);
        fs::write(dir.path().join("bad.json"), "{not json").unwrap();
        fs::write(dir.path().join("good.json"), r#"{"y": 1}"#).unwrap();

        let records = ingest(dir.path(), &registry).unwrap();
        assert_eq!(records.len(), 1);
        // Only the parsed file is marked processed; the bad one will be
        // hashed and attempted again.
        assert_eq!(registry.load().len(), 1);

        fs::write(dir.path().join("bad.json"), r#"{"z": 2}"#).unwrap();
        let retried = ingest(dir.path(), &registry).unwrap();
        assert_eq!(retried, vec![json!({"z": 2})]);
    }

    #[test]
    fn unexpected_shapes_count_as_processed() {
        let dir = TempDir::new().unwrap();
        let registry = registry_in(&dir);
        fs::write(dir.path().join("scalar.json"), "42").unwrap();

        let records = ingest(dir.path(), &registry).unwrap();
        assert!(records.is_empty());
        assert_eq!(registry.load().len(), 1);
    }
}
