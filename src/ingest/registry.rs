//! Content-hash registry making file ingestion idempotent.
//!
//! One SHA-256 digest per successfully parsed source file, persisted as a
//! sorted newline-delimited text file. Registry I/O failures are logged and
//! swallowed: losing the registry only costs re-reading files on the next
//! run, never correctness of the current one.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::warn;

/// Default registry file name inside the data directory.
pub const REGISTRY_FILE_NAME: &str = "processed_hashes.txt";

const HASH_CHUNK_BYTES: usize = 4096;

/// Persisted set of content hashes for already-ingested files.
pub struct ContentHashRegistry {
    path: PathBuf,
}

impl ContentHashRegistry {
    pub fn new(path: PathBuf) -> Self {
        ContentHashRegistry { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted hash set; missing or unreadable files yield an
    /// empty set.
    pub fn load(&self) -> BTreeSet<String> {
        if !self.path.exists() {
            return BTreeSet::new();
        }
        match std::fs::read_to_string(&self.path) {
            Ok(content) => content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
            Err(err) => {
                warn!("error reading processed hashes {}: {err}", self.path.display());
                BTreeSet::new()
            }
        }
    }

    /// Overwrite the registry with `hashes`, one per line, sorted.
    ///
    /// A write failure is logged, not surfaced: the run's in-memory results
    /// stand, the same files are just re-hashed next time.
    pub fn save(&self, hashes: &BTreeSet<String>) {
        let body = hashes.iter().map(String::as_str).collect::<Vec<_>>().join("\n");
        if let Err(err) = std::fs::write(&self.path, body) {
            warn!("error writing processed hashes {}: {err}", self.path.display());
        }
    }

    /// SHA-256 of the file's raw bytes, streamed in fixed-size chunks.
    ///
    /// Depends only on content: identical bytes hash identically whatever
    /// the file is called or where it lives.
    pub fn hash_of(path: &Path) -> io::Result<String> {
        let mut file = File::open(path)?;
        let mut hasher = Sha256::new();
        let mut chunk = [0u8; HASH_CHUNK_BYTES];
        loop {
            let read = file.read(&mut chunk)?;
            if read == 0 {
                break;
            }
            hasher.update(&chunk[..read]);
        }
        Ok(format!("{:x}", hasher.finalize()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn hash_depends_on_content_not_name() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.json");
        let b = dir.path().join("renamed.json");
        fs::write(&a, b"{\"x\": 1}").unwrap();
        fs::write(&b, b"{\"x\": 1}").unwrap();

        let hash_a = ContentHashRegistry::hash_of(&a).unwrap();
        let hash_b = ContentHashRegistry::hash_of(&b).unwrap();
        assert_eq!(hash_a, hash_b);
        assert_eq!(hash_a.len(), 64);
        // Stable across repeated calls.
        assert_eq!(ContentHashRegistry::hash_of(&a).unwrap(), hash_a);
    }

    #[test]
    fn round_trips_sorted_lines() {
        let dir = TempDir::new().unwrap();
        let registry = ContentHashRegistry::new(dir.path().join("hashes.txt"));

        let hashes: BTreeSet<String> =
            ["beef".to_string(), "abad".to_string()].into_iter().collect();
        registry.save(&hashes);

        let content = fs::read_to_string(registry.path()).unwrap();
        assert_eq!(content, "abad\nbeef");
        assert_eq!(registry.load(), hashes);
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let registry = ContentHashRegistry::new(dir.path().join("absent.txt"));
        assert!(registry.load().is_empty());
    }
}
