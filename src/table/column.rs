//! Hierarchical column identity and field-name sanitizing.
//!
//! Columns are addressed by a [`ColumnPath`]: an ordered sequence of
//! sanitized segments, e.g. `entry.content.award.contractData...` from the
//! feed becomes `(entry, content, award, contractData, ...)`. Paths of
//! different depths coexist in one table; selection code must never assume
//! uniform depth.
//!
//! Persisted files flatten a path to a single `_`-joined string, and readers
//! rebuild the path by splitting on `_`. Sanitizing maps space, `-` and `.`
//! to `_`, so a segment can itself contain the delimiter and two distinct
//! raw paths can collapse to the same flat name. This collision is kept
//! as-is for compatibility with already-written tables; see DESIGN.md.

use std::fmt;

use crate::error::{Error, Result};

/// Sanitize one raw field-name segment into an identifier-safe form.
///
/// `@` and `#` are deleted, space/`-`/`.` become `_`, every other
/// non-alphanumeric character is stripped, and a leading digit gets a `_`
/// prefix. Pure and deterministic: column identity must be stable across
/// independent runs for incremental merging to mean anything.
pub fn normalize_segment(raw: &str) -> Result<String> {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '@' | '#' => {}
            ' ' | '-' | '.' => out.push('_'),
            c if c.is_alphanumeric() || c == '_' => out.push(c),
            _ => {}
        }
    }
    if out.is_empty() {
        return Err(Error::EmptyColumnName(raw.to_string()));
    }
    if out.as_bytes()[0].is_ascii_digit() {
        out.insert(0, '_');
    }
    Ok(out)
}

/// Ordered sequence of sanitized segments identifying one column.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnPath(Vec<String>);

impl ColumnPath {
    /// Build a path from segments that are already sanitized.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ColumnPath(segments.into_iter().map(Into::into).collect())
    }

    /// Rebuild a path from a flat `_`-joined name.
    ///
    /// Empty pieces produced by consecutive or leading underscores are
    /// dropped before sanitizing, so a flat name written for a
    /// digit-guarded segment (`_2025_value`) splits back to the original
    /// `(_2025, value)` path.
    pub fn from_flat(flat: &str) -> Result<Self> {
        let segments = flat
            .split('_')
            .filter(|piece| !piece.is_empty())
            .map(normalize_segment)
            .collect::<Result<Vec<_>>>()?;
        if segments.is_empty() {
            return Err(Error::EmptyColumnName(flat.to_string()));
        }
        Ok(ColumnPath(segments))
    }

    /// Flatten to the `_`-joined form used for persisted column names.
    pub fn to_flat(&self) -> String {
        self.0.join("_")
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Whether the first `prefix.len()` segments equal `prefix`.
    pub fn starts_with(&self, prefix: &[&str]) -> bool {
        self.0.len() >= prefix.len()
            && self.0.iter().zip(prefix).all(|(seg, want)| seg == want)
    }

    /// Match against a positional pattern where `None` is a wildcard.
    ///
    /// Each `Some(segment)` must be present at exactly that position;
    /// positions beyond the pattern are unconstrained. Paths shorter than
    /// the last fixed position never match.
    pub fn matches(&self, pattern: &[Option<&str>]) -> bool {
        pattern.iter().enumerate().all(|(i, step)| match step {
            Some(want) => self.0.get(i).is_some_and(|seg| seg == want),
            None => true,
        })
    }
}

impl fmt::Display for ColumnPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.0.join(", "))
    }
}
