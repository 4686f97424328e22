//! The index collaborator consumed by the index iterator (C4).
//!
//! A real binary index-file parser is out of scope here. This module
//! models the flat, pre-sorted backing store the index iterator walks,
//! and a constructor that accepts entries in any order and sorts them
//! the way a real index would be sorted on disk.

use std::cmp::Ordering;

use crate::entry::{Mode, ObjectId};
use crate::pathutil::{prefixcmp, prefixcmp_icase, strncasecmp};

/// One row of the flat index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// The full, slash-separated path.
    pub path: String,
    /// The kind of the entry. The index never stores `Mode::Tree` -- only
    /// leaves (files, executables, symlinks, gitlinks) -- directories are
    /// always synthetic, produced on the fly (see [`crate::iter`]).
    pub mode: Mode,
    /// The content id.
    pub oid: ObjectId,
    /// The merge-conflict stage: `0` for a normal, unconflicted entry;
    /// nonzero for one side of an unresolved merge. Iteration silently
    /// skips nonzero-stage entries.
    pub stage: u8,
}

impl IndexEntry {
    /// Convenience constructor for an ordinary, unconflicted entry.
    pub fn new(path: impl Into<String>, mode: Mode, oid: ObjectId) -> Self {
        IndexEntry { path: path.into(), mode, oid, stage: 0 }
    }

    /// Convenience constructor for a conflicted entry at a given stage.
    pub fn conflicted(path: impl Into<String>, mode: Mode, oid: ObjectId, stage: u8) -> Self {
        IndexEntry { path: path.into(), mode, oid, stage }
    }
}

/// The flat, sorted staging index.
#[derive(Debug, Clone, Default)]
pub struct Index {
    entries: Vec<IndexEntry>,
    ignore_case: bool,
}

impl Index {
    /// Builds an index, sorting entries the way a real index stores them
    /// on disk: by path under the index's own collation, with stage as
    /// a tiebreaker so conflict sides stay adjacent.
    pub fn new(mut entries: Vec<IndexEntry>, ignore_case: bool) -> Self {
        entries.sort_by(|a, b| {
            let cmp = if ignore_case {
                strncasecmp(&a.path, &b.path)
            } else {
                a.path.cmp(&b.path)
            };
            cmp.then(a.stage.cmp(&b.stage))
        });
        Index { entries, ignore_case }
    }

    /// Whether this index's own collation is case-insensitive; the
    /// inherited default when neither `IGNORE_CASE` nor
    /// `DO_NOT_IGNORE_CASE` is set explicitly.
    pub fn ignore_case(&self) -> bool {
        self.ignore_case
    }

    /// Number of rows, including conflicted stages.
    pub fn entrycount(&self) -> usize {
        self.entries.len()
    }

    /// The row at flat position `i`.
    pub fn get(&self, i: usize) -> Option<&IndexEntry> {
        self.entries.get(i)
    }

    /// Binary search for the first row not ordered strictly before
    /// `prefix`, under the index's own collation.
    pub fn prefix_position(&self, prefix: &str) -> usize {
        let cmp: fn(&str, &str) -> Ordering =
            if self.ignore_case { prefixcmp_icase } else { prefixcmp };
        self.entries.partition_point(|e| cmp(&e.path, prefix) == Ordering::Less)
    }
}
