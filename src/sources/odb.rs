//! The object-database collaborator consumed by the tree iterator (C3).
//!
//! This crate does not implement a real, on-disk object database. It
//! defines the trait the tree iterator needs (`tree_lookup`,
//! `tree_entrycount`, `tree_entry_byindex`, `tree_prefix_position`) and
//! ships an in-memory implementation useful for embedding and for this
//! crate's own tests.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use crate::entry::{Mode, ObjectId};
use crate::error::{Error, Result};
use crate::pathutil::{prefixcmp, strncasecmp};

/// One child of a tree, as stored case-sensitively on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// The bare file name (no path component from any ancestor).
    pub filename: String,
    /// The kind of the entry.
    pub mode: Mode,
    /// The content id of the entry.
    pub oid: ObjectId,
}

impl TreeEntry {
    /// Convenience constructor.
    pub fn new(filename: impl Into<String>, mode: Mode, oid: ObjectId) -> Self {
        TreeEntry { filename: filename.into(), mode, oid }
    }
}

/// An immutable tree object: a case-sensitively-sorted list of named
/// entries.
#[derive(Debug, Clone, Default)]
pub struct Tree {
    entries: Vec<TreeEntry>,
}

impl Tree {
    /// Builds a tree from entries, sorting them case-sensitively by
    /// filename the way a real object database stores them on disk.
    pub fn new(mut entries: Vec<TreeEntry>) -> Self {
        entries.sort_by(|a, b| a.filename.cmp(&b.filename));
        Tree { entries }
    }

    /// Number of direct children.
    pub fn entrycount(&self) -> usize {
        self.entries.len()
    }

    /// The child at case-sensitive on-disk index `i`.
    pub fn entry_by_index(&self, i: usize) -> Option<&TreeEntry> {
        self.entries.get(i)
    }

    /// Case-insensitive comparison between two on-disk indices, used to
    /// build the tree iterator frame's secondary-order map.
    pub fn icmp(&self, a: usize, b: usize) -> Ordering {
        strncasecmp(&self.entries[a].filename, &self.entries[b].filename)
    }

    /// Case-sensitive binary search for the first index whose filename is
    /// not ordered strictly before `prefix`.
    pub fn prefix_position(&self, prefix: &str) -> usize {
        self.entries
            .partition_point(|e| prefixcmp(&e.filename, prefix) == Ordering::Less)
    }
}

/// The object-database interface the tree iterator consumes.
pub trait ObjectDatabase: Send + Sync {
    /// Loads the tree named by `oid`.
    fn tree_lookup(&self, oid: ObjectId) -> Result<Arc<Tree>>;
}

/// A trivial in-memory object database, useful for embedding callers that
/// build trees programmatically and for this crate's own tests.
#[derive(Debug, Default)]
pub struct InMemoryObjectDatabase {
    trees: HashMap<ObjectId, Arc<Tree>>,
}

impl InMemoryObjectDatabase {
    /// An empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tree under `oid`, returning the id for convenience.
    pub fn insert_tree(&mut self, oid: ObjectId, tree: Tree) -> ObjectId {
        self.trees.insert(oid, Arc::new(tree));
        oid
    }
}

impl ObjectDatabase for InMemoryObjectDatabase {
    fn tree_lookup(&self, oid: ObjectId) -> Result<Arc<Tree>> {
        self.trees
            .get(&oid)
            .cloned()
            .ok_or_else(|| Error::Repository(format!("no such tree: {}", oid)))
    }
}
