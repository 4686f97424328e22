//! The four concrete iterators (C2-C5) and the dispatch facade that
//! unifies them behind one contract (§4.1, §9).
//!
//! Function-table polymorphism in the original design is rendered here as
//! a tagged enum (`Iter`) wrapped by [`HierIter`]: no virtual dispatch is
//! needed, and the enum keeps each variant's lifetimes and ownership
//! explicit rather than hidden behind a vtable.

pub mod empty;
pub mod index;
pub mod tree;
pub mod workdir;

use std::cmp::Ordering;
use std::path::Path;
use std::sync::Arc;

pub use empty::EmptyIter;
pub use index::IndexIter;
pub use tree::TreeIter;
pub use workdir::WorkdirIter;

use crate::entry::{Entry, ObjectId};
use crate::error::{Error, Result};
use crate::flags::Flags;
use crate::pathutil::{prefixcmp, prefixcmp_icase};
use crate::repository::Repository;
use crate::sources::{Index, Tree, TreeEntry};

/// The tagged sum of concrete iterator implementations.
#[derive(Debug)]
enum Iter {
    Empty(EmptyIter),
    Tree(TreeIter),
    Index(IndexIter),
    Workdir(WorkdirIter),
}

/// A unified hierarchical iterator over one of the three namespace
/// sources described in the crate's top-level documentation: a committed
/// tree, a staging index, or a working directory.
///
/// Constructed via [`HierIter::for_nothing`], [`HierIter::for_tree`],
/// [`HierIter::for_index`], or [`HierIter::for_workdir`]. Every
/// instance, regardless of source, exposes the same seven operations
/// (§4.1): [`current`](Self::current), [`advance`](Self::advance),
/// [`advance_into`](Self::advance_into), [`seek`](Self::seek),
/// [`reset`](Self::reset), [`at_end`](Self::at_end), and ordinary
/// `Drop`/[`close`](Self::close) for resource release.
#[derive(Debug)]
pub struct HierIter {
    inner: Iter,
}

impl HierIter {
    /// The zero-entry iterator. `at_end()` is true immediately.
    pub fn for_nothing(flags: Flags, start: Option<String>, end: Option<String>) -> Self {
        HierIter { inner: Iter::Empty(EmptyIter::new(flags, start, end)) }
    }

    /// An iterator over the committed tree named by `root_oid`, resolved
    /// through `repo`'s attached object database.
    pub fn for_tree(
        repo: Repository,
        root_oid: ObjectId,
        flags: Flags,
        start: Option<String>,
        end: Option<String>,
    ) -> Result<Self> {
        Ok(HierIter { inner: Iter::Tree(TreeIter::new(repo, root_oid, flags, start, end)?) })
    }

    /// An iterator over the flat staging index.
    pub fn for_index(index: Arc<Index>, flags: Flags, start: Option<String>, end: Option<String>) -> Self {
        HierIter { inner: Iter::Index(IndexIter::new(index, flags, start, end)) }
    }

    /// An iterator over `repo`'s working directory. Fails with
    /// [`Error::Repository`] if `repo` is bare (has no workdir root).
    pub fn for_workdir(repo: Repository, flags: Flags, start: Option<String>, end: Option<String>) -> Result<Self> {
        Ok(HierIter { inner: Iter::Workdir(WorkdirIter::new(repo, flags, start, end)?) })
    }

    /// Yields the entry at the current position without moving. `None`
    /// iff `at_end()`.
    pub fn current(&self) -> Option<&Entry> {
        match &self.inner {
            Iter::Empty(_) => None,
            Iter::Tree(it) => it.current(),
            Iter::Index(it) => it.current(),
            Iter::Workdir(it) => it.current(),
        }
    }

    /// Moves to the next entry in traversal order. If the current entry
    /// is an auto-expandable directory, advances *into* it instead
    /// (§4.1).
    pub fn advance(&mut self) -> Result<()> {
        match &mut self.inner {
            Iter::Empty(it) => it.advance(),
            Iter::Tree(it) => it.advance(),
            Iter::Index(it) => it.advance(),
            Iter::Workdir(it) => it.advance(),
        }
    }

    /// If the current entry is a directory, makes its first child the
    /// new current entry. A no-op (not an error) if the current entry
    /// isn't a directory. Fails with [`Error::NotFound`] if the
    /// directory is empty.
    pub fn advance_into(&mut self) -> Result<()> {
        match &mut self.inner {
            Iter::Empty(it) => it.advance_into(),
            Iter::Tree(it) => it.advance_into(),
            Iter::Index(it) => it.advance_into(),
            Iter::Workdir(it) => it.advance_into(),
        }
    }

    /// Reserved; unsupported by every concrete iterator in this crate.
    /// Always fails with [`Error::Invalid`] -- use [`reset`](Self::reset)
    /// to reposition instead (§9 Open Questions).
    pub fn seek(&mut self, _prefix: &str) -> Result<()> {
        Err(Error::Invalid("seek is not supported by this iterator; use reset".into()))
    }

    /// Rebinds the range bounds and restarts from the smallest included
    /// path.
    pub fn reset(&mut self, start: Option<String>, end: Option<String>) -> Result<()> {
        match &mut self.inner {
            Iter::Empty(it) => it.reset(start, end),
            Iter::Tree(it) => it.reset(start, end),
            Iter::Index(it) => it.reset(start, end),
            Iter::Workdir(it) => it.reset(start, end),
        }
    }

    /// True iff further `advance` will never yield a new entry.
    pub fn at_end(&self) -> bool {
        match &self.inner {
            Iter::Empty(it) => it.at_end(),
            Iter::Tree(it) => it.at_end(),
            Iter::Index(it) => it.at_end(),
            Iter::Workdir(it) => it.at_end(),
        }
    }

    /// Releases owned resources ahead of scope end. Equivalent to
    /// dropping the iterator; provided for callers that want deterministic
    /// release at a specific point. Idempotent: consuming `self` by value
    /// means it cannot be called twice.
    pub fn close(self) {
        drop(self)
    }

    /// Mutates the case-folding policy. Only the empty iterator (built by
    /// `for_nothing`) permits this; every other variant fails with
    /// [`Error::Invalid`] (§4.1).
    pub fn set_ignore_case(&mut self, ignore_case: bool) -> Result<()> {
        match &mut self.inner {
            Iter::Empty(it) => {
                it.set_ignore_case(ignore_case);
                Ok(())
            }
            _ => Err(Error::Invalid("case-folding can only be changed on the empty iterator".into())),
        }
    }

    fn ignore_case(&self) -> bool {
        match &self.inner {
            Iter::Empty(it) => it.range().ignore_case(),
            Iter::Tree(it) => it.range().ignore_case(),
            Iter::Index(it) => it.range().ignore_case(),
            Iter::Workdir(it) => it.range().ignore_case(),
        }
    }

    /// Returns the backing index, if this is an index iterator.
    pub fn get_index(&self) -> Option<&Arc<Index>> {
        match &self.inner {
            Iter::Index(it) => Some(it.index()),
            _ => None,
        }
    }

    /// Returns the raw on-disk tree-entry backing the current position,
    /// if this is a tree iterator positioned on a real entry.
    pub fn current_tree_entry(&self) -> Option<&TreeEntry> {
        match &self.inner {
            Iter::Tree(it) => it.current_tree_entry(),
            _ => None,
        }
    }

    /// Walks the tree-iterator frame stack and returns the tree object
    /// whose directory path equals `parent_path`, a prefix of the current
    /// entry. `None` if this isn't a tree iterator or no such ancestor
    /// frame exists.
    pub fn current_parent_tree(&self, parent_path: &str) -> Option<Arc<Tree>> {
        match &self.inner {
            Iter::Tree(it) => it.parent_tree(parent_path),
            _ => None,
        }
    }

    /// Whether the current entry is ignored. Always `false` for
    /// non-workdir iterators.
    pub fn current_is_ignored(&mut self) -> bool {
        match &mut self.inner {
            Iter::Workdir(it) => it.current_is_ignored(),
            _ => false,
        }
    }

    /// The absolute host path of the current entry. `None` for
    /// non-workdir iterators or when at end.
    pub fn current_workdir_path(&self) -> Option<&Path> {
        match &self.inner {
            Iter::Workdir(it) => it.current_workdir_path(),
            _ => None,
        }
    }

    /// The sign of `prefixcmp(current_path, prefix)`: `+1` when the
    /// iterator is exhausted, `-1` when `prefix` is `None`.
    pub fn cmp(&self, prefix: Option<&str>) -> i32 {
        let prefix = match prefix {
            Some(p) => p,
            None => return -1,
        };
        match self.current() {
            None => 1,
            Some(e) => {
                let ord = if self.ignore_case() {
                    prefixcmp_icase(&e.path, prefix)
                } else {
                    prefixcmp(&e.path, prefix)
                };
                match ord {
                    Ordering::Less => -1,
                    Ordering::Equal => 0,
                    Ordering::Greater => 1,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::Mode;
    use crate::sources::{IndexEntry, InMemoryObjectDatabase};

    #[test]
    fn for_nothing_is_always_at_end() {
        let it = HierIter::for_nothing(Flags::empty(), None, None);
        assert!(it.at_end());
        assert!(it.current().is_none());
    }

    #[test]
    fn facade_dispatches_to_index_iterator() {
        let index = Arc::new(Index::new(
            vec![
                IndexEntry::new("a", Mode::File, ObjectId::NULL),
                IndexEntry::new("b", Mode::File, ObjectId::NULL),
            ],
            false,
        ));
        let mut it = HierIter::for_index(index.clone(), Flags::empty(), None, None);
        assert!(!it.at_end());
        assert_eq!(it.current().unwrap().path, "a");
        assert!(Arc::ptr_eq(it.get_index().unwrap(), &index));
        it.advance().unwrap();
        assert_eq!(it.current().unwrap().path, "b");
        it.advance().unwrap();
        assert!(it.at_end());
    }

    #[test]
    fn seek_is_unsupported() {
        let mut it = HierIter::for_nothing(Flags::empty(), None, None);
        assert!(matches!(it.seek("a"), Err(Error::Invalid(_))));
    }

    #[test]
    fn ignore_case_mutation_only_allowed_on_empty() {
        let mut empty = HierIter::for_nothing(Flags::empty(), None, None);
        assert!(empty.set_ignore_case(true).is_ok());

        let index = Arc::new(Index::new(vec![IndexEntry::new("a", Mode::File, ObjectId::NULL)], false));
        let mut it = HierIter::for_index(index, Flags::empty(), None, None);
        assert!(matches!(it.set_ignore_case(true), Err(Error::Invalid(_))));
    }

    #[test]
    fn cmp_reports_exhausted_and_none_prefix() {
        let it = HierIter::for_nothing(Flags::empty(), None, None);
        assert_eq!(it.cmp(Some("anything")), 1);
        assert_eq!(it.cmp(None), -1);
    }

    #[test]
    fn cmp_against_current_path() {
        let index = Arc::new(Index::new(vec![IndexEntry::new("m", Mode::File, ObjectId::NULL)], false));
        let it = HierIter::for_index(index, Flags::empty(), None, None);
        assert_eq!(it.cmp(Some("m")), 0);
        assert_eq!(it.cmp(Some("a")), 1);
        assert_eq!(it.cmp(Some("z")), -1);
    }

    #[test]
    fn tree_iterator_exposes_parent_tree_and_tree_entry() {
        let mut odb = InMemoryObjectDatabase::new();
        let oid = |b: u8| {
            let mut bytes = [0u8; 20];
            bytes[0] = b;
            ObjectId::from_bytes(bytes)
        };
        let child = odb.insert_tree(oid(10), Tree::new(vec![TreeEntry::new("x", Mode::File, oid(11))]));
        let root = odb.insert_tree(oid(1), Tree::new(vec![TreeEntry::new("a", Mode::Tree, child)]));
        let repo = Repository::builder(false).odb(Arc::new(odb)).build();

        let mut it = HierIter::for_tree(repo, root, Flags::INCLUDE_TREES, None, None).unwrap();
        assert_eq!(it.current().unwrap().path, "a/");
        assert_eq!(it.current_tree_entry().unwrap().filename, "a");
        it.advance().unwrap();
        assert_eq!(it.current().unwrap().path, "a/x");
        assert!(it.current_parent_tree("a").is_some());
        assert!(it.current_parent_tree("nope").is_none());
    }
}
