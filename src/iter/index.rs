//! C4: the index iterator -- a DFS-shaped walk over the flat, pre-sorted
//! staging index, synthesizing directory entries on the fly since the
//! index itself stores only leaves.

use std::cmp::Ordering;
use std::collections::VecDeque;
use std::sync::Arc;

use crate::entry::{Entry, Mode, ObjectId};
use crate::error::Result;
use crate::flags::Flags;
use crate::pathutil::common_dir_prefix_len;
use crate::range::PathRange;
use crate::sources::Index;

/// The index iterator (C4).
#[derive(Debug)]
pub struct IndexIter {
    index: Arc<Index>,
    range: PathRange,
    flags: Flags,
    /// Position of the next real (stage-0) row to surface, or
    /// `index.entrycount()` once exhausted.
    pos: usize,
    /// Synthetic directory paths still queued ahead of `pos`'s row.
    pending: VecDeque<String>,
    /// The path most recently handed to the caller (leaf or synthetic
    /// directory), used to compute how much of the next path's ancestry
    /// is already "open".
    last_emitted: String,
    current: Option<Entry>,
}

impl IndexIter {
    pub(crate) fn new(
        index: Arc<Index>,
        flags: Flags,
        start: Option<String>,
        end: Option<String>,
    ) -> Self {
        let ignore_case = flags.resolve_ignore_case(index.ignore_case());
        let range = PathRange::new(start, end, ignore_case);
        let mut it = IndexIter {
            index,
            range,
            flags,
            pos: 0,
            pending: VecDeque::new(),
            last_emitted: String::new(),
            current: None,
        };
        if it.range.is_empty_range() {
            it.pos = it.index.entrycount();
            return it;
        }
        it.pos = it.index.prefix_position(it.range.start().unwrap_or(""));
        it.skip_conflicted_forward();
        it.recompute_landing();
        it.materialize_current();
        it
    }

    pub(crate) fn current(&self) -> Option<&Entry> {
        self.current.as_ref()
    }

    pub(crate) fn range(&self) -> &PathRange {
        &self.range
    }

    /// The backing index, for the `get_index` auxiliary query.
    pub(crate) fn index(&self) -> &Arc<Index> {
        &self.index
    }

    pub(crate) fn at_end(&self) -> bool {
        self.pending.is_empty() && self.pos >= self.index.entrycount()
    }

    /// The flat on-disk row backing the current leaf position, or `None`
    /// when the current entry is a synthetic directory or the iterator
    /// is at end.
    pub(crate) fn current_index_entry(&self) -> Option<&crate::sources::IndexEntry> {
        if !self.pending.is_empty() {
            return None;
        }
        self.index.get(self.pos)
    }

    pub(crate) fn advance(&mut self) -> Result<()> {
        if self.at_end() {
            self.current = None;
            return Ok(());
        }
        let current_is_dir = matches!(&self.current, Some(e) if e.mode.is_tree());
        if current_is_dir {
            let dir = self.pending.pop_front().unwrap();
            if self.flags.auto_expand() {
                self.last_emitted = dir;
            } else {
                self.last_emitted = dir.clone();
                self.pending.clear();
                self.skip_past_subtree(&dir);
                self.recompute_landing();
            }
        } else {
            if let Some(e) = &self.current {
                self.last_emitted = e.path.clone();
            }
            self.pos += 1;
            self.skip_conflicted_forward();
            self.recompute_landing();
        }
        self.materialize_current();
        Ok(())
    }

    pub(crate) fn advance_into(&mut self) -> Result<()> {
        let is_dir = matches!(&self.current, Some(e) if e.mode.is_tree());
        if !is_dir {
            return Ok(());
        }
        let dir = self.pending.pop_front().unwrap();
        self.last_emitted = dir;
        self.materialize_current();
        Ok(())
    }

    pub(crate) fn reset(&mut self, start: Option<String>, end: Option<String>) -> Result<()> {
        self.range.rebind(start, end);
        self.pending.clear();
        self.last_emitted = String::new();
        if self.range.is_empty_range() {
            self.pos = self.index.entrycount();
            self.current = None;
            return Ok(());
        }
        self.pos = self.index.prefix_position(self.range.start().unwrap_or(""));
        self.skip_conflicted_forward();
        self.recompute_landing();
        self.materialize_current();
        Ok(())
    }

    fn skip_conflicted_forward(&mut self) {
        while self.pos < self.index.entrycount() && self.index.get(self.pos).unwrap().stage != 0 {
            self.pos += 1;
        }
    }

    /// Advances `pos` past every remaining row (conflicted or not) that
    /// still falls under `dir`, landing on the first row outside it (or
    /// `entrycount()`).
    fn skip_past_subtree(&mut self, dir: &str) {
        while self.pos < self.index.entrycount() {
            let row = self.index.get(self.pos).unwrap();
            if row.stage != 0 || self.range.prefixcmp(&row.path, dir) == Ordering::Equal {
                self.pos += 1;
                continue;
            }
            break;
        }
    }

    /// Recomputes the synthetic directories that must be yielded between
    /// `last_emitted` and the row currently at `pos`.
    fn recompute_landing(&mut self) {
        self.pending.clear();
        if !self.flags.include_trees() || self.pos >= self.index.entrycount() {
            return;
        }
        let leaf_path = self.index.get(self.pos).unwrap().path.clone();
        let common = common_dir_prefix_len(&self.last_emitted, &leaf_path);
        for (i, b) in leaf_path.bytes().enumerate().skip(common) {
            if b == b'/' {
                self.pending.push_back(leaf_path[..=i].to_owned());
            }
        }
    }

    fn materialize_current(&mut self) {
        if let Some(dir) = self.pending.front() {
            self.current = Some(Entry::new(Mode::Tree, ObjectId::NULL, dir.clone()));
            return;
        }
        if self.pos >= self.index.entrycount() {
            self.current = None;
            return;
        }
        let row = self.index.get(self.pos).unwrap();
        if self.range.is_past_end(&row.path) {
            self.pos = self.index.entrycount();
            self.current = None;
            return;
        }
        self.current = Some(Entry::new(row.mode, row.oid, row.path.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::IndexEntry;

    fn build(entries: Vec<IndexEntry>) -> Arc<Index> {
        Arc::new(Index::new(entries, false))
    }

    #[test]
    fn flat_mode_skips_synthetic_directories() {
        let idx = build(vec![
            IndexEntry::new("a", Mode::File, ObjectId::NULL),
            IndexEntry::new("b/c", Mode::File, ObjectId::NULL),
            IndexEntry::new("b/d", Mode::File, ObjectId::NULL),
            IndexEntry::new("e", Mode::File, ObjectId::NULL),
        ]);
        let mut it = IndexIter::new(idx, Flags::empty(), None, None);
        let mut paths = Vec::new();
        while let Some(e) = it.current() {
            paths.push(e.path.clone());
            it.advance().unwrap();
        }
        assert_eq!(paths, vec!["a", "b/c", "b/d", "e"]);
    }

    #[test]
    fn include_trees_synthesizes_directories() {
        let idx = build(vec![
            IndexEntry::new("a", Mode::File, ObjectId::NULL),
            IndexEntry::new("b/c", Mode::File, ObjectId::NULL),
            IndexEntry::new("b/d", Mode::File, ObjectId::NULL),
            IndexEntry::new("e", Mode::File, ObjectId::NULL),
        ]);
        let mut it = IndexIter::new(idx, Flags::INCLUDE_TREES, None, None);
        let mut paths = Vec::new();
        while let Some(e) = it.current() {
            paths.push(e.path.clone());
            it.advance().unwrap();
        }
        assert_eq!(paths, vec!["a", "b/", "b/c", "b/d", "e"]);
    }

    #[test]
    fn nested_directories_are_synthesized_in_order() {
        let idx = build(vec![
            IndexEntry::new("a/b/c", Mode::File, ObjectId::NULL),
            IndexEntry::new("a/b/d", Mode::File, ObjectId::NULL),
            IndexEntry::new("a/e", Mode::File, ObjectId::NULL),
        ]);
        let mut it = IndexIter::new(idx, Flags::INCLUDE_TREES, None, None);
        let mut paths = Vec::new();
        while let Some(e) = it.current() {
            paths.push(e.path.clone());
            it.advance().unwrap();
        }
        assert_eq!(paths, vec!["a/", "a/b/", "a/b/c", "a/b/d", "a/e"]);
    }

    #[test]
    fn explicit_mode_skips_whole_subtree_on_advance() {
        let idx = build(vec![
            IndexEntry::new("a/b/c", Mode::File, ObjectId::NULL),
            IndexEntry::new("a/b/d", Mode::File, ObjectId::NULL),
            IndexEntry::new("a/e", Mode::File, ObjectId::NULL),
            IndexEntry::new("z", Mode::File, ObjectId::NULL),
        ]);
        let mut it = IndexIter::new(
            idx,
            Flags::INCLUDE_TREES | Flags::SUPPRESS_AUTO_EXPAND,
            None,
            None,
        );
        assert_eq!(it.current().unwrap().path, "a/");
        it.advance().unwrap();
        assert_eq!(it.current().unwrap().path, "a/e");
        it.advance().unwrap();
        assert_eq!(it.current().unwrap().path, "z");
    }

    #[test]
    fn advance_into_descends_one_level_in_explicit_mode() {
        let idx = build(vec![
            IndexEntry::new("a/b/c", Mode::File, ObjectId::NULL),
            IndexEntry::new("a/e", Mode::File, ObjectId::NULL),
        ]);
        let mut it = IndexIter::new(
            idx,
            Flags::INCLUDE_TREES | Flags::SUPPRESS_AUTO_EXPAND,
            None,
            None,
        );
        assert_eq!(it.current().unwrap().path, "a/");
        it.advance_into().unwrap();
        assert_eq!(it.current().unwrap().path, "a/b/");
        it.advance_into().unwrap();
        assert_eq!(it.current().unwrap().path, "a/b/c");
    }

    #[test]
    fn conflicted_stages_are_skipped() {
        let idx = build(vec![
            IndexEntry::new("a", Mode::File, ObjectId::NULL),
            IndexEntry::conflicted("b", Mode::File, ObjectId::NULL, 1),
            IndexEntry::conflicted("b", Mode::File, ObjectId::NULL, 2),
            IndexEntry::new("c", Mode::File, ObjectId::NULL),
        ]);
        let mut it = IndexIter::new(idx, Flags::empty(), None, None);
        let mut paths = Vec::new();
        while let Some(e) = it.current() {
            paths.push(e.path.clone());
            it.advance().unwrap();
        }
        assert_eq!(paths, vec!["a", "c"]);
    }

    #[test]
    fn range_bounds_restrict_output() {
        let idx = build(vec![
            IndexEntry::new("a", Mode::File, ObjectId::NULL),
            IndexEntry::new("b/c", Mode::File, ObjectId::NULL),
            IndexEntry::new("b/d", Mode::File, ObjectId::NULL),
            IndexEntry::new("e", Mode::File, ObjectId::NULL),
        ]);
        let mut it = IndexIter::new(
            idx,
            Flags::INCLUDE_TREES,
            Some("b/".into()),
            Some("b/".into()),
        );
        let mut paths = Vec::new();
        while let Some(e) = it.current() {
            paths.push(e.path.clone());
            it.advance().unwrap();
        }
        assert_eq!(paths, vec!["b/", "b/c", "b/d"]);
    }
}
