//! C3: the tree iterator -- a DFS over an object-database tree with a
//! frame stack and an optional case-insensitive secondary ordering.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::entry::{Entry, ObjectId};
use crate::error::{Error, Result};
use crate::flags::Flags;
use crate::pathutil::prefixcmp_icase;
use crate::range::PathRange;
use crate::repository::Repository;
use crate::sources::Tree;

/// One level of the tree iterator's descent stack.
#[derive(Debug)]
struct TreeFrame {
    /// The tree object this frame walks.
    tree: Arc<Tree>,
    /// The directory path this frame represents, trailing-slash
    /// terminated (empty for the root frame).
    dir_path: String,
    /// Length `self.path` was truncated to when this frame's directory
    /// component was appended; restored on pop.
    path_len_before: usize,
    /// Current child position, in *iteration* order (identity order when
    /// case-sensitive, translated through `icase_map` otherwise).
    index: usize,
    /// Case-insensitive secondary ordering: a stable permutation of
    /// `0..entrycount` mapping iteration position to on-disk index.
    icase_map: Option<Vec<usize>>,
}

impl TreeFrame {
    fn entrycount(&self) -> usize {
        self.tree.entrycount()
    }

    fn on_disk_index(&self) -> Option<usize> {
        if self.index >= self.entrycount() {
            return None;
        }
        Some(match &self.icase_map {
            Some(map) => map[self.index],
            None => self.index,
        })
    }
}

/// The tree iterator (C3).
#[derive(Debug)]
pub struct TreeIter {
    repo: Repository,
    range: PathRange,
    flags: Flags,
    frames: Vec<TreeFrame>,
    path: String,
    current: Option<Entry>,
}

impl TreeIter {
    pub(crate) fn new(
        repo: Repository,
        root_oid: ObjectId,
        flags: Flags,
        start: Option<String>,
        end: Option<String>,
    ) -> Result<Self> {
        let odb = repo
            .odb()
            .ok_or_else(|| Error::Repository("no object database attached".into()))?;
        let root_tree = odb.tree_lookup(root_oid)?;
        let ignore_case = flags.resolve_ignore_case(repo.ignore_case_default());
        let range = PathRange::new(start, end, ignore_case);

        let icase_map = ignore_case.then(|| Self::build_icase_map(&root_tree));
        let index = Self::frame_seek_start(&root_tree, range.start(), icase_map.as_deref(), ignore_case);

        let mut it = TreeIter {
            repo,
            range,
            flags,
            frames: vec![TreeFrame { tree: root_tree, dir_path: String::new(), path_len_before: 0, index, icase_map }],
            path: String::new(),
            current: None,
        };

        if it.range.is_empty_range() {
            it.teleport_to_end();
        } else {
            it.normalize_position()?;
        }
        Ok(it)
    }

    fn build_icase_map(tree: &Tree) -> Vec<usize> {
        let mut map: Vec<usize> = (0..tree.entrycount()).collect();
        map.sort_by(|&a, &b| tree.icmp(a, b));
        map
    }

    fn frame_seek_start(
        tree: &Tree,
        start: Option<&str>,
        icase_map: Option<&[usize]>,
        ignore_case: bool,
    ) -> usize {
        let start = match start {
            Some(s) if !s.is_empty() => s,
            _ => return 0,
        };
        match icase_map {
            Some(map) => map.partition_point(|&idx| {
                prefixcmp_icase(&tree.entry_by_index(idx).unwrap().filename, start) == Ordering::Less
            }),
            None => {
                debug_assert!(!ignore_case);
                tree.prefix_position(start)
            }
        }
    }

    pub(crate) fn current(&self) -> Option<&Entry> {
        self.current.as_ref()
    }

    pub(crate) fn range(&self) -> &PathRange {
        &self.range
    }

    pub(crate) fn at_end(&self) -> bool {
        match self.frames.last() {
            Some(top) => top.index >= top.entrycount(),
            None => true,
        }
    }

    /// The raw on-disk tree-entry backing the current position, for the
    /// `current_tree_entry` auxiliary query.
    pub(crate) fn current_tree_entry(&self) -> Option<&crate::sources::TreeEntry> {
        let top = self.frames.last()?;
        let idx = top.on_disk_index()?;
        top.tree.entry_by_index(idx)
    }

    /// Returns the tree object of the ancestor frame whose directory path
    /// equals `parent_path` (trailing slash optional), for the
    /// `current_parent_tree` auxiliary query.
    pub(crate) fn parent_tree(&self, parent_path: &str) -> Option<Arc<Tree>> {
        let wanted = crate::pathutil::as_dir(parent_path);
        let wanted = if parent_path.is_empty() { "" } else { wanted.as_str() };
        self.frames.iter().find(|f| f.dir_path == wanted).map(|f| f.tree.clone())
    }

    pub(crate) fn advance(&mut self) -> Result<()> {
        if self.at_end() {
            self.current = None;
            return Ok(());
        }
        let descend =
            matches!(&self.current, Some(e) if e.mode.is_tree() && self.flags.auto_expand());
        if descend {
            match self.expand_tree() {
                Ok(()) => {}
                Err(Error::NotFound) => self.bump_top(),
                Err(e) => return Err(e),
            }
        } else {
            self.bump_top();
        }
        self.normalize_position()
    }

    pub(crate) fn advance_into(&mut self) -> Result<()> {
        let is_tree = matches!(&self.current, Some(e) if e.mode.is_tree());
        if !is_tree {
            return Ok(());
        }
        self.expand_tree()?;
        self.normalize_position()
    }

    pub(crate) fn reset(&mut self, start: Option<String>, end: Option<String>) -> Result<()> {
        self.range.rebind(start, end);
        self.frames.truncate(1);
        self.path.clear();
        {
            let root = &mut self.frames[0];
            root.index = Self::frame_seek_start(
                &root.tree,
                self.range.start(),
                root.icase_map.as_deref(),
                self.range.ignore_case(),
            );
        }
        if self.range.is_empty_range() {
            self.teleport_to_end();
            self.current = None;
            return Ok(());
        }
        self.normalize_position()
    }

    fn bump_top(&mut self) {
        if let Some(top) = self.frames.last_mut() {
            top.index += 1;
        }
    }

    /// Pops every frame (other than the root) that has been fully
    /// consumed, bumping each parent's index past the child it just
    /// finished. The root frame is kept alive even when exhausted so
    /// `at_end` has something to consult.
    fn ascend(&mut self) {
        while self.frames.len() > 1 {
            let exhausted = {
                let top = self.frames.last().unwrap();
                top.index >= top.entrycount()
            };
            if !exhausted {
                break;
            }
            let popped = self.frames.pop().unwrap();
            self.path.truncate(popped.path_len_before);
            if let Some(parent) = self.frames.last_mut() {
                parent.index += 1;
            }
        }
    }

    /// Loads the tree named by the current entry and pushes a new frame
    /// for it. On success the new frame is positioned at the smallest
    /// child still within `[start, end]`. Fails with `NotFound` (and
    /// leaves all state exactly as it was) when the subtree is empty.
    fn expand_tree(&mut self) -> Result<()> {
        let (oid, filename) = {
            let top = self.frames.last().ok_or_else(|| {
                Error::Repository("tree iterator has no current frame".into())
            })?;
            let idx = top.on_disk_index().ok_or(Error::NotFound)?;
            let te = top.tree.entry_by_index(idx).unwrap();
            (te.oid, te.filename.clone())
        };

        tracing::trace!(filename = %filename, oid = %oid, "expanding tree entry");

        let odb = self
            .repo
            .odb()
            .ok_or_else(|| Error::Repository("no object database attached".into()))?;
        let child_tree = odb.tree_lookup(oid)?;

        let path_len_before = self.path.len();
        if !self.path.is_empty() {
            self.path.push('/');
        }
        self.path.push_str(&filename);
        let dir_path = format!("{}/", self.path);

        let ignore_case = self.range.ignore_case();
        let icase_map = ignore_case.then(|| Self::build_icase_map(&child_tree));

        let start_in_frame = self.range.start().and_then(|start| {
            start.strip_prefix(dir_path.as_str()).map(|rest| rest.to_owned())
        });

        let index = Self::frame_seek_start(&child_tree, start_in_frame.as_deref(), icase_map.as_deref(), ignore_case);

        if child_tree.entrycount() == 0 {
            self.path.truncate(path_len_before);
            return Err(Error::NotFound);
        }

        self.frames.push(TreeFrame { tree: child_tree, dir_path, path_len_before, index, icase_map });
        Ok(())
    }

    /// Restores the "teleport to end" state: every frame above the root
    /// is discarded and the root's index is set past its last child.
    fn teleport_to_end(&mut self) {
        self.frames.truncate(1);
        self.path.clear();
        let root = &mut self.frames[0];
        root.index = root.entrycount();
    }

    fn materialize_current(&mut self) {
        let top = match self.frames.last() {
            Some(top) => top,
            None => {
                self.current = None;
                return;
            }
        };
        let idx = match top.on_disk_index() {
            Some(idx) => idx,
            None => {
                self.current = None;
                return;
            }
        };
        let te = top.tree.entry_by_index(idx).unwrap();
        let mut path = self.path.clone();
        if !path.is_empty() {
            path.push('/');
        }
        path.push_str(&te.filename);
        if te.mode.is_tree() {
            path.push('/');
        }
        self.current = Some(Entry::new(te.mode, te.oid, path));
    }

    /// Restores the invariant that `current` is either `None` (at end) or
    /// a single materialized entry within range, auto-descending through
    /// any directory this flag set says should be transparent, and
    /// swallowing empty-directory descents along the way.
    fn normalize_position(&mut self) -> Result<()> {
        loop {
            self.ascend();
            if self.at_end() {
                self.current = None;
                return Ok(());
            }
            self.materialize_current();
            let path = match &self.current {
                Some(e) => e.path.clone(),
                None => return Ok(()),
            };
            if self.range.is_past_end(&path) {
                self.teleport_to_end();
                self.current = None;
                return Ok(());
            }
            let is_tree = self.current.as_ref().unwrap().mode.is_tree();
            if is_tree && !self.flags.include_trees() {
                match self.expand_tree() {
                    Ok(()) => continue,
                    Err(Error::NotFound) => {
                        self.bump_top();
                        continue;
                    }
                    Err(e) => return Err(e),
                }
            }
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{InMemoryObjectDatabase, TreeEntry};
    use std::sync::Arc;

    fn oid(byte: u8) -> ObjectId {
        let mut bytes = [0u8; 20];
        bytes[0] = byte;
        ObjectId::from_bytes(bytes)
    }

    fn repo_with(odb: InMemoryObjectDatabase) -> Repository {
        Repository::builder(false).odb(Arc::new(odb)).build()
    }

    /// tree: a, b/ (c/d? no -- nested), e; matches Scenario A's shape.
    fn scenario_a_repo() -> (Repository, ObjectId) {
        let mut odb = InMemoryObjectDatabase::new();
        let b_child = odb.insert_tree(oid(10), Tree::new(vec![TreeEntry::new("x", crate::entry::Mode::File, oid(11))]));
        let c_child = odb.insert_tree(
            oid(20),
            Tree::new(vec![TreeEntry::new("d", crate::entry::Mode::File, oid(21))]),
        );
        let root = odb.insert_tree(
            oid(1),
            Tree::new(vec![
                TreeEntry::new("a", crate::entry::Mode::File, oid(2)),
                TreeEntry::new("b", crate::entry::Mode::Tree, b_child),
                TreeEntry::new("c", crate::entry::Mode::Tree, c_child),
                TreeEntry::new("e", crate::entry::Mode::File, oid(3)),
            ]),
        );
        (repo_with(odb), root)
    }

    #[test]
    fn scenario_a_tree_range_with_include_trees() {
        let (repo, root) = scenario_a_repo();
        let mut it = TreeIter::new(
            repo,
            root,
            Flags::INCLUDE_TREES,
            Some("b/".into()),
            Some("c/".into()),
        )
        .unwrap();

        let mut paths = Vec::new();
        while let Some(e) = it.current() {
            paths.push(e.path.clone());
            it.advance().unwrap();
        }
        assert_eq!(paths, vec!["b/", "b/x", "c/", "c/d"]);
    }

    #[test]
    fn default_auto_expand_flattens_trees() {
        let (repo, root) = scenario_a_repo();
        let mut it = TreeIter::new(repo, root, Flags::empty(), None, None).unwrap();
        let mut paths = Vec::new();
        while let Some(e) = it.current() {
            paths.push(e.path.clone());
            it.advance().unwrap();
        }
        assert_eq!(paths, vec!["a", "b/x", "c/d", "e"]);
    }

    #[test]
    fn explicit_mode_requires_advance_into() {
        let mut odb = InMemoryObjectDatabase::new();
        let a_child = odb.insert_tree(
            oid(10),
            Tree::new(vec![
                TreeEntry::new("1", crate::entry::Mode::File, oid(11)),
                TreeEntry::new("2", crate::entry::Mode::File, oid(12)),
            ]),
        );
        let b_child = odb.insert_tree(oid(20), Tree::new(vec![TreeEntry::new("1", crate::entry::Mode::File, oid(21))]));
        let root = odb.insert_tree(
            oid(1),
            Tree::new(vec![
                TreeEntry::new("a", crate::entry::Mode::Tree, a_child),
                TreeEntry::new("b", crate::entry::Mode::Tree, b_child),
            ]),
        );
        let repo = repo_with(odb);
        let mut it = TreeIter::new(
            repo,
            root,
            Flags::INCLUDE_TREES | Flags::SUPPRESS_AUTO_EXPAND,
            None,
            None,
        )
        .unwrap();

        assert_eq!(it.current().unwrap().path, "a/");
        it.advance().unwrap();
        assert_eq!(it.current().unwrap().path, "b/");
        it.advance_into().unwrap();
        assert_eq!(it.current().unwrap().path, "b/1");
        it.advance().unwrap();
        assert!(it.at_end());
    }

    #[test]
    fn case_insensitive_tree_is_stably_ordered() {
        let mut odb = InMemoryObjectDatabase::new();
        let root = odb.insert_tree(
            oid(1),
            Tree::new(vec![
                TreeEntry::new("A", crate::entry::Mode::File, oid(2)),
                TreeEntry::new("B", crate::entry::Mode::File, oid(3)),
                TreeEntry::new("a", crate::entry::Mode::File, oid(4)),
                TreeEntry::new("b", crate::entry::Mode::File, oid(5)),
            ]),
        );
        let repo = repo_with(odb);
        let mut it = TreeIter::new(repo, root, Flags::IGNORE_CASE, None, None).unwrap();
        let mut paths = Vec::new();
        while let Some(e) = it.current() {
            paths.push(e.path.clone());
            it.advance().unwrap();
        }
        assert_eq!(paths, vec!["A", "a", "B", "b"]);
    }

    #[test]
    fn empty_tree_is_immediately_at_end() {
        let mut odb = InMemoryObjectDatabase::new();
        let root = odb.insert_tree(oid(1), Tree::new(vec![]));
        let repo = repo_with(odb);
        let it = TreeIter::new(repo, root, Flags::empty(), None, None).unwrap();
        assert!(it.at_end());
        assert!(it.current().is_none());
    }

    #[test]
    fn start_after_end_is_immediately_at_end() {
        let (repo, root) = scenario_a_repo();
        let it = TreeIter::new(repo, root, Flags::empty(), Some("z".into()), Some("a".into())).unwrap();
        assert!(it.at_end());
    }

    #[test]
    fn reset_matches_fresh_construction() {
        let (repo, root) = scenario_a_repo();
        let mut it = TreeIter::new(repo.clone(), root, Flags::INCLUDE_TREES, None, None).unwrap();
        it.advance().unwrap();
        it.advance().unwrap();
        it.reset(Some("b/".into()), Some("c/".into())).unwrap();

        let mut from_reset = Vec::new();
        while let Some(e) = it.current() {
            from_reset.push(e.path.clone());
            it.advance().unwrap();
        }

        let mut fresh = TreeIter::new(repo, root, Flags::INCLUDE_TREES, Some("b/".into()), Some("c/".into())).unwrap();
        let mut from_fresh = Vec::new();
        while let Some(e) = fresh.current() {
            from_fresh.push(e.path.clone());
            fresh.advance().unwrap();
        }

        assert_eq!(from_reset, from_fresh);
    }
}
