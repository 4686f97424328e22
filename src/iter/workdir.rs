//! C5: the workdir iterator -- a recursive directory listing with ignore
//! integration and submodule collapsing.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use crate::entry::{Entry, Mode, ObjectId};
use crate::error::{Error, Result};
use crate::flags::Flags;
use crate::pathutil::{as_dir, is_dot_git, join, prefixcmp, prefixcmp_icase};
use crate::range::PathRange;
use crate::repository::Repository;
use crate::sources::{DirLoader, IgnoreStack, WorkdirChild};

/// The hard cap on frame-stack depth (§4.3); guards against runaway
/// recursion through symlink loops or pathological directory nesting.
const MAX_DEPTH: usize = 100;

/// One level of the workdir iterator's descent stack.
#[derive(Debug)]
struct WorkdirFrame {
    /// The directory's children, already sorted and with `.git` removed.
    children: Vec<WorkdirChild>,
    /// The absolute host path of the directory this frame lists.
    abs_dir: PathBuf,
    /// Length `self.path` was truncated to before this frame's directory
    /// component was appended; restored on pop.
    path_len_before: usize,
    /// Current child position.
    index: usize,
}

/// The workdir iterator (C5).
#[derive(Debug)]
pub struct WorkdirIter {
    repo: Repository,
    range: PathRange,
    flags: Flags,
    root: PathBuf,
    frames: Vec<WorkdirFrame>,
    path: String,
    ignore: Box<dyn IgnoreStack>,
    current: Option<Entry>,
    current_abs: Option<PathBuf>,
    current_is_dir: bool,
    is_ignored_cache: Option<bool>,
}

impl WorkdirIter {
    pub(crate) fn new(repo: Repository, flags: Flags, start: Option<String>, end: Option<String>) -> Result<Self> {
        let root = repo
            .workdir_root()
            .cloned()
            .ok_or_else(|| Error::Repository("workdir iterator requested on a bare repository".into()))?;
        let ignore_case = flags.resolve_ignore_case(repo.ignore_case_default());
        let range = PathRange::new(start, end, ignore_case);

        let mut ignore = repo.new_ignore_stack();
        ignore.push_dir(&root)?;

        let root_frame = if range.is_empty_range() {
            WorkdirFrame { children: Vec::new(), abs_dir: root.clone(), path_len_before: 0, index: 0 }
        } else {
            let children = Self::load_and_filter(repo.dir_loader(), &root, ignore_case)?;
            let index = Self::seek_index(&children, range.start(), ignore_case);
            WorkdirFrame { children, abs_dir: root.clone(), path_len_before: 0, index }
        };

        let mut it = WorkdirIter {
            repo,
            range,
            flags,
            root,
            frames: vec![root_frame],
            path: String::new(),
            ignore,
            current: None,
            current_abs: None,
            current_is_dir: false,
            is_ignored_cache: None,
        };

        it.normalize_position()?;
        Ok(it)
    }

    fn load_and_filter(loader: &std::sync::Arc<dyn DirLoader>, dir: &Path, ignore_case: bool) -> Result<Vec<WorkdirChild>> {
        let mut children = loader.load(dir, ignore_case)?;
        children.retain(|c| !is_dot_git(&c.name, ignore_case));
        Ok(children)
    }

    fn seek_index(children: &[WorkdirChild], start: Option<&str>, ignore_case: bool) -> usize {
        let start = match start {
            Some(s) if !s.is_empty() => s,
            _ => return 0,
        };
        let cmp: fn(&str, &str) -> Ordering = if ignore_case { prefixcmp_icase } else { prefixcmp };
        children.partition_point(|c| cmp(&c.name, start) == Ordering::Less)
    }

    pub(crate) fn current(&self) -> Option<&Entry> {
        self.current.as_ref()
    }

    pub(crate) fn range(&self) -> &PathRange {
        &self.range
    }

    pub(crate) fn at_end(&self) -> bool {
        match self.frames.last() {
            Some(top) => top.index >= top.children.len(),
            None => true,
        }
    }

    /// The absolute host path of the current entry, for the
    /// `current_workdir_path` auxiliary query.
    pub(crate) fn current_workdir_path(&self) -> Option<&Path> {
        self.current_abs.as_deref()
    }

    /// Whether the current entry is ignored, computed lazily and cached
    /// (§4.3); forced `true` for unsupported file kinds without
    /// consulting the ignore engine at all.
    pub(crate) fn current_is_ignored(&mut self) -> bool {
        if self.current.is_none() {
            return false;
        }
        if let Some(v) = self.is_ignored_cache {
            return v;
        }
        let ignored = match &self.current_abs {
            Some(abs) => self.ignore.is_ignored(abs, self.current_is_dir),
            None => false,
        };
        self.is_ignored_cache = Some(ignored);
        ignored
    }

    pub(crate) fn advance(&mut self) -> Result<()> {
        if self.at_end() {
            self.clear_current();
            return Ok(());
        }
        let descend = matches!(&self.current, Some(e) if e.mode.is_tree() && self.flags.auto_expand());
        if descend {
            match self.expand_dir() {
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
        self.expand_dir()?;
        self.normalize_position()
    }

    pub(crate) fn reset(&mut self, start: Option<String>, end: Option<String>) -> Result<()> {
        self.range.rebind(start, end);
        while self.frames.len() > 1 {
            self.frames.pop();
            self.ignore.pop_dir();
        }
        self.path.clear();

        if self.range.is_empty_range() {
            self.frames[0].children = Vec::new();
            self.frames[0].index = 0;
            self.clear_current();
            return Ok(());
        }

        let ignore_case = self.range.ignore_case();
        let children = Self::load_and_filter(self.repo.dir_loader(), &self.root, ignore_case)?;
        let index = Self::seek_index(&children, self.range.start(), ignore_case);
        self.frames[0] = WorkdirFrame { children, abs_dir: self.root.clone(), path_len_before: 0, index };

        self.normalize_position()
    }

    fn clear_current(&mut self) {
        self.current = None;
        self.current_abs = None;
        self.is_ignored_cache = None;
    }

    fn bump_top(&mut self) {
        if let Some(top) = self.frames.last_mut() {
            top.index += 1;
        }
    }

    /// Pops every frame (other than the root) that has been fully
    /// consumed, popping its matching ignore level and bumping the
    /// parent's index past the child it just finished.
    fn ascend(&mut self) {
        while self.frames.len() > 1 {
            let exhausted = {
                let top = self.frames.last().unwrap();
                top.index >= top.children.len()
            };
            if !exhausted {
                break;
            }
            let popped = self.frames.pop().unwrap();
            self.ignore.pop_dir();
            self.path.truncate(popped.path_len_before);
            if let Some(parent) = self.frames.last_mut() {
                parent.index += 1;
            }
        }
    }

    /// Loads the directory named by the current entry and pushes a new
    /// frame for it. Fails with `NotFound` (leaving all state untouched,
    /// no ignore level pushed) when the directory is empty.
    fn expand_dir(&mut self) -> Result<()> {
        if self.frames.len() >= MAX_DEPTH {
            return Err(Error::Repository(format!("workdir depth exceeded {} levels", MAX_DEPTH)));
        }

        let (name, abs_dir) = {
            let top = self.frames.last().ok_or_else(|| Error::Repository("workdir iterator has no current frame".into()))?;
            let child = top.children.get(top.index).ok_or(Error::NotFound)?;
            (child.name.clone(), top.abs_dir.join(&child.name))
        };

        tracing::trace!(path = %abs_dir.display(), "expanding workdir directory");

        let ignore_case = self.range.ignore_case();
        let children = Self::load_and_filter(self.repo.dir_loader(), &abs_dir, ignore_case)?;
        if children.is_empty() {
            return Err(Error::NotFound);
        }

        let path_len_before = self.path.len();
        let new_path = join(&self.path, &name);
        let dir_path = as_dir(&new_path);

        self.ignore.push_dir(&abs_dir)?;

        let start_in_frame =
            self.range.start().and_then(|s| s.strip_prefix(dir_path.as_str()).map(str::to_owned));
        let index = Self::seek_index(&children, start_in_frame.as_deref(), ignore_case);

        self.path = new_path;
        self.frames.push(WorkdirFrame { children, abs_dir, path_len_before, index });
        Ok(())
    }

    /// All frames above the root are discarded (popping their ignore
    /// levels) and the root's index is set past its last child.
    fn teleport_to_end(&mut self) {
        while self.frames.len() > 1 {
            self.frames.pop();
            self.ignore.pop_dir();
        }
        self.path.clear();
        let root = &mut self.frames[0];
        root.index = root.children.len();
    }

    fn materialize_current(&mut self) {
        let top = match self.frames.last() {
            Some(top) => top,
            None => {
                self.clear_current();
                return;
            }
        };
        let child = match top.children.get(top.index) {
            Some(c) => c,
            None => {
                self.clear_current();
                return;
            }
        };

        let rel_path = join(&self.path, &child.name);
        let abs_path = top.abs_dir.join(&child.name);

        let (mode, path) = if child.is_dir {
            match self.repo.submodules().lookup(&rel_path) {
                Some(_status) => (Mode::Gitlink, rel_path),
                None => (Mode::Tree, as_dir(&rel_path)),
            }
        } else {
            (child.mode, rel_path)
        };

        self.current_is_dir = child.is_dir;
        self.is_ignored_cache = if child.unsupported { Some(true) } else { None };
        self.current = Some(Entry::new(mode, ObjectId::NULL, path));
        self.current_abs = Some(abs_path);
    }

    /// Restores the invariant that `current` is either `None` (at end) or
    /// a single materialized entry within range, auto-descending through
    /// any directory this flag set says should be transparent (gitlinks
    /// are never descended, regardless of flags), and swallowing
    /// empty-directory descents along the way.
    fn normalize_position(&mut self) -> Result<()> {
        loop {
            self.ascend();
            if self.at_end() {
                self.clear_current();
                return Ok(());
            }
            self.materialize_current();
            let path = match &self.current {
                Some(e) => e.path.clone(),
                None => return Ok(()),
            };
            if self.range.is_past_end(&path) {
                self.teleport_to_end();
                self.clear_current();
                return Ok(());
            }
            let is_tree = self.current.as_ref().unwrap().mode.is_tree();
            if is_tree && !self.flags.include_trees() {
                match self.expand_dir() {
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

impl Drop for WorkdirIter {
    /// Guarantees the ignore-stack-balance invariant (Testable Property 7)
    /// across the iterator's full lifecycle: whatever levels remain --
    /// including the root level seeded in `new` -- are released.
    fn drop(&mut self) {
        while self.ignore.depth() > 0 {
            self.ignore.pop_dir();
        }
    }
}
