//! The ignore-file engine collaborator consumed by the workdir iterator
//! (C5), wrapping the `ignore` crate's gitignore matcher the way
//! `turborepo-scm` and `fdf` both reach for it rather than hand-rolling
//! `.gitignore` parsing.

use std::path::Path;

use ignore::gitignore::{Gitignore, GitignoreBuilder};

use crate::error::Result;

/// A directory-scoped accumulator of ignore rules.
///
/// `push_dir` is called once per directory entered (seeded once more for
/// the root), `pop_dir` once per directory exited; the workdir iterator
/// guarantees these stay balanced (Testable Property 7).
pub trait IgnoreStack: Send {
    /// Pushes the rules found in `dir` (an absolute, real path) onto the
    /// stack.
    fn push_dir(&mut self, dir: &Path) -> Result<()>;

    /// Pops the most recently pushed level.
    fn pop_dir(&mut self);

    /// Whether `abs_path` (an absolute, real filesystem path) is
    /// ignored, consulting levels from innermost (most recently pushed)
    /// to outermost. `ignore`'s matchers are rooted at an absolute
    /// directory, so lookups use the absolute path rather than one
    /// relative to the iteration root.
    fn is_ignored(&self, abs_path: &Path, is_dir: bool) -> bool;

    /// Current stack depth, for the ignore-stack-balance invariant.
    fn depth(&self) -> usize;
}

/// The default [`IgnoreStack`], backed by one compiled [`Gitignore`]
/// matcher per pushed directory level.
#[derive(Default)]
pub struct GitignoreStack {
    levels: Vec<Option<Gitignore>>,
}

impl GitignoreStack {
    /// An empty stack.
    pub fn new() -> Self {
        Self::default()
    }
}

impl IgnoreStack for GitignoreStack {
    fn push_dir(&mut self, dir: &Path) -> Result<()> {
        let candidate = dir.join(".gitignore");
        let matcher = if candidate.is_file() {
            let mut builder = GitignoreBuilder::new(dir);
            // A malformed .gitignore shouldn't abort the whole traversal;
            // the real `ignore` crate surfaces per-line errors, which we
            // fold into "no rules from this level" rather than bubbling
            // up a hard traversal failure.
            if builder.add(&candidate).is_none() {
                builder.build().ok()
            } else {
                None
            }
        } else {
            None
        };
        self.levels.push(matcher);
        Ok(())
    }

    fn pop_dir(&mut self) {
        self.levels.pop();
    }

    fn is_ignored(&self, abs_path: &Path, is_dir: bool) -> bool {
        for level in self.levels.iter().rev() {
            let Some(matcher) = level else { continue };
            let m = matcher.matched(abs_path, is_dir);
            if m.is_ignore() {
                tracing::trace!(path = %abs_path.display(), "path ignored");
                return true;
            }
            if m.is_whitelist() {
                return false;
            }
        }
        false
    }

    fn depth(&self) -> usize {
        self.levels.len()
    }
}
