//! The repository handle: the bundle of collaborators and configuration
//! the tree, index and workdir iterators are constructed against.
//!
//! This mirrors the common split between immutable per-run options and
//! the handles/context a walk needs: here, the "options" are the
//! inherited `ignore_case` default plus the workdir root, and the
//! "context" is the set of collaborator trait objects.

use std::path::PathBuf;
use std::sync::Arc;

use crate::sources::{DirLoader, IgnoreStack, ObjectDatabase, StdDirLoader, SubmoduleRegistry};

/// A handle bundling the collaborators an iterator needs, plus the
/// inherited case-folding default (the repository index's own
/// `ignore_case` attribute in the original design).
#[derive(Clone)]
pub struct Repository {
    inner: Arc<RepositoryInner>,
}

struct RepositoryInner {
    odb: Option<Arc<dyn ObjectDatabase>>,
    submodules: Arc<dyn SubmoduleRegistry>,
    dir_loader: Arc<dyn DirLoader>,
    workdir_root: Option<PathBuf>,
    ignore_case_default: bool,
}

impl Repository {
    /// Starts building a repository handle. `ignore_case_default` is
    /// the value inherited by iterators that don't pass an explicit
    /// `IGNORE_CASE`/`DO_NOT_IGNORE_CASE` flag.
    pub fn builder(ignore_case_default: bool) -> RepositoryBuilder {
        RepositoryBuilder {
            odb: None,
            submodules: None,
            dir_loader: None,
            workdir_root: None,
            ignore_case_default,
        }
    }

    pub(crate) fn odb(&self) -> Option<&Arc<dyn ObjectDatabase>> {
        self.inner.odb.as_ref()
    }

    pub(crate) fn submodules(&self) -> &Arc<dyn SubmoduleRegistry> {
        &self.inner.submodules
    }

    pub(crate) fn dir_loader(&self) -> &Arc<dyn DirLoader> {
        &self.inner.dir_loader
    }

    /// The working directory root, if this repository is not bare.
    pub fn workdir_root(&self) -> Option<&PathBuf> {
        self.inner.workdir_root.as_ref()
    }

    /// The inherited case-folding default.
    pub fn ignore_case_default(&self) -> bool {
        self.inner.ignore_case_default
    }

    /// A fresh [`IgnoreStack`] for a new workdir traversal.
    pub(crate) fn new_ignore_stack(&self) -> Box<dyn IgnoreStack> {
        Box::new(crate::sources::GitignoreStack::new())
    }
}

/// Builds a [`Repository`] handle.
pub struct RepositoryBuilder {
    odb: Option<Arc<dyn ObjectDatabase>>,
    submodules: Option<Arc<dyn SubmoduleRegistry>>,
    dir_loader: Option<Arc<dyn DirLoader>>,
    workdir_root: Option<PathBuf>,
    ignore_case_default: bool,
}

impl RepositoryBuilder {
    /// Attaches an object database, required for `for_tree`.
    pub fn odb(mut self, odb: Arc<dyn ObjectDatabase>) -> Self {
        self.odb = Some(odb);
        self
    }

    /// Attaches a submodule registry; defaults to an empty one (nothing
    /// is a submodule) when omitted.
    pub fn submodules(mut self, submodules: Arc<dyn SubmoduleRegistry>) -> Self {
        self.submodules = Some(submodules);
        self
    }

    /// Attaches a directory loader; defaults to [`StdDirLoader`] when
    /// omitted.
    pub fn dir_loader(mut self, dir_loader: Arc<dyn DirLoader>) -> Self {
        self.dir_loader = Some(dir_loader);
        self
    }

    /// Sets the working directory root, required for `for_workdir`.
    pub fn workdir_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.workdir_root = Some(root.into());
        self
    }

    /// Finishes construction.
    pub fn build(self) -> Repository {
        Repository {
            inner: Arc::new(RepositoryInner {
                odb: self.odb,
                submodules: self
                    .submodules
                    .unwrap_or_else(|| Arc::new(crate::sources::InMemorySubmoduleRegistry::new())),
                dir_loader: self.dir_loader.unwrap_or_else(|| Arc::new(StdDirLoader)),
                workdir_root: self.workdir_root,
                ignore_case_default: self.ignore_case_default,
            }),
        }
    }
}
