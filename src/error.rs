//! The error type surfaced by the iterator core and its collaborators.

use std::path::PathBuf;

/// Errors produced by construction or traversal of a [`crate::HierIter`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Resource acquisition failed during construction, frame push, or
    /// path growth. The iterator remains in a consistent state; the
    /// affected call simply did not complete.
    #[error("allocation failed")]
    Allocation,

    /// Raised by `advance_into` / directory expansion when the directory
    /// exists but is empty. Auto-expand mode swallows this and treats the
    /// absent subtree as already exhausted; explicit mode surfaces it.
    #[error("directory has no entries to descend into")]
    NotFound,

    /// Wraps an underlying OS error (a filesystem walk, a stat call, ...),
    /// optionally tagged with the path that triggered it.
    #[error("OS error{}: {source}", path.as_ref().map(|p| format!(" for {}", p.display())).unwrap_or_default())]
    Os {
        /// The path the failing operation concerned, if known.
        path: Option<PathBuf>,
        /// The underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// A structural violation: a workdir iterator requested over a bare
    /// repository, or the working-directory depth cap was exceeded.
    #[error("repository error: {0}")]
    Repository(String),

    /// A disallowed configuration change, such as toggling case-folding
    /// on a non-empty iterator, or calling an unsupported operation
    /// (`seek` is not implemented by any concrete iterator; use `reset`).
    #[error("invalid operation: {0}")]
    Invalid(String),
}

impl Error {
    pub(crate) fn os(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Os { path: Some(path.into()), source }
    }

    pub(crate) fn os_bare(source: std::io::Error) -> Self {
        Error::Os { path: None, source }
    }
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::os_bare(source)
    }
}

/// The crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
