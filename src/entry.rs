//! The uniform record type yielded by every concrete iterator, and the small
//! pieces of vocabulary (`Mode`, `ObjectId`) it is built from.

use std::fmt;

/// A content-addressed object identifier.
///
/// Real object databases hash blob/tree contents (typically with SHA-1 or
/// SHA-256); this crate treats the hash as an opaque, fixed-width byte
/// string so it doesn't have to pick a hash function on behalf of its
/// collaborators. The all-zero id is reserved for entries that have no
/// backing object yet: workdir files that haven't been hashed, and
/// synthetic directory entries.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; 20]);

impl ObjectId {
    /// The all-zero id used for un-hashed workdir entries and synthetic
    /// directories.
    pub const NULL: ObjectId = ObjectId([0; 20]);

    /// Builds an id from raw bytes.
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        ObjectId(bytes)
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Is this the null id?
    pub fn is_null(&self) -> bool {
        self.0 == [0; 20]
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        ObjectId::NULL
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// The kind of thing a path names.
///
/// This is the union of what all three backing sources can produce: trees
/// have `Tree`, indexes have everything except `Tree` (plus conflict
/// stages, modelled separately), working directories have everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// A regular, non-executable file (or a workdir file whose kind could
    /// not be determined, which is treated as ignored by the workdir
    /// iterator).
    File,
    /// A regular file with at least one executable bit set.
    Executable,
    /// A symbolic link.
    Symlink,
    /// A subdirectory: a tree in the committed-tree source, a synthetic
    /// grouping entry in the index source, or a real directory in the
    /// workdir source.
    Tree,
    /// A submodule reference ("gitlink"): a pointer to the head commit of
    /// another repository nested at this path. Never descended into.
    Gitlink,
}

impl Mode {
    /// Whether entries of this mode are directories that a caller might
    /// want to descend into via `advance_into`.
    pub fn is_tree(self) -> bool {
        matches!(self, Mode::Tree)
    }

    /// Whether this mode denotes a submodule reference.
    pub fn is_gitlink(self) -> bool {
        matches!(self, Mode::Gitlink)
    }
}

/// A single entry yielded by any of the concrete iterators.
///
/// `path` is always slash-separated and relative to the iteration root. It
/// carries a trailing `/` exactly when `mode` is `Mode::Tree` and the
/// caller asked to observe directories (`Flags::INCLUDE_TREES`); gitlinks
/// never carry a trailing slash, matching the "no descent, no directory
/// shape" semantics of a submodule reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// The kind of the entry.
    pub mode: Mode,
    /// The content id of the entry, or `ObjectId::NULL` if none is known.
    pub oid: ObjectId,
    /// The slash-separated path, relative to the iteration root.
    pub path: String,
}

impl Entry {
    pub(crate) fn new(mode: Mode, oid: ObjectId, path: String) -> Self {
        Entry { mode, oid, path }
    }
}
