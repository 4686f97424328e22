//! A unified hierarchical iterator over the three filesystem-shaped
//! namespaces a content-addressed version-control system juggles: a
//! committed tree persisted in an object database, a flat staging index
//! held in memory, and a live working directory on the host filesystem.
//!
//! Each of the three is simple to walk on its own. The value this crate
//! provides is making all three traversals *observably indistinguishable*
//! to a caller written once against [`HierIter`]: identical lexicographic
//! path ordering (with a switchable case-folding collation), identical
//! directory expansion-vs-flattening semantics, identical range
//! restriction, identical behavior at boundaries (empty directories,
//! submodule nests, conflicted index stages, a path named like the
//! control metadata directory). Higher-level operations -- status
//! computation, diffing, checkout, merge-base walks -- can then be
//! written once against the shared contract and applied to any
//! combination of the three sources, including pairwise merge-walks that
//! require two iterators to advance in lockstep under the same ordering.
//!
//! # From the top
//!
//! [`HierIter`] is the single public iterator type; it is built from one
//! of four constructors ([`HierIter::for_nothing`],
//! [`HierIter::for_tree`], [`HierIter::for_index`],
//! [`HierIter::for_workdir`]) and exposes the same operations regardless
//! of which concrete source backs it. [`Entry`] is the uniform record
//! yielded at every step. [`Flags`] selects case-folding, whether
//! directories are yielded in their own right, and auto-expand vs.
//! explicit descent. [`Repository`] bundles the collaborators (an object
//! database, a submodule registry, a directory loader) an embedder
//! supplies.
//!
//! # Example
//!
//! ```
//! use pathwalk::{sources::{Index, IndexEntry}, Entry, Flags, HierIter, Mode, ObjectId};
//! use std::sync::Arc;
//!
//! let index = Arc::new(Index::new(
//!     vec![
//!         IndexEntry::new("src/a.c", Mode::File, ObjectId::NULL),
//!         IndexEntry::new("src/b.c", Mode::File, ObjectId::NULL),
//!     ],
//!     false,
//! ));
//!
//! let mut it = HierIter::for_index(index, Flags::INCLUDE_TREES, None, None);
//! let mut paths = Vec::new();
//! while let Some(Entry { path, .. }) = it.current() {
//!     paths.push(path.clone());
//!     it.advance().unwrap();
//! }
//! assert_eq!(paths, vec!["src/", "src/a.c", "src/b.c"]);
//! ```

#[cfg(doctest)]
doc_comment::doctest!("../README.md");

pub mod entry;
pub mod error;
pub mod flags;
pub mod iter;
pub mod pathutil;
pub mod range;
pub mod repository;
pub mod sources;

pub use entry::{Entry, Mode, ObjectId};
pub use error::{Error, Result};
pub use flags::Flags;
pub use iter::HierIter;
pub use repository::{Repository, RepositoryBuilder};
