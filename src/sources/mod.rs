//! External collaborators consumed by the iterator core: the object
//! database, the flat index, the ignore-file engine, the submodule
//! registry, and the directory loader.
//!
//! Each is specified here as a trait plus a default, self-contained
//! implementation. A real embedding application (an on-disk object
//! database, a parsed `.gitmodules`, ...) supplies its own.

pub mod dirload;
pub mod ignore_stack;
pub mod index;
pub mod odb;
pub mod submodule;

pub use dirload::{DirLoader, StdDirLoader, WorkdirChild};
pub use ignore_stack::{GitignoreStack, IgnoreStack};
pub use index::{Index, IndexEntry};
pub use odb::{InMemoryObjectDatabase, ObjectDatabase, Tree, TreeEntry};
pub use submodule::{InMemorySubmoduleRegistry, SubmoduleRegistry, SubmoduleStatus};
