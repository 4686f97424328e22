//! The filesystem directory-loader collaborator consumed by the workdir
//! iterator (C5): `dirload_with_stat` in the original design.

use std::fs;
use std::path::Path;

use crate::entry::Mode;
use crate::error::{Error, Result};
use crate::pathutil::strncasecmp;

/// One child of a directory, already classified to a [`Mode`].
///
/// Classification never reports `Mode::Tree` for a non-directory and
/// never needs to: the workdir iterator decides `Tree` vs. `Gitlink` for
/// directories itself, after consulting the submodule registry.
#[derive(Debug, Clone)]
pub struct WorkdirChild {
    /// The bare file name.
    pub name: String,
    /// Whether this child is a directory (before submodule collapse).
    pub is_dir: bool,
    /// The classified mode. For directories this is always `Mode::Tree`
    /// pending the submodule check; for everything else it is the
    /// file/executable/symlink classification, or `Mode::File` with a
    /// later "unsupported kind" flag for file types git has no model for
    /// (FIFOs, sockets, device nodes).
    pub mode: Mode,
    /// True for file kinds this platform has no model for (mode 0 in the
    /// original design); such entries are treated as ignored.
    pub unsupported: bool,
}

/// The directory-loading interface the workdir iterator consumes.
///
/// Implementations must return children already sorted under the
/// requested collation -- this crate's default implementation sorts
/// using the same full-string `strncasecmp` comparator `Tree::new` uses
/// for tree entries, so the three traversals stay observably identical.
pub trait DirLoader: Send + Sync {
    /// Lists the immediate children of `dir`, sorted under `ignore_case`.
    fn load(&self, dir: &Path, ignore_case: bool) -> Result<Vec<WorkdirChild>>;
}

/// The default [`DirLoader`], backed by `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDirLoader;

impl DirLoader for StdDirLoader {
    fn load(&self, dir: &Path, ignore_case: bool) -> Result<Vec<WorkdirChild>> {
        let read_dir = fs::read_dir(dir).map_err(|e| Error::os(dir, e))?;
        let mut children = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|e| Error::os(dir, e))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let meta = entry.metadata().map_err(|e| Error::os(entry.path(), e))?;
            let file_type = meta.file_type();

            let (is_dir, mode, unsupported) = if file_type.is_symlink() {
                (false, Mode::Symlink, false)
            } else if file_type.is_dir() {
                (true, Mode::Tree, false)
            } else if file_type.is_file() {
                (false, classify_regular_file(&meta), false)
            } else {
                (false, Mode::File, true)
            };

            children.push(WorkdirChild { name, is_dir, mode, unsupported });
        }

        children.sort_by(|a, b| {
            if ignore_case {
                strncasecmp(&a.name, &b.name).then_with(|| a.name.cmp(&b.name))
            } else {
                a.name.cmp(&b.name)
            }
        });
        Ok(children)
    }
}

#[cfg(unix)]
fn classify_regular_file(meta: &fs::Metadata) -> Mode {
    use std::os::unix::fs::PermissionsExt;
    if meta.permissions().mode() & 0o111 != 0 {
        Mode::Executable
    } else {
        Mode::File
    }
}

#[cfg(not(unix))]
fn classify_regular_file(_meta: &fs::Metadata) -> Mode {
    Mode::File
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs as stdfs;

    #[test]
    fn loads_and_sorts_children() {
        let dir = tempfile::tempdir().unwrap();
        stdfs::write(dir.path().join("b.txt"), b"").unwrap();
        stdfs::write(dir.path().join("a.txt"), b"").unwrap();
        stdfs::create_dir(dir.path().join("sub")).unwrap();

        let children = StdDirLoader.load(dir.path(), false).unwrap();
        let names: Vec<_> = children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "sub"]);
        assert!(children.iter().find(|c| c.name == "sub").unwrap().is_dir);
    }

    #[test]
    fn sorts_prefix_sibling_names_lexicographically() {
        let dir = tempfile::tempdir().unwrap();
        stdfs::write(dir.path().join("abc"), b"").unwrap();
        stdfs::write(dir.path().join("ab"), b"").unwrap();

        let children = StdDirLoader.load(dir.path(), false).unwrap();
        let names: Vec<_> = children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["ab", "abc"]);
    }

    #[cfg(unix)]
    #[test]
    fn detects_executable_bit() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.sh");
        stdfs::write(&path, b"#!/bin/sh\n").unwrap();
        let mut perms = stdfs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        stdfs::set_permissions(&path, perms).unwrap();

        let children = StdDirLoader.load(dir.path(), false).unwrap();
        assert_eq!(children[0].mode, Mode::Executable);
    }
}
