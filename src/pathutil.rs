//! Small free functions over `&str` paths.
//!
//! The original design treats these (plus `realloc`, which has no
//! analogue once paths are ordinary growable `String`s) as an external
//! collaborator. They're trivial enough in Rust that there's no value in
//! hiding them behind a trait; they're just functions.

use std::cmp::Ordering;

/// Case-sensitive three-way prefix comparison.
///
/// Compares `path` against `prefix` up to `prefix`'s length: `Ordering`
/// reflects whether `path` sorts before, within (i.e. starts with), or
/// after `prefix`. An empty `prefix` compares equal to everything (it
/// bounds nothing).
pub fn prefixcmp(path: &str, prefix: &str) -> Ordering {
    if prefix.is_empty() {
        return Ordering::Equal;
    }
    let plen = prefix.len();
    if path.len() < plen {
        path.cmp(&prefix[..path.len()])
    } else {
        path[..plen].cmp(prefix)
    }
}

/// Case-insensitive (ASCII) three-way prefix comparison. Non-ASCII bytes
/// compare byte-for-byte, matching git's own "ignore_case" behavior of
/// folding only the ASCII range.
pub fn prefixcmp_icase(path: &str, prefix: &str) -> Ordering {
    if prefix.is_empty() {
        return Ordering::Equal;
    }
    let plen = prefix.len();
    let probe = if path.len() < plen { path } else { &path[..plen] };
    strncasecmp(probe, prefix)
}

/// Case-insensitive (ASCII) whole-string comparison, folding only ASCII
/// letters -- the byte-for-byte analogue of C's `strncasecmp` extended to
/// the full strings rather than a fixed count.
pub fn strncasecmp(a: &str, b: &str) -> Ordering {
    let mut ai = a.bytes().map(|b| b.to_ascii_lowercase());
    let mut bi = b.bytes().map(|b| b.to_ascii_lowercase());
    loop {
        match (ai.next(), bi.next()) {
            (Some(x), Some(y)) => match x.cmp(&y) {
                Ordering::Equal => continue,
                other => return other,
            },
            (Some(_), None) => return Ordering::Greater,
            (None, Some(_)) => return Ordering::Less,
            (None, None) => return Ordering::Equal,
        }
    }
}

/// Joins a parent directory path and a child name with exactly one `/`.
pub fn join(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_owned()
    } else if parent.ends_with('/') {
        format!("{}{}", parent, child)
    } else {
        format!("{}/{}", parent, child)
    }
}

/// Ensures a path carries a trailing `/`.
pub fn as_dir(path: &str) -> String {
    if path.is_empty() || path.ends_with('/') {
        path.to_owned()
    } else {
        format!("{}/", path)
    }
}

/// Returns the length of the longest common prefix of `a` and `b`,
/// truncated backward to the nearest preceding `/` boundary (or 0).
///
/// Used by the index iterator to figure out how many of the previous
/// leaf's ancestor directories are still "open" relative to the new leaf.
pub fn common_dir_prefix_len(a: &str, b: &str) -> usize {
    let max = a.len().min(b.len());
    let mut common = 0;
    for (x, y) in a.bytes().zip(b.bytes()).take(max) {
        if x != y {
            break;
        }
        common += 1;
    }
    match a.as_bytes()[..common].iter().rposition(|&c| c == b'/') {
        Some(pos) => pos + 1,
        None => 0,
    }
}

/// Returns the last path component of `path` (the part after the final
/// `/`, or the whole string if there is none).
pub fn basename(path: &str) -> &str {
    let path = path.strip_suffix('/').unwrap_or(path);
    match path.rfind('/') {
        Some(pos) => &path[pos + 1..],
        None => path,
    }
}

/// Whether `name` (ignoring a possible trailing slash) equals `.git`
/// under the requested collation.
pub fn is_dot_git(name: &str, ignore_case: bool) -> bool {
    let trimmed = name.strip_suffix('/').unwrap_or(name);
    if ignore_case {
        strncasecmp(trimmed, ".git") == Ordering::Equal
    } else {
        trimmed == ".git"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixcmp_basics() {
        assert_eq!(prefixcmp("b/c", "b/"), Ordering::Equal);
        assert_eq!(prefixcmp("a", "b/"), Ordering::Less);
        assert_eq!(prefixcmp("c", "b/"), Ordering::Greater);
        assert_eq!(prefixcmp("anything", ""), Ordering::Equal);
    }

    #[test]
    fn prefixcmp_icase_folds_ascii() {
        assert_eq!(prefixcmp_icase("SRC/a.c", "src/"), Ordering::Equal);
        assert_eq!(prefixcmp_icase("Test/a.c", "src/"), Ordering::Greater);
    }

    #[test]
    fn common_dir_prefix_len_truncates_to_slash() {
        assert_eq!(common_dir_prefix_len("src/a.c", "src/b.c"), 4);
        assert_eq!(common_dir_prefix_len("src/a.c", "test/a.c"), 0);
        assert_eq!(common_dir_prefix_len("src/sub/a.c", "src/sub/b.c"), 8);
    }

    #[test]
    fn dot_git_detection() {
        assert!(is_dot_git(".git", false));
        assert!(is_dot_git(".git/", false));
        assert!(is_dot_git(".GIT", true));
        assert!(!is_dot_git(".GIT", false));
        assert!(!is_dot_git(".gitignore", false));
    }
}
