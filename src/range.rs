//! C1: the path-range predicate shared by every concrete iterator.

use std::cmp::Ordering;

use crate::pathutil::{prefixcmp, prefixcmp_icase};

/// Uniform `start`/`end` bounding plus a case-selectable prefix
/// comparison, shared by all four concrete iterators.
///
/// `start` and `end` are inclusive path *prefixes*, not exact matches: a
/// path is in range when it is not ordered strictly before `start` and
/// not ordered strictly (by prefix comparison) after `end`.
#[derive(Debug, Clone)]
pub struct PathRange {
    start: Option<String>,
    end: Option<String>,
    ignore_case: bool,
}

impl PathRange {
    /// Builds a new range. `start`/`end` of `""` are treated as unbounded,
    /// the "empty string means no bound" convention used throughout this
    /// crate.
    pub fn new(start: Option<String>, end: Option<String>, ignore_case: bool) -> Self {
        let start = start.filter(|s| !s.is_empty());
        let end = end.filter(|s| !s.is_empty());
        PathRange { start, end, ignore_case }
    }

    /// The lower bound, if any.
    pub fn start(&self) -> Option<&str> {
        self.start.as_deref()
    }

    /// The upper bound, if any.
    pub fn end(&self) -> Option<&str> {
        self.end.as_deref()
    }

    /// Whether this range folds case in its comparisons.
    pub fn ignore_case(&self) -> bool {
        self.ignore_case
    }

    /// Three-way prefix comparison using the range's active collation.
    pub fn prefixcmp(&self, path: &str, prefix: &str) -> Ordering {
        if self.ignore_case {
            prefixcmp_icase(path, prefix)
        } else {
            prefixcmp(path, prefix)
        }
    }

    /// Whether `path` is not ordered strictly before `start`.
    pub fn at_or_after_start(&self, path: &str) -> bool {
        match &self.start {
            None => true,
            Some(start) => self.prefixcmp(path, start) != Ordering::Less,
        }
    }

    /// Whether `path` is ordered strictly (by prefix comparison) after
    /// `end` -- i.e. whether `path` is "past end".
    pub fn is_past_end(&self, path: &str) -> bool {
        match &self.end {
            None => false,
            Some(end) => self.prefixcmp(path, end) == Ordering::Greater,
        }
    }

    /// Whether `path` lies within `[start, end]`.
    pub fn contains(&self, path: &str) -> bool {
        self.at_or_after_start(path) && !self.is_past_end(path)
    }

    /// Whether the range is already empty by construction (`start > end`
    /// under the active collation), in which case an iterator built from
    /// it must report `at_end()` immediately.
    pub fn is_empty_range(&self) -> bool {
        match (&self.start, &self.end) {
            (Some(start), Some(end)) => self.prefixcmp(start, end) == Ordering::Greater,
            _ => false,
        }
    }

    /// Rebinds this range with new bounds, keeping the collation.
    pub fn rebind(&mut self, start: Option<String>, end: Option<String>) {
        self.start = start.filter(|s| !s.is_empty());
        self.end = end.filter(|s| !s.is_empty());
    }
}
