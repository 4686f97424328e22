//! Construction-time flags shared by every concrete iterator.

use bitflags::bitflags;

bitflags! {
    /// Bitmask of construction-time options.
    ///
    /// `IGNORE_CASE` and `DO_NOT_IGNORE_CASE` are mutually exclusive in
    /// intent (see [`Flags::resolve_ignore_case`]); setting both is not
    /// rejected, but `IGNORE_CASE` wins, matching "explicit flag beats
    /// inherited default" priority described for case-folding policy.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Flags: u32 {
        /// Force case-insensitive path comparison regardless of what the
        /// repository's index would otherwise select.
        const IGNORE_CASE = 0b0001;
        /// Force case-sensitive path comparison regardless of what the
        /// repository's index would otherwise select.
        const DO_NOT_IGNORE_CASE = 0b0010;
        /// Yield directory entries themselves (once, before descent)
        /// instead of silently flattening them away.
        const INCLUDE_TREES = 0b0100;
        /// Disable auto-expansion: `advance` never enters a directory on
        /// its own; the caller must call `advance_into` explicitly.
        /// Implies `INCLUDE_TREES`.
        const SUPPRESS_AUTO_EXPAND = 0b1000;
    }
}

impl Default for Flags {
    fn default() -> Self {
        Flags::empty()
    }
}

impl Flags {
    /// Whether directories should be yielded as entries in their own
    /// right (as opposed to being transparently flattened).
    pub fn include_trees(self) -> bool {
        self.contains(Flags::INCLUDE_TREES) || self.contains(Flags::SUPPRESS_AUTO_EXPAND)
    }

    /// Whether `advance` should auto-descend into directories.
    pub fn auto_expand(self) -> bool {
        !self.contains(Flags::SUPPRESS_AUTO_EXPAND)
    }

    /// Resolves the effective case-folding policy given an inherited
    /// repository default (e.g. the index's own `ignore_case` attribute).
    pub fn resolve_ignore_case(self, inherited_default: bool) -> bool {
        if self.contains(Flags::IGNORE_CASE) {
            true
        } else if self.contains(Flags::DO_NOT_IGNORE_CASE) {
            false
        } else {
            inherited_default
        }
    }
}
