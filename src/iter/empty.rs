//! C2: the empty iterator -- the shared zero-entry instance.

use crate::error::Result;
use crate::flags::Flags;
use crate::range::PathRange;

/// The iterator over nothing. Used as the degenerate case of `for_nothing`
/// and as the instance on which case-folding may still be mutated after
/// construction (§4.1): every other concrete iterator rejects that.
#[derive(Debug)]
pub struct EmptyIter {
    flags: Flags,
    range: PathRange,
}

impl EmptyIter {
    pub(crate) fn new(flags: Flags, start: Option<String>, end: Option<String>) -> Self {
        let ignore_case = flags.resolve_ignore_case(false);
        EmptyIter { flags, range: PathRange::new(start, end, ignore_case) }
    }

    pub(crate) fn current(&self) -> Option<&str> {
        None
    }

    pub(crate) fn range(&self) -> &PathRange {
        &self.range
    }

    pub(crate) fn advance(&mut self) -> Result<()> {
        Ok(())
    }

    pub(crate) fn advance_into(&mut self) -> Result<()> {
        Ok(())
    }

    pub(crate) fn at_end(&self) -> bool {
        true
    }

    pub(crate) fn reset(&mut self, start: Option<String>, end: Option<String>) -> Result<()> {
        let ignore_case = self.flags.resolve_ignore_case(false);
        self.range.rebind(start, end);
        self.range = PathRange::new(
            self.range.start().map(str::to_owned),
            self.range.end().map(str::to_owned),
            ignore_case,
        );
        Ok(())
    }

    /// This is the one concrete iterator allowed to change its
    /// case-folding after construction (§4.1): being genuinely empty,
    /// there is no sequence whose ordering the change could violate.
    pub(crate) fn set_ignore_case(&mut self, ignore_case: bool) {
        self.range = PathRange::new(
            self.range.start().map(str::to_owned),
            self.range.end().map(str::to_owned),
            ignore_case,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_always_at_end() {
        let mut it = EmptyIter::new(Flags::empty(), None, None);
        assert!(it.at_end());
        assert!(it.current().is_none());
        it.advance().unwrap();
        assert!(it.at_end());
        assert!(it.advance_into().is_ok());
    }
}
