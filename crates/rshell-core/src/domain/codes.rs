//! Success-code policy.
//!
//! Most commands exit with `0` on success, but some use non-zero codes for
//! well-defined non-error conditions (a pager interrupted by its reader exits
//! with `130`, for example). A session keeps a persistent set of accepted
//! codes; each call may add extra codes that only apply to that call.

use std::collections::BTreeSet;

/// The exit code every new code set starts with.
pub const DEFAULT_SUCCESS_CODE: i32 = 0;

/// Persistent set of exit codes treated as success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultCodes {
    codes: BTreeSet<i32>,
}

impl ResultCodes {
    /// Create the default set, `{0}`.
    pub fn new() -> Self {
        Self {
            codes: BTreeSet::from([DEFAULT_SUCCESS_CODE]),
        }
    }

    /// Add a code. Returns `false` if it was already present.
    pub fn add(&mut self, code: i32) -> bool {
        self.codes.insert(code)
    }

    /// Remove a code. Returns `false` if it was not present.
    pub fn remove(&mut self, code: i32) -> bool {
        self.codes.remove(&code)
    }

    /// Restore the default set.
    pub fn reset(&mut self) {
        self.codes.clear();
        self.codes.insert(DEFAULT_SUCCESS_CODE);
    }

    /// Whether `code` is accepted.
    pub fn contains(&self, code: i32) -> bool {
        self.codes.contains(&code)
    }

    /// Persistent codes merged with call-scoped extras.
    ///
    /// The returned set is a snapshot; `self` is left untouched.
    pub fn merged(&self, extra: &[i32]) -> BTreeSet<i32> {
        let mut merged = self.codes.clone();
        merged.extend(extra.iter().copied());
        merged
    }

    /// Snapshot of the persistent codes.
    pub fn snapshot(&self) -> BTreeSet<i32> {
        self.codes.clone()
    }
}

impl Default for ResultCodes {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_zero_only() {
        let codes = ResultCodes::new();
        assert_eq!(codes.snapshot(), BTreeSet::from([0]));
    }

    #[test]
    fn test_reset_after_add() {
        let mut codes = ResultCodes::new();
        assert!(codes.add(5));
        assert!(codes.contains(5));

        codes.reset();
        assert!(!codes.contains(5));
        assert_eq!(codes.snapshot(), BTreeSet::from([0]));
    }

    #[test]
    fn test_remove_default_code() {
        let mut codes = ResultCodes::new();
        assert!(codes.remove(0));
        assert!(!codes.remove(0));
        assert!(codes.snapshot().is_empty());
    }

    #[test]
    fn test_merged_does_not_persist_extras() {
        let codes = ResultCodes::new();
        let merged = codes.merged(&[130, 1]);
        assert_eq!(merged, BTreeSet::from([0, 1, 130]));
        assert!(!codes.contains(130));
    }
}
