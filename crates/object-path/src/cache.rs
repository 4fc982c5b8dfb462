//! Memoized resolutions, keyed by normalized path.

use std::collections::HashMap;

use dot_path::{Path, Step};

use crate::resolve::ResolvedStep;

/// Maps normalized paths to the concrete steps they last resolved to.
///
/// Keys are token sequences, not strings, so they are independent of whatever
/// delimiter and root symbol were configured when the entry was recorded.
/// Only successful resolutions are recorded (a failed by-value scan is never
/// cached), and invalidation is conservative: a dropped entry costs one
/// re-traversal, a stale one would return a wrong node.
#[derive(Debug, Clone, Default)]
pub(crate) struct ResolutionCache {
    entries: HashMap<Path, Vec<ResolvedStep>>,
}

impl ResolutionCache {
    pub fn lookup(&self, path: &[Step]) -> Option<&Vec<ResolvedStep>> {
        self.entries.get(path)
    }

    pub fn record(&mut self, path: Path, concrete: Vec<ResolvedStep>) {
        self.entries.insert(path, concrete);
    }

    pub fn remove(&mut self, path: &[Step]) {
        self.entries.remove(path);
    }

    pub fn contains(&self, path: &[Step]) -> bool {
        self.entries.contains_key(path)
    }

    /// Invalidation for a value written at `path` (non-empty): every entry at
    /// or under the written node, plus every by-value entry on the same parent
    /// container, since the element a selector matched may just have been
    /// overwritten.
    pub fn invalidate_write(&mut self, path: &[Step]) {
        let parent_len = path.len() - 1;
        self.entries.retain(|entry, _| {
            if starts_with(entry, path) {
                return false;
            }
            let by_value_sibling = entry.len() > parent_len
                && entry[..parent_len] == path[..parent_len]
                && entry[parent_len].is_select();
            !by_value_sibling
        });
    }

    /// Invalidation for a deletion at `path` (non-empty): everything at or
    /// under the parent container, since re-packing a sequence shifts the
    /// concrete index of every later sibling.
    pub fn invalidate_unset(&mut self, path: &[Step]) {
        let parent = &path[..path.len() - 1];
        self.entries.retain(|entry, _| !starts_with(entry, parent));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

fn starts_with(entry: &[Step], prefix: &[Step]) -> bool {
    entry.len() >= prefix.len() && entry[..prefix.len()] == *prefix
}
