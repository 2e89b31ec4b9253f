//! Logical deletion markers
//!
//! A tombstoned id stays in the vector store and metadata table until the
//! next compaction; search simply skips it. The set carries its own lock so
//! deletes never contend with searches on the store lock.

use parking_lot::RwLock;
use std::collections::HashSet;

/// Set of ids marked for deletion but not yet physically removed
#[derive(Debug, Default)]
pub struct TombstoneSet {
    ids: RwLock<HashSet<String>>,
}

impl TombstoneSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark ids as deleted, returns how many were not already marked
    pub fn mark<I, S>(&self, ids: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = self.ids.write();
        let mut newly_marked = 0;
        for id in ids {
            if set.insert(id.into()) {
                newly_marked += 1;
            }
        }
        newly_marked
    }

    pub fn is_tombstoned(&self, id: &str) -> bool {
        self.ids.read().contains(id)
    }

    /// Drain the set, returning every id that was marked
    pub fn clear(&self) -> Vec<String> {
        self.ids.write().drain().collect()
    }

    /// Copy of the current markers
    pub fn snapshot(&self) -> HashSet<String> {
        self.ids.read().clone()
    }

    /// Remove exactly `ids`, leaving markers added since a snapshot in place
    pub fn remove_all<'a, I>(&self, ids: I) -> usize
    where
        I: IntoIterator<Item = &'a String>,
    {
        let mut set = self.ids.write();
        ids.into_iter().filter(|id| set.remove(id.as_str())).count()
    }

    /// Run `f` with a read guard held, for checking many ids at once
    pub fn with_read<R>(&self, f: impl FnOnce(&HashSet<String>) -> R) -> R {
        f(&self.ids.read())
    }

    pub fn len(&self) -> usize {
        self.ids.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_counts_only_new_ids() {
        let tombstones = TombstoneSet::new();
        assert_eq!(tombstones.mark(["a", "b"]), 2);
        assert_eq!(tombstones.mark(["b", "c"]), 1);
        assert_eq!(tombstones.mark(["a"]), 0);
        assert_eq!(tombstones.len(), 3);
    }

    #[test]
    fn test_mark_duplicates_in_one_call() {
        let tombstones = TombstoneSet::new();
        assert_eq!(tombstones.mark(vec!["x".to_string(), "x".to_string()]), 1);
    }

    #[test]
    fn test_is_tombstoned() {
        let tombstones = TombstoneSet::new();
        tombstones.mark(["gone"]);
        assert!(tombstones.is_tombstoned("gone"));
        assert!(!tombstones.is_tombstoned("here"));
    }

    #[test]
    fn test_clear_drains() {
        let tombstones = TombstoneSet::new();
        tombstones.mark(["a", "b"]);

        let mut drained = tombstones.clear();
        drained.sort();
        assert_eq!(drained, vec!["a".to_string(), "b".to_string()]);
        assert!(tombstones.is_empty());
        assert!(tombstones.clear().is_empty());
    }

    #[test]
    fn test_remove_all_keeps_later_marks() {
        let tombstones = TombstoneSet::new();
        tombstones.mark(["a", "b"]);
        let snapshot = tombstones.snapshot();

        tombstones.mark(["c"]);
        assert_eq!(tombstones.remove_all(snapshot.iter()), 2);
        assert!(tombstones.is_tombstoned("c"));
        assert_eq!(tombstones.len(), 1);
    }
}
