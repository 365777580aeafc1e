//! Ordered set of record ids
//!
//! Shared storage for selection and expansion. Membership is O(1) and iteration
//! follows insertion order, which is what makes batch dispatch order
//! reproducible.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdSet {
    ids: IndexSet<String>,
}

impl IdSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of `id`, returning the new membership
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.ids.shift_remove(id) {
            false
        } else {
            self.ids.insert(id.to_string());
            true
        }
    }

    pub fn insert(&mut self, id: &str) -> bool {
        self.ids.insert(id.to_string())
    }

    pub fn remove(&mut self, id: &str) -> bool {
        self.ids.shift_remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Replace the whole set
    pub fn replace<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ids = ids.into_iter().map(Into::into).collect();
    }

    /// Add every id, keeping existing ones in place
    pub fn extend<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ids.extend(ids.into_iter().map(Into::into));
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Keep only ids accepted by `keep`, returning how many were dropped
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) -> usize {
        let before = self.ids.len();
        self.ids.retain(|id| keep(id));
        before - self.ids.len()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    /// Owned snapshot in insertion order
    pub fn to_vec(&self) -> Vec<String> {
        self.ids.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_is_involution() {
        let mut set = IdSet::new();
        assert!(set.toggle("a"));
        assert!(!set.toggle("a"));
        assert!(!set.contains("a"));
        assert!(set.is_empty());
    }

    #[test]
    fn test_insertion_order_survives_removal() {
        let mut set = IdSet::new();
        for id in ["c", "a", "b", "d"] {
            set.insert(id);
        }
        set.remove("a");
        assert_eq!(set.to_vec(), ["c", "b", "d"]);
    }

    #[test]
    fn test_retain_reports_dropped() {
        let mut set = IdSet::new();
        set.replace(["a", "b", "c"]);
        let dropped = set.retain(|id| id != "b");
        assert_eq!(dropped, 1);
        assert_eq!(set.to_vec(), ["a", "c"]);
    }
}
