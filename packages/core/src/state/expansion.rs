//! Expand/collapse state for tree display

use super::IdSet;

/// Ids currently expanded
///
/// Persists across refetches. Ids never seen are collapsed. Changing it is
/// purely visual and never triggers a refetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionState {
    ids: IdSet,
}

impl ExpansionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip expansion of `id`, returning whether it is now expanded
    pub fn toggle(&mut self, id: &str) -> bool {
        self.ids.toggle(id)
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn expand(&mut self, id: &str) {
        self.ids.insert(id);
    }

    pub fn collapse(&mut self, id: &str) {
        self.ids.remove(id);
    }

    /// Replace the expanded set with exactly `ids`
    pub fn expand_all<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ids.replace(ids);
    }

    pub fn collapse_all(&mut self) {
        self.ids.clear();
    }

    /// Expand every ancestor so that a node becomes visible
    pub fn expand_path<I, S>(&mut self, ancestors: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ids.extend(ancestors);
    }

    /// Forget ids that no longer exist, returning how many were dropped
    pub fn prune<'a>(&mut self, existing: impl IntoIterator<Item = &'a str>) -> usize {
        let existing: std::collections::HashSet<&str> = existing.into_iter().collect();
        self.ids.retain(|id| existing.contains(id))
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
