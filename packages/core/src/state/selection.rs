//! Selection state for batch operations

use super::IdSet;
use serde::Serialize;

/// Tri-state of a "select all" checkbox over the currently visible ids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectAllState {
    None,
    Partial,
    All,
}

/// Ids currently selected for a batch operation
///
/// Cleared after every batch run, on explicit clear, and on collection refetch.
/// Otherwise it persists across tree rebuilds since it keys on record ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    ids: IdSet,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip selection of `id`, returning whether it is now selected
    pub fn toggle(&mut self, id: &str) -> bool {
        let selected = self.ids.toggle(id);
        tracing::trace!("Selection toggled for '{}': {}", id, selected);
        selected
    }

    /// Replace the selection with exactly `ids`
    pub fn select_all<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ids.replace(ids);
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Selected ids in the order they were selected
    pub fn ids(&self) -> Vec<String> {
        self.ids.to_vec()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter()
    }

    /// Drop selected ids that are not in `existing`
    pub fn retain<'a>(&mut self, existing: impl IntoIterator<Item = &'a str>) -> usize {
        let existing: std::collections::HashSet<&str> = existing.into_iter().collect();
        self.ids.retain(|id| existing.contains(id))
    }

    /// Checkbox state for a header "select all" over `visible_ids`
    pub fn select_all_state<'a>(
        &self,
        visible_ids: impl IntoIterator<Item = &'a str>,
    ) -> SelectAllState {
        let mut total = 0;
        let mut selected = 0;
        for id in visible_ids {
            total += 1;
            if self.ids.contains(id) {
                selected += 1;
            }
        }

        match selected {
            0 => SelectAllState::None,
            n if n == total => SelectAllState::All,
            _ => SelectAllState::Partial,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_twice_restores_membership() {
        let mut selection = SelectionState::new();
        selection.select_all(["a"]);

        assert!(!selection.toggle("a"));
        assert!(selection.toggle("a"));
        assert!(selection.is_selected("a"));

        assert!(selection.toggle("b"));
        assert!(!selection.toggle("b"));
        assert!(!selection.is_selected("b"));
    }

    #[test]
    fn test_select_all_then_clear() {
        let mut selection = SelectionState::new();
        selection.select_all(["a", "b", "c"]);
        assert_eq!(selection.len(), 3);

        selection.clear();
        for id in ["a", "b", "c", "d"] {
            assert!(!selection.is_selected(id));
        }
        assert!(selection.is_empty());
    }

    #[test]
    fn test_ids_follow_selection_order() {
        let mut selection = SelectionState::new();
        selection.toggle("c");
        selection.toggle("a");
        selection.toggle("b");
        assert_eq!(selection.ids(), ["c", "a", "b"]);
    }

    #[test]
    fn test_select_all_state() {
        let mut selection = SelectionState::new();
        let visible = ["a", "b"];

        assert_eq!(selection.select_all_state(visible), SelectAllState::None);
        selection.toggle("a");
        assert_eq!(selection.select_all_state(visible), SelectAllState::Partial);
        selection.toggle("b");
        assert_eq!(selection.select_all_state(visible), SelectAllState::All);
        // Hidden selections do not count
        selection.toggle("zzz");
        assert_eq!(selection.select_all_state(["a"]), SelectAllState::All);
    }

    #[test]
    fn test_select_all_state_with_nothing_visible() {
        let selection = SelectionState::new();
        assert_eq!(
            selection.select_all_state(std::iter::empty::<&str>()),
            SelectAllState::None
        );
    }
}
