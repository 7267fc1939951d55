use std::collections::BTreeSet;

use shared::domain::RecordId;

/// What a list view does with the selection when its query changes. The set
/// itself never prunes on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelectionPolicy {
    /// Selection survives paging, sorting and filtering.
    #[default]
    Persist,
    ClearOnQueryChange,
}

/// State of a tri-state "select all" checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    Unchecked,
    Indeterminate,
    Checked,
}

/// Selected record ids for bulk actions on one list view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: BTreeSet<RecordId>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `id` if absent, removes it if present. Returns whether it is now
    /// selected.
    pub fn toggle(&mut self, id: &RecordId) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.clone());
            true
        }
    }

    /// Replaces the selection with exactly `ids`.
    pub fn select_all<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = RecordId>,
    {
        self.ids = ids.into_iter().collect();
    }

    pub fn deselect(&mut self, id: &RecordId) -> bool {
        self.ids.remove(id)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn is_selected(&self, id: &RecordId) -> bool {
        self.ids.contains(id)
    }

    /// False for an empty `ids`.
    pub fn is_all_selected(&self, ids: &[RecordId]) -> bool {
        !ids.is_empty() && ids.iter().all(|id| self.ids.contains(id))
    }

    pub fn is_some_selected(&self, ids: &[RecordId]) -> bool {
        ids.iter().any(|id| self.ids.contains(id))
    }

    pub fn check_state(&self, ids: &[RecordId]) -> CheckState {
        if self.is_all_selected(ids) {
            CheckState::Checked
        } else if self.is_some_selected(ids) {
            CheckState::Indeterminate
        } else {
            CheckState::Unchecked
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> Vec<RecordId> {
        self.ids.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[&str]) -> Vec<RecordId> {
        raw.iter().map(|id| RecordId::from(*id)).collect()
    }

    #[test]
    fn toggle_is_its_own_inverse() {
        let mut selection = SelectionSet::new();
        selection.select_all(ids(&["a", "b"]));
        let before = selection.clone();

        for id in ids(&["a", "c"]) {
            selection.toggle(&id);
            selection.toggle(&id);
            assert_eq!(selection, before);
        }
    }

    #[test]
    fn select_all_replaces_previous_selection() {
        let mut selection = SelectionSet::new();
        selection.toggle(&RecordId::from("old"));

        let page = ids(&["a", "b", "c"]);
        selection.select_all(page.clone());

        assert!(selection.is_all_selected(&page));
        assert!(!selection.is_selected(&RecordId::from("old")));
        assert_eq!(selection.len(), 3);
    }

    #[test]
    fn clear_empties_the_set() {
        let mut selection = SelectionSet::new();
        selection.select_all(ids(&["a", "b"]));
        selection.clear();
        assert_eq!(selection.len(), 0);
        assert!(selection.is_empty());
    }

    #[test]
    fn empty_list_is_never_all_selected() {
        let selection = SelectionSet::new();
        assert!(!selection.is_all_selected(&[]));
        assert_eq!(selection.check_state(&[]), CheckState::Unchecked);
    }

    #[test]
    fn tri_state_header() {
        let page = ids(&["a", "b"]);
        let mut selection = SelectionSet::new();
        assert_eq!(selection.check_state(&page), CheckState::Unchecked);

        selection.toggle(&page[0]);
        assert!(selection.is_some_selected(&page));
        assert_eq!(selection.check_state(&page), CheckState::Indeterminate);

        selection.toggle(&page[1]);
        assert_eq!(selection.check_state(&page), CheckState::Checked);
    }

    #[test]
    fn selection_spans_pages() {
        let mut selection = SelectionSet::new();
        selection.toggle(&RecordId::from("page1-row"));
        let next_page = ids(&["page2-a", "page2-b"]);

        assert!(!selection.is_some_selected(&next_page));
        assert_eq!(selection.ids(), ids(&["page1-row"]));
    }
}
