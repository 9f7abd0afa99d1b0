//! Selection set manager
//!
//! A [`SelectionSet`] is the set of record ids the user has ticked, kept in
//! the order they were selected. It is always a subset of the visible
//! sequence: callers prune it every time that sequence is recomputed.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Insertion-ordered set of selected record ids
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionSet {
    ids: IndexSet<Uuid>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip one id; returns whether it is now selected
    pub fn toggle(&mut self, id: Uuid) -> bool {
        if self.ids.shift_remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    /// Select one id (no-op when already selected)
    pub fn select(&mut self, id: Uuid) {
        self.ids.insert(id);
    }

    /// Deselect one id; returns whether it was selected
    pub fn deselect(&mut self, id: &Uuid) -> bool {
        self.ids.shift_remove(id)
    }

    /// Replace the selection with exactly the visible ids
    pub fn set_all(&mut self, visible: &[Uuid]) {
        self.ids = visible.iter().copied().collect();
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Selected ids in selection order
    pub fn ids(&self) -> Vec<Uuid> {
        self.ids.iter().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Uuid> {
        self.ids.iter()
    }

    /// True iff the selection equals the whole, non-empty visible set
    pub fn is_all_selected(&self, visible: &[Uuid]) -> bool {
        !visible.is_empty()
            && self.ids.len() == visible.len()
            && visible.iter().all(|id| self.ids.contains(id))
    }

    /// True iff something is selected but not everything visible
    pub fn is_partially_selected(&self, visible: &[Uuid]) -> bool {
        !self.ids.is_empty() && !self.is_all_selected(visible)
    }

    /// Drop every id that is no longer visible and return the dropped ids
    pub fn prune(&mut self, visible: &[Uuid]) -> Vec<Uuid> {
        let visible: IndexSet<&Uuid> = visible.iter().collect();
        let dropped: Vec<Uuid> = self
            .ids
            .iter()
            .filter(|id| !visible.contains(id))
            .copied()
            .collect();
        if !dropped.is_empty() {
            self.ids.retain(|id| visible.contains(id));
        }
        dropped
    }

    /// The selection that results from `previous` once `visible` is recomputed
    pub fn reconcile(previous: &SelectionSet, visible: &[Uuid]) -> SelectionSet {
        let mut next = previous.clone();
        next.prune(visible);
        next
    }
}

impl FromIterator<Uuid> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = Uuid>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}
