// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeSet;

/// Interaction point that must approve destructive operations.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection<Id: Ord> {
    ids: BTreeSet<Id>,
}

impl<Id: Ord> Default for Selection<Id> {
    fn default() -> Self {
        Self {
            ids: BTreeSet::new(),
        }
    }
}

impl<Id: Ord + Copy> Selection<Id> {
    pub fn contains(&self, id: Id) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> Vec<Id> {
        self.ids.iter().copied().collect()
    }

    /// Returns whether `id` is selected afterwards.
    pub fn toggle(&mut self, id: Id) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    pub fn insert(&mut self, id: Id) {
        self.ids.insert(id);
    }

    /// Clears the selection when it already equals the whole visible set,
    /// otherwise selects exactly the visible set.
    pub fn select_all(&mut self, visible: &[Id]) {
        let visible: BTreeSet<Id> = visible.iter().copied().collect();
        if self.ids == visible {
            self.ids.clear();
        } else {
            self.ids = visible;
        }
    }

    /// Drops ids that are not in `existing`. Returns how many were dropped.
    pub fn prune<I>(&mut self, existing: I) -> usize
    where
        I: IntoIterator<Item = Id>,
    {
        let existing: BTreeSet<Id> = existing.into_iter().collect();
        let before = self.ids.len();
        self.ids.retain(|id| existing.contains(id));
        before - self.ids.len()
    }

    pub fn retain_visible(&mut self, visible: &[Id]) -> usize {
        self.prune(visible.iter().copied())
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Asks `confirm` before handing back every selected id in ascending
    /// order. A refused or empty selection is left untouched.
    pub fn bulk_remove<C>(&mut self, plural: &str, confirm: &mut C) -> Option<Vec<Id>>
    where
        C: Confirm + ?Sized,
    {
        if self.ids.is_empty() {
            return None;
        }
        let prompt = format!(
            "Are you sure you want to delete {} {plural}?",
            self.ids.len()
        );
        if !confirm.confirm(&prompt) {
            return None;
        }
        let removed = self.ids();
        self.ids.clear();
        Some(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::Selection;

    #[test]
    fn toggle_flips_membership() {
        let mut selection = Selection::default();
        assert!(selection.toggle(3));
        assert!(selection.contains(3));
        assert!(!selection.toggle(3));
        assert!(selection.is_empty());
    }

    #[test]
    fn select_all_twice_clears() {
        let mut selection = Selection::default();
        selection.select_all(&[1, 2, 3]);
        assert_eq!(selection.ids(), vec![1, 2, 3]);
        selection.select_all(&[3, 2, 1]);
        assert!(selection.is_empty());
    }

    #[test]
    fn select_all_with_partial_selection_selects_everything() {
        let mut selection = Selection::default();
        selection.toggle(2);
        selection.select_all(&[1, 2, 3]);
        assert_eq!(selection.ids(), vec![1, 2, 3]);
    }

    #[test]
    fn select_all_replaces_ids_outside_visible_set() {
        let mut selection = Selection::default();
        selection.toggle(9);
        selection.select_all(&[1, 2]);
        assert_eq!(selection.ids(), vec![1, 2]);
    }

    #[test]
    fn prune_drops_missing_ids() {
        let mut selection = Selection::default();
        selection.select_all(&[1, 2, 3]);
        let dropped = selection.prune([1, 3, 4]);
        assert_eq!(dropped, 1);
        assert_eq!(selection.ids(), vec![1, 3]);
    }

    #[test]
    fn bulk_remove_refused_keeps_selection() {
        let mut selection = Selection::default();
        selection.select_all(&[4, 5]);
        let mut prompts = Vec::new();
        let mut refuse = |prompt: &str| {
            prompts.push(prompt.to_owned());
            false
        };
        assert_eq!(selection.bulk_remove("applications", &mut refuse), None);
        assert_eq!(selection.ids(), vec![4, 5]);
        assert_eq!(
            prompts,
            vec!["Are you sure you want to delete 2 applications?".to_owned()]
        );
    }

    #[test]
    fn bulk_remove_accepted_returns_ids_and_clears() {
        let mut selection = Selection::default();
        selection.toggle(7);
        selection.toggle(2);
        let mut accept = |_: &str| true;
        assert_eq!(
            selection.bulk_remove("applications", &mut accept),
            Some(vec![2, 7])
        );
        assert!(selection.is_empty());
    }

    #[test]
    fn bulk_remove_on_empty_selection_does_not_prompt() {
        let mut selection: Selection<i64> = Selection::default();
        let mut asked = false;
        let mut confirm = |_: &str| {
            asked = true;
            true
        };
        assert_eq!(selection.bulk_remove("applications", &mut confirm), None);
        assert!(!asked);
    }
}
