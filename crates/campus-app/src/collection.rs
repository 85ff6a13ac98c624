// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Derived-state controller shared by every list screen.
//!
//! A [`CollectionView`] owns the raw record set loaded from the API together
//! with the screen's [`ViewState`]. Every transition recomputes the visible
//! projection as `sort(filter(raw, search, filters), sort)` and then narrows
//! the selection to the ids that remain visible, so the selection is always a
//! subset of both the visible ids and the raw ids.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

use crate::{
    Field, FilterSpec, FilterValue, Record, SearchSpec, Selection, SortSpec, compare, matches,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Table,
    Grid,
}

impl ViewMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Grid => "grid",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "table" => Some(Self::Table),
            "grid" => Some(Self::Grid),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewState<F, Id: Ord> {
    pub search: SearchSpec,
    pub filters: FilterSpec<F>,
    pub sort: Option<SortSpec<F>>,
    pub selection: Selection<Id>,
    pub view_mode: ViewMode,
}

impl<F: Field, Id: Ord + Copy> ViewState<F, Id> {
    pub fn new(sort: Option<SortSpec<F>>) -> Self {
        Self {
            search: SearchSpec::default(),
            filters: FilterSpec::default(),
            sort,
            selection: Selection::default(),
            view_mode: ViewMode::Table,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CollectionView<R: Record> {
    pub(crate) records: Vec<R>,
    pub(crate) state: ViewState<R::Field, R::Id>,
    visible: Vec<usize>,
}

impl<R: Record> Default for CollectionView<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> CollectionView<R> {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            state: ViewState::new(R::default_sort()),
            visible: Vec::new(),
        }
    }

    pub fn with_view_mode(mut self, view_mode: ViewMode) -> Self {
        self.state.view_mode = view_mode;
        self
    }

    pub fn load(&mut self, records: Vec<R>) {
        debug!(kind = R::PLURAL, count = records.len(), "loaded records");
        self.records = records;
        self.recompute();
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: R::Id) -> Option<&R> {
        self.records.iter().find(|record| record.id() == id)
    }

    pub fn view_state(&self) -> &ViewState<R::Field, R::Id> {
        &self.state
    }

    pub fn selection(&self) -> &Selection<R::Id> {
        &self.state.selection
    }

    pub fn sort(&self) -> Option<SortSpec<R::Field>> {
        self.state.sort
    }

    pub fn view_mode(&self) -> ViewMode {
        self.state.view_mode
    }

    /// The render-ready projection.
    pub fn visible(&self) -> Vec<&R> {
        self.visible
            .iter()
            .map(|index| &self.records[*index])
            .collect()
    }

    pub fn visible_ids(&self) -> Vec<R::Id> {
        self.visible
            .iter()
            .map(|index| self.records[*index].id())
            .collect()
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    /// No search, no filters, default sort, empty selection, table view.
    pub fn is_idle(&self) -> bool {
        self.state.search.is_empty()
            && self.state.filters.is_empty()
            && self.state.sort == R::default_sort()
            && self.state.selection.is_empty()
            && self.state.view_mode == ViewMode::Table
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.state.search = SearchSpec::new(term);
        self.recompute();
    }

    pub fn set_filter(&mut self, field: R::Field, value: FilterValue) {
        if self.state.filters.set(field, value) {
            self.recompute();
        }
    }

    /// Filter entry point for raw dropdown input. Unknown paths are ignored;
    /// returns whether the path named a declared field.
    pub fn set_filter_path(&mut self, path: &str, raw: &str) -> bool {
        let Some(field) = R::Field::parse(path) else {
            debug!(kind = R::PLURAL, path, "ignoring filter on undeclared field");
            return false;
        };
        self.set_filter(field, FilterValue::parse_for(field, raw));
        true
    }

    pub fn clear_filters(&mut self) {
        self.state.filters.clear();
        self.recompute();
    }

    /// Flips direction when `key` is already active, otherwise sorts
    /// ascending by `key`.
    pub fn set_sort(&mut self, key: R::Field) {
        self.state.sort = Some(SortSpec::toggled(self.state.sort, key));
        self.recompute();
    }

    pub fn set_sort_path(&mut self, path: &str) -> bool {
        let Some(field) = R::Field::parse(path) else {
            debug!(kind = R::PLURAL, path, "ignoring sort on undeclared field");
            return false;
        };
        self.set_sort(field);
        true
    }

    pub fn set_view_mode(&mut self, view_mode: ViewMode) {
        self.state.view_mode = view_mode;
    }

    pub fn toggle_view_mode(&mut self) -> ViewMode {
        self.state.view_mode = match self.state.view_mode {
            ViewMode::Table => ViewMode::Grid,
            ViewMode::Grid => ViewMode::Table,
        };
        self.state.view_mode
    }

    /// Only visible rows can be selected. Returns whether `id` is selected
    /// afterwards.
    pub fn toggle_selection(&mut self, id: R::Id) -> bool {
        if !self.is_visible(id) {
            return false;
        }
        self.state.selection.toggle(id)
    }

    pub fn select_all_visible(&mut self) {
        let visible = self.visible_ids();
        self.state.selection.select_all(&visible);
    }

    pub fn clear_selection(&mut self) {
        self.state.selection.clear();
    }

    /// Merges `patch` into the record with `id`. An absent id is a silent
    /// no-op reported as `false`.
    pub fn update_record(&mut self, id: R::Id, patch: &R::Patch) -> bool {
        let Some(record) = self.records.iter_mut().find(|record| record.id() == id) else {
            debug!(kind = R::PLURAL, %id, "update skipped; record not loaded");
            return false;
        };
        record.apply_patch(patch);
        self.recompute();
        true
    }

    pub fn remove_record(&mut self, id: R::Id) -> bool {
        self.remove_records(&[id]) == 1
    }

    /// Returns how many records were removed.
    pub fn remove_records(&mut self, ids: &[R::Id]) -> usize {
        let targets: BTreeSet<R::Id> = ids.iter().copied().collect();
        let before = self.records.len();
        self.records.retain(|record| !targets.contains(&record.id()));
        let removed = before - self.records.len();
        if removed > 0 {
            self.recompute();
        }
        removed
    }

    pub(crate) fn position(&self, id: R::Id) -> Option<usize> {
        self.records.iter().position(|record| record.id() == id)
    }

    fn is_visible(&self, id: R::Id) -> bool {
        self.visible
            .iter()
            .any(|index| self.records[*index].id() == id)
    }

    pub(crate) fn recompute(&mut self) {
        let records = &self.records;
        let search = &self.state.search;
        let filters = &self.state.filters;

        let mut visible: Vec<usize> = (0..records.len())
            .filter(|index| matches(&records[*index], search, filters))
            .collect();
        if let Some(sort) = &self.state.sort {
            visible.sort_by(|left, right| compare(&records[*left], &records[*right], sort));
        }

        let dropped = self
            .state
            .selection
            .prune(visible.iter().map(|index| records[*index].id()));
        if dropped > 0 {
            debug!(kind = R::PLURAL, dropped, "selection narrowed to visible rows");
        }
        self.visible = visible;
    }
}
