// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeMap;

use crate::{Field, FieldValue, Record};

/// Sentinel spelling the filter dropdowns use for "no filter".
pub const ALL_SENTINEL: &str = "all";

#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    All,
    Equals(FieldValue),
}

impl FilterValue {
    /// Parses raw dropdown input for `field`. `all` and the empty string clear
    /// the filter; other input is coerced to the field's kind when possible and
    /// kept as text otherwise.
    pub fn parse_for<F: Field>(field: F, raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL_SENTINEL) {
            return Self::All;
        }
        match FieldValue::parse_as(raw, field.kind()) {
            Some(value) => Self::Equals(value),
            None => Self::Equals(FieldValue::text(raw)),
        }
    }

    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Equals(_))
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchSpec {
    term: String,
}

impl SearchSpec {
    pub fn new(term: impl Into<String>) -> Self {
        Self { term: term.into() }
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn is_empty(&self) -> bool {
        self.term.is_empty()
    }

    /// Passes when the term is empty or any of `R::search_fields()` contains
    /// it, ignoring case.
    pub fn matches<R: Record>(&self, record: &R) -> bool {
        if self.term.is_empty() {
            return true;
        }
        let needle = self.term.to_lowercase();
        R::search_fields().iter().any(|field| {
            record
                .field(*field)
                .map(|value| value.display().to_lowercase().contains(&needle))
                .unwrap_or(false)
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec<F> {
    entries: BTreeMap<F, FieldValue>,
}

impl<F> Default for FilterSpec<F> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<F: Field> FilterSpec<F> {
    /// Returns true when the stored filters changed.
    pub fn set(&mut self, field: F, value: FilterValue) -> bool {
        match value {
            FilterValue::All => self.entries.remove(&field).is_some(),
            FilterValue::Equals(value) => {
                self.entries.insert(field, value.clone()).as_ref() != Some(&value)
            }
        }
    }

    pub fn get(&self, field: F) -> FilterValue {
        match self.entries.get(&field) {
            Some(value) => FilterValue::Equals(value.clone()),
            None => FilterValue::All,
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn active(&self) -> impl Iterator<Item = (F, &FieldValue)> {
        self.entries.iter().map(|(field, value)| (*field, value))
    }

    /// Logical AND over every active entry.
    pub fn matches<R: Record<Field = F>>(&self, record: &R) -> bool {
        self.entries
            .iter()
            .all(|(field, expected)| value_matches(record.field(*field).as_ref(), expected))
    }
}

/// Exact equality after coercing `expected` to the kind of `actual`. A missing
/// value never matches an active filter.
pub fn value_matches(actual: Option<&FieldValue>, expected: &FieldValue) -> bool {
    let Some(actual) = actual else {
        return false;
    };
    match expected.coerce_to(actual.kind()) {
        Some(coerced) => *actual == coerced,
        None => false,
    }
}

pub fn matches<R: Record>(record: &R, search: &SearchSpec, filters: &FilterSpec<R::Field>) -> bool {
    search.matches(record) && filters.matches(record)
}
