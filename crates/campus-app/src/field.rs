// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Typed field access for list-view records.
//!
//! Every screen declares a closed set of field paths. Filtering, sorting, and
//! column rendering all resolve values through [`Record::field`], so a nested
//! relation such as `Student.Class.name` is addressed by one declared path and
//! a missing intermediate object resolves to `None` instead of failing.

use std::fmt::{Debug, Display};
use std::hash::Hash;
use time::Date;
use time::macros::format_description;

use crate::SortSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Integer,
    Decimal,
    Bool,
    Date,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Decimal(f64),
    Bool(bool),
    Date(Date),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Text(_) => ValueKind::Text,
            Self::Integer(_) => ValueKind::Integer,
            Self::Decimal(_) => ValueKind::Decimal,
            Self::Bool(_) => ValueKind::Bool,
            Self::Date(_) => ValueKind::Date,
        }
    }

    /// String form used for search matching and plain-text rendering.
    pub fn display(&self) -> String {
        match self {
            Self::Text(value) => value.clone(),
            Self::Integer(value) => value.to_string(),
            Self::Decimal(value) => value.to_string(),
            Self::Bool(value) => value.to_string(),
            Self::Date(value) => value.to_string(),
        }
    }

    /// Converts this value to `kind`, or `None` when no lossless conversion
    /// exists. Text is trimmed before numeric, boolean, or date parsing.
    pub fn coerce_to(&self, kind: ValueKind) -> Option<Self> {
        if self.kind() == kind {
            return Some(self.clone());
        }

        match (self, kind) {
            (Self::Text(raw), kind) => Self::parse_as(raw, kind),
            (Self::Integer(value), ValueKind::Decimal) => Some(Self::Decimal(*value as f64)),
            (Self::Decimal(value), ValueKind::Integer) => decimal_to_integer(*value),
            (value, ValueKind::Text) => Some(Self::Text(value.display())),
            _ => None,
        }
    }

    pub fn parse_as(raw: &str, kind: ValueKind) -> Option<Self> {
        let trimmed = raw.trim();
        match kind {
            ValueKind::Text => Some(Self::Text(raw.to_owned())),
            ValueKind::Integer => match trimmed.parse::<i64>() {
                Ok(value) => Some(Self::Integer(value)),
                Err(_) => trimmed
                    .parse::<f64>()
                    .ok()
                    .and_then(decimal_to_integer),
            },
            ValueKind::Decimal => trimmed
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .map(Self::Decimal),
            ValueKind::Bool => match trimmed.to_ascii_lowercase().as_str() {
                "1" | "true" | "on" | "yes" => Some(Self::Bool(true)),
                "0" | "false" | "off" | "no" => Some(Self::Bool(false)),
                _ => None,
            },
            ValueKind::Date => Date::parse(trimmed, format_description!("[year]-[month]-[day]"))
                .ok()
                .map(Self::Date),
        }
    }
}

fn decimal_to_integer(value: f64) -> Option<FieldValue> {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Some(FieldValue::Integer(value as i64))
    } else {
        None
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Decimal(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Date> for FieldValue {
    fn from(value: Date) -> Self {
        Self::Date(value)
    }
}

/// A declared field path on one record type.
pub trait Field: Copy + Eq + Ord + Hash + Debug + 'static {
    const ALL: &'static [Self];

    fn path(self) -> &'static str;

    fn label(self) -> &'static str;

    fn kind(self) -> ValueKind;

    /// Resolves a dotted path to a declared field. Matching ignores ASCII case.
    fn parse(path: &str) -> Option<Self> {
        let path = path.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|field| field.path().eq_ignore_ascii_case(path))
    }
}

/// One row type managed by a [`crate::CollectionView`].
pub trait Record: Clone + Debug {
    type Id: Copy + Eq + Ord + Hash + Debug + Display;
    type Field: Field;
    type Patch: Clone + Debug;

    /// Nouns used in confirmation prompts and log fields.
    const SINGULAR: &'static str;
    const PLURAL: &'static str;

    fn id(&self) -> Self::Id;

    fn field(&self, field: Self::Field) -> Option<FieldValue>;

    /// Text fields the free-text search box scans.
    fn search_fields() -> &'static [Self::Field];

    fn default_sort() -> Option<SortSpec<Self::Field>> {
        None
    }

    fn apply_patch(&mut self, patch: &Self::Patch);
}
