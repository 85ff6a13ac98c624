// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::{Field, FieldValue, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub const fn arrow(self) -> &'static str {
        match self {
            Self::Asc => "↑",
            Self::Desc => "↓",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec<F> {
    pub key: F,
    pub direction: SortDirection,
}

impl<F: Field> SortSpec<F> {
    pub const fn asc(key: F) -> Self {
        Self {
            key,
            direction: SortDirection::Asc,
        }
    }

    pub const fn desc(key: F) -> Self {
        Self {
            key,
            direction: SortDirection::Desc,
        }
    }

    /// Selecting the active key flips its direction; any other key starts
    /// ascending.
    pub fn toggled(current: Option<Self>, key: F) -> Self {
        match current {
            Some(spec) if spec.key == key => Self {
                key,
                direction: spec.direction.flipped(),
            },
            _ => Self::asc(key),
        }
    }
}

/// Orders two defined values. Text is case-sensitive; integers and decimals
/// compare numerically across kinds.
pub fn cmp_values(left: &FieldValue, right: &FieldValue) -> Ordering {
    match (left, right) {
        (FieldValue::Text(left), FieldValue::Text(right)) => left.cmp(right),
        (FieldValue::Integer(left), FieldValue::Integer(right)) => left.cmp(right),
        (FieldValue::Decimal(left), FieldValue::Decimal(right)) => left.total_cmp(right),
        (FieldValue::Integer(left), FieldValue::Decimal(right)) => (*left as f64).total_cmp(right),
        (FieldValue::Decimal(left), FieldValue::Integer(right)) => left.total_cmp(&(*right as f64)),
        (FieldValue::Date(left), FieldValue::Date(right)) => left.cmp(right),
        (FieldValue::Bool(left), FieldValue::Bool(right)) => left.cmp(right),
        _ => left.display().cmp(&right.display()),
    }
}

/// Missing values sort last in both directions; only defined values are
/// subject to the direction.
pub fn compare<R: Record>(left: &R, right: &R, sort: &SortSpec<R::Field>) -> Ordering {
    match (left.field(sort.key), right.field(sort.key)) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(left), Some(right)) => {
            let order = cmp_values(&left, &right);
            match sort.direction {
                SortDirection::Asc => order,
                SortDirection::Desc => order.reverse(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{SortDirection, SortSpec, cmp_values};
    use crate::{AdmissionField, FieldValue};
    use std::cmp::Ordering;

    #[test]
    fn text_comparison_is_case_sensitive() {
        assert_eq!(
            cmp_values(&FieldValue::text("Zed"), &FieldValue::text("apple")),
            Ordering::Less
        );
    }

    #[test]
    fn mixed_numeric_kinds_compare_numerically() {
        assert_eq!(
            cmp_values(&FieldValue::Integer(10), &FieldValue::Decimal(9.5)),
            Ordering::Greater
        );
        assert_eq!(
            cmp_values(&FieldValue::Decimal(2.0), &FieldValue::Integer(2)),
            Ordering::Equal
        );
    }

    #[test]
    fn numbers_do_not_compare_as_strings() {
        assert_eq!(
            cmp_values(&FieldValue::Integer(9), &FieldValue::Integer(10)),
            Ordering::Less
        );
    }

    #[test]
    fn toggled_flips_active_key_and_resets_new_key() {
        let current = Some(SortSpec::asc(AdmissionField::FirstName));

        let flipped = SortSpec::toggled(current, AdmissionField::FirstName);
        assert_eq!(flipped.direction, SortDirection::Desc);

        let flipped_back = SortSpec::toggled(Some(flipped), AdmissionField::FirstName);
        assert_eq!(flipped_back.direction, SortDirection::Asc);

        let other = SortSpec::toggled(
            Some(SortSpec::desc(AdmissionField::FirstName)),
            AdmissionField::Email,
        );
        assert_eq!(other, SortSpec::asc(AdmissionField::Email));
    }
}
