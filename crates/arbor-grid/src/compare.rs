//! Comparators for field values.
//!
//! Total-order and equality semantics shared by the sort and filter engines.
//! All functions here are total: null or mismatched operands produce an
//! ordering or "not equal", never a panic or error.

use std::cmp::Ordering;

use chrono::NaiveDateTime;

use crate::value::{FieldType, FieldValue};

/// Compares two field values.
///
/// Integers and floats compare by numeric magnitude, dates compare truncated
/// to whole days (use [`compare_with_time`] when the time of day matters),
/// and null orders before every non-null value. Values of unrelated types
/// order by a fixed type rank so the result is still total.
pub fn default_compare(a: &FieldValue, b: &FieldValue) -> Ordering {
    match (a, b) {
        (FieldValue::Null, FieldValue::Null) => Ordering::Equal,
        (FieldValue::Null, _) => Ordering::Less,
        (_, FieldValue::Null) => Ordering::Greater,
        (FieldValue::Bool(x), FieldValue::Bool(y)) => x.cmp(y),
        (FieldValue::String(x), FieldValue::String(y)) => x.cmp(y),
        (FieldValue::Date(x), FieldValue::Date(y)) => x.date().cmp(&y.date()),
        _ => match (a.as_number(), b.as_number()) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => type_rank(a).cmp(&type_rank(b)),
        },
    }
}

/// Like [`default_compare`], but date values compare with their time of day.
pub fn compare_with_time(a: &FieldValue, b: &FieldValue) -> Ordering {
    match (a, b) {
        (FieldValue::Date(x), FieldValue::Date(y)) => x.cmp(y),
        _ => default_compare(a, b),
    }
}

fn type_rank(value: &FieldValue) -> u8 {
    match value.field_type() {
        FieldType::Null => 0,
        FieldType::Bool => 1,
        FieldType::Int | FieldType::Float => 2,
        FieldType::String => 3,
        FieldType::Date => 4,
    }
}

/// A value transformation applied to both operands before comparing.
///
/// Primers let string-typed columns sort by their numeric or chronological
/// value instead of lexicographically. Values that fail to convert compare
/// as null, ordering them before everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primer {
    /// Parse string operands as numbers before comparing.
    Number,
    /// Parse string operands as dates before comparing.
    Date,
}

impl Primer {
    /// Applies this primer to a value. Conversion failure yields null.
    pub fn apply(&self, value: &FieldValue) -> FieldValue {
        let target = match self {
            Self::Number => FieldType::Float,
            Self::Date => FieldType::Date,
        };
        value.convert(target).unwrap_or(FieldValue::Null)
    }
}

/// A single-field comparator with optional priming and direction reversal.
///
/// Composable: the sort engine evaluates one `FieldComparator` per sort key
/// in declaration order and takes the first non-equal result.
///
/// # Example
///
/// ```
/// use std::cmp::Ordering;
/// use arbor_grid::{FieldComparator, FieldValue, Primer};
///
/// let cmp = FieldComparator::new(Some(Primer::Number), true);
/// // "10" > "9" numerically, reversed for descending order
/// assert_eq!(
///     cmp.compare(&FieldValue::from("10"), &FieldValue::from("9")),
///     Ordering::Less,
/// );
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldComparator {
    primer: Option<Primer>,
    descending: bool,
}

impl FieldComparator {
    /// Creates a comparator with the given primer and direction.
    pub fn new(primer: Option<Primer>, descending: bool) -> Self {
        Self { primer, descending }
    }

    /// Compares two values, priming both first and reversing if descending.
    pub fn compare(&self, a: &FieldValue, b: &FieldValue) -> Ordering {
        let ordering = match self.primer {
            Some(primer) => default_compare(&primer.apply(a), &primer.apply(b)),
            None => default_compare(a, b),
        };
        if self.descending { ordering.reverse() } else { ordering }
    }
}

/// Returns `true` if two date values fall on the same day, ignoring time.
pub fn date_equals(a: NaiveDateTime, b: NaiveDateTime) -> bool {
    a.date() == b.date()
}

/// Returns `true` if two date values fall on different days.
pub fn date_not_equals(a: NaiveDateTime, b: NaiveDateTime) -> bool {
    !date_equals(a, b)
}

/// Returns `true` if two date values have the same time of day, ignoring the date.
pub fn time_equals(a: NaiveDateTime, b: NaiveDateTime) -> bool {
    a.time() == b.time()
}

/// Compares two strings, case-insensitively unless `case_sensitive`.
pub fn string_equals(a: &str, b: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        a == b
    } else {
        a.to_lowercase() == b.to_lowercase()
    }
}

/// Equality across field values.
///
/// `strict` requires the same runtime type (integers and floats still match
/// by magnitude). Loose equality additionally matches values whose string
/// renderings agree, so `42` equals `"42"`. A null operand against a
/// non-null operand is never equal, in either mode.
pub fn values_equal(a: &FieldValue, b: &FieldValue, strict: bool) -> bool {
    match (a, b) {
        (FieldValue::Null, FieldValue::Null) => true,
        (FieldValue::Null, _) | (_, FieldValue::Null) => false,
        (FieldValue::Date(x), FieldValue::Date(y)) => date_equals(*x, *y),
        _ => {
            if a == b {
                return true;
            }
            !strict && a.to_string() == b.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::parse_date;

    #[test]
    fn test_default_compare_numbers() {
        assert_eq!(
            default_compare(&FieldValue::Int(1), &FieldValue::Int(2)),
            Ordering::Less
        );
        assert_eq!(
            default_compare(&FieldValue::Int(2), &FieldValue::Float(2.0)),
            Ordering::Equal
        );
        assert_eq!(
            default_compare(&FieldValue::Float(2.5), &FieldValue::Int(2)),
            Ordering::Greater
        );
    }

    #[test]
    fn test_default_compare_null_orders_first() {
        assert_eq!(
            default_compare(&FieldValue::Null, &FieldValue::Int(0)),
            Ordering::Less
        );
        assert_eq!(
            default_compare(&FieldValue::from("a"), &FieldValue::Null),
            Ordering::Greater
        );
        assert_eq!(
            default_compare(&FieldValue::Null, &FieldValue::Null),
            Ordering::Equal
        );
    }

    #[test]
    fn test_default_compare_dates_truncate_to_days() {
        let morning = parse_date("2021-03-05T08:00:00").unwrap();
        let evening = parse_date("2021-03-05T20:00:00").unwrap();
        let next_day = parse_date("2021-03-06T01:00:00").unwrap();

        assert_eq!(
            default_compare(&FieldValue::Date(morning), &FieldValue::Date(evening)),
            Ordering::Equal
        );
        assert_eq!(
            default_compare(&FieldValue::Date(next_day), &FieldValue::Date(evening)),
            Ordering::Greater
        );
        // Time-aware comparison distinguishes the same day
        assert_eq!(
            compare_with_time(&FieldValue::Date(morning), &FieldValue::Date(evening)),
            Ordering::Less
        );
    }

    #[test]
    fn test_field_comparator_descending() {
        let cmp = FieldComparator::new(None, true);
        assert_eq!(
            cmp.compare(&FieldValue::Int(1), &FieldValue::Int(2)),
            Ordering::Greater
        );
    }

    #[test]
    fn test_number_primer_sorts_string_digits() {
        let cmp = FieldComparator::new(Some(Primer::Number), false);
        // Lexicographically "10" < "9"; numerically primed it is greater
        assert_eq!(
            cmp.compare(&FieldValue::from("10"), &FieldValue::from("9")),
            Ordering::Greater
        );
    }

    #[test]
    fn test_date_primer() {
        let cmp = FieldComparator::new(Some(Primer::Date), false);
        assert_eq!(
            cmp.compare(
                &FieldValue::from("2021-01-02"),
                &FieldValue::from("2021-01-10")
            ),
            Ordering::Less
        );
        // Unparseable operand compares as null and orders first
        assert_eq!(
            cmp.compare(&FieldValue::from("garbage"), &FieldValue::from("2021-01-10")),
            Ordering::Less
        );
    }

    #[test]
    fn test_date_and_time_equality() {
        let a = parse_date("2021-03-05T08:00:00").unwrap();
        let b = parse_date("2021-03-05T20:00:00").unwrap();
        let c = parse_date("2021-04-01T08:00:00").unwrap();

        assert!(date_equals(a, b));
        assert!(date_not_equals(a, c));
        assert!(time_equals(a, c));
        assert!(!time_equals(a, b));
    }

    #[test]
    fn test_string_equals_case_folding() {
        assert!(string_equals("Apple", "aPPLE", false));
        assert!(!string_equals("Apple", "aPPLE", true));
    }

    #[test]
    fn test_values_equal_loose_and_strict() {
        assert!(values_equal(&FieldValue::Int(42), &FieldValue::from("42"), false));
        assert!(!values_equal(&FieldValue::Int(42), &FieldValue::from("42"), true));
        assert!(values_equal(&FieldValue::Int(42), &FieldValue::Float(42.0), true));
        // Null against a defined value is never equal
        assert!(!values_equal(&FieldValue::Null, &FieldValue::from(""), false));
    }
}
