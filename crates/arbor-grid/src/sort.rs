//! Multi-key sort engine.
//!
//! Sorting is configured as an ordered list of [`SortField`]s: the first is
//! the primary key, later entries break ties. Each field spec builds a
//! [`FieldComparator`](crate::compare::FieldComparator); record pairs take
//! the first non-equal per-field result in declaration order. Ties across
//! every spec fall through to the host sort, which for `slice::sort_by` is
//! stable, so equal records keep their incoming relative order.

use std::cmp::Ordering;

use crate::compare::{FieldComparator, Primer};
use crate::record::Record;

/// One sort key: a field, a direction, and an optional primer.
#[derive(Debug, Clone, PartialEq)]
pub struct SortField {
    /// The field to order by.
    pub field: String,
    /// Reverse the comparison result.
    pub descending: bool,
    /// Transformation applied to both operands before comparing, letting
    /// string-typed columns sort numerically or chronologically.
    pub primer: Option<Primer>,
}

impl SortField {
    /// Ascending sort on the named field.
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: false,
            primer: None,
        }
    }

    /// Descending sort on the named field.
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: true,
            primer: None,
        }
    }

    /// Sets the primer.
    pub fn with_primer(mut self, primer: Primer) -> Self {
        self.primer = Some(primer);
        self
    }

    fn comparator(&self) -> FieldComparator {
        FieldComparator::new(self.primer, self.descending)
    }
}

/// Compares two records under the given sort keys.
pub fn compare_records(a: &Record, b: &Record, fields: &[SortField]) -> Ordering {
    for spec in fields {
        let ordering = spec
            .comparator()
            .compare(a.field_or_null(&spec.field), b.field_or_null(&spec.field));
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Sorts a record array in place under the given sort keys.
///
/// An empty spec list leaves the array untouched.
pub fn sort_records(records: &mut [Record], fields: &[SortField]) {
    if fields.is_empty() {
        return;
    }
    records.sort_by(|a, b| compare_records(a, b, fields));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::FieldValue;

    fn records(values: &[(i64, &str)]) -> Vec<Record> {
        values
            .iter()
            .map(|&(n, s)| Record::with_fields([("n", n.into()), ("s", FieldValue::from(s))]))
            .collect()
    }

    fn field_ints(records: &[Record], field: &str) -> Vec<i64> {
        records
            .iter()
            .map(|r| r.field_or_null(field).as_int().unwrap())
            .collect()
    }

    #[test]
    fn test_single_key_ascending() {
        let mut rows = records(&[(3, "a"), (1, "a"), (2, "a")]);
        sort_records(&mut rows, &[SortField::asc("n")]);
        assert_eq!(field_ints(&rows, "n"), vec![1, 2, 3]);
    }

    #[test]
    fn test_single_key_descending() {
        let mut rows = records(&[(3, "a"), (1, "a"), (2, "a")]);
        sort_records(&mut rows, &[SortField::desc("n")]);
        assert_eq!(field_ints(&rows, "n"), vec![3, 2, 1]);
    }

    #[test]
    fn test_multi_key_priority() {
        let mut rows = records(&[(1, "b"), (2, "a"), (1, "a"), (2, "b")]);
        sort_records(&mut rows, &[SortField::asc("s"), SortField::desc("n")]);

        let keys: Vec<(String, i64)> = rows
            .iter()
            .map(|r| {
                (
                    r.field_or_null("s").to_string(),
                    r.field_or_null("n").as_int().unwrap(),
                )
            })
            .collect();
        assert_eq!(
            keys,
            vec![
                ("a".into(), 2),
                ("a".into(), 1),
                ("b".into(), 2),
                ("b".into(), 1),
            ]
        );
    }

    #[test]
    fn test_full_tie_keeps_incoming_order() {
        let mut rows = records(&[(1, "x"), (1, "y"), (1, "z")]);
        sort_records(&mut rows, &[SortField::asc("n")]);
        let order: Vec<String> = rows.iter().map(|r| r.field_or_null("s").to_string()).collect();
        assert_eq!(order, vec!["x", "y", "z"]);
    }

    #[test]
    fn test_primer_sorts_string_numbers() {
        let mut rows: Vec<Record> = ["10", "2", "1"]
            .iter()
            .map(|&s| Record::with_fields([("n", FieldValue::from(s))]))
            .collect();
        sort_records(&mut rows, &[SortField::asc("n").with_primer(Primer::Number)]);
        let order: Vec<String> = rows.iter().map(|r| r.field_or_null("n").to_string()).collect();
        assert_eq!(order, vec!["1", "2", "10"]);
    }

    #[test]
    fn test_empty_spec_is_noop() {
        let mut rows = records(&[(3, "a"), (1, "b")]);
        sort_records(&mut rows, &[]);
        assert_eq!(field_ints(&rows, "n"), vec![3, 1]);
    }

    #[test]
    fn test_missing_field_orders_first() {
        let mut rows = vec![
            Record::with_fields([("n", 1.into())]),
            Record::with_fields([("other", 0.into())]),
        ];
        sort_records(&mut rows, &[SortField::asc("n")]);
        assert!(rows[0].field("n").is_none());
    }
}
