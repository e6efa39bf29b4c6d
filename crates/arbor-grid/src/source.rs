//! The data source orchestrator.
//!
//! [`DataSource`] owns the base record array, the active sorting, filter,
//! and grouping configuration, and the **current view**: the post
//! filter/sort materialization the rendering layer pulls windows from.
//! Every mutating operation recomputes the view synchronously before
//! returning; there is no lazy or dirty state.
//!
//! # Re-entrancy
//!
//! The engine is single-threaded and follows a mutate-then-notify-then-return
//! discipline. Calling a mutating operation from inside a change-notification
//! slot is unsupported: the slot runs while the triggering mutation's caller
//! is still on the stack, and a nested mutation would observe and publish a
//! half-consistent view. Consumers must treat arrays and trees returned from
//! queries as snapshots; a later mutation replaces them rather than patching
//! them in place.

use arbor_grid_core::Signal;

use crate::error::{DataError, Result};
use crate::filter::{FieldFilter, FilterClause};
use crate::group::{GroupField, GroupNode, group_records, tree_leaf_count};
use crate::record::Record;
use crate::sort::{SortField, sort_records};
use crate::value::FieldValue;

/// Signals a data source emits after mutations.
///
/// Both carry the new length of the structure that changed. Slots run
/// synchronously on the mutating call stack; see the module notes on
/// re-entrancy.
pub struct SourceSignals {
    /// Emitted after `set_data` replaces the base array. Argument: new
    /// record count.
    pub data_changed: Signal<usize>,
    /// Emitted after any operation recomputes the current view. Argument:
    /// new view length.
    pub view_changed: Signal<usize>,
}

impl SourceSignals {
    fn new() -> Self {
        Self {
            data_changed: Signal::new(),
            view_changed: Signal::new(),
        }
    }
}

/// A window of the current view, as returned by [`DataSource::range`].
///
/// Flat when no grouping is configured; a grouped tree otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum RangeSlice {
    /// Records of the window, in view order.
    Rows(Vec<Record>),
    /// The window materialized as a grouped tree.
    Groups(Vec<GroupNode>),
}

impl RangeSlice {
    /// Number of records in the window (leaf count when grouped).
    pub fn len(&self) -> usize {
        match self {
            Self::Rows(rows) => rows.len(),
            Self::Groups(nodes) => tree_leaf_count(nodes),
        }
    }

    /// Returns `true` if the window holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The flat record window, if this slice is ungrouped.
    pub fn as_rows(&self) -> Option<&[Record]> {
        match self {
            Self::Rows(rows) => Some(rows),
            Self::Groups(_) => None,
        }
    }

    /// The grouped tree, if this slice is grouped.
    pub fn as_groups(&self) -> Option<&[GroupNode]> {
        match self {
            Self::Groups(nodes) => Some(nodes),
            Self::Rows(_) => None,
        }
    }
}

/// In-memory data engine backing the grid, combobox, and dropdown widgets.
///
/// # Example
///
/// ```
/// use arbor_grid::{DataSource, Record, SortField};
///
/// let mut source = DataSource::with_data(vec![
///     Record::with_fields([("a", 3.into())]),
///     Record::with_fields([("a", 1.into())]),
///     Record::with_fields([("a", 2.into())]),
/// ]);
///
/// source.add_sorting(SortField::asc("a"), true);
/// let values: Vec<i64> = source
///     .view()
///     .iter()
///     .map(|r| r.field_or_null("a").as_int().unwrap())
///     .collect();
/// assert_eq!(values, vec![1, 2, 3]);
/// ```
pub struct DataSource {
    /// The base array. Replaced wholesale via `set_data`, never patched.
    data: Vec<Record>,
    /// Post filter/sort materialization. Always a subsequence/permutation
    /// of `data` with row identities preserved.
    current_view: Vec<Record>,
    /// Ordered sort keys; earlier entries take priority.
    sorting: Vec<SortField>,
    /// Per-field filters in application order; at most one per field.
    filters: Vec<FieldFilter>,
    /// Grouping levels in declared order; `level` stays gap-free.
    grouping: Vec<GroupField>,
    /// Default case sensitivity for stored filters and searches.
    case_sensitive: bool,
    signals: SourceSignals,
}

impl Default for DataSource {
    fn default() -> Self {
        Self::new()
    }
}

impl DataSource {
    /// Creates an empty data source.
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            current_view: Vec::new(),
            sorting: Vec::new(),
            filters: Vec::new(),
            grouping: Vec::new(),
            case_sensitive: false,
            signals: SourceSignals::new(),
        }
    }

    /// Creates a data source over an initial record array.
    ///
    /// Row identities are stamped by base-array index, exactly as
    /// [`set_data`](Self::set_data) does.
    pub fn with_data(records: Vec<Record>) -> Self {
        let mut source = Self::new();
        source.ingest(records);
        source
    }

    /// Sets the default case sensitivity for stored filters and searches.
    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// The change-notification signals.
    pub fn signals(&self) -> &SourceSignals {
        &self.signals
    }

    /// The base record array, in ingestion order.
    pub fn data(&self) -> &[Record] {
        &self.data
    }

    /// The current view: base data with active filters and sorting applied.
    pub fn view(&self) -> &[Record] {
        &self.current_view
    }

    /// The active sort keys, primary first.
    pub fn sorting(&self) -> &[SortField] {
        &self.sorting
    }

    /// The active per-field filters, in application order.
    pub fn filters(&self) -> &[FieldFilter] {
        &self.filters
    }

    /// The active grouping levels, outermost first.
    pub fn grouping(&self) -> &[GroupField] {
        &self.grouping
    }

    // -------------------------------------------------------------------------
    // Data
    // -------------------------------------------------------------------------

    /// Replaces the base array wholesale.
    ///
    /// Every record is re-stamped with its index as row identity — the only
    /// point identities are ever assigned. The view is recomputed under the
    /// existing filter/sort configuration, then `data_changed` fires.
    pub fn set_data(&mut self, records: Vec<Record>) -> &[Record] {
        self.ingest(records);
        self.signals.data_changed.emit(self.data.len());
        self.signals.view_changed.emit(self.current_view.len());
        &self.current_view
    }

    fn ingest(&mut self, mut records: Vec<Record>) {
        for (index, record) in records.iter_mut().enumerate() {
            record.set_row_id(index);
        }
        self.data = records;
        self.recompute_view();
    }

    /// Replays active filters over the base array, then applies sorting.
    fn recompute_view(&mut self) {
        let mut view = self.data.clone();
        for filter in &self.filters {
            view = filter.apply(&view, self.case_sensitive);
        }
        sort_records(&mut view, &self.sorting);

        tracing::debug!(
            target: "arbor_grid::data",
            rows = view.len(),
            filters = self.filters.len(),
            sort_keys = self.sorting.len(),
            "recomputed view"
        );
        self.current_view = view;
    }

    // -------------------------------------------------------------------------
    // Sorting
    // -------------------------------------------------------------------------

    /// Inserts a sort key, or updates the existing key for that field in
    /// place, preserving its priority position.
    ///
    /// With `apply_now`, the current view is re-sorted immediately (filters
    /// are left as they are); otherwise the key takes effect on the next
    /// recomputation.
    pub fn add_sorting(&mut self, spec: SortField, apply_now: bool) -> &[Record] {
        match self.sorting.iter_mut().find(|s| s.field == spec.field) {
            Some(existing) => {
                existing.descending = spec.descending;
                existing.primer = spec.primer;
            }
            None => self.sorting.push(spec),
        }
        if apply_now {
            sort_records(&mut self.current_view, &self.sorting);
            self.signals.view_changed.emit(self.current_view.len());
        }
        &self.current_view
    }

    /// Removes the sort key for a field.
    ///
    /// The view is re-derived from the base array: remaining filters replay
    /// and any remaining sort keys apply, so dropping the last key restores
    /// the (filtered) insertion order.
    pub fn remove_sorting(&mut self, field: &str) -> &[Record] {
        self.sorting.retain(|s| s.field != field);
        self.recompute_view();
        self.signals.view_changed.emit(self.current_view.len());
        &self.current_view
    }

    /// Drops all sort keys and re-derives the view.
    pub fn clear_sorting(&mut self) -> &[Record] {
        self.sorting.clear();
        self.recompute_view();
        self.signals.view_changed.emit(self.current_view.len());
        &self.current_view
    }

    // -------------------------------------------------------------------------
    // Filtering
    // -------------------------------------------------------------------------

    /// Stores a filter for a field, replacing any existing filter for that
    /// field. Filters for distinct fields conjoin: each applies over the
    /// previous filter's result when the view is derived.
    ///
    /// With `apply_now`, the view is re-derived immediately.
    pub fn add_filter(
        &mut self,
        field: &str,
        clauses: Vec<FilterClause>,
        apply_now: bool,
    ) -> &[Record] {
        let filter = FieldFilter::new(field, clauses);
        match self.filters.iter_mut().find(|f| f.field == field) {
            Some(existing) => *existing = filter,
            None => self.filters.push(filter),
        }
        if apply_now {
            self.recompute_view();
            self.signals.view_changed.emit(self.current_view.len());
        }
        &self.current_view
    }

    /// Drops the filter for a field and re-derives the view by replaying
    /// every remaining filter from the base array.
    pub fn remove_filter(&mut self, field: &str) -> &[Record] {
        self.filters.retain(|f| f.field != field);
        self.recompute_view();
        self.signals.view_changed.emit(self.current_view.len());
        &self.current_view
    }

    /// Drops all filters. The view resets to a fresh copy of the base
    /// array, re-sorted if sort keys remain active.
    pub fn clear_filters(&mut self) -> &[Record] {
        self.filters.clear();
        self.recompute_view();
        self.signals.view_changed.emit(self.current_view.len());
        &self.current_view
    }

    // -------------------------------------------------------------------------
    // Grouping
    // -------------------------------------------------------------------------

    /// Appends a grouping level for a field. No-op if the field is already
    /// grouped. Grouping never changes the current view; the tree is
    /// materialized on demand by [`group_data`](Self::group_data) and
    /// [`range`](Self::range).
    pub fn group_by_field(&mut self, field: &str) {
        if self.grouping.iter().any(|g| g.field == field) {
            return;
        }
        let level = self.grouping.len();
        self.grouping.push(GroupField::new(field, level));
    }

    /// Removes the grouping level for a field and re-levels the remaining
    /// levels so numbering stays gap-free.
    pub fn remove_grouping(&mut self, field: &str) {
        self.grouping.retain(|g| g.field != field);
        for (level, group) in self.grouping.iter_mut().enumerate() {
            group.level = level;
        }
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Pure sort query: returns a sorted copy of `data` (or of the base
    /// array) under `fields` (or the active sort keys).
    pub fn sorted(&self, fields: Option<&[SortField]>, data: Option<&[Record]>) -> Vec<Record> {
        let mut records = data.unwrap_or(&self.data).to_vec();
        sort_records(&mut records, fields.unwrap_or(&self.sorting));
        records
    }

    /// Pure filter query: returns the records of `data` (or the base array)
    /// matching `filter`.
    pub fn filtered(
        &self,
        filter: &FieldFilter,
        data: Option<&[Record]>,
        case_sensitive: Option<bool>,
    ) -> Vec<Record> {
        filter.apply(
            data.unwrap_or(&self.data),
            case_sensitive.unwrap_or(self.case_sensitive),
        )
    }

    /// Free-text search over `data` (or the base array).
    ///
    /// A record matches when any string-typed field contains the search
    /// text; the scan of a record stops at its first matching field. Case
    /// folding applies unless overridden.
    pub fn search(
        &self,
        text: &str,
        data: Option<&[Record]>,
        case_sensitive: Option<bool>,
    ) -> Vec<Record> {
        let case_sensitive = case_sensitive.unwrap_or(self.case_sensitive);
        let needle = fold(text, case_sensitive);

        data.unwrap_or(&self.data)
            .iter()
            .filter(|record| {
                record.fields().any(|(_, value)| match value {
                    FieldValue::String(s) => fold(s, case_sensitive).contains(&needle),
                    _ => false,
                })
            })
            .cloned()
            .collect()
    }

    /// Field-scoped search with positionally paired texts and fields.
    ///
    /// With `strict`, a record matches only when every pair matches (AND);
    /// otherwise one matching pair suffices (OR). A pair matches when the
    /// field's string rendering contains the text. Missing fields or a
    /// length mismatch are precondition errors raised before any scanning.
    pub fn search_by_field(
        &self,
        texts: &[&str],
        fields: &[&str],
        data: Option<&[Record]>,
        case_sensitive: Option<bool>,
        strict: bool,
    ) -> Result<Vec<Record>> {
        if fields.is_empty() {
            return Err(DataError::MissingSearchFields);
        }
        if texts.len() != fields.len() {
            return Err(DataError::FieldCountMismatch {
                texts: texts.len(),
                fields: fields.len(),
            });
        }

        let case_sensitive = case_sensitive.unwrap_or(self.case_sensitive);
        let needles: Vec<String> = texts.iter().map(|t| fold(t, case_sensitive)).collect();

        let matches = |record: &Record| {
            let mut pairs = fields.iter().zip(&needles).map(|(field, needle)| {
                fold(&record.field_or_null(field).to_string(), case_sensitive).contains(needle)
            });
            if strict { pairs.all(|m| m) } else { pairs.any(|m| m) }
        };

        Ok(data
            .unwrap_or(&self.data)
            .iter()
            .filter(|r| matches(r))
            .cloned()
            .collect())
    }

    /// Materializes the grouped tree for `data` (or the current view) under
    /// the active grouping levels.
    pub fn group_data(&self, data: Option<&[Record]>) -> Vec<GroupNode> {
        group_records(data.unwrap_or(&self.current_view), &self.grouping)
    }

    /// Returns the view window for inclusive bounds `[start, stop]`.
    ///
    /// Bounds outside the view are clamped, never an error; an inverted or
    /// out-of-range window is empty. When grouping is active the window is
    /// materialized as a grouped tree.
    pub fn range(&self, start: usize, stop: usize) -> RangeSlice {
        let len = self.current_view.len();
        let window: &[Record] = if len == 0 || start >= len || stop < start {
            &[]
        } else {
            &self.current_view[start..=stop.min(len - 1)]
        };

        if self.grouping.is_empty() {
            RangeSlice::Rows(window.to_vec())
        } else {
            RangeSlice::Groups(group_records(window, &self.grouping))
        }
    }
}

fn fold(text: &str, case_sensitive: bool) -> String {
    if case_sensitive {
        text.to_string()
    } else {
        text.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{ComparisonOp, FilterClause};
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn int_records(values: &[i64]) -> Vec<Record> {
        values
            .iter()
            .map(|&n| Record::with_fields([("a", n.into())]))
            .collect()
    }

    fn ints(records: &[Record], field: &str) -> Vec<i64> {
        records
            .iter()
            .map(|r| r.field_or_null(field).as_int().unwrap())
            .collect()
    }

    #[test]
    fn test_row_ids_stamped_at_ingestion() {
        let source = DataSource::with_data(int_records(&[30, 10, 20]));
        let ids: Vec<usize> = source.data().iter().map(Record::row_id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_row_ids_survive_sort_and_filter() {
        let mut source = DataSource::with_data(int_records(&[30, 10, 20]));
        source.add_sorting(SortField::asc("a"), true);
        source.add_filter("a", vec![FilterClause::new(10.into(), ComparisonOp::Gt)], true);

        // View holds 20 (base index 2) then 30 (base index 0)
        let ids: Vec<usize> = source.view().iter().map(Record::row_id).collect();
        assert_eq!(ids, vec![2, 0]);
    }

    #[test]
    fn test_add_sorting_updates_direction_in_place() {
        let mut source = DataSource::with_data(int_records(&[3, 1, 2]));
        source.add_sorting(SortField::asc("a"), true);
        assert_eq!(ints(source.view(), "a"), vec![1, 2, 3]);

        // Same field again with flipped direction keeps its priority slot
        source.add_sorting(SortField::desc("a"), true);
        assert_eq!(source.sorting().len(), 1);
        assert_eq!(ints(source.view(), "a"), vec![3, 2, 1]);
    }

    #[test]
    fn test_remove_last_sorting_restores_insertion_order() {
        let mut source = DataSource::with_data(int_records(&[3, 1, 2]));
        source.add_sorting(SortField::asc("a"), true);
        source.remove_sorting("a");
        assert_eq!(ints(source.view(), "a"), vec![3, 1, 2]);
    }

    #[test]
    fn test_filter_replaces_per_field() {
        let mut source = DataSource::with_data(int_records(&[1, 2, 3, 4]));
        source.add_filter("a", vec![FilterClause::new(1.into(), ComparisonOp::Gt)], true);
        assert_eq!(ints(source.view(), "a"), vec![2, 3, 4]);

        // Replacing the filter for the same field replays from base data
        source.add_filter("a", vec![FilterClause::new(4.into(), ComparisonOp::Lt)], true);
        assert_eq!(source.filters().len(), 1);
        assert_eq!(ints(source.view(), "a"), vec![1, 2, 3]);
    }

    #[test]
    fn test_filters_conjoin_across_fields() {
        let mut source = DataSource::with_data(vec![
            Record::with_fields([("a", 1.into()), ("b", "x".into())]),
            Record::with_fields([("a", 2.into()), ("b", "x".into())]),
            Record::with_fields([("a", 2.into()), ("b", "y".into())]),
        ]);
        source.add_filter("a", vec![FilterClause::new(2.into(), ComparisonOp::Eq)], true);
        source.add_filter("b", vec![FilterClause::new("x".into(), ComparisonOp::Eq)], true);
        assert_eq!(source.view().len(), 1);
        assert_eq!(source.view()[0].row_id(), 1);
    }

    #[test]
    fn test_remove_filter_replays_remaining() {
        let mut source = DataSource::with_data(vec![
            Record::with_fields([("a", 1.into()), ("b", "x".into())]),
            Record::with_fields([("a", 2.into()), ("b", "y".into())]),
            Record::with_fields([("a", 3.into()), ("b", "x".into())]),
        ]);
        source.add_filter("a", vec![FilterClause::new(1.into(), ComparisonOp::Gt)], true);
        source.add_filter("b", vec![FilterClause::new("x".into(), ComparisonOp::Eq)], true);
        assert_eq!(source.view().len(), 1);

        source.remove_filter("b");
        assert_eq!(ints(source.view(), "a"), vec![2, 3]);
    }

    #[test]
    fn test_clear_filters_resorts_when_sorting_active() {
        let mut source = DataSource::with_data(int_records(&[3, 1, 2]));
        source.add_sorting(SortField::asc("a"), true);
        source.add_filter("a", vec![FilterClause::new(1.into(), ComparisonOp::Gt)], true);
        assert_eq!(ints(source.view(), "a"), vec![2, 3]);

        source.clear_filters();
        assert_eq!(ints(source.view(), "a"), vec![1, 2, 3]);
    }

    #[test]
    fn test_empty_filter_result_is_valid() {
        let mut source = DataSource::with_data(int_records(&[1, 2]));
        source.add_filter("a", vec![FilterClause::new(99.into(), ComparisonOp::Gt)], true);
        assert!(source.view().is_empty());
        assert_eq!(source.data().len(), 2);
    }

    #[test]
    fn test_search_case_insensitive_by_default() {
        let source = DataSource::with_data(vec![
            Record::with_fields([("name", "Al".into())]),
            Record::with_fields([("name", "Bob".into())]),
            Record::with_fields([("name", "al".into())]),
        ]);
        assert_eq!(source.search("al", None, None).len(), 2);
        assert_eq!(source.search("al", None, Some(true)).len(), 1);
    }

    #[test]
    fn test_search_ignores_non_string_fields() {
        let source = DataSource::with_data(vec![Record::with_fields([
            ("n", 123.into()),
            ("s", "12".into()),
        ])]);
        // "12" matches the string field, not the integer field
        assert_eq!(source.search("12", None, None).len(), 1);
        assert_eq!(source.search("123", None, None).len(), 0);
    }

    #[test]
    fn test_search_by_field_strict_and_loose() {
        let source = DataSource::with_data(vec![
            Record::with_fields([("a", "red".into()), ("b", "apple".into())]),
            Record::with_fields([("a", "red".into()), ("b", "pear".into())]),
        ]);

        let strict = source
            .search_by_field(&["red", "apple"], &["a", "b"], None, None, true)
            .unwrap();
        assert_eq!(strict.len(), 1);

        let loose = source
            .search_by_field(&["red", "apple"], &["a", "b"], None, None, false)
            .unwrap();
        assert_eq!(loose.len(), 2);
    }

    #[test]
    fn test_search_by_field_precondition_errors() {
        let source = DataSource::with_data(int_records(&[1]));
        assert_eq!(
            source.search_by_field(&["x"], &[], None, None, true),
            Err(DataError::MissingSearchFields)
        );
        assert_eq!(
            source.search_by_field(&["x"], &["a", "b"], None, None, true),
            Err(DataError::FieldCountMismatch { texts: 1, fields: 2 })
        );
    }

    #[test]
    fn test_grouping_levels_and_releveling() {
        let mut source = DataSource::new();
        source.group_by_field("a");
        source.group_by_field("b");
        source.group_by_field("a"); // no-op
        source.group_by_field("c");
        assert_eq!(source.grouping().len(), 3);

        source.remove_grouping("b");
        let levels: Vec<(String, usize)> = source
            .grouping()
            .iter()
            .map(|g| (g.field.clone(), g.level))
            .collect();
        assert_eq!(levels, vec![("a".into(), 0), ("c".into(), 1)]);
    }

    #[test]
    fn test_range_clamps_bounds() {
        let source = DataSource::with_data(int_records(&[1, 2, 3]));
        assert_eq!(source.range(0, 99).len(), 3);
        assert_eq!(source.range(2, 2).len(), 1);
        assert!(source.range(5, 9).is_empty());
        assert!(source.range(2, 1).is_empty());
    }

    #[test]
    fn test_range_groups_when_grouping_active() {
        let mut source = DataSource::with_data(vec![
            Record::with_fields([("x", 1.into()), ("y", "A".into())]),
            Record::with_fields([("x", 2.into()), ("y", "A".into())]),
            Record::with_fields([("x", 3.into()), ("y", "B".into())]),
        ]);
        source.group_by_field("y");

        let slice = source.range(0, 2);
        let nodes = slice.as_groups().expect("grouped slice");
        assert_eq!(nodes.len(), 2);
        assert_eq!(slice.len(), 3);
    }

    #[test]
    fn test_set_data_fires_signals() {
        let mut source = DataSource::new();
        let events = Arc::new(Mutex::new(Vec::new()));

        let data_events = events.clone();
        source.signals().data_changed.connect(move |&len| {
            data_events.lock().push(("data", len));
        });
        let view_events = events.clone();
        source.signals().view_changed.connect(move |&len| {
            view_events.lock().push(("view", len));
        });

        source.set_data(int_records(&[1, 2]));
        assert_eq!(*events.lock(), vec![("data", 2), ("view", 2)]);
    }

    #[test]
    fn test_set_data_restamps_identities() {
        let mut source = DataSource::with_data(int_records(&[1, 2, 3]));
        source.set_data(int_records(&[9, 8]));
        let ids: Vec<usize> = source.data().iter().map(Record::row_id).collect();
        assert_eq!(ids, vec![0, 1]);
        assert_eq!(source.view().len(), 2);
    }

    #[test]
    fn test_pure_queries_leave_state_untouched() {
        let mut source = DataSource::with_data(int_records(&[3, 1, 2]));
        source.add_sorting(SortField::asc("a"), false); // configured, not applied

        let sorted = source.sorted(None, None);
        assert_eq!(ints(&sorted, "a"), vec![1, 2, 3]);
        // View untouched by the pure query (and by apply_now = false)
        assert_eq!(ints(source.view(), "a"), vec![3, 1, 2]);
    }
}
