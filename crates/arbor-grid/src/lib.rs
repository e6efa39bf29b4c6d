//! Arbor Grid - the in-memory data engine behind Arbor's grid, combobox,
//! and dropdown widgets.
//!
//! A [`DataSource`] owns an array of [`Record`]s and derives a **current
//! view** from them by applying per-field filters and multi-key sorting;
//! grouping and paging materialize windows of that view on demand. All
//! operations are synchronous: a mutation recomputes the view, fires its
//! change signals, and only then returns.
//!
//! # Example
//!
//! ```
//! use arbor_grid::{ComparisonOp, DataSource, FilterClause, Record, SortField};
//!
//! let mut source = DataSource::with_data(vec![
//!     Record::with_fields([("name", "Alice".into()), ("age", 34.into())]),
//!     Record::with_fields([("name", "Bob".into()), ("age", 28.into())]),
//!     Record::with_fields([("name", "Carol".into()), ("age", 41.into())]),
//! ]);
//!
//! source.add_filter("age", vec![FilterClause::new(30.into(), ComparisonOp::Gt)], true);
//! source.add_sorting(SortField::desc("age"), true);
//!
//! let names: Vec<&str> = source
//!     .view()
//!     .iter()
//!     .filter_map(|r| r.field_or_null("name").as_str())
//!     .collect();
//! assert_eq!(names, vec!["Carol", "Alice"]);
//! ```

pub mod compare;
pub mod error;
pub mod filter;
pub mod group;
pub mod pager;
pub mod record;
pub mod selection;
pub mod sort;
pub mod source;
pub mod value;

pub use compare::{
    FieldComparator, Primer, compare_with_time, date_equals, date_not_equals, default_compare,
    string_equals, time_equals, values_equal,
};
pub use error::{DataError, Result};
pub use filter::{ComparisonOp, FieldFilter, FilterClause, LogicalOp};
pub use group::{GroupField, GroupItems, GroupNode, group_records, tree_leaf_count};
pub use pager::Pager;
pub use record::{ROW_ID_FIELD, Record, records_from_json};
pub use selection::{SelectionMode, SelectionModel};
pub use sort::{SortField, compare_records, sort_records};
pub use source::{DataSource, RangeSlice, SourceSignals};
pub use value::{FieldType, FieldValue, parse_date};
