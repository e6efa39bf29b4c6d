//! Selection model for widgets backed by a data source.
//!
//! Tracks selected rows by **row identity** rather than view position, so a
//! selection survives re-sorting and re-filtering: a selected record stays
//! selected wherever it moves in the view, and [`SelectionModel::prune`]
//! drops identities that a filter removed from the view entirely.
//!
//! # Example
//!
//! ```
//! use arbor_grid::{SelectionMode, SelectionModel};
//!
//! let mut selection = SelectionModel::new();
//! selection.set_mode(SelectionMode::MultiSelection);
//!
//! selection.select(3);
//! selection.select(7);
//! assert!(selection.is_selected(3));
//! assert_eq!(selection.selected_row_ids(), &[3, 7]);
//! ```

use std::collections::HashSet;

use arbor_grid_core::Signal;

use crate::record::Record;

/// How many rows may be selected at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// Selection is disabled; every select call is a no-op.
    NoSelection,
    /// One row at a time; selecting a row replaces the previous selection.
    #[default]
    SingleSelection,
    /// Any number of rows.
    MultiSelection,
}

/// Selection state keyed by row identity.
///
/// # Signals
///
/// `selection_changed` carries `(selected, deselected)`: the row identities
/// added to and removed from the selection by the operation that fired it.
pub struct SelectionModel {
    mode: SelectionMode,
    /// Membership test.
    selected: HashSet<usize>,
    /// Selection order, for stable iteration and reporting.
    order: Vec<usize>,
    /// Emitted after every change with `(selected, deselected)` identities.
    pub selection_changed: Signal<(Vec<usize>, Vec<usize>)>,
}

impl Default for SelectionModel {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionModel {
    /// Creates an empty selection in [`SelectionMode::SingleSelection`].
    pub fn new() -> Self {
        Self {
            mode: SelectionMode::default(),
            selected: HashSet::new(),
            order: Vec::new(),
            selection_changed: Signal::new(),
        }
    }

    /// The active selection mode.
    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Changes the selection mode.
    ///
    /// Switching to `NoSelection` clears the selection. Switching from
    /// multi to single keeps only the most recently selected row.
    pub fn set_mode(&mut self, mode: SelectionMode) {
        self.mode = mode;
        match mode {
            SelectionMode::NoSelection => {
                self.clear();
            }
            SelectionMode::SingleSelection if self.order.len() > 1 => {
                let keep = *self.order.last().unwrap();
                let dropped: Vec<usize> =
                    self.order.iter().copied().filter(|&id| id != keep).collect();
                self.selected.retain(|&id| id == keep);
                self.order.retain(|&id| id == keep);
                self.selection_changed.emit((Vec::new(), dropped));
            }
            _ => {}
        }
    }

    /// Returns `true` if the row identity is selected.
    pub fn is_selected(&self, row_id: usize) -> bool {
        self.selected.contains(&row_id)
    }

    /// Selected row identities in selection order.
    pub fn selected_row_ids(&self) -> &[usize] {
        &self.order
    }

    /// Number of selected rows.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Selects a row identity.
    ///
    /// In single-selection mode any previous selection is replaced. No-op
    /// when the row is already selected or selection is disabled.
    pub fn select(&mut self, row_id: usize) {
        match self.mode {
            SelectionMode::NoSelection => {}
            SelectionMode::SingleSelection => {
                if self.is_selected(row_id) {
                    return;
                }
                let deselected: Vec<usize> = self.order.drain(..).collect();
                self.selected.clear();
                self.selected.insert(row_id);
                self.order.push(row_id);
                self.selection_changed.emit((vec![row_id], deselected));
            }
            SelectionMode::MultiSelection => {
                if self.selected.insert(row_id) {
                    self.order.push(row_id);
                    self.selection_changed.emit((vec![row_id], Vec::new()));
                }
            }
        }
    }

    /// Deselects a row identity. No-op when it is not selected.
    pub fn deselect(&mut self, row_id: usize) {
        if self.selected.remove(&row_id) {
            self.order.retain(|&id| id != row_id);
            self.selection_changed.emit((Vec::new(), vec![row_id]));
        }
    }

    /// Toggles a row identity's selection state.
    pub fn toggle(&mut self, row_id: usize) {
        if self.is_selected(row_id) {
            self.deselect(row_id);
        } else {
            self.select(row_id);
        }
    }

    /// Clears the selection.
    pub fn clear(&mut self) {
        if self.order.is_empty() {
            return;
        }
        let deselected: Vec<usize> = self.order.drain(..).collect();
        self.selected.clear();
        self.selection_changed.emit((Vec::new(), deselected));
    }

    /// Drops selected identities no longer present in `view`.
    ///
    /// Call after a filter change; rows the filter removed cannot stay
    /// selected.
    pub fn prune(&mut self, view: &[Record]) {
        let visible: HashSet<usize> = view.iter().map(Record::row_id).collect();
        let dropped: Vec<usize> = self
            .order
            .iter()
            .copied()
            .filter(|id| !visible.contains(id))
            .collect();
        if dropped.is_empty() {
            return;
        }
        self.selected.retain(|id| visible.contains(id));
        self.order.retain(|id| visible.contains(id));
        self.selection_changed.emit((Vec::new(), dropped));
    }
}
