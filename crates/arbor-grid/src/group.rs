//! Grouping engine.
//!
//! Partitions a record array into a tree keyed by one or more grouping
//! fields, one tree level per field in declared order. Partitioning is
//! stable: within a group, records keep the relative order they arrived in
//! (the sorted/filtered view order), because the engine only reorders across
//! group keys, never inside a key run.
//!
//! Before partitioning, the input is re-sorted by the grouping fields —
//! **ascending, regardless of any configured descending sort on those
//! fields** — to guarantee each key's records are contiguous. That internal
//! sort is a materialization detail, not user-visible sort configuration.

use crate::record::Record;
use crate::sort::{SortField, sort_records};
use crate::value::FieldValue;

/// One grouping level: a field and its depth in the declared grouping order.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupField {
    /// The field whose values key this level.
    pub field: String,
    /// Tree depth, equal to insertion order. Re-leveled without gaps when a
    /// grouping is removed.
    pub level: usize,
}

impl GroupField {
    /// Creates a grouping level.
    pub fn new(field: impl Into<String>, level: usize) -> Self {
        Self {
            field: field.into(),
            level,
        }
    }
}

/// The contents of a group node: either child groups or a leaf record run.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupItems {
    /// Child nodes, one per distinct key of the next grouping field.
    Groups(Vec<GroupNode>),
    /// The records of a leaf bucket, in view order.
    Records(Vec<Record>),
}

/// One node of the grouped tree.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupNode {
    /// The grouping-field value shared by every record under this node.
    pub key: FieldValue,
    /// Tree depth of this node (0-based).
    pub level: usize,
    /// Child groups or leaf records.
    pub items: GroupItems,
}

impl GroupNode {
    /// Total count of leaf records under this node.
    pub fn leaf_count(&self) -> usize {
        match &self.items {
            GroupItems::Records(records) => records.len(),
            GroupItems::Groups(children) => children.iter().map(GroupNode::leaf_count).sum(),
        }
    }

    /// Leaf records under this node, depth-first in tree order.
    pub fn leaf_records(&self) -> Vec<&Record> {
        match &self.items {
            GroupItems::Records(records) => records.iter().collect(),
            GroupItems::Groups(children) => {
                children.iter().flat_map(GroupNode::leaf_records).collect()
            }
        }
    }
}

/// Total count of leaf records across a grouped tree.
pub fn tree_leaf_count(nodes: &[GroupNode]) -> usize {
    nodes.iter().map(GroupNode::leaf_count).sum()
}

/// Materializes the grouped tree for a record array.
///
/// An empty input or an empty field list yields an empty tree.
pub fn group_records(records: &[Record], fields: &[GroupField]) -> Vec<GroupNode> {
    if records.is_empty() || fields.is_empty() {
        return Vec::new();
    }

    // Contiguity sort over a copy; ascending only, see module docs. Stable,
    // so within equal keys the caller's order survives.
    let mut sorted = records.to_vec();
    let contiguity_keys: Vec<SortField> =
        fields.iter().map(|g| SortField::asc(g.field.clone())).collect();
    sort_records(&mut sorted, &contiguity_keys);

    partition(&sorted, fields, 0)
}

/// Splits records into contiguous runs of equal key at `depth`, recursing
/// while more grouping fields remain.
fn partition(records: &[Record], fields: &[GroupField], depth: usize) -> Vec<GroupNode> {
    let field = &fields[depth].field;
    let mut nodes = Vec::new();

    let mut start = 0;
    while start < records.len() {
        let key = records[start].field_or_null(field).clone();
        let mut end = start + 1;
        // Raw field equality, not case-folded
        while end < records.len() && *records[end].field_or_null(field) == key {
            end += 1;
        }

        let run = &records[start..end];
        let items = if depth + 1 < fields.len() {
            GroupItems::Groups(partition(run, fields, depth + 1))
        } else {
            GroupItems::Records(run.to_vec())
        };
        nodes.push(GroupNode {
            key,
            level: depth,
            items,
        });
        start = end;
    }

    nodes
}
