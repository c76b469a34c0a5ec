//! Structural diff between two visual trees.
//!
//! Classifies every node of the current tree relative to a previous tree
//! (typically a history snapshot) by stable node identity. An id → node
//! index is built once over the whole previous tree and used for every
//! lookup, so a node that moved across the structure between edits is
//! still found. Status is label-only: structural changes confined to
//! descendants do not mark the parent as changed.

use serde::Serialize;
use std::collections::HashMap;
use vt_core::id::NodeId;
use vt_core::visual::{VisualKind, VisualNode};

/// Per-node change classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffStatus {
    Added,
    Removed,
    Changed,
    Unchanged,
}

/// A visual node annotated with its change status. Computed on demand;
/// never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct NodeDiff {
    pub id: NodeId,
    pub label: String,
    pub kind: VisualKind,
    pub status: DiffStatus,
    pub children: Vec<NodeDiff>,
}

impl NodeDiff {
    /// Total entry count including self.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(NodeDiff::node_count).sum::<usize>()
    }

    /// Whether any entry in this subtree is not `Unchanged`.
    pub fn has_changes(&self) -> bool {
        self.status != DiffStatus::Unchanged || self.children.iter().any(NodeDiff::has_changes)
    }
}

/// Diff `current` against `previous`. With no previous tree, every node is
/// `Added`.
#[must_use]
pub fn diff(current: &VisualNode, previous: Option<&VisualNode>) -> NodeDiff {
    match previous {
        None => mark_subtree(current, DiffStatus::Added),
        Some(prev) => {
            let mut index = HashMap::new();
            build_index(prev, &mut index);
            diff_node(current, &index)
        }
    }
}

fn build_index<'a>(node: &'a VisualNode, index: &mut HashMap<NodeId, &'a VisualNode>) {
    index.insert(node.id, node);
    for child in &node.children {
        build_index(child, index);
    }
}

fn diff_node(current: &VisualNode, index: &HashMap<NodeId, &VisualNode>) -> NodeDiff {
    let Some(prev) = index.get(&current.id) else {
        return mark_subtree(current, DiffStatus::Added);
    };

    let status = if current.label != prev.label {
        DiffStatus::Changed
    } else {
        DiffStatus::Unchanged
    };

    let mut children: Vec<NodeDiff> = current
        .children
        .iter()
        .map(|child| diff_node(child, index))
        .collect();

    // Previous children with no counterpart among the current children are
    // emitted as removed subtrees, after the surviving entries.
    for prev_child in &prev.children {
        if !current.children.iter().any(|c| c.id == prev_child.id) {
            children.push(mark_subtree(prev_child, DiffStatus::Removed));
        }
    }

    // Every visible child must carry a diff entry: if pairing produced
    // nothing while children are present, re-diff each against nothing.
    if children.is_empty() && !current.children.is_empty() {
        children = current
            .children
            .iter()
            .map(|child| mark_subtree(child, DiffStatus::Added))
            .collect();
    }

    NodeDiff {
        id: current.id,
        label: current.label.clone(),
        kind: current.kind,
        status,
        children,
    }
}

/// Tag a whole subtree with one status, the construction used both for
/// added subtrees and (with the tag flipped) removed ones.
fn mark_subtree(node: &VisualNode, status: DiffStatus) -> NodeDiff {
    NodeDiff {
        id: node.id,
        label: node.label.clone(),
        kind: node.kind,
        status,
        children: node
            .children
            .iter()
            .map(|child| mark_subtree(child, status))
            .collect(),
    }
}
