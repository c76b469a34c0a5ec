//! Generic, edit-friendly visual tree.
//!
//! A `VisualNode` is what the node-graph editor displays and mutates:
//! a stable id, an editable label, a kind, and ordered children. It is a
//! derived, disposable view of one canonical section, recomputed when the
//! canonical model changes, never the other way around.
//!
//! Besides the display label, each node carries its structured
//! `(name, value)` pair. The label is *derived* from the pair at projection
//! time; the pair is re-derived from the label only when the user actually
//! edits it. Untouched nodes therefore round-trip through commit without
//! ever going through the ambiguous `"name: value"` string parse.

use crate::id::NodeId;
use crate::model::NodeValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What a visual node represents in the canonical schema.
///
/// An open set: `Custom` is the default for user-inserted nodes and for
/// every level of a projected generic subtree below its root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VisualKind {
    Section,
    Mood,
    Genre,
    InstrumentGroup,
    Instrument,
    Texture,
    SonicDetailGroup,
    Detail,
    Nuance,
    Influence,
    Custom,
}

/// One node of the editable visual tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualNode {
    /// Stable identity: assigned at creation, never reused. Survives
    /// edit/commit cycles; only newly inserted nodes get fresh ids.
    pub id: NodeId,

    /// Human-readable, editable display form.
    pub label: String,

    /// Structured attribute name the label was derived from.
    pub name: String,

    /// Structured attribute value, when the node carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<NodeValue>,

    pub kind: VisualKind,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<VisualNode>,

    /// Opaque metadata carried through for generic-subtree nodes. Not
    /// displayed or editable; preserved verbatim by commit.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, NodeValue>,
}

impl VisualNode {
    /// A leaf with no structured value: label and name coincide.
    pub fn leaf(id: NodeId, name: impl Into<String>, kind: VisualKind) -> Self {
        let name = name.into();
        Self {
            id,
            label: name.clone(),
            name,
            value: None,
            kind,
            children: Vec::new(),
            metadata: BTreeMap::new(),
        }
    }

    /// Total node count including self.
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(VisualNode::node_count)
            .sum::<usize>()
    }

    /// Depth-first search for a node by id.
    pub fn find(&self, id: NodeId) -> Option<&VisualNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    /// Whether `id` exists anywhere in this subtree.
    pub fn contains(&self, id: NodeId) -> bool {
        self.find(id).is_some()
    }
}
