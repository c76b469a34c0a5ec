//! Canonical composition-tree data model.
//!
//! A `CompositionTree` is the authoritative description of a piece of music:
//! a root concept, an ordered list of time-ordered sections, and global
//! traits (arc, tags, duration). Each section carries a bag of musical
//! attributes ("branches") in one of two schema generations: the fixed
//! attribute schema, or an escape-hatch generic subtree used when the
//! upstream attribute set is unpredictable. Which generation applies is
//! resolved once at ingestion into the `Branches` tagged union; downstream
//! code never re-inspects raw shapes.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::{BTreeMap, BTreeSet};

// ─── Generic values ──────────────────────────────────────────────────────

/// A typed attribute value carried by generic-subtree nodes.
///
/// Deserialized untagged, so plain JSON scalars, arrays, and objects map
/// directly. Variant order matters: `Bool` and `Number` must be tried
/// before `Text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeValue {
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<NodeValue>),
    Map(BTreeMap<String, NodeValue>),
}

impl NodeValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            NodeValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            NodeValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

/// One node of the generic subtree schema generation.
///
/// Mirrors the upstream wire shape: `{ name, value?, children?, metadata? }`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SongNode {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<NodeValue>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SongNode>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, NodeValue>,
}

impl SongNode {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Total node count including self.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(SongNode::node_count).sum::<usize>()
    }
}

// ─── Fixed attribute schema ──────────────────────────────────────────────

/// Mood of a section: one primary descriptor plus nuances.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Mood {
    pub primary: String,
    pub nuances: SmallVec<[String; 4]>,
}

impl Mood {
    pub fn is_empty(&self) -> bool {
        self.primary.is_empty() && self.nuances.is_empty()
    }
}

/// Genre of a section: one primary style plus influences.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Genre {
    pub primary: String,
    pub influences: SmallVec<[String; 4]>,
}

impl Genre {
    pub fn is_empty(&self) -> bool {
        self.primary.is_empty() && self.influences.is_empty()
    }
}

/// One instrument entry. `role` and `character` have no visual-tree
/// representation; commit carries them over from the original section.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Instrument {
    pub name: String,
    pub role: String,
    pub character: String,
}

/// Texture descriptors for a section.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Texture {
    pub density: String,
    pub movement: String,
    pub space: String,
}

impl Texture {
    pub fn is_empty(&self) -> bool {
        self.density.is_empty() && self.movement.is_empty() && self.space.is_empty()
    }
}

/// Per-section performance metadata. All fields optional; the flattener
/// emits the first non-null value found when scanning sections in order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SectionMeta {
    pub tempo_feel: Option<String>,
    pub suggested_bpm: Option<f64>,
    pub key: Option<String>,
    pub time_signature: Option<String>,
}

/// The fixed schema generation for a section's attribute bag.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FixedAttributes {
    pub mood: Option<Mood>,
    pub genre: Option<Genre>,
    pub instruments: Vec<Instrument>,
    pub texture: Option<Texture>,
    pub sonic_details: Vec<String>,
    pub metadata: SectionMeta,
}

// ─── Sections ────────────────────────────────────────────────────────────

/// The attribute bag of a section, resolved to exactly one schema
/// generation at ingestion time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Branches {
    /// Escape-hatch generic subtree, stored under a single `tree` key on
    /// the wire.
    Tree { tree: SongNode },
    /// The fixed attribute schema.
    Fixed(FixedAttributes),
}

impl Branches {
    pub fn is_tree(&self) -> bool {
        matches!(self, Branches::Tree { .. })
    }
}

/// One time-ordered segment of the composition (intro, build, outro, …).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Free-form label, often but not necessarily a temporal role.
    pub name: String,

    /// Relative duration share in [0, 1]. Sections are NOT required to sum
    /// to 1; proportions are advisory and left unnormalized.
    pub weight: f32,

    pub branches: Branches,
}

// ─── Tree root ───────────────────────────────────────────────────────────

/// Composition-wide traits.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GlobalTraits {
    pub overall_arc: String,
    /// Insertion order is irrelevant; the flattener unions these with
    /// per-section tags in first-seen order.
    pub tags: BTreeSet<String>,
    pub duration_seconds: f64,
}

/// The canonical, authoritative composition description.
///
/// Visual trees are derived, disposable views of its sections; this is the
/// single source of truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositionTree {
    /// Free-text summary of the piece.
    pub concept: String,

    /// Optional annotation produced by external image understanding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_interpretation: Option<String>,

    /// Time-ordered; order is significant (intro → body → outro).
    pub sections: Vec<Section>,

    pub global: GlobalTraits,
}

impl CompositionTree {
    /// Whether the flattener should use generic-subtree mode: decided by
    /// the schema generation of the first section.
    pub fn uses_generic_mode(&self) -> bool {
        self.sections.first().is_some_and(|s| s.branches.is_tree())
    }
}
