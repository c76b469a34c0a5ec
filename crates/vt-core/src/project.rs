//! Visual projection: one canonical `Section` → an editable `VisualNode`
//! tree.
//!
//! Pure function of its input; every created node gets a fresh id from the
//! caller's allocator, never a reused one. The projection is lossy by
//! omission: absent or empty attribute groups produce no child, and fields
//! with no visual representation (instrument role/character, section
//! metadata) are simply not projected; commit recovers them from the
//! original section.

use crate::id::IdAlloc;
use crate::label::display_label;
use crate::model::*;
use crate::visual::{VisualKind, VisualNode};
use std::collections::BTreeMap;

/// Project a section into its visual tree.
#[must_use]
pub fn project(section: &Section, ids: &mut IdAlloc) -> VisualNode {
    match &section.branches {
        Branches::Tree { tree } => project_generic(section, tree, ids),
        Branches::Fixed(attrs) => project_fixed(section, attrs, ids),
    }
}

fn section_root(section: &Section, ids: &mut IdAlloc) -> VisualNode {
    VisualNode {
        id: ids.fresh("section"),
        label: section.name.clone(),
        name: section.name.clone(),
        value: None,
        kind: VisualKind::Section,
        children: Vec::new(),
        metadata: BTreeMap::new(),
    }
}

// ─── Generic subtree ─────────────────────────────────────────────────────

/// The generic tree maps 1:1: the section root stands in for the subtree
/// root (keeping its value and metadata), everything below is `Custom`.
fn project_generic(section: &Section, tree: &SongNode, ids: &mut IdAlloc) -> VisualNode {
    let mut root = section_root(section, ids);
    root.value = tree.value.clone();
    root.metadata = tree.metadata.clone();
    root.children = tree
        .children
        .iter()
        .map(|child| project_song_node(child, ids))
        .collect();
    root
}

fn project_song_node(node: &SongNode, ids: &mut IdAlloc) -> VisualNode {
    VisualNode {
        id: ids.fresh("node"),
        label: display_label(&node.name, node.value.as_ref()),
        name: node.name.clone(),
        value: node.value.clone(),
        kind: VisualKind::Custom,
        children: node
            .children
            .iter()
            .map(|child| project_song_node(child, ids))
            .collect(),
        metadata: node.metadata.clone(),
    }
}

// ─── Fixed attributes ────────────────────────────────────────────────────

fn project_fixed(section: &Section, attrs: &FixedAttributes, ids: &mut IdAlloc) -> VisualNode {
    let mut root = section_root(section, ids);

    if let Some(mood) = &attrs.mood
        && !mood.is_empty()
    {
        root.children.push(group(
            ids.fresh("mood"),
            "Mood",
            &mood.primary,
            VisualKind::Mood,
            mood.nuances
                .iter()
                .map(|n| VisualNode::leaf(ids.fresh("nuance"), n.clone(), VisualKind::Nuance))
                .collect(),
        ));
    }

    if let Some(genre) = &attrs.genre
        && !genre.is_empty()
    {
        root.children.push(group(
            ids.fresh("genre"),
            "Genre",
            &genre.primary,
            VisualKind::Genre,
            genre
                .influences
                .iter()
                .map(|i| VisualNode::leaf(ids.fresh("influence"), i.clone(), VisualKind::Influence))
                .collect(),
        ));
    }

    if !attrs.instruments.is_empty() {
        root.children.push(group(
            ids.fresh("instruments"),
            "Instruments",
            "",
            VisualKind::InstrumentGroup,
            attrs
                .instruments
                .iter()
                .map(|inst| {
                    VisualNode::leaf(ids.fresh("instrument"), inst.name.clone(), VisualKind::Instrument)
                })
                .collect(),
        ));
    }

    if let Some(texture) = &attrs.texture
        && !texture.is_empty()
    {
        let fields = [
            ("density", texture.density.as_str()),
            ("movement", texture.movement.as_str()),
            ("space", texture.space.as_str()),
        ];
        let mut children = Vec::new();
        for (name, text) in fields {
            if !text.is_empty() {
                children.push(valued_leaf(ids.fresh("detail"), name, text));
            }
        }
        root.children.push(group(
            ids.fresh("texture"),
            "Texture",
            "",
            VisualKind::Texture,
            children,
        ));
    }

    if !attrs.sonic_details.is_empty() {
        root.children.push(group(
            ids.fresh("sonic"),
            "Sonic details",
            "",
            VisualKind::SonicDetailGroup,
            attrs
                .sonic_details
                .iter()
                .map(|d| VisualNode::leaf(ids.fresh("detail"), d.clone(), VisualKind::Detail))
                .collect(),
        ));
    }

    root
}

/// A group node: `"Mood: contemplative"` when a primary value exists,
/// bare `"Instruments"` otherwise.
fn group(
    id: crate::id::NodeId,
    name: &str,
    primary: &str,
    kind: VisualKind,
    children: Vec<VisualNode>,
) -> VisualNode {
    let value = (!primary.is_empty()).then(|| NodeValue::Text(primary.to_string()));
    VisualNode {
        id,
        label: display_label(name, value.as_ref()),
        name: name.to_string(),
        value,
        kind,
        children,
        metadata: BTreeMap::new(),
    }
}

fn valued_leaf(id: crate::id::NodeId, name: &str, value: &str) -> VisualNode {
    let value = Some(NodeValue::Text(value.to_string()));
    VisualNode {
        id,
        label: display_label(name, value.as_ref()),
        name: name.to_string(),
        value,
        kind: VisualKind::Detail,
        children: Vec::new(),
        metadata: BTreeMap::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    fn fixed_section() -> Section {
        Section {
            name: "intro".into(),
            weight: 0.2,
            branches: Branches::Fixed(FixedAttributes {
                mood: Some(Mood {
                    primary: "isolation".into(),
                    nuances: smallvec!["stillness".to_string()],
                }),
                genre: Some(Genre {
                    primary: "ambient".into(),
                    influences: smallvec![],
                }),
                instruments: vec![Instrument {
                    name: "bowed pad".into(),
                    role: "texture".into(),
                    character: "glacial".into(),
                }],
                texture: None,
                sonic_details: vec!["faint wind".into()],
                metadata: SectionMeta::default(),
            }),
        }
    }

    #[test]
    fn fixed_projection_shape() {
        let mut ids = IdAlloc::new();
        let tree = project(&fixed_section(), &mut ids);

        assert_eq!(tree.kind, VisualKind::Section);
        assert_eq!(tree.label, "intro");
        // mood, genre, instruments, sonic; texture absent
        assert_eq!(tree.children.len(), 4);
        assert_eq!(tree.children[0].label, "Mood: isolation");
        assert_eq!(tree.children[0].children[0].label, "stillness");
        assert_eq!(tree.children[1].label, "Genre: ambient");
        assert!(tree.children[1].children.is_empty());
        assert_eq!(tree.children[2].children[0].label, "bowed pad");
        assert_eq!(tree.children[3].children[0].label, "faint wind");
    }

    #[test]
    fn empty_groups_project_nothing() {
        let section = Section {
            name: "sparse".into(),
            weight: 1.0,
            branches: Branches::Fixed(FixedAttributes::default()),
        };
        let mut ids = IdAlloc::new();
        let tree = project(&section, &mut ids);
        assert!(tree.children.is_empty());
    }

    #[test]
    fn separate_projections_never_share_ids() {
        let mut ids = IdAlloc::new();
        let a = project(&fixed_section(), &mut ids);
        let b = project(&fixed_section(), &mut ids);
        assert!(!b.contains(a.id));
        for child in &a.children {
            assert!(!b.contains(child.id));
        }
    }

    #[test]
    fn generic_projection_maps_one_to_one() {
        let section = Section {
            name: "Echo".into(),
            weight: 1.0,
            branches: Branches::Tree {
                tree: SongNode {
                    name: "Echo".into(),
                    children: vec![SongNode {
                        name: "Tempo".into(),
                        value: Some(NodeValue::Number(80.0)),
                        ..SongNode::default()
                    }],
                    ..SongNode::default()
                },
            },
        };
        let mut ids = IdAlloc::new();
        let tree = project(&section, &mut ids);
        assert_eq!(tree.children.len(), 1);
        assert_eq!(tree.children[0].label, "Tempo: 80");
        assert_eq!(tree.children[0].kind, VisualKind::Custom);
    }
}
