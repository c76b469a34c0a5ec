//! Reverse projection: an edited `VisualNode` tree → canonical `Section`.
//!
//! The inverse of projection, taking the untouched original section
//! alongside the edited tree: fields with no visual counterpart
//! (instrument role/character, section metadata) carry over from the
//! original. Commit never drops `weight` or `name`; it only writes the
//! fields it is explicitly responsible for.

use crate::label::format_value;
use crate::model::*;
use crate::visual::{VisualKind, VisualNode};

/// Fold an edited visual tree back into a canonical section.
///
/// The branches generation is inherited from `original`; editing never
/// migrates a section between schema generations.
#[must_use]
pub fn commit(node: &VisualNode, original: &Section) -> Section {
    let branches = match &original.branches {
        Branches::Tree { .. } => Branches::Tree {
            tree: rebuild_song_node(node),
        },
        Branches::Fixed(orig) => Branches::Fixed(rebuild_fixed(node, orig)),
    };

    Section {
        name: node.name.clone(),
        weight: original.weight,
        branches,
    }
}

// ─── Generic subtree ─────────────────────────────────────────────────────

/// Re-encode a visual tree into the generic node format. Structured
/// `(name, value)` pairs and metadata are carried on the visual nodes, so
/// no label re-parsing happens here; only nodes the user actually edited
/// have been through the parse, at edit time.
fn rebuild_song_node(node: &VisualNode) -> SongNode {
    SongNode {
        name: node.name.clone(),
        value: node.value.clone(),
        children: node.children.iter().map(rebuild_song_node).collect(),
        metadata: node.metadata.clone(),
    }
}

// ─── Fixed attributes ────────────────────────────────────────────────────

fn rebuild_fixed(root: &VisualNode, orig: &FixedAttributes) -> FixedAttributes {
    // Section metadata has no visual counterpart; carried over unchanged.
    let mut attrs = FixedAttributes {
        metadata: orig.metadata.clone(),
        ..FixedAttributes::default()
    };

    for child in &root.children {
        match child.kind {
            VisualKind::Mood => {
                let mood = Mood {
                    primary: primary_of(child),
                    nuances: child.children.iter().map(|c| c.label.clone()).collect(),
                };
                attrs.mood = (!mood.is_empty()).then_some(mood);
            }
            VisualKind::Genre => {
                let genre = Genre {
                    primary: primary_of(child),
                    influences: child.children.iter().map(|c| c.label.clone()).collect(),
                };
                attrs.genre = (!genre.is_empty()).then_some(genre);
            }
            VisualKind::InstrumentGroup => {
                attrs.instruments = child
                    .children
                    .iter()
                    .enumerate()
                    .map(|(i, c)| rebuild_instrument(c, orig.instruments.get(i)))
                    .collect();
            }
            VisualKind::Texture => {
                let texture = Texture {
                    density: texture_field(child, "density"),
                    movement: texture_field(child, "movement"),
                    space: texture_field(child, "space"),
                };
                attrs.texture = (!texture.is_empty()).then_some(texture);
            }
            VisualKind::SonicDetailGroup => {
                attrs.sonic_details = child.children.iter().map(|c| c.label.clone()).collect();
            }
            // User-inserted nodes have no home in the fixed schema.
            _ => {}
        }
    }

    attrs
}

fn primary_of(node: &VisualNode) -> String {
    node.value.as_ref().map(format_value).unwrap_or_default()
}

/// Role and character are matched by index position against the original
/// instrument list; entries past its end (newly added children) default to
/// a texture role with no character.
fn rebuild_instrument(node: &VisualNode, original: Option<&Instrument>) -> Instrument {
    let (role, character) = original
        .map(|o| (o.role.clone(), o.character.clone()))
        .unwrap_or_else(|| ("texture".to_string(), String::new()));
    Instrument {
        name: node.label.clone(),
        role,
        character,
    }
}

fn texture_field(node: &VisualNode, field: &str) -> String {
    node.children
        .iter()
        .find(|c| c.name == field)
        .and_then(|c| c.value.as_ref())
        .map(format_value)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::IdAlloc;
    use crate::project::project;
    use pretty_assertions::assert_eq;
    use smallvec::smallvec;

    fn full_section() -> Section {
        Section {
            name: "intro".into(),
            weight: 0.25,
            branches: Branches::Fixed(FixedAttributes {
                mood: Some(Mood {
                    primary: "isolation".into(),
                    nuances: smallvec!["stillness".to_string(), "distance".to_string()],
                }),
                genre: Some(Genre {
                    primary: "ambient".into(),
                    influences: smallvec!["drone".to_string()],
                }),
                instruments: vec![
                    Instrument {
                        name: "bowed pad".into(),
                        role: "texture".into(),
                        character: "glacial".into(),
                    },
                    Instrument {
                        name: "sub bass".into(),
                        role: "foundation".into(),
                        character: "soft".into(),
                    },
                ],
                texture: Some(Texture {
                    density: "sparse".into(),
                    movement: "slow".into(),
                    space: "cavernous".into(),
                }),
                sonic_details: vec!["faint wind".into(), "tape hiss".into()],
                metadata: SectionMeta {
                    tempo_feel: Some("unhurried".into()),
                    suggested_bpm: Some(62.0),
                    key: Some("D minor".into()),
                    time_signature: None,
                },
            }),
        }
    }

    #[test]
    fn project_commit_roundtrip_preserves_everything() {
        let section = full_section();
        let mut ids = IdAlloc::new();
        let visual = project(&section, &mut ids);
        let committed = commit(&visual, &section);
        assert_eq!(committed, section);
    }

    #[test]
    fn added_instrument_gets_default_role() {
        let section = full_section();
        let mut ids = IdAlloc::new();
        let mut visual = project(&section, &mut ids);

        // Instruments group is the third child (mood, genre, instruments).
        let instruments = &mut visual.children[2];
        instruments.children.push(VisualNode::leaf(
            ids.fresh("instrument"),
            "glass chimes",
            VisualKind::Instrument,
        ));

        let committed = commit(&visual, &section);
        let Branches::Fixed(attrs) = &committed.branches else {
            panic!("fixed section committed as tree");
        };
        assert_eq!(attrs.instruments.len(), 3);
        // Existing entries keep role/character by index position.
        assert_eq!(attrs.instruments[0].character, "glacial");
        assert_eq!(attrs.instruments[1].role, "foundation");
        // The new entry defaults.
        assert_eq!(attrs.instruments[2].name, "glass chimes");
        assert_eq!(attrs.instruments[2].role, "texture");
        assert_eq!(attrs.instruments[2].character, "");
    }

    #[test]
    fn deleted_group_commits_as_absent() {
        let section = full_section();
        let mut ids = IdAlloc::new();
        let mut visual = project(&section, &mut ids);
        visual.children.retain(|c| c.kind != VisualKind::Mood);

        let committed = commit(&visual, &section);
        let Branches::Fixed(attrs) = &committed.branches else {
            panic!("fixed section committed as tree");
        };
        assert!(attrs.mood.is_none());
        // Untouched groups survive.
        assert_eq!(attrs.genre.as_ref().unwrap().primary, "ambient");
    }

    #[test]
    fn generic_commit_reencodes_structurally() {
        let tree = SongNode {
            name: "Echo".into(),
            children: vec![SongNode {
                name: "Tempo".into(),
                value: Some(NodeValue::Number(80.0)),
                metadata: [("feel".to_string(), NodeValue::Text("breathing".into()))]
                    .into_iter()
                    .collect(),
                ..SongNode::default()
            }],
            ..SongNode::default()
        };
        let section = Section {
            name: "Echo".into(),
            weight: 1.0,
            branches: Branches::Tree { tree },
        };

        let mut ids = IdAlloc::new();
        let visual = project(&section, &mut ids);
        let committed = commit(&visual, &section);
        assert_eq!(committed, section);
    }
}
