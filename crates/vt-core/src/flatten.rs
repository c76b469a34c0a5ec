//! Flattener: canonical tree → external prompt text.
//!
//! Produces the plain-text prompt handed to the external music-generation
//! call. Two output shapes exist, chosen by the schema generation of the
//! first section:
//!
//! - **Generic-subtree mode** renders the node tree as nested markdown
//!   headings with values and metadata inline.
//! - **Fixed-attribute mode** renders the `Tags:` / `[Section]` /
//!   metadata-lines structure the generator expects.
//!
//! Flattening is total: absent optional fields are omitted from the
//! output, never errors.

use crate::label::{format_number, format_value};
use crate::model::*;
use std::collections::HashSet;
use std::fmt::Write;

/// Serialize a composition into the external prompt format.
#[must_use]
pub fn flatten(tree: &CompositionTree) -> String {
    match tree.sections.first().map(|s| &s.branches) {
        Some(Branches::Tree { tree: node }) => flatten_song_node(node),
        _ => flatten_fixed(tree),
    }
}

// ─── Generic-subtree mode ────────────────────────────────────────────────

/// Render a generic node tree as markdown: one heading per node (depth
/// capped at `######`), its value as text or a bullet list, metadata as
/// bold key/value lines, then a blank line, recursing into children.
#[must_use]
pub fn flatten_song_node(node: &SongNode) -> String {
    let mut out = String::with_capacity(1024);
    render_node(&mut out, node, 1);
    out
}

fn render_node(out: &mut String, node: &SongNode, depth: usize) {
    let level = depth.min(6);
    let _ = writeln!(out, "{} {}", "#".repeat(level), node.name);

    match &node.value {
        Some(NodeValue::List(items)) => {
            for item in items {
                let _ = writeln!(out, "- {}", format_value(item));
            }
        }
        Some(value) => {
            let _ = writeln!(out, "{}", format_value(value));
        }
        None => {}
    }

    for (key, value) in &node.metadata {
        let _ = writeln!(out, "**{key}:** {}", format_value(value));
    }

    out.push('\n');

    for child in &node.children {
        render_node(out, child, depth + 1);
    }
}

// ─── Fixed-attribute mode ────────────────────────────────────────────────

fn flatten_fixed(tree: &CompositionTree) -> String {
    let mut out = String::with_capacity(512);

    let _ = writeln!(out, "Tags: {}", collect_tags(tree).join(", "));
    out.push_str("Lyrics: [Instrumental]\n");

    for section in &tree.sections {
        out.push('\n');
        let _ = writeln!(out, "[{}]", capitalize(&section.name));
        let _ = writeln!(out, "({})", section_texture_line(section).join(", "));
    }

    out.push('\n');
    let metas: Vec<&SectionMeta> = tree
        .sections
        .iter()
        .filter_map(|s| match &s.branches {
            Branches::Fixed(attrs) => Some(&attrs.metadata),
            Branches::Tree { .. } => None,
        })
        .collect();

    if let Some(bpm) = metas.iter().find_map(|m| m.suggested_bpm) {
        let _ = writeln!(out, "BPM: {}", format_number(bpm));
    }
    if let Some(key) = metas.iter().find_map(|m| m.key.as_deref()) {
        let _ = writeln!(out, "Key: {key}");
    }
    if let Some(ts) = metas.iter().find_map(|m| m.time_signature.as_deref()) {
        let _ = writeln!(out, "Time Signature: {ts}");
    }
    let _ = writeln!(out, "Duration: {}s", format_number(tree.global.duration_seconds));

    out
}

/// Union of global tags, genre primaries and influences, mood primaries,
/// and instrument names. Duplicates collapse; order is deterministic
/// first-seen order.
fn collect_tags(tree: &CompositionTree) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut tags = Vec::new();

    for tag in &tree.global.tags {
        push_tag(tag, &mut seen, &mut tags);
    }

    for section in &tree.sections {
        let Branches::Fixed(attrs) = &section.branches else {
            continue;
        };
        if let Some(genre) = &attrs.genre {
            push_tag(&genre.primary, &mut seen, &mut tags);
            for influence in &genre.influences {
                push_tag(influence, &mut seen, &mut tags);
            }
        }
        if let Some(mood) = &attrs.mood {
            push_tag(&mood.primary, &mut seen, &mut tags);
        }
        for instrument in &attrs.instruments {
            push_tag(&instrument.name, &mut seen, &mut tags);
        }
    }

    tags
}

fn push_tag(tag: &str, seen: &mut HashSet<String>, tags: &mut Vec<String>) {
    if !tag.is_empty() && seen.insert(tag.to_string()) {
        tags.push(tag.to_string());
    }
}

/// One comma-joined line per section: instruments as
/// `"{character} {name}"`, then sonic details, then mood nuances.
fn section_texture_line(section: &Section) -> Vec<String> {
    let mut parts = Vec::new();
    let Branches::Fixed(attrs) = &section.branches else {
        return parts;
    };

    for instrument in &attrs.instruments {
        if instrument.character.is_empty() {
            parts.push(instrument.name.clone());
        } else {
            parts.push(format!("{} {}", instrument.character, instrument.name));
        }
    }
    parts.extend(attrs.sonic_details.iter().cloned());
    if let Some(mood) = &attrs.mood {
        parts.extend(mood.nuances.iter().cloned());
    }

    parts
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
