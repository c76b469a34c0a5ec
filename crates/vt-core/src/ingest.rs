//! Ingestion boundary: external JSON → `CompositionTree`.
//!
//! Two wire generations arrive from the upstream language-model call:
//!
//! - **SongCharacteristics**: `{ "root": { name, value?, children?,
//!   metadata? } }`, a single generic subtree. Becomes a one-section tree
//!   with global traits lifted from the root node's metadata.
//! - **Legacy VibeTree**: `{ concept, sections: [...], ... }`, optionally
//!   wrapped under a `"root"` key, with global fields either nested under
//!   `"global"` or at the top level.
//!
//! This is the one fallible entry point in the crate. Malformed or
//! schema-mismatched input fails loudly with a descriptive error rather
//! than producing a partially-populated tree; downstream flattening
//! assumes structural presence of the root. Which branches generation each
//! section uses is resolved here, once; nothing downstream re-inspects raw
//! JSON shapes.

use crate::model::*;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Parse an upstream JSON document into a `CompositionTree`.
#[must_use = "parsing result should be used"]
pub fn parse_tree(json: &str) -> Result<CompositionTree, String> {
    let value: Value =
        serde_json::from_str(json).map_err(|e| format!("invalid JSON: {e}"))?;
    let tree = tree_from_value(&value)?;
    log::debug!(
        "ingested {:?}: {} section(s), generic mode: {}",
        tree.concept,
        tree.sections.len(),
        tree.uses_generic_mode()
    );
    Ok(tree)
}

/// Parse an already-decoded JSON value into a `CompositionTree`.
pub fn tree_from_value(value: &Value) -> Result<CompositionTree, String> {
    let obj = value
        .as_object()
        .ok_or("expected a JSON object at the top level")?;

    if let Some(root) = obj.get("root") {
        let root_obj = root.as_object().ok_or("\"root\" must be an object")?;
        if root_obj.contains_key("sections") {
            return legacy_tree(root_obj);
        }
        if root_obj.contains_key("name") {
            return song_characteristics(root.clone());
        }
        return Err(
            "\"root\" is neither a song node (missing \"name\") nor a composition \
             (missing \"sections\")"
                .to_string(),
        );
    }

    if obj.contains_key("sections") {
        return legacy_tree(obj);
    }

    Err("missing root: expected {\"root\": ...} or an object with \"sections\"".to_string())
}

// ─── SongCharacteristics generation ──────────────────────────────────────

fn song_characteristics(root: Value) -> Result<CompositionTree, String> {
    let node: SongNode = serde_json::from_value(root)
        .map_err(|e| format!("malformed song-node root: {e}"))?;
    if node.name.is_empty() {
        return Err("song-node root has an empty name".to_string());
    }

    let global = global_from_metadata(&node.metadata);
    let section = Section {
        name: node.name.clone(),
        weight: 1.0,
        branches: Branches::Tree { tree: node.clone() },
    };

    Ok(CompositionTree {
        concept: node.name,
        image_interpretation: None,
        sections: vec![section],
        global,
    })
}

/// Lift composition-wide traits out of the root node's metadata bag.
fn global_from_metadata(metadata: &std::collections::BTreeMap<String, NodeValue>) -> GlobalTraits {
    let overall_arc = metadata
        .get("overall_arc")
        .and_then(NodeValue::as_text)
        .unwrap_or_default()
        .to_string();

    let tags: BTreeSet<String> = match metadata.get("tags") {
        Some(NodeValue::List(items)) => items
            .iter()
            .filter_map(NodeValue::as_text)
            .map(str::to_string)
            .collect(),
        _ => BTreeSet::new(),
    };

    let duration_seconds = metadata
        .get("duration_seconds")
        .and_then(NodeValue::as_number)
        .unwrap_or_default();

    GlobalTraits {
        overall_arc,
        tags,
        duration_seconds,
    }
}

// ─── Legacy VibeTree generation ──────────────────────────────────────────

fn legacy_tree(obj: &Map<String, Value>) -> Result<CompositionTree, String> {
    let concept = str_field(obj, &["concept"]).unwrap_or_default();
    let image_interpretation = str_field(obj, &["image_interpretation", "imageInterpretation"]);

    let raw_sections = obj
        .get("sections")
        .and_then(Value::as_array)
        .ok_or("\"sections\" must be an array")?;

    let mut sections = Vec::with_capacity(raw_sections.len());
    for (i, raw) in raw_sections.iter().enumerate() {
        sections.push(parse_section(raw, i)?);
    }

    Ok(CompositionTree {
        concept,
        image_interpretation,
        sections,
        global: parse_global(obj),
    })
}

fn parse_section(raw: &Value, index: usize) -> Result<Section, String> {
    let obj = raw
        .as_object()
        .ok_or_else(|| format!("section {index} is not an object"))?;

    let name = obj
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| format!("section {index} is missing \"name\""))?
        .to_string();

    let weight = obj
        .get("weight")
        .and_then(Value::as_f64)
        .unwrap_or_default() as f32;

    let branches_raw = obj
        .get("branches")
        .and_then(Value::as_object)
        .ok_or_else(|| format!("section {index} ({name:?}) has no \"branches\" object"))?;

    let branches = parse_branches(branches_raw)
        .map_err(|e| format!("section {index} ({name:?}): {e}"))?;

    Ok(Section {
        name,
        weight,
        branches,
    })
}

/// Resolve which schema generation a section's branches use.
///
/// A `tree` key holding an object with a `name` marks the generic-subtree
/// generation; everything else deserializes against the fixed schema.
fn parse_branches(obj: &Map<String, Value>) -> Result<Branches, String> {
    if let Some(tree) = obj.get("tree")
        && tree.as_object().is_some_and(|t| t.contains_key("name"))
    {
        let node: SongNode = serde_json::from_value(tree.clone())
            .map_err(|e| format!("malformed branches tree: {e}"))?;
        return Ok(Branches::Tree { tree: node });
    }

    let attrs: FixedAttributes = serde_json::from_value(Value::Object(obj.clone()))
        .map_err(|e| format!("malformed fixed branches: {e}"))?;
    Ok(Branches::Fixed(attrs))
}

/// Global fields are accepted both nested under `"global"` and flat at the
/// top level, in either key spelling.
fn parse_global(obj: &Map<String, Value>) -> GlobalTraits {
    let scope: &Map<String, Value> = obj
        .get("global")
        .and_then(Value::as_object)
        .unwrap_or(obj);

    let overall_arc = str_field(scope, &["overall_arc", "overallArc"]).unwrap_or_default();

    let tags: BTreeSet<String> = scope
        .get("tags")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let duration_seconds = scope
        .get("duration_seconds")
        .or_else(|| scope.get("durationSeconds"))
        .and_then(Value::as_f64)
        .unwrap_or_default();

    GlobalTraits {
        overall_arc,
        tags,
        duration_seconds,
    }
}

fn str_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| obj.get(*k))
        .and_then(Value::as_str)
        .map(str::to_string)
}
