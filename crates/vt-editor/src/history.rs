//! Append-only history of generation snapshots.
//!
//! A `HistoryEntry` freezes everything about one successful generation:
//! the source prompt, deep copies of the canonical tree and its visual
//! trees, the flattened prompt that was sent out, and whatever the
//! external generator echoed back. Entries are immutable after creation
//! and serve as the "previous" side of diffs against the current state.

use crate::diff::{DiffStatus, NodeDiff};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use vt_core::model::CompositionTree;
use vt_core::visual::VisualNode;

/// What the external music-generation call reported for a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationOutput {
    pub audio_url: Option<String>,
    pub bpm: Option<f64>,
    pub key_scale: Option<String>,
    pub time_signature: Option<String>,
    pub generation_info: Option<String>,
}

/// One frozen point-in-time snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub id: String,
    pub timestamp_ms: u64,
    pub source_prompt: String,
    pub tree: CompositionTree,
    /// One visual tree per section, index-aligned with `tree.sections`.
    pub visual: Vec<VisualNode>,
    pub flattened_prompt: String,
    pub generation: Option<GenerationOutput>,
}

/// In-memory, append-only log of snapshots.
#[derive(Debug, Default)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
    next_id: u64,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new entry and return it. Ids are `snap_{n}` in creation
    /// order; timestamps are wall-clock milliseconds.
    pub fn push(
        &mut self,
        source_prompt: String,
        tree: CompositionTree,
        visual: Vec<VisualNode>,
        flattened_prompt: String,
        generation: Option<GenerationOutput>,
    ) -> &HistoryEntry {
        let id = format!("snap_{}", self.next_id);
        self.next_id += 1;
        log::info!("created history entry {id}");

        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        self.entries.push(HistoryEntry {
            id,
            timestamp_ms,
            source_prompt,
            tree,
            visual,
            flattened_prompt,
            generation,
        });

        // Just pushed, so never empty.
        self.entries.last().unwrap()
    }

    pub fn get(&self, id: &str) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Entries in creation order (oldest first).
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Human-readable change summary for a computed diff:
/// `"2 nodes added, 1 node removed"`, or `"No changes"`.
pub fn summarize_diff(diff: &NodeDiff) -> String {
    let mut added = 0usize;
    let mut changed = 0usize;
    let mut removed = 0usize;
    count(diff, &mut added, &mut changed, &mut removed);

    if added + changed + removed == 0 {
        return "No changes".to_string();
    }

    let mut parts = Vec::new();
    if added > 0 {
        parts.push(format!("{added} node{} added", plural(added)));
    }
    if changed > 0 {
        parts.push(format!("{changed} node{} changed", plural(changed)));
    }
    if removed > 0 {
        parts.push(format!("{removed} node{} removed", plural(removed)));
    }
    parts.join(", ")
}

fn count(diff: &NodeDiff, added: &mut usize, changed: &mut usize, removed: &mut usize) {
    match diff.status {
        DiffStatus::Added => *added += 1,
        DiffStatus::Changed => *changed += 1,
        DiffStatus::Removed => *removed += 1,
        DiffStatus::Unchanged => {}
    }
    for child in &diff.children {
        count(child, added, changed, removed);
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}
