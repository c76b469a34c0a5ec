//! The editing session: the one owner of mutable state.
//!
//! A `Session` holds the single canonical tree and its index-aligned
//! visual trees, routes mutations into the right section's visual tree,
//! folds edits back into the canonical model on commit, and snapshots the
//! whole state into the history log. Everything underneath is a pure
//! function; this is the only place state lives between calls.
//!
//! Visual node ids stay stable for the lifetime of the session: visual
//! trees are projected once at ingestion and then only *edited*; commit
//! updates the canonical model without re-projecting, so detail-panel
//! bindings and diffs keep working across edit/commit cycles.

use crate::diff::{NodeDiff, diff};
use crate::history::{GenerationOutput, HistoryEntry, HistoryLog};
use crate::mutate::{MutationOp, add_child, edit, remove};
use vt_core::commit::commit;
use vt_core::flatten::flatten;
use vt_core::id::IdAlloc;
use vt_core::ingest::parse_tree;
use vt_core::model::CompositionTree;
use vt_core::project::project;
use vt_core::visual::VisualNode;

pub struct Session {
    /// The canonical tree, the single source of truth.
    pub tree: CompositionTree,

    /// Derived visual trees, index-aligned with `tree.sections`.
    pub visual: Vec<VisualNode>,

    /// Fresh-id allocator shared by projection and `add_child`.
    ids: IdAlloc,

    pub history: HistoryLog,
}

impl Session {
    /// Ingest an upstream JSON document and project every section.
    pub fn from_json(json: &str) -> Result<Self, String> {
        Ok(Self::new(parse_tree(json)?))
    }

    pub fn new(tree: CompositionTree) -> Self {
        let mut ids = IdAlloc::new();
        let visual = tree
            .sections
            .iter()
            .map(|section| project(section, &mut ids))
            .collect();
        Self {
            tree,
            visual,
            ids,
            history: HistoryLog::new(),
        }
    }

    /// Apply one mutation to one section's visual tree.
    ///
    /// Out-of-range sections and attempts to remove a section root are
    /// logged no-ops; mutations may race against a tree swap.
    pub fn apply(&mut self, section: usize, op: MutationOp) {
        let Some(visual) = self.visual.get(section) else {
            log::warn!("mutation on out-of-range section {section}");
            return;
        };

        let next = match op {
            MutationOp::Edit { id, label } => edit(visual, id, &label),
            MutationOp::Remove { id } => {
                if id == visual.id {
                    log::warn!("refusing to remove section root {id}");
                    return;
                }
                remove(visual, id)
            }
            MutationOp::AddChild { parent } => add_child(visual, parent, &mut self.ids),
        };
        self.visual[section] = next;
    }

    /// Fold one section's visual tree back into the canonical model.
    pub fn commit_section(&mut self, section: usize) {
        let Some(visual) = self.visual.get(section) else {
            return;
        };
        let Some(canonical) = self.tree.sections.get(section) else {
            return;
        };
        let committed = commit(visual, canonical);
        self.tree.sections[section] = committed;
    }

    /// Fold every section back into the canonical model.
    pub fn commit_all(&mut self) {
        for i in 0..self.visual.len().min(self.tree.sections.len()) {
            self.commit_section(i);
        }
    }

    /// The external prompt for the current canonical state.
    pub fn flattened(&self) -> String {
        flatten(&self.tree)
    }

    /// Commit all edits, then freeze the state into a history entry.
    pub fn snapshot(
        &mut self,
        source_prompt: &str,
        generation: Option<GenerationOutput>,
    ) -> &HistoryEntry {
        self.commit_all();
        let flattened = flatten(&self.tree);
        self.history.push(
            source_prompt.to_string(),
            self.tree.clone(),
            self.visual.clone(),
            flattened,
            generation,
        )
    }

    /// Diff one section's current visual tree against a history entry.
    /// Sections the entry does not have come back all-`Added`.
    pub fn diff_section_against(&self, section: usize, entry: &HistoryEntry) -> Option<NodeDiff> {
        let current = self.visual.get(section)?;
        Some(diff(current, entry.visual.get(section)))
    }
}
