//! Mutation operators over visual trees.
//!
//! All three operators are pure: they return a new tree and leave the
//! input untouched. Unknown ids are silent no-ops: ids may legitimately
//! race with concurrent edits, so an unmatched id is never an error. Each
//! call recurses the whole tree; sizes are bounded by what a human can
//! interactively author, so no batching is attempted.

use vt_core::id::{IdAlloc, NodeId};
use vt_core::label::parse_label;
use vt_core::visual::{VisualKind, VisualNode};

/// One edit to apply to a section's visual tree, as dispatched by the
/// session layer.
#[derive(Debug, Clone)]
pub enum MutationOp {
    Edit { id: NodeId, label: String },
    Remove { id: NodeId },
    AddChild { parent: NodeId },
}

/// Replace the label of the node matching `id`, re-deriving its structured
/// `(name, value)` pair from the new text. No-op for unmatched ids.
#[must_use]
pub fn edit(tree: &VisualNode, id: NodeId, label: &str) -> VisualNode {
    let mut next = tree.clone();
    if next.id == id {
        apply_label(&mut next, label);
    } else {
        next.children = tree.children.iter().map(|c| edit(c, id, label)).collect();
    }
    next
}

fn apply_label(node: &mut VisualNode, label: &str) {
    let (name, value) = parse_label(label);
    node.label = label.to_string();
    node.name = name;
    node.value = value;
}

/// Remove the subtree rooted at `id` from its parent's children. The root
/// itself is never a valid target; callers must guard against passing the
/// root id; the operator leaves the tree unchanged in that case.
#[must_use]
pub fn remove(tree: &VisualNode, id: NodeId) -> VisualNode {
    let mut next = tree.clone();
    next.children = tree
        .children
        .iter()
        .filter(|c| c.id != id)
        .map(|c| remove(c, id))
        .collect();
    next
}

/// Append one fresh `Custom` node labeled `"new"` to the node matching
/// `parent`. No-op if the parent is not found.
#[must_use]
pub fn add_child(tree: &VisualNode, parent: NodeId, ids: &mut IdAlloc) -> VisualNode {
    let mut next = tree.clone();
    if next.id == parent {
        next.children
            .push(VisualNode::leaf(ids.fresh("node"), "new", VisualKind::Custom));
    } else {
        next.children = tree
            .children
            .iter()
            .map(|c| add_child(c, parent, ids))
            .collect();
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vt_core::model::NodeValue;

    fn sample_tree(ids: &mut IdAlloc) -> VisualNode {
        let mut root = VisualNode::leaf(ids.fresh("section"), "intro", VisualKind::Section);
        let mut mood = VisualNode::leaf(ids.fresh("mood"), "Mood: calm", VisualKind::Mood);
        mood.children
            .push(VisualNode::leaf(ids.fresh("nuance"), "still", VisualKind::Nuance));
        root.children.push(mood);
        root.children
            .push(VisualNode::leaf(ids.fresh("genre"), "Genre: ambient", VisualKind::Genre));
        root
    }

    fn ids_of(tree: &VisualNode, out: &mut Vec<NodeId>) {
        out.push(tree.id);
        for c in &tree.children {
            ids_of(c, out);
        }
    }

    #[test]
    fn edit_changes_label_and_keeps_every_id_in_place() {
        let mut ids = IdAlloc::new();
        let tree = sample_tree(&mut ids);
        let target = tree.children[0].id;

        let edited = edit(&tree, target, "Mood: tense");

        let mut before = Vec::new();
        let mut after = Vec::new();
        ids_of(&tree, &mut before);
        ids_of(&edited, &mut after);
        assert_eq!(before, after, "edit moved or changed node ids");

        assert_eq!(edited.children[0].label, "Mood: tense");
        assert_eq!(edited.children[0].name, "Mood");
        assert_eq!(
            edited.children[0].value,
            Some(NodeValue::Text("tense".into()))
        );
        // The original is untouched.
        assert_eq!(tree.children[0].label, "Mood: calm");
    }

    #[test]
    fn edit_unknown_id_is_noop() {
        let mut ids = IdAlloc::new();
        let tree = sample_tree(&mut ids);
        let edited = edit(&tree, NodeId::intern("nowhere"), "x");
        assert_eq!(edited, tree);
    }

    #[test]
    fn remove_drops_whole_subtree_only() {
        let mut ids = IdAlloc::new();
        let tree = sample_tree(&mut ids);
        let mood_id = tree.children[0].id;
        let nuance_id = tree.children[0].children[0].id;
        let genre_id = tree.children[1].id;

        let pruned = remove(&tree, mood_id);
        assert!(!pruned.contains(mood_id));
        assert!(!pruned.contains(nuance_id));
        assert!(pruned.contains(genre_id));
        assert_eq!(pruned.children.len(), 1);
    }

    #[test]
    fn remove_root_id_is_noop() {
        let mut ids = IdAlloc::new();
        let tree = sample_tree(&mut ids);
        let pruned = remove(&tree, tree.id);
        assert_eq!(pruned, tree);
    }

    #[test]
    fn add_child_appends_fresh_custom_node() {
        let mut ids = IdAlloc::new();
        let tree = sample_tree(&mut ids);
        let mood_id = tree.children[0].id;

        let grown = add_child(&tree, mood_id, &mut ids);
        let mood = &grown.children[0];
        assert_eq!(mood.children.len(), 2);
        let fresh = &mood.children[1];
        assert_eq!(fresh.label, "new");
        assert_eq!(fresh.kind, VisualKind::Custom);
        assert!(!tree.contains(fresh.id), "fresh id reused an existing one");
    }

    #[test]
    fn add_child_unknown_parent_is_noop() {
        let mut ids = IdAlloc::new();
        let tree = sample_tree(&mut ids);
        let grown = add_child(&tree, NodeId::intern("nowhere"), &mut ids);
        assert_eq!(grown, tree);
    }
}
