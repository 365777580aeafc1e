//! Pure traversals over a built forest
//!
//! Every function here turns the nested hierarchy into a flat list of
//! [`FlatNode`] rows, so rendering never has to recurse over `TreeNode` itself.

use crate::models::{FlatNode, Record, TreeNode};
use crate::state::ExpansionState;
use std::collections::{HashMap, HashSet, VecDeque};

/// Pre-order rows for every node in the forest
pub fn flatten_preorder(forest: &[TreeNode]) -> Vec<FlatNode<'_>> {
    walk_preorder(forest, |_| true)
}

/// Pre-order rows, descending only into expanded nodes
///
/// Roots are always visible. A collapsed node is emitted but its subtree is not.
pub fn visible_rows<'a>(forest: &'a [TreeNode], expansion: &ExpansionState) -> Vec<FlatNode<'a>> {
    walk_preorder(forest, |id| expansion.is_expanded(id))
}

fn walk_preorder<'a>(forest: &'a [TreeNode], descend: impl Fn(&str) -> bool) -> Vec<FlatNode<'a>> {
    let mut rows = Vec::new();
    let mut stack: Vec<(&TreeNode, usize, Option<&str>)> =
        forest.iter().rev().map(|root| (root, 0, None)).collect();

    while let Some((node, depth, parent_id)) = stack.pop() {
        rows.push(FlatNode {
            id: node.id(),
            parent_id,
            depth,
            has_children: !node.is_leaf(),
            record: &node.record,
        });

        if descend(node.id()) {
            stack.extend(
                node.children
                    .iter()
                    .rev()
                    .map(|child| (child, depth + 1, Some(node.id()))),
            );
        }
    }
    rows
}

/// Breadth-first rows, level by level
pub fn flatten_level_order(forest: &[TreeNode]) -> Vec<FlatNode<'_>> {
    let mut rows = Vec::new();
    let mut queue: VecDeque<(&TreeNode, usize, Option<&str>)> =
        forest.iter().map(|root| (root, 0, None)).collect();

    while let Some((node, depth, parent_id)) = queue.pop_front() {
        rows.push(FlatNode {
            id: node.id(),
            parent_id,
            depth,
            has_children: !node.is_leaf(),
            record: &node.record,
        });
        queue.extend(
            node.children
                .iter()
                .map(|child| (child, depth + 1, Some(node.id()))),
        );
    }

    rows
}

/// Ids of every node below `id`, in pre-order. Empty if `id` is not in the forest.
pub fn descendant_ids(forest: &[TreeNode], id: &str) -> Vec<String> {
    match crate::models::find_in_forest(forest, id) {
        Some(node) => flatten_preorder(&node.children)
            .into_iter()
            .map(|row| row.id.to_string())
            .collect(),
        None => Vec::new(),
    }
}

/// Parent chain of `id` in the flat collection, nearest ancestor first
///
/// Stops at a record with no parent, at a parent id that does not resolve, or
/// when the chain loops back on itself.
pub fn ancestor_ids(records: &[Record], id: &str) -> Vec<String> {
    let mut parents: HashMap<&str, Option<&str>> = HashMap::with_capacity(records.len());
    for record in records {
        parents
            .entry(record.id.as_str())
            .or_insert(record.parent_id.as_deref());
    }

    let mut ancestors = Vec::new();
    let mut seen: HashSet<&str> = HashSet::from([id]);
    let mut current = id;
    while let Some(&Some(parent)) = parents.get(current) {
        if !parents.contains_key(parent) || !seen.insert(parent) {
            break;
        }
        ancestors.push(parent.to_string());
        current = parent;
    }
    ancestors
}
