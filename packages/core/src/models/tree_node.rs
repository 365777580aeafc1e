//! Derived hierarchy types
//!
//! A [`TreeNode`] is a pure projection of a [`Record`] collection. It is rebuilt
//! from scratch whenever the collection changes and never patched in place, so
//! it carries no identity of its own beyond the wrapped record's `id`.

use crate::models::Record;
use serde::Serialize;

/// In-memory hierarchical wrapper around a record plus its children
///
/// Building, walking, cloning, comparing and dropping all use an explicit
/// stack, so depth is bounded by memory rather than by the thread stack. The
/// nested `Serialize` and `Debug` output still recurse per level; use
/// [`FlatNode`] rows for arbitrarily deep trees.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    /// The wrapped record
    #[serde(flatten)]
    pub record: Record,

    /// Children in input order (always present, possibly empty)
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Wrap a record with no children
    pub fn leaf(record: Record) -> Self {
        Self {
            record,
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.record.id
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of nodes below this one (excluding itself)
    pub fn descendant_count(&self) -> usize {
        let mut count = 0;
        let mut stack: Vec<&TreeNode> = self.children.iter().collect();
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }

    /// Height of the subtree rooted here (a leaf has height 1)
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut stack = vec![(self, 1)];
        while let Some((node, level)) = stack.pop() {
            height = height.max(level);
            stack.extend(node.children.iter().map(|child| (child, level + 1)));
        }
        height
    }

    /// Find a node by id in this subtree (first match in pre-order)
    pub fn find(&self, id: &str) -> Option<&TreeNode> {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if node.id() == id {
                return Some(node);
            }
            stack.extend(node.children.iter().rev());
        }
        None
    }
}

impl Clone for TreeNode {
    fn clone(&self) -> Self {
        // Reverse pre-order visits every child before its parent, leaving a
        // node's children on top of `built`, first child uppermost.
        let mut order: Vec<&TreeNode> = Vec::new();
        let mut stack: Vec<&TreeNode> = self.children.iter().rev().collect();
        while let Some(node) = stack.pop() {
            order.push(node);
            stack.extend(node.children.iter().rev());
        }

        let mut built: Vec<TreeNode> = Vec::with_capacity(order.len());
        for node in order.into_iter().rev() {
            let children = pop_children(&mut built, node.children.len());
            built.push(TreeNode {
                record: node.record.clone(),
                children,
            });
        }

        TreeNode {
            record: self.record.clone(),
            children: pop_children(&mut built, self.children.len()),
        }
    }
}

fn pop_children(built: &mut Vec<TreeNode>, count: usize) -> Vec<TreeNode> {
    let mut children = Vec::with_capacity(count);
    for _ in 0..count {
        if let Some(child) = built.pop() {
            children.push(child);
        }
    }
    children
}

impl PartialEq for TreeNode {
    fn eq(&self, other: &Self) -> bool {
        let mut stack = vec![(self, other)];
        while let Some((a, b)) = stack.pop() {
            if a.record != b.record || a.children.len() != b.children.len() {
                return false;
            }
            stack.extend(a.children.iter().zip(b.children.iter()));
        }
        true
    }
}

impl Drop for TreeNode {
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.children);
        while let Some(mut node) = stack.pop() {
            stack.append(&mut node.children);
        }
    }
}

/// Find a node by id anywhere in a forest
pub fn find_in_forest<'a>(forest: &'a [TreeNode], id: &str) -> Option<&'a TreeNode> {
    forest.iter().find_map(|root| root.find(id))
}

/// Single row produced by a tree traversal
///
/// Rows decouple traversal from presentation: a renderer only needs to indent
/// by `depth` and draw an expander when `has_children` is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatNode<'a> {
    pub id: &'a str,
    pub parent_id: Option<&'a str>,
    pub depth: usize,
    pub has_children: bool,
    #[serde(skip)]
    pub record: &'a Record,
}
