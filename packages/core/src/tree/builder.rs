//! Flat list → forest construction
//!
//! Builds the nested hierarchy in two passes over the input:
//!
//! 1. Map `id → index` (first-seen record wins on duplicate ids)
//! 2. Attach every record to its parent's child list, or to the root list when
//!    the parent is missing or unknown
//!
//! Children lists are filled in input order, so sibling order is stable and the
//! build is deterministic. Records caught in a parent cycle are never reachable
//! from a root; they are recovered by promoting one member of each cycle.

use crate::models::{Record, TreeNode};
use serde::Serialize;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

/// Diagnostics collected while building a forest
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildReport {
    /// Ids seen more than once; only the first record was kept
    pub duplicate_ids: Vec<String>,

    /// Records whose parent id did not resolve and were promoted to root
    pub dangling_parents: Vec<String>,

    /// Records promoted to root to break a parent cycle
    pub cycle_breaks: Vec<String>,
}

impl BuildReport {
    /// True when the input was a well-formed forest
    pub fn is_clean(&self) -> bool {
        self.duplicate_ids.is_empty() && self.cycle_breaks.is_empty()
    }
}

/// Build an ordered forest from a flat record list
///
/// # Examples
///
/// ```rust
/// use catalog_core::models::{Record, RecordKind};
/// use catalog_core::tree::build_forest;
///
/// let records = vec![
///     Record::new_with_id("1".into(), "Root".into(), None, RecordKind::tag()),
///     Record::new_with_id("2".into(), "Child".into(), Some("1".into()), RecordKind::tag()),
///     Record::new_with_id("3".into(), "Orphan".into(), Some("99".into()), RecordKind::tag()),
/// ];
///
/// let forest = build_forest(&records);
/// let roots: Vec<&str> = forest.iter().map(|n| n.id()).collect();
/// assert_eq!(roots, ["1", "3"]);
/// assert_eq!(forest[0].children[0].id(), "2");
/// ```
pub fn build_forest(records: &[Record]) -> Vec<TreeNode> {
    build_forest_with_report(records).0
}

/// Build an ordered forest and report how malformed input was handled
pub fn build_forest_with_report(records: &[Record]) -> (Vec<TreeNode>, BuildReport) {
    let mut report = BuildReport::default();

    // Pass 1: id → index, first-seen wins
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(records.len());
    let mut kept: Vec<usize> = Vec::with_capacity(records.len());
    for (i, record) in records.iter().enumerate() {
        match index.entry(record.id.as_str()) {
            Entry::Occupied(_) => {
                tracing::warn!(
                    "Duplicate record id '{}' at position {}, keeping first occurrence",
                    record.id,
                    i
                );
                report.duplicate_ids.push(record.id.clone());
            }
            Entry::Vacant(slot) => {
                slot.insert(i);
                kept.push(i);
            }
        }
    }

    // Pass 2: adjacency list (parent index → child indices, input order)
    let mut parent_of: Vec<Option<usize>> = vec![None; records.len()];
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); records.len()];
    let mut roots: Vec<usize> = Vec::new();
    for &i in &kept {
        let record = &records[i];
        match record.parent_id.as_deref() {
            None => roots.push(i),
            Some(parent_id) => match index.get(parent_id) {
                Some(&parent) => {
                    parent_of[i] = Some(parent);
                    children[parent].push(i);
                }
                None => {
                    tracing::debug!(
                        "Record '{}' references unknown parent '{}', promoting to root",
                        record.id,
                        parent_id
                    );
                    report.dangling_parents.push(record.id.clone());
                    roots.push(i);
                }
            },
        }
    }

    let mut reachable = vec![false; records.len()];
    for &root in &roots {
        mark_reachable(root, &children, &mut reachable);
    }

    // Anything still unreachable hangs below a cycle
    for &i in &kept {
        if reachable[i] {
            continue;
        }
        let entry = cycle_entry(i, &parent_of);
        tracing::warn!(
            "Parent cycle detected at record '{}', promoting it to root",
            records[entry].id
        );
        report.cycle_breaks.push(records[entry].id.clone());
        roots.push(entry);
        mark_reachable(entry, &children, &mut reachable);
    }

    let forest = assemble(&roots, records, &children);
    (forest, report)
}

fn mark_reachable(start: usize, children: &[Vec<usize>], reachable: &mut [bool]) {
    let mut stack = vec![start];
    while let Some(i) = stack.pop() {
        if reachable[i] {
            continue;
        }
        reachable[i] = true;
        stack.extend(children[i].iter().copied().filter(|&c| !reachable[c]));
    }
}

/// Walk up the parent chain until a record repeats
///
/// Only called for unreachable records, whose chain never ends at a root, so
/// every step has a resolved parent.
fn cycle_entry(start: usize, parent_of: &[Option<usize>]) -> usize {
    let mut on_path = HashSet::new();
    let mut current = start;
    while on_path.insert(current) {
        match parent_of[current] {
            Some(parent) => current = parent,
            None => return current,
        }
    }
    current
}

/// Turn adjacency lists into owned nodes without recursion
///
/// A pre-order pass over an explicit stack decides which child edges are kept;
/// nodes are then assembled in reverse pre-order, so every child is complete
/// before its parent takes it.
fn assemble(roots: &[usize], records: &[Record], children: &[Vec<usize>]) -> Vec<TreeNode> {
    let mut placed = vec![false; records.len()];
    let mut kept_children: Vec<Vec<usize>> = vec![Vec::new(); records.len()];
    let mut order: Vec<usize> = Vec::with_capacity(records.len());

    for &root in roots {
        let mut stack = vec![root];
        placed[root] = true;
        while let Some(i) = stack.pop() {
            order.push(i);
            for &child in &children[i] {
                // The edge that closes a broken cycle points back at an already placed node
                if !placed[child] {
                    placed[child] = true;
                    kept_children[i].push(child);
                }
            }
            stack.extend(kept_children[i].iter().rev().copied());
        }
    }

    let mut slots: Vec<Option<TreeNode>> = (0..records.len()).map(|_| None).collect();
    for &i in order.iter().rev() {
        let mut node = TreeNode::leaf(records[i].clone());
        node.children = kept_children[i]
            .iter()
            .filter_map(|&child| slots[child].take())
            .collect();
        slots[i] = Some(node);
    }

    roots.iter().filter_map(|&root| slots[root].take()).collect()
}

/// Stable sort by `sort_order`; ties keep their input order
///
/// The builder never reorders siblings itself, so callers that want
/// sort-order display sort the flat list first.
pub fn sort_by_sort_order(records: &mut [Record]) {
    records.sort_by_key(|record| record.sort_order);
}
