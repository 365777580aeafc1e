//! Data Models
//!
//! This module contains the core data structures used throughout the console:
//!
//! - `Record` - Flat record shared by category, content-category and tag collections
//! - `RecordKind` - Tagged family-specific payload, validated at the store boundary
//! - `RecordPatch` - Sparse update used by single-record mutations
//! - `TreeNode` / `FlatNode` - Derived hierarchy and traversal rows

mod record;
mod tree_node;


pub use record::{Record, RecordKind, RecordPatch, ValidationError};
pub use tree_node::{find_in_forest, FlatNode, TreeNode};
