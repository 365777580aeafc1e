//! Tree Building and Traversal
//!
//! - `builder` - flat record list → ordered forest (O(n), stable, never panics)
//! - `traversal` - forest → flat rows (pre-order, visible-only, level-order)
//!
//! The forest is a projection: it is rebuilt whenever the source collection
//! changes, and selection/expansion state is keyed by record id so a rebuild
//! never loses it.

mod builder;
mod traversal;


pub use builder::{build_forest, build_forest_with_report, sort_by_sort_order, BuildReport};
pub use traversal::{
    ancestor_ids, descendant_ids, flatten_level_order, flatten_preorder, visible_rows,
};
