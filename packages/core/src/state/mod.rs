//! View State
//!
//! Two independent id sets that the renderer reads and user interaction writes:
//!
//! - `SelectionState` - ids picked for the next batch operation
//! - `ExpansionState` - ids whose children are shown
//!
//! Both key on record ids, never on tree nodes, so rebuilding the forest keeps
//! them intact for every id that still exists.

mod expansion;
mod id_set;
mod selection;

pub use expansion::ExpansionState;
pub use id_set::IdSet;
pub use selection::{SelectAllState, SelectionState};
