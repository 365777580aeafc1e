//! Business Services
//!
//! - `CatalogConsole` - per-view context tying store, tree, view state and
//!   batch dispatcher together
//! - `ConsoleError` - errors surfaced to the view layer
//!
//! Services coordinate between the store layer and the view, refetching after
//! every mutation so the store stays the source of truth.

pub mod console;
pub mod error;

pub use console::CatalogConsole;
pub use error::ConsoleError;
