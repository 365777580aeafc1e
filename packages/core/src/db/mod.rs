//! Store Layer
//!
//! This module holds the boundary to the backend that owns record collections:
//!
//! - `RecordStore` - async trait with the four calls the console needs
//! - `InMemoryStore` - reference implementation for development and tests
//!
//! Records coming out of a store are validated before any tree or selection
//! logic sees them (see `Record::from_json` and `CatalogConsole::refresh`).

mod memory_store;
mod record_store;

pub use memory_store::InMemoryStore;
pub use record_store::RecordStore;
