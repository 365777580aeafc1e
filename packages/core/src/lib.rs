//! Catalog Console Core
//!
//! Client-side core of an e-commerce admin console for hierarchical
//! collections: product categories, content categories and tags.
//!
//! # Architecture
//!
//! - **Flat in, forest out**: stores return flat records with a `parent_id`;
//!   the hierarchy is derived on every refetch and never stored
//! - **State keyed by id**: selection and expansion survive tree rebuilds
//! - **Sequential batches**: one store call at a time with an explicit error policy
//! - **Server truth**: no optimistic patching, always refetch after a mutation
//!
//! # Modules
//!
//! - [`models`] - Data structures (Record, RecordKind, TreeNode, etc.)
//! - [`tree`] - Forest building and traversal
//! - [`state`] - Selection and expansion state
//! - [`operations`] - Batch mutation dispatcher
//! - [`db`] - Store trait and in-memory store
//! - [`services`] - `CatalogConsole` view context
//! - [`config`] - Console configuration

pub mod config;
pub mod db;
pub mod models;
pub mod operations;
pub mod services;
pub mod state;
pub mod tree;

// Re-export commonly used types
pub use config::ConsoleConfig;
pub use db::{InMemoryStore, RecordStore};
pub use models::*;
pub use operations::{
    BatchDispatcher, BatchError, BatchEvent, BatchOperation, BatchOutcome, BatchPhase,
    BatchReport, ErrorPolicy,
};
pub use services::*;
pub use state::{ExpansionState, SelectAllState, SelectionState};
