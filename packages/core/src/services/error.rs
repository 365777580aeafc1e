//! Service Layer Error Types
//!
//! Errors surfaced by `CatalogConsole`, chaining the lower layers' errors.

use crate::models::ValidationError;
use crate::operations::BatchError;
use thiserror::Error;

/// Console operation errors
#[derive(Error, Debug)]
pub enum ConsoleError {
    /// Configuration rejected at construction
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The store failed to return the collection
    #[error("Failed to fetch collection: {0}")]
    Fetch(String),

    /// Batch preconditions failed
    #[error("Batch operation rejected: {0}")]
    Batch(#[from] BatchError),

    /// A record failed validation
    #[error("Record validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Operation referenced a record not in the current collection
    #[error("Record not found: {id}")]
    RecordNotFound { id: String },
}

impl ConsoleError {
    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a fetch error
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    /// Create a record not found error
    pub fn record_not_found(id: impl Into<String>) -> Self {
        Self::RecordNotFound { id: id.into() }
    }
}
