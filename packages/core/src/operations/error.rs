//! Error types for batch operations
//!
//! Only precondition failures are errors. Failures of individual store calls
//! during a run are captured in the `BatchReport` instead, so a partially
//! applied batch is always inspectable.

use thiserror::Error;

/// Errors that stop a batch before any store call is made
///
/// # Examples
///
/// ```rust
/// use catalog_core::operations::BatchError;
///
/// let err = BatchError::merge_target_selected("shoes");
/// assert_eq!(
///     err.to_string(),
///     "Merge target 'shoes' is part of the selection"
/// );
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BatchError {
    /// Nothing is selected
    #[error("No records selected for batch operation")]
    EmptySelection,

    /// Merge requested without a target
    #[error("Merge requires a target record")]
    MissingMergeTarget,

    /// Merge target is also one of the sources
    ///
    /// Merging a record into itself would delete the target.
    #[error("Merge target '{target_id}' is part of the selection")]
    MergeTargetSelected { target_id: String },
}

impl BatchError {
    /// Create a merge-target-selected error
    pub fn merge_target_selected(target_id: impl Into<String>) -> Self {
        Self::MergeTargetSelected {
            target_id: target_id.into(),
        }
    }
}
