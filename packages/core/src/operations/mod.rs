//! Batch Operations
//!
//! This module applies one user-requested change across the current selection:
//!
//! - `BatchDispatcher` - sequential per-id store calls with an explicit `ErrorPolicy`
//! - `BatchEvent` / `BatchPhase` - progress reporting for UI layers
//! - `BatchError` - precondition failures (nothing was sent to the store)

mod batch_dispatcher;
mod error;
mod events;

pub use batch_dispatcher::{
    BatchDispatcher, BatchFailure, BatchOperation, BatchOutcome, BatchReport, ErrorPolicy,
};
pub use error::BatchError;
pub use events::{BatchEvent, BatchPhase};
