//! Batch progress events
//!
//! Published by `BatchDispatcher` on a tokio broadcast channel so a progress
//! bar or log view can follow a running batch without holding the dispatcher.
//! Slow subscribers may lag and miss events; the final `BatchReport` is the
//! authoritative result.

use crate::operations::{BatchOperation, BatchOutcome};
use serde::{Deserialize, Serialize};

/// Where a dispatcher is in its run
///
/// `Idle → Running(i of n) → Completed | PartiallyFailed → Idle`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum BatchPhase {
    Idle,
    /// Store call `index` (zero-based) of `total` is in flight
    Running {
        index: usize,
        total: usize,
    },
    Completed,
    PartiallyFailed,
}

impl From<BatchOutcome> for BatchPhase {
    fn from(outcome: BatchOutcome) -> Self {
        match outcome {
            BatchOutcome::Completed => BatchPhase::Completed,
            BatchOutcome::PartiallyFailed => BatchPhase::PartiallyFailed,
        }
    }
}

/// Events emitted during a batch run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BatchEvent {
    /// Preconditions passed, the first call is about to be issued
    #[serde(rename = "batch:started")]
    Started {
        operation: BatchOperation,
        total: usize,
    },

    /// One store call finished
    #[serde(rename = "batch:progress")]
    Progress {
        index: usize,
        total: usize,
        id: String,
        succeeded: bool,
    },

    /// The run reached a terminal state; the dispatcher is idle again
    #[serde(rename = "batch:finished")]
    Finished {
        outcome: BatchOutcome,
        succeeded: usize,
        failed: usize,
        skipped: usize,
    },
}

impl BatchEvent {
    /// Get a string representation of the event type
    pub fn event_type(&self) -> &str {
        match self {
            BatchEvent::Started { .. } => "batch:started",
            BatchEvent::Progress { .. } => "batch:progress",
            BatchEvent::Finished { .. } => "batch:finished",
        }
    }
}
