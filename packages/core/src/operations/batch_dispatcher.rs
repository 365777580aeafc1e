//! Sequential batch mutations over the current selection
//!
//! Applies one operation to every selected record, one store call at a time,
//! awaiting each call before issuing the next. There is no concurrent fan-out:
//! load on the backend stays bounded and completion order is deterministic, so
//! a partial failure leaves an inspectable boundary.
//!
//! # Error Policy
//!
//! - `ContinueOnError` (default): every selected id is attempted, failures are
//!   collected in the report
//! - `FailFast`: the first failure stops the run, later ids are reported as
//!   skipped
//!
//! Either way the run ends with the dispatcher back in `Idle` and the selection
//! cleared. The dispatcher never patches local state; callers refetch.
//!
//! # Example
//!
//! ```rust
//! use catalog_core::db::InMemoryStore;
//! use catalog_core::models::{Record, RecordKind};
//! use catalog_core::operations::{BatchDispatcher, BatchOperation, ErrorPolicy};
//! use catalog_core::state::SelectionState;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(InMemoryStore::new(vec![
//!     Record::new_with_id("a".into(), "A".into(), None, RecordKind::tag()),
//! ]));
//! let mut dispatcher = BatchDispatcher::new(store, ErrorPolicy::ContinueOnError, 16);
//!
//! let mut selection = SelectionState::new();
//! selection.toggle("a");
//!
//! let report = dispatcher.run(&mut selection, BatchOperation::Disable).await?;
//! assert!(report.is_success());
//! assert!(selection.is_empty());
//! # Ok(())
//! # }
//! ```

use crate::db::RecordStore;
use crate::models::RecordPatch;
use crate::operations::{BatchError, BatchEvent, BatchPhase};
use crate::state::SelectionState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};

/// One change applied to every selected record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum BatchOperation {
    Enable,
    Disable,
    Delete,
    #[serde(rename_all = "camelCase")]
    MergeInto {
        target_id: String,
    },
}

impl BatchOperation {
    pub fn merge_into(target_id: impl Into<String>) -> Self {
        Self::MergeInto {
            target_id: target_id.into(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Enable => "enable",
            Self::Disable => "disable",
            Self::Delete => "delete",
            Self::MergeInto { .. } => "merge-into",
        }
    }
}

impl FromStr for BatchOperation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "enable" => Ok(Self::Enable),
            "disable" => Ok(Self::Disable),
            "delete" => Ok(Self::Delete),
            _ => match s.split_once(':') {
                Some(("merge" | "merge-into", target)) if !target.is_empty() => {
                    Ok(Self::merge_into(target))
                }
                _ => Err(format!(
                    "Invalid batch operation: {} (expected enable, disable, delete or merge:<id>)",
                    s
                )),
            },
        }
    }
}

impl std::fmt::Display for BatchOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MergeInto { target_id } => write!(f, "merge-into:{}", target_id),
            other => write!(f, "{}", other.name()),
        }
    }
}

/// What to do when a single store call fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Attempt every id and collect failures
    #[default]
    ContinueOnError,
    /// Stop at the first failure and skip the rest
    FailFast,
}

/// Terminal state of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchOutcome {
    Completed,
    PartiallyFailed,
}

/// A store call that returned an error or `false`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchFailure {
    pub id: String,
    pub reason: String,
}

/// Result of one batch run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub operation: BatchOperation,
    /// Ids whose call succeeded, in call order
    pub succeeded: Vec<String>,
    /// Ids whose call failed, in call order
    pub failed: Vec<BatchFailure>,
    /// Ids never attempted (fail-fast only)
    pub skipped: Vec<String>,
    pub outcome: BatchOutcome,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BatchReport {
    /// Number of store calls issued
    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn is_success(&self) -> bool {
        self.outcome == BatchOutcome::Completed
    }

    pub fn failed_ids(&self) -> Vec<&str> {
        self.failed.iter().map(|f| f.id.as_str()).collect()
    }
}

/// Applies a `BatchOperation` across a `SelectionState`, one id at a time
pub struct BatchDispatcher<S: RecordStore + ?Sized> {
    store: Arc<S>,
    policy: ErrorPolicy,
    phase: watch::Sender<BatchPhase>,
    events: broadcast::Sender<BatchEvent>,
}

impl<S: RecordStore + ?Sized> BatchDispatcher<S> {
    /// Create a dispatcher
    ///
    /// `event_capacity` bounds the broadcast buffer for progress events; zero
    /// is raised to one.
    pub fn new(store: Arc<S>, policy: ErrorPolicy, event_capacity: usize) -> Self {
        let (events, _) = broadcast::channel(event_capacity.max(1));
        let (phase, _) = watch::channel(BatchPhase::Idle);
        Self {
            store,
            policy,
            phase,
            events,
        }
    }

    pub fn policy(&self) -> ErrorPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: ErrorPolicy) {
        self.policy = policy;
    }

    /// Current phase (always `Idle` outside of `run`)
    pub fn phase(&self) -> BatchPhase {
        self.phase.borrow().clone()
    }

    /// Watch phase transitions, including while a run is in flight
    pub fn watch_phase(&self) -> watch::Receiver<BatchPhase> {
        self.phase.subscribe()
    }

    /// Subscribe to progress events
    pub fn subscribe(&self) -> broadcast::Receiver<BatchEvent> {
        self.events.subscribe()
    }

    /// Check preconditions without touching the store
    pub fn validate(
        selection: &SelectionState,
        operation: &BatchOperation,
    ) -> Result<(), BatchError> {
        if selection.is_empty() {
            return Err(BatchError::EmptySelection);
        }
        if let BatchOperation::MergeInto { target_id } = operation {
            if target_id.is_empty() {
                return Err(BatchError::MissingMergeTarget);
            }
            if selection.is_selected(target_id) {
                return Err(BatchError::merge_target_selected(target_id.clone()));
            }
        }
        Ok(())
    }

    /// Run `operation` over every selected id, in selection order
    ///
    /// # Returns
    ///
    /// - `Ok(report)` once the run reached a terminal state; the selection is
    ///   cleared whatever the outcome
    /// - `Err(BatchError)` if a precondition failed; no store call was made
    ///   and the selection is left untouched
    pub async fn run(
        &mut self,
        selection: &mut SelectionState,
        operation: BatchOperation,
    ) -> Result<BatchReport, BatchError> {
        Self::validate(selection, &operation)?;

        let ids = selection.ids();
        let total = ids.len();
        let started_at = Utc::now();

        tracing::info!("Starting batch '{}' over {} record(s)", operation, total);
        let _ = self.events.send(BatchEvent::Started {
            operation: operation.clone(),
            total,
        });

        let mut succeeded = Vec::with_capacity(total);
        let mut failed = Vec::new();
        let mut skipped = Vec::new();

        for (index, id) in ids.into_iter().enumerate() {
            if self.policy == ErrorPolicy::FailFast && !failed.is_empty() {
                skipped.push(id);
                continue;
            }

            self.phase.send_replace(BatchPhase::Running { index, total });
            let result = self.apply(&id, &operation).await;

            let ok = match result {
                Ok(true) => {
                    tracing::debug!(
                        "Batch '{}' {}/{}: '{}' ok",
                        operation,
                        index + 1,
                        total,
                        id
                    );
                    true
                }
                Ok(false) => {
                    tracing::warn!("Batch '{}': store rejected '{}'", operation, id);
                    failed.push(BatchFailure {
                        id: id.clone(),
                        reason: "rejected by store".to_string(),
                    });
                    false
                }
                Err(e) => {
                    tracing::warn!("Batch '{}': call for '{}' failed: {:#}", operation, id, e);
                    failed.push(BatchFailure {
                        id: id.clone(),
                        reason: format!("{:#}", e),
                    });
                    false
                }
            };

            let _ = self.events.send(BatchEvent::Progress {
                index,
                total,
                id: id.clone(),
                succeeded: ok,
            });
            if ok {
                succeeded.push(id);
            }
        }

        let outcome = if failed.is_empty() {
            BatchOutcome::Completed
        } else {
            BatchOutcome::PartiallyFailed
        };
        self.phase.send_replace(outcome.into());

        if !skipped.is_empty() {
            tracing::warn!(
                "Batch '{}' stopped after first failure, {} record(s) skipped",
                operation,
                skipped.len()
            );
        }
        tracing::info!(
            "Batch '{}' finished: {} succeeded, {} failed, {} skipped",
            operation,
            succeeded.len(),
            failed.len(),
            skipped.len()
        );

        let _ = self.events.send(BatchEvent::Finished {
            outcome,
            succeeded: succeeded.len(),
            failed: failed.len(),
            skipped: skipped.len(),
        });

        selection.clear();
        self.phase.send_replace(BatchPhase::Idle);

        Ok(BatchReport {
            operation,
            succeeded,
            failed,
            skipped,
            outcome,
            started_at,
            finished_at: Utc::now(),
        })
    }

    async fn apply(&self, id: &str, operation: &BatchOperation) -> anyhow::Result<bool> {
        match operation {
            BatchOperation::Enable => self.store.mutate_one(id, RecordPatch::enable()).await,
            BatchOperation::Disable => self.store.mutate_one(id, RecordPatch::disable()).await,
            BatchOperation::Delete => self.store.delete_one(id).await,
            BatchOperation::MergeInto { target_id } => {
                self.store.merge_many(&[id.to_string()], target_id).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryStore;
    use crate::models::{Record, RecordKind};

    #[test]
    fn test_operation_from_str() {
        assert_eq!("enable".parse::<BatchOperation>(), Ok(BatchOperation::Enable));
        assert_eq!("delete".parse::<BatchOperation>(), Ok(BatchOperation::Delete));
        assert_eq!(
            "merge:shoes".parse::<BatchOperation>(),
            Ok(BatchOperation::merge_into("shoes"))
        );
        assert_eq!(
            "merge-into:shoes".parse::<BatchOperation>(),
            Ok(BatchOperation::merge_into("shoes"))
        );
        assert!("merge:".parse::<BatchOperation>().is_err());
        assert!("archive".parse::<BatchOperation>().is_err());
    }

    #[test]
    fn test_operation_display_round_trips_merge() {
        let op = BatchOperation::merge_into("boots");
        assert_eq!(op.to_string(), "merge-into:boots");
        assert_eq!(op.to_string().parse::<BatchOperation>(), Ok(op));
    }

    #[tokio::test]
    async fn test_zero_event_capacity_is_clamped() {
        let store = Arc::new(InMemoryStore::new(vec![
            Record::new_with_id("a".into(), "A".into(), None, RecordKind::tag())
                .with_active(false),
        ]));
        let mut dispatcher = BatchDispatcher::new(Arc::clone(&store), ErrorPolicy::FailFast, 0);
        dispatcher.set_policy(ErrorPolicy::ContinueOnError);
        assert_eq!(dispatcher.policy(), ErrorPolicy::ContinueOnError);

        let mut events = dispatcher.subscribe();
        let mut selection = SelectionState::new();
        selection.toggle("a");
        let report = dispatcher
            .run(&mut selection, BatchOperation::Enable)
            .await
            .unwrap();

        assert!(report.is_success());
        assert!(store.snapshot().await[0].is_active);
        // capacity one keeps only the newest event
        assert!(matches!(
            events.recv().await,
            Err(broadcast::error::RecvError::Lagged(_))
        ));
        assert!(matches!(
            events.recv().await,
            Ok(BatchEvent::Finished { .. })
        ));
    }

    #[test]
    fn test_policy_serde_names() {
        let policy: ErrorPolicy = serde_json::from_str("\"fail_fast\"").unwrap();
        assert_eq!(policy, ErrorPolicy::FailFast);
        assert_eq!(ErrorPolicy::default(), ErrorPolicy::ContinueOnError);
    }
}
