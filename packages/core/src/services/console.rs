//! Catalog Console - per-view context
//!
//! Owns everything one admin view needs: the last fetched collection, the
//! forest built from it, selection and expansion state, and the batch
//! dispatcher. One console per view; there is no global instance.
//!
//! Mutations always go through the store and are followed by a refetch, so the
//! local collection is never patched optimistically.
//!
//! # Examples
//!
//! ```rust
//! use catalog_core::config::ConsoleConfig;
//! use catalog_core::db::InMemoryStore;
//! use catalog_core::models::{Record, RecordKind};
//! use catalog_core::operations::BatchOperation;
//! use catalog_core::services::CatalogConsole;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(InMemoryStore::new(vec![
//!     Record::new_with_id("shoes".into(), "Shoes".into(), None, RecordKind::category("shoes")),
//!     Record::new_with_id(
//!         "boots".into(),
//!         "Boots".into(),
//!         Some("shoes".into()),
//!         RecordKind::category("boots"),
//!     ),
//! ]));
//!
//! let mut console = CatalogConsole::new(store, ConsoleConfig::default())?;
//! console.refresh().await?;
//! assert_eq!(console.visible_rows().len(), 1);
//!
//! console.toggle_expanded("shoes");
//! assert_eq!(console.visible_rows().len(), 2);
//!
//! console.toggle_selected("boots");
//! let report = console.run_batch(BatchOperation::Disable).await?;
//! assert!(report.is_success());
//! # Ok(())
//! # }
//! ```

use crate::config::ConsoleConfig;
use crate::db::RecordStore;
use crate::models::{FlatNode, Record, TreeNode};
use crate::operations::{BatchDispatcher, BatchEvent, BatchOperation, BatchPhase, BatchReport};
use crate::services::error::ConsoleError;
use crate::state::{ExpansionState, SelectAllState, SelectionState};
use crate::tree::{self, BuildReport};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Context for one hierarchical admin view
pub struct CatalogConsole<S: RecordStore + ?Sized> {
    store: Arc<S>,
    config: ConsoleConfig,
    records: Vec<Record>,
    forest: Vec<TreeNode>,
    build_report: BuildReport,
    selection: SelectionState,
    expansion: ExpansionState,
    dispatcher: BatchDispatcher<S>,
    last_batch: Option<BatchReport>,
}

impl<S: RecordStore + ?Sized> CatalogConsole<S> {
    /// Create a console over `store`
    ///
    /// The collection starts empty; call [`refresh`](Self::refresh) to load it.
    pub fn new(store: Arc<S>, config: ConsoleConfig) -> Result<Self, ConsoleError> {
        config.validate().map_err(ConsoleError::config)?;

        let dispatcher = BatchDispatcher::new(
            Arc::clone(&store),
            config.error_policy,
            config.event_channel_capacity,
        );

        Ok(Self {
            store,
            config,
            records: Vec::new(),
            forest: Vec::new(),
            build_report: BuildReport::default(),
            selection: SelectionState::new(),
            expansion: ExpansionState::new(),
            dispatcher,
            last_batch: None,
        })
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    /// Refetch the collection and rebuild the forest
    ///
    /// Records failing validation are dropped with a warning, or fail the whole
    /// refresh with `ConsoleError::Validation` under `strict_validation`; a
    /// failed refresh leaves the previous collection and view state in place.
    /// Otherwise the selection is cleared and expansion is kept, pruned to
    /// surviving ids when configured.
    pub async fn refresh(&mut self) -> Result<(), ConsoleError> {
        let fetched = self
            .store
            .fetch_collection()
            .await
            .map_err(|e| ConsoleError::fetch(format!("{:#}", e)))?;

        let fetched_count = fetched.len();
        let mut records: Vec<Record> = Vec::with_capacity(fetched_count);
        for record in fetched {
            match record.validate() {
                Ok(()) => records.push(record),
                Err(e) if self.config.strict_validation => {
                    tracing::warn!("Refresh aborted, invalid record '{}': {}", record.id, e);
                    return Err(e.into());
                }
                Err(e) => tracing::warn!("Dropping invalid record '{}': {}", record.id, e),
            }
        }

        if self.config.sort_by_sort_order {
            tree::sort_by_sort_order(&mut records);
        }

        let (forest, report) = tree::build_forest_with_report(&records);

        self.selection.clear();
        if self.config.prune_expansion_on_refresh {
            let dropped = self
                .expansion
                .prune(records.iter().map(|r| r.id.as_str()));
            if dropped > 0 {
                tracing::debug!("Pruned {} expanded id(s) no longer present", dropped);
            }
        }

        tracing::info!(
            "Refreshed collection: {} record(s), {} dropped as invalid, {} root(s)",
            records.len(),
            fetched_count - records.len(),
            forest.len()
        );

        self.records = records;
        self.forest = forest;
        self.build_report = report;
        Ok(())
    }

    /// The validated collection from the last refresh
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn forest(&self) -> &[TreeNode] {
        &self.forest
    }

    /// Rows a tree renderer should draw given the current expansion
    pub fn visible_rows(&self) -> Vec<FlatNode<'_>> {
        tree::visible_rows(&self.forest, &self.expansion)
    }

    /// Diagnostics from the last forest build
    pub fn last_build_report(&self) -> &BuildReport {
        &self.build_report
    }

    /// Report of the last batch run, kept even if the follow-up refresh failed
    pub fn last_batch_report(&self) -> Option<&BatchReport> {
        self.last_batch.as_ref()
    }

    pub fn find(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectionState {
        &mut self.selection
    }

    pub fn expansion(&self) -> &ExpansionState {
        &self.expansion
    }

    pub fn expansion_mut(&mut self) -> &mut ExpansionState {
        &mut self.expansion
    }

    /// Toggle selection of one record, returning whether it is now selected
    pub fn toggle_selected(&mut self, id: &str) -> bool {
        self.selection.toggle(id)
    }

    /// Toggle expansion of one record, returning whether it is now expanded
    pub fn toggle_expanded(&mut self, id: &str) -> bool {
        self.expansion.toggle(id)
    }

    /// Select every record in the current collection
    pub fn select_all(&mut self) {
        self.selection
            .select_all(self.records.iter().map(|r| r.id.clone()));
    }

    /// Header checkbox state over the currently visible rows
    pub fn select_all_state(&self) -> SelectAllState {
        let rows = self.visible_rows();
        self.selection.select_all_state(rows.iter().map(|row| row.id))
    }

    /// Expand every ancestor of `id` so its row becomes visible
    pub fn reveal(&mut self, id: &str) -> Result<(), ConsoleError> {
        if self.find(id).is_none() {
            return Err(ConsoleError::record_not_found(id));
        }
        let ancestors = tree::ancestor_ids(&self.records, id);
        tracing::debug!("Revealing '{}' ({} ancestor(s))", id, ancestors.len());
        self.expansion.expand_path(ancestors);
        Ok(())
    }

    /// Current dispatcher phase
    pub fn batch_phase(&self) -> BatchPhase {
        self.dispatcher.phase()
    }

    pub fn subscribe_to_batch_events(&self) -> broadcast::Receiver<BatchEvent> {
        self.dispatcher.subscribe()
    }

    /// Apply `operation` to the selection, then refetch
    ///
    /// Precondition failures leave the selection and collection untouched.
    /// Once the batch has run its report is kept in
    /// [`last_batch_report`](Self::last_batch_report) even if the refetch fails.
    pub async fn run_batch(
        &mut self,
        operation: BatchOperation,
    ) -> Result<BatchReport, ConsoleError> {
        let report = self.dispatcher.run(&mut self.selection, operation).await?;
        self.last_batch = Some(report.clone());

        if let Err(e) = self.refresh().await {
            tracing::warn!("Refetch after batch '{}' failed: {}", report.operation, e);
            return Err(e);
        }
        Ok(report)
    }

    /// Tear down the view: clears collection and view state
    pub fn shutdown(&mut self) {
        tracing::info!(
            "Shutting down console ({} record(s), {} selected, {} expanded)",
            self.records.len(),
            self.selection.len(),
            self.expansion.len()
        );
        self.records.clear();
        self.forest.clear();
        self.build_report = BuildReport::default();
        self.selection.clear();
        self.expansion.collapse_all();
        self.last_batch = None;
    }
}
