//! RecordStore Trait - Remote Store Abstraction
//!
//! This module defines the `RecordStore` trait, the only interface the console
//! core needs from the backend that owns the record collections. Request and
//! response shapes beyond these four calls are backend-defined.
//!
//! # Design Decisions
//!
//! 1. **Async-First**: every call is async so HTTP and embedded backends fit alike
//! 2. **Boolean Outcome**: mutations report `Ok(false)` when the backend refused
//!    the change, and `Err(_)` when the call itself failed
//! 3. **Error Handling**: uses `anyhow::Result` for flexible error context
//! 4. **No Local Patching**: callers refetch after mutating instead of
//!    trusting their own copy
//!
//! # Examples
//!
//! ```rust,no_run
//! use catalog_core::db::RecordStore;
//! use catalog_core::models::RecordPatch;
//!
//! # async fn example(store: &dyn RecordStore) -> anyhow::Result<()> {
//! let records = store.fetch_collection().await?;
//! if let Some(first) = records.first() {
//!     store.mutate_one(&first.id, RecordPatch::disable()).await?;
//! }
//! # Ok(())
//! # }
//! ```

use crate::models::{Record, RecordPatch};
use anyhow::Result;
use async_trait::async_trait;

/// Backend collaborator that owns a record collection
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so the store can be shared behind an
/// `Arc` and its futures moved between threads.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch the whole collection in backend order
    async fn fetch_collection(&self) -> Result<Vec<Record>>;

    /// Apply a sparse patch to one record
    ///
    /// Returns `Ok(false)` if the record does not exist or the backend rejected
    /// the patch.
    async fn mutate_one(&self, id: &str, patch: RecordPatch) -> Result<bool>;

    /// Delete one record
    ///
    /// What happens to its children is backend-defined. If they keep a parent id
    /// that no longer resolves, the tree builder shows them as roots.
    async fn delete_one(&self, id: &str) -> Result<bool>;

    /// Fold `source_ids` into `target_id`
    async fn merge_many(&self, source_ids: &[String], target_id: &str) -> Result<bool>;
}
