//! Console Refresh Tests
//!
//! End-to-end behavior of `CatalogConsole` over the in-memory store: view
//! state across refetches, batch runs followed by refresh, and merge.

#[cfg(test)]
mod console_refresh_tests {
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use catalog_core::config::ConsoleConfig;
    use catalog_core::db::{InMemoryStore, RecordStore};
    use catalog_core::models::{Record, RecordKind, RecordPatch};
    use catalog_core::operations::{BatchOperation, ErrorPolicy};
    use catalog_core::services::{CatalogConsole, ConsoleError};
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tokio::time::{timeout, Duration};

    fn seed_json() -> String {
        json!([
            { "id": "apparel", "name": "Apparel", "kind": "category", "slug": "apparel", "productCount": 3 },
            { "id": "shoes", "parentId": "apparel", "name": "Shoes", "kind": "category", "slug": "shoes", "productCount": 10 },
            { "id": "boots", "parentId": "shoes", "name": "Boots", "kind": "category", "slug": "boots", "productCount": 4 },
            { "id": "sneakers", "parentId": "shoes", "name": "Sneakers", "kind": "category", "slug": "sneakers", "productCount": 6 },
            { "id": "orphan", "parentId": "gone", "name": "Orphan", "kind": "category", "slug": "orphan" }
        ])
        .to_string()
    }

    async fn create_console() -> Result<(CatalogConsole<InMemoryStore>, Arc<InMemoryStore>)> {
        let store = Arc::new(InMemoryStore::from_json_str(&seed_json())?);
        let mut console = CatalogConsole::new(Arc::clone(&store), ConsoleConfig::default())?;
        console.refresh().await?;
        Ok((console, store))
    }

    fn root_ids(console: &CatalogConsole<InMemoryStore>) -> Vec<String> {
        console.forest().iter().map(|n| n.id().to_string()).collect()
    }

    #[tokio::test]
    async fn test_dangling_parent_is_root_and_reported() -> Result<()> {
        let (console, _store) = create_console().await?;

        assert_eq!(root_ids(&console), vec!["apparel", "orphan"]);
        assert_eq!(console.last_build_report().dangling_parents, vec!["orphan"]);
        assert!(console.last_build_report().is_clean());
        Ok(())
    }

    #[tokio::test]
    async fn test_expansion_survives_refresh_selection_does_not() -> Result<()> {
        let (mut console, _store) = create_console().await?;

        console.toggle_expanded("apparel");
        console.toggle_expanded("shoes");
        console.toggle_selected("boots");
        assert_eq!(console.visible_rows().len(), 5);

        console.refresh().await?;

        assert!(console.expansion().is_expanded("apparel"));
        assert!(console.expansion().is_expanded("shoes"));
        assert!(console.selection().is_empty());
        assert_eq!(console.visible_rows().len(), 5);
        Ok(())
    }

    #[tokio::test]
    async fn test_prune_on_refresh_drops_deleted_ids() -> Result<()> {
        let (mut console, _store) = create_console().await?;

        console.toggle_expanded("shoes");
        console.toggle_selected("shoes");
        console.run_batch(BatchOperation::Delete).await?;

        assert!(!console.expansion().is_expanded("shoes"));
        assert!(console.find("shoes").is_none());
        // boots and sneakers lost their parent and are promoted
        assert_eq!(
            root_ids(&console),
            vec!["apparel", "boots", "sneakers", "orphan"]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_run_batch_refetches_server_truth() -> Result<()> {
        let (mut console, store) = create_console().await?;
        let mut events = console.subscribe_to_batch_events();

        console.toggle_selected("boots");
        console.toggle_selected("sneakers");
        let report = console.run_batch(BatchOperation::Disable).await?;

        assert!(report.is_success());
        assert!(console.selection().is_empty());
        assert!(!console.find("boots").map(|r| r.is_active).unwrap_or(true));
        assert!(!console.find("sneakers").map(|r| r.is_active).unwrap_or(true));
        assert_eq!(console.records(), store.snapshot().await.as_slice());

        let first = timeout(Duration::from_secs(1), events.recv()).await??;
        assert_eq!(first.event_type(), "batch:started");
        Ok(())
    }

    #[tokio::test]
    async fn test_merge_into_category() -> Result<()> {
        let (mut console, _store) = create_console().await?;

        console.toggle_selected("boots");
        console.toggle_selected("sneakers");
        let report = console
            .run_batch(BatchOperation::merge_into("apparel"))
            .await?;

        assert_eq!(report.succeeded, vec!["boots", "sneakers"]);
        assert!(console.find("boots").is_none());
        let apparel = console.find("apparel").ok_or_else(|| anyhow!("apparel missing"))?;
        match &apparel.kind {
            RecordKind::Category { product_count, .. } => assert_eq!(*product_count, 13),
            other => panic!("Expected category, got {:?}", other),
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_merge_target_selected_keeps_state() -> Result<()> {
        let (mut console, store) = create_console().await?;

        console.toggle_selected("boots");
        console.toggle_selected("apparel");
        let result = console
            .run_batch(BatchOperation::merge_into("apparel"))
            .await;

        assert!(matches!(result, Err(ConsoleError::Batch(_))));
        assert_eq!(console.selection().len(), 2);
        assert_eq!(store.len().await, 5);
        Ok(())
    }

    #[tokio::test]
    async fn test_merge_parent_into_own_child_keeps_target() -> Result<()> {
        let (mut console, _store) = create_console().await?;

        console.toggle_selected("shoes");
        let report = console
            .run_batch(BatchOperation::merge_into("boots"))
            .await?;

        assert!(report.is_success());
        let boots = console.find("boots").ok_or_else(|| anyhow!("boots missing"))?;
        assert_eq!(boots.parent_id.as_deref(), Some("apparel"));
        match &boots.kind {
            RecordKind::Category { product_count, .. } => assert_eq!(*product_count, 14),
            other => panic!("Expected category, got {:?}", other),
        }

        let sneakers = console
            .find("sneakers")
            .ok_or_else(|| anyhow!("sneakers missing"))?;
        assert_eq!(sneakers.parent_id.as_deref(), Some("boots"));
        assert_eq!(console.records().len(), 4);
        assert!(console.last_build_report().cycle_breaks.is_empty());
        Ok(())
    }

    /// Store whose fetch fails after a switch is flipped
    struct FlakyStore {
        inner: InMemoryStore,
        fail_fetch: AtomicBool,
    }

    #[async_trait]
    impl RecordStore for FlakyStore {
        async fn fetch_collection(&self) -> Result<Vec<Record>> {
            if self.fail_fetch.load(Ordering::SeqCst) {
                return Err(anyhow!("connection reset"));
            }
            self.inner.fetch_collection().await
        }

        async fn mutate_one(&self, id: &str, patch: RecordPatch) -> Result<bool> {
            self.inner.mutate_one(id, patch).await
        }

        async fn delete_one(&self, id: &str) -> Result<bool> {
            self.inner.delete_one(id).await
        }

        async fn merge_many(&self, source_ids: &[String], target_id: &str) -> Result<bool> {
            self.inner.merge_many(source_ids, target_id).await
        }
    }

    #[tokio::test]
    async fn test_failed_refetch_keeps_batch_report() -> Result<()> {
        let store = Arc::new(FlakyStore {
            inner: InMemoryStore::from_json_str(&seed_json())?,
            fail_fetch: AtomicBool::new(false),
        });
        let config = ConsoleConfig {
            error_policy: ErrorPolicy::FailFast,
            ..Default::default()
        };
        let mut console = CatalogConsole::new(Arc::clone(&store), config)?;
        console.refresh().await?;

        console.toggle_selected("orphan");
        store.fail_fetch.store(true, Ordering::SeqCst);
        let result = console.run_batch(BatchOperation::Enable).await;

        assert!(matches!(result, Err(ConsoleError::Fetch(_))));
        let report = console
            .last_batch_report()
            .ok_or_else(|| anyhow!("report missing"))?;
        assert_eq!(report.succeeded, vec!["orphan"]);
        Ok(())
    }
}
