//! In-memory `RecordStore`
//!
//! Reference backend used by the developer tools and tests. Records live in a
//! `Vec` behind a tokio `RwLock`, so `fetch_collection` returns them in
//! insertion order just like a backend returning rows by primary key.

use crate::db::RecordStore;
use crate::models::{Record, RecordKind, RecordPatch};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: RwLock<Vec<Record>>,
}

impl InMemoryStore {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    /// Seed from a JSON array of records
    ///
    /// Every entry goes through `Record::from_json`; the first invalid entry
    /// aborts seeding with its position in the error context.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let values: Vec<serde_json::Value> =
            serde_json::from_str(json).context("Record dump must be a JSON array")?;

        let records = values
            .into_iter()
            .enumerate()
            .map(|(i, value)| {
                Record::from_json(value).with_context(|| format!("Invalid record at index {}", i))
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!("Seeded in-memory store with {} records", records.len());
        Ok(Self::new(records))
    }

    /// Append a record (no uniqueness check, mirroring a backend without constraints)
    pub async fn insert(&self, record: Record) {
        self.records.write().await.push(record);
    }

    /// Copy of the current collection
    pub async fn snapshot(&self) -> Vec<Record> {
        self.records.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn fetch_collection(&self) -> Result<Vec<Record>> {
        Ok(self.snapshot().await)
    }

    async fn mutate_one(&self, id: &str, patch: RecordPatch) -> Result<bool> {
        let mut records = self.records.write().await;
        match records.iter_mut().find(|record| record.id == id) {
            Some(record) => {
                record.apply_patch(&patch);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_one(&self, id: &str) -> Result<bool> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|record| record.id != id);
        Ok(records.len() != before)
    }

    async fn merge_many(&self, source_ids: &[String], target_id: &str) -> Result<bool> {
        let mut records = self.records.write().await;

        let sources: HashSet<&str> = source_ids.iter().map(String::as_str).collect();
        if sources.contains(target_id) {
            return Ok(false);
        }
        let present: HashSet<&str> = records.iter().map(|r| r.id.as_str()).collect();
        if !present.contains(target_id) || !sources.iter().all(|id| present.contains(id)) {
            return Ok(false);
        }

        let moved_products: u32 = records
            .iter()
            .filter(|record| sources.contains(record.id.as_str()))
            .map(|record| match record.kind {
                RecordKind::Category { product_count, .. } => product_count,
                _ => 0,
            })
            .sum();

        let target_parent = lifted_parent(&records, &sources, target_id);

        let now = Utc::now();
        for record in records.iter_mut() {
            if record.id == target_id {
                if let Some(parent_id) = &target_parent {
                    record.parent_id = parent_id.clone();
                    record.modified_at = now;
                }
                if let RecordKind::Category { product_count, .. } = &mut record.kind {
                    *product_count += moved_products;
                    record.modified_at = now;
                }
                continue;
            }

            let reparent = record
                .parent_id
                .as_deref()
                .is_some_and(|parent| sources.contains(parent));
            if reparent {
                record.parent_id = Some(target_id.to_string());
                record.modified_at = now;
            }
        }

        records.retain(|record| !sources.contains(record.id.as_str()));
        Ok(true)
    }
}

/// New parent for a merge target that sits below one of the sources
///
/// The target takes the place of the topmost source on its ancestor chain, so
/// it neither points at itself nor ends up under one of its own former
/// ancestors. `None` when no source is an ancestor of the target.
fn lifted_parent(
    records: &[Record],
    sources: &HashSet<&str>,
    target_id: &str,
) -> Option<Option<String>> {
    let parents: HashMap<&str, Option<&str>> = records
        .iter()
        .map(|record| (record.id.as_str(), record.parent_id.as_deref()))
        .collect();

    let mut lifted = None;
    let mut seen = HashSet::from([target_id]);
    let mut current = target_id;
    while let Some(&Some(parent)) = parents.get(current) {
        if !seen.insert(parent) {
            break;
        }
        if sources.contains(parent) {
            lifted = Some(parents.get(parent).copied().flatten().map(str::to_string));
        }
        current = parent;
    }
    lifted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(id: &str, parent: Option<&str>, products: u32) -> Record {
        Record::new_with_id(
            id.to_string(),
            id.to_uppercase(),
            parent.map(str::to_string),
            RecordKind::Category {
                slug: id.to_string(),
                description: None,
                product_count: products,
            },
        )
    }

    fn product_count(record: &Record) -> u32 {
        match record.kind {
            RecordKind::Category { product_count, .. } => product_count,
            _ => 0,
        }
    }

    #[test]
    fn test_mutate_missing_record_returns_false() {
        let store = InMemoryStore::new(vec![category("a", None, 0)]);
        let changed =
            tokio_test::block_on(store.mutate_one("zzz", RecordPatch::disable())).unwrap();
        assert!(!changed);
    }

    #[tokio::test]
    async fn test_delete_one() {
        let store = InMemoryStore::new(vec![category("a", None, 0), category("b", Some("a"), 0)]);

        assert!(store.delete_one("a").await.unwrap());
        assert!(!store.delete_one("a").await.unwrap());

        let remaining = store.fetch_collection().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(
            remaining[0].parent_id.as_deref(),
            Some("a"),
            "children keep dangling parent"
        );
    }

    #[tokio::test]
    async fn test_merge_reparents_children_and_sums_products() {
        let store = InMemoryStore::new(vec![
            category("target", None, 2),
            category("src", None, 5),
            category("kid", Some("src"), 1),
        ]);

        let merged = store.merge_many(&["src".to_string()], "target").await;
        assert!(merged.unwrap());

        let records = store.snapshot().await;
        assert_eq!(records.len(), 2);
        assert_eq!(product_count(&records[0]), 7);
        assert_eq!(records[1].parent_id.as_deref(), Some("target"));
    }

    #[tokio::test]
    async fn test_merge_rejects_missing_target_or_self_merge() {
        let store = InMemoryStore::new(vec![category("a", None, 0), category("b", None, 0)]);

        assert!(!store.merge_many(&["a".to_string()], "ghost").await.unwrap());
        assert!(!store.merge_many(&["a".to_string()], "a").await.unwrap());
        assert!(!store.merge_many(&["ghost".to_string()], "b").await.unwrap());
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_merge_parent_into_child_lifts_target() {
        let store = InMemoryStore::new(vec![category("top", None, 0), category("a", Some("top"), 3)]);
        store.insert(category("b", Some("a"), 1)).await;
        store.insert(category("sibling", Some("a"), 0)).await;

        assert!(store.merge_many(&["a".to_string()], "b").await.unwrap());

        let records = store.snapshot().await;
        let parent_of = |id: &str| {
            records
                .iter()
                .find(|r| r.id == id)
                .map(|r| r.parent_id.clone())
        };
        assert_eq!(parent_of("b"), Some(Some("top".to_string())));
        assert_eq!(parent_of("sibling"), Some(Some("b".to_string())));
        assert_eq!(parent_of("a"), None);
        assert_eq!(product_count(&records[1]), 4);
    }

    #[tokio::test]
    async fn test_merge_into_deep_descendant_leaves_no_cycle() {
        let store = InMemoryStore::new(vec![
            category("a", None, 0),
            category("x", Some("a"), 0),
            category("b", Some("x"), 0),
        ]);

        assert!(store.merge_many(&["a".to_string()], "b").await.unwrap());

        let records = store.snapshot().await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "x");
        assert_eq!(records[0].parent_id.as_deref(), Some("b"));
        assert_eq!(records[1].id, "b");
        assert_eq!(records[1].parent_id, None);
    }

    #[test]
    fn test_from_json_str_reports_bad_index() {
        let json = r#"[
            {"id": "a", "name": "A", "kind": "tag"},
            {"id": "b", "name": "", "kind": "tag"}
        ]"#;

        let err = InMemoryStore::from_json_str(json).unwrap_err();
        assert!(format!("{:#}", err).contains("index 1"));
    }
}
