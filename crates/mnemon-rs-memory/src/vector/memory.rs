//! In-process vector index backed by a lock-guarded map.

use crate::error::MemoryError;
use crate::model::{MemoryRecord, ScoredRecord};
use crate::vector::{VectorIndex, rank_records};
use async_trait::async_trait;
use log::debug;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::HashMap;
use uuid::Uuid;

/// Reference vector index holding records in memory.
#[derive(Debug, Default)]
pub struct InMemoryVectorIndex {
    records: RwLock<HashMap<Uuid, MemoryRecord>>,
}

impl InMemoryVectorIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Whether the index holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    async fn insert(&self, record: MemoryRecord) -> Result<(), MemoryError> {
        let mut records = self.records.write();
        if records.contains_key(&record.id) {
            return Err(MemoryError::Backend(format!(
                "duplicate record id: {}",
                record.id
            )));
        }
        debug!(
            "inserting record (id={}, text_len={})",
            record.id,
            record.text.len()
        );
        records.insert(record.id, record);
        Ok(())
    }

    async fn search(
        &self,
        vector: &[f32],
        filters: &Map<String, Value>,
        limit: usize,
    ) -> Result<Vec<ScoredRecord>, MemoryError> {
        let records = self.records.read();
        let hits = rank_records(records.values().cloned(), vector, filters, limit);
        debug!(
            "search complete (candidates={}, returned={})",
            records.len(),
            hits.len()
        );
        Ok(hits)
    }

    async fn get(&self, id: Uuid) -> Result<Option<MemoryRecord>, MemoryError> {
        Ok(self.records.read().get(&id).cloned())
    }

    async fn list(&self, filters: &Map<String, Value>) -> Result<Vec<MemoryRecord>, MemoryError> {
        Ok(self
            .records
            .read()
            .values()
            .filter(|record| record.matches(filters))
            .cloned()
            .collect())
    }

    async fn update(&self, record: MemoryRecord) -> Result<(), MemoryError> {
        let mut records = self.records.write();
        if !records.contains_key(&record.id) {
            return Err(MemoryError::NotFound(record.id));
        }
        records.insert(record.id, record);
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), MemoryError> {
        let mut records = self.records.write();
        if records.remove(&id).is_none() {
            return Err(MemoryError::NotFound(id));
        }
        Ok(())
    }

    async fn reset(&self) -> Result<(), MemoryError> {
        debug!("resetting in-memory index");
        self.records.write().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::InMemoryVectorIndex;
    use crate::error::MemoryError;
    use crate::model::MemoryRecord;
    use crate::vector::VectorIndex;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use serde_json::{Map, json};
    use uuid::Uuid;

    fn record(vector: Vec<f32>, user_id: &str) -> MemoryRecord {
        let mut metadata = Map::new();
        metadata.insert("user_id".to_string(), json!(user_id));
        MemoryRecord {
            id: Uuid::new_v4(),
            vector,
            text: "fact".to_string(),
            metadata,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn search_ranks_nearest_first_and_respects_filters() {
        let index = InMemoryVectorIndex::new();
        let near = record(vec![1.0, 0.0], "u1");
        let far = record(vec![0.0, 1.0], "u1");
        let other_scope = record(vec![1.0, 0.0], "u2");
        index.insert(near.clone()).await.expect("insert near");
        index.insert(far.clone()).await.expect("insert far");
        index.insert(other_scope).await.expect("insert other");

        let mut filters = Map::new();
        filters.insert("user_id".to_string(), json!("u1"));
        let hits = index
            .search(&[1.0, 0.0], &filters, 10)
            .await
            .expect("search");

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].record.id, near.id);
        assert_eq!(hits[1].record.id, far.id);
        assert!(hits[0].score > hits[1].score);
    }

    #[tokio::test]
    async fn search_caps_results_at_limit() {
        let index = InMemoryVectorIndex::new();
        for _ in 0..5 {
            index
                .insert(record(vec![1.0, 0.0], "u1"))
                .await
                .expect("insert");
        }
        let hits = index
            .search(&[1.0, 0.0], &Map::new(), 2)
            .await
            .expect("search");
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_ids() {
        let index = InMemoryVectorIndex::new();
        let first = record(vec![1.0], "u1");
        index.insert(first.clone()).await.expect("insert");
        let err = index.insert(first).await.expect_err("duplicate");
        assert!(matches!(err, MemoryError::Backend(_)));
    }

    #[tokio::test]
    async fn delete_twice_reports_not_found() {
        let index = InMemoryVectorIndex::new();
        let stored = record(vec![1.0], "u1");
        index.insert(stored.clone()).await.expect("insert");

        index.delete(stored.id).await.expect("first delete");
        let err = index.delete(stored.id).await.expect_err("second delete");
        assert!(matches!(err, MemoryError::NotFound(id) if id == stored.id));
    }

    #[tokio::test]
    async fn update_missing_record_reports_not_found() {
        let index = InMemoryVectorIndex::new();
        let err = index
            .update(record(vec![1.0], "u1"))
            .await
            .expect_err("missing");
        assert!(matches!(err, MemoryError::NotFound(_)));
    }

    #[tokio::test]
    async fn reset_clears_every_record() {
        let index = InMemoryVectorIndex::new();
        index.insert(record(vec![1.0], "u1")).await.expect("insert");
        index.insert(record(vec![1.0], "u2")).await.expect("insert");

        index.reset().await.expect("reset");
        let all = index.list(&Map::new()).await.expect("list");
        assert_eq!(all, Vec::new());
    }
}
