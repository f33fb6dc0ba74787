//! Memory store composing the embedding gateway with a vector index.

use crate::embedding::{EmbeddingGateway, EmbeddingPurpose};
use crate::error::MemoryError;
use crate::model::{MemoryRecord, SCOPE_KEYS, ScoredRecord};
use crate::vector::VectorIndex;
use chrono::Utc;
use log::debug;
use serde_json::{Map, Value};
use std::sync::Arc;
use uuid::Uuid;

/// Vector-backed memory store.
///
/// Owns record lifecycle: created on `add`, replaced on `update`, removed
/// on `delete`. Scope fields inside a record's metadata are fixed at
/// creation and survive updates.
#[derive(Clone)]
pub struct MemoryStore {
    embedder: EmbeddingGateway,
    index: Arc<dyn VectorIndex>,
}

impl MemoryStore {
    /// Create a store over the given gateway and index.
    pub fn new(embedder: EmbeddingGateway, index: Arc<dyn VectorIndex>) -> Self {
        Self { embedder, index }
    }

    /// The embedding gateway used by this store.
    pub fn embedder(&self) -> &EmbeddingGateway {
        &self.embedder
    }

    /// Embed and persist a text under a fresh id; returns the id.
    pub async fn add(
        &self,
        text: &str,
        metadata: Map<String, Value>,
    ) -> Result<Uuid, MemoryError> {
        let vector = self.embedder.embed(text, EmbeddingPurpose::Add).await?;
        let record = MemoryRecord {
            id: Uuid::new_v4(),
            vector,
            text: text.to_string(),
            metadata,
            created_at: Utc::now(),
        };
        let id = record.id;
        self.index.insert(record).await?;
        debug!("memory added (id={}, text_len={})", id, text.len());
        Ok(id)
    }

    /// Return up to `limit` records matching the filters, nearest-first.
    pub async fn search(
        &self,
        query_vector: &[f32],
        filters: &Map<String, Value>,
        limit: usize,
    ) -> Result<Vec<ScoredRecord>, MemoryError> {
        self.index.search(query_vector, filters, limit).await
    }

    /// Re-embed and replace a record's text and metadata.
    ///
    /// Scope fields from the stored record are carried over; the rest of
    /// the metadata is replaced by `new_metadata` when provided.
    pub async fn update(
        &self,
        id: Uuid,
        new_text: &str,
        new_metadata: Option<Map<String, Value>>,
    ) -> Result<(), MemoryError> {
        let existing = self
            .index
            .get(id)
            .await?
            .ok_or(MemoryError::NotFound(id))?;
        let vector = self
            .embedder
            .embed(new_text, EmbeddingPurpose::Update)
            .await?;

        let mut metadata = new_metadata.unwrap_or_else(|| existing.metadata.clone());
        for key in SCOPE_KEYS {
            if let Some(value) = existing.metadata.get(key) {
                metadata.insert(key.to_string(), value.clone());
            }
        }

        self.index
            .update(MemoryRecord {
                id,
                vector,
                text: new_text.to_string(),
                metadata,
                created_at: existing.created_at,
            })
            .await?;
        debug!("memory updated (id={}, text_len={})", id, new_text.len());
        Ok(())
    }

    /// Remove a record; `NotFound` when the id does not exist.
    pub async fn delete(&self, id: Uuid) -> Result<(), MemoryError> {
        self.index.delete(id).await?;
        debug!("memory deleted (id={})", id);
        Ok(())
    }

    /// Fetch a record by id.
    pub async fn get(&self, id: Uuid) -> Result<Option<MemoryRecord>, MemoryError> {
        self.index.get(id).await
    }

    /// Return every record matching the filters.
    pub async fn get_all(
        &self,
        filters: &Map<String, Value>,
    ) -> Result<Vec<MemoryRecord>, MemoryError> {
        self.index.list(filters).await
    }

    /// Destroy all records unconditionally.
    pub async fn reset(&self) -> Result<(), MemoryError> {
        self.index.reset().await
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryStore;
    use crate::embedding::{EmbeddingGateway, HashEmbedder};
    use crate::error::MemoryError;
    use crate::vector::InMemoryVectorIndex;
    use pretty_assertions::assert_eq;
    use serde_json::{Map, json};
    use std::sync::Arc;
    use uuid::Uuid;

    fn store() -> MemoryStore {
        let gateway =
            EmbeddingGateway::new(Arc::new(HashEmbedder::new(64)), None).expect("gateway");
        MemoryStore::new(gateway, Arc::new(InMemoryVectorIndex::new()))
    }

    fn metadata(user_id: &str) -> Map<String, serde_json::Value> {
        let mut map = Map::new();
        map.insert("user_id".to_string(), json!(user_id));
        map
    }

    #[tokio::test]
    async fn add_then_get_round_trips_scope_fields() {
        let store = store();
        let id = store
            .add("my favorite color is blue", metadata("u1"))
            .await
            .expect("add");

        let record = store.get(id).await.expect("get").expect("record");
        assert_eq!(record.text, "my favorite color is blue");
        assert_eq!(record.metadata.get("user_id"), Some(&json!("u1")));
    }

    #[tokio::test]
    async fn update_preserves_scope_and_replaces_text() {
        let store = store();
        let mut extras = metadata("u1");
        extras.insert("topic".to_string(), json!("colors"));
        let id = store.add("old fact", extras).await.expect("add");

        let mut replacement = Map::new();
        replacement.insert("topic".to_string(), json!("revised"));
        store
            .update(id, "new fact", Some(replacement))
            .await
            .expect("update");

        let record = store.get(id).await.expect("get").expect("record");
        assert_eq!(record.text, "new fact");
        assert_eq!(record.metadata.get("user_id"), Some(&json!("u1")));
        assert_eq!(record.metadata.get("topic"), Some(&json!("revised")));
    }

    #[tokio::test]
    async fn update_missing_record_reports_not_found() {
        let store = store();
        let err = store
            .update(Uuid::new_v4(), "text", None)
            .await
            .expect_err("missing");
        assert!(matches!(err, MemoryError::NotFound(_)));
    }

    #[tokio::test]
    async fn search_is_scoped_by_filters() {
        let store = store();
        store
            .add("my favorite color is blue", metadata("u1"))
            .await
            .expect("add");

        let query = store
            .embedder()
            .embed(
                "What is my favorite color?",
                crate::embedding::EmbeddingPurpose::Search,
            )
            .await
            .expect("embed");

        let hits = store.search(&query, &metadata("u1"), 5).await.expect("search");
        assert_eq!(hits.len(), 1);

        let other = store.search(&query, &metadata("u2"), 5).await.expect("search");
        assert_eq!(other.len(), 0);
    }

    #[tokio::test]
    async fn reset_leaves_no_records_behind() {
        let store = store();
        store.add("a fact", metadata("u1")).await.expect("add");
        store.reset().await.expect("reset");
        assert_eq!(store.get_all(&Map::new()).await.expect("get_all"), Vec::new());
    }
}
