use async_trait::async_trait;
use mnemon_rs_memory::{MemoryError, MemoryRecord, ScoredRecord, VectorIndex};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Vector index whose write operations sleep before delegating.
///
/// Lets tests observe that a background write has not landed by the time
/// the triggering call returns. Reads are never delayed.
pub struct DelayedVectorIndex {
    inner: Arc<dyn VectorIndex>,
    delay: Duration,
}

impl DelayedVectorIndex {
    pub fn new(inner: Arc<dyn VectorIndex>, delay: Duration) -> Self {
        Self { inner, delay }
    }
}

#[async_trait]
impl VectorIndex for DelayedVectorIndex {
    async fn insert(&self, record: MemoryRecord) -> Result<(), MemoryError> {
        tokio::time::sleep(self.delay).await;
        self.inner.insert(record).await
    }

    async fn search(
        &self,
        vector: &[f32],
        filters: &Map<String, Value>,
        limit: usize,
    ) -> Result<Vec<ScoredRecord>, MemoryError> {
        self.inner.search(vector, filters, limit).await
    }

    async fn get(&self, id: Uuid) -> Result<Option<MemoryRecord>, MemoryError> {
        self.inner.get(id).await
    }

    async fn list(&self, filters: &Map<String, Value>) -> Result<Vec<MemoryRecord>, MemoryError> {
        self.inner.list(filters).await
    }

    async fn update(&self, record: MemoryRecord) -> Result<(), MemoryError> {
        tokio::time::sleep(self.delay).await;
        self.inner.update(record).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), MemoryError> {
        tokio::time::sleep(self.delay).await;
        self.inner.delete(id).await
    }

    async fn reset(&self) -> Result<(), MemoryError> {
        self.inner.reset().await
    }
}

/// Vector index where every operation fails with a backend error.
#[derive(Debug, Default)]
pub struct FailingVectorIndex;

impl FailingVectorIndex {
    pub fn new() -> Self {
        Self {}
    }

    fn unavailable() -> MemoryError {
        MemoryError::Backend("vector index unavailable".to_string())
    }
}

#[async_trait]
impl VectorIndex for FailingVectorIndex {
    async fn insert(&self, _record: MemoryRecord) -> Result<(), MemoryError> {
        Err(Self::unavailable())
    }

    async fn search(
        &self,
        _vector: &[f32],
        _filters: &Map<String, Value>,
        _limit: usize,
    ) -> Result<Vec<ScoredRecord>, MemoryError> {
        Err(Self::unavailable())
    }

    async fn get(&self, _id: Uuid) -> Result<Option<MemoryRecord>, MemoryError> {
        Err(Self::unavailable())
    }

    async fn list(&self, _filters: &Map<String, Value>) -> Result<Vec<MemoryRecord>, MemoryError> {
        Err(Self::unavailable())
    }

    async fn update(&self, _record: MemoryRecord) -> Result<(), MemoryError> {
        Err(Self::unavailable())
    }

    async fn delete(&self, _id: Uuid) -> Result<(), MemoryError> {
        Err(Self::unavailable())
    }

    async fn reset(&self) -> Result<(), MemoryError> {
        Err(Self::unavailable())
    }
}
