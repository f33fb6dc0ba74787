//! Vector index capability and reference backends.

mod jsonl;
mod memory;

pub use jsonl::JsonlVectorIndex;
pub use memory::InMemoryVectorIndex;

use crate::error::MemoryError;
use crate::model::{MemoryRecord, ScoredRecord};
use async_trait::async_trait;
use serde_json::{Map, Value};
use uuid::Uuid;

/// Vector index abstraction used by the memory store.
///
/// Implementations are process-wide and safe for concurrent use; per-record
/// consistency is each backend's responsibility.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Persist a new record. Ids are caller-generated and never reused.
    async fn insert(&self, record: MemoryRecord) -> Result<(), MemoryError>;

    /// Return up to `limit` records matching the filters, nearest-first.
    async fn search(
        &self,
        vector: &[f32],
        filters: &Map<String, Value>,
        limit: usize,
    ) -> Result<Vec<ScoredRecord>, MemoryError>;

    /// Fetch a record by id.
    async fn get(&self, id: Uuid) -> Result<Option<MemoryRecord>, MemoryError>;

    /// Return every record matching the filters.
    async fn list(&self, filters: &Map<String, Value>) -> Result<Vec<MemoryRecord>, MemoryError>;

    /// Replace an existing record in full. Fails with `NotFound` when the
    /// id does not exist.
    async fn update(&self, record: MemoryRecord) -> Result<(), MemoryError>;

    /// Remove a record. Fails with `NotFound` when the id does not exist.
    async fn delete(&self, id: Uuid) -> Result<(), MemoryError>;

    /// Destroy all records unconditionally.
    async fn reset(&self) -> Result<(), MemoryError>;
}

/// Cosine similarity between two vectors; zero when either has no norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Rank records against a query vector, nearest-first, capped at `limit`.
pub(crate) fn rank_records(
    records: impl Iterator<Item = MemoryRecord>,
    vector: &[f32],
    filters: &Map<String, Value>,
    limit: usize,
) -> Vec<ScoredRecord> {
    let mut hits: Vec<ScoredRecord> = records
        .filter(|record| record.matches(filters))
        .map(|record| {
            let score = cosine_similarity(&record.vector, vector);
            ScoredRecord { record, score }
        })
        .collect();
    hits.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    hits.truncate(limit);
    hits
}

#[cfg(test)]
mod tests {
    use super::cosine_similarity;
    use pretty_assertions::assert_eq;

    #[test]
    fn cosine_similarity_handles_zero_vectors() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]), 1.0);
    }

    #[test]
    fn cosine_similarity_is_symmetric() {
        let a = [0.5, 0.5, 0.0];
        let b = [0.0, 1.0, 0.0];
        assert_eq!(cosine_similarity(&a, &b), cosine_similarity(&b, &a));
    }
}
