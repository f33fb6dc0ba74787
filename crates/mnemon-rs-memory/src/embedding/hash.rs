//! Deterministic local embedder based on token feature hashing.
//!
//! Produces stable vectors without any model download, which makes it the
//! offline default and the embedder used throughout the test suite. Texts
//! sharing tokens land in shared buckets, so cosine ranking still prefers
//! lexically related records.

use crate::embedding::{EmbeddingProvider, EmbeddingPurpose};
use crate::error::MemoryError;
use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Default dimension, matching the common MiniLM embedding size.
pub const DEFAULT_DIMENSIONS: usize = 384;

/// Token-hashing embedding provider.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimensions: usize,
}

impl HashEmbedder {
    /// Create an embedder producing vectors of the given dimension.
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSIONS)
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    /// Embed by hashing lowercase alphanumeric tokens into signed buckets.
    async fn embed(&self, text: &str, _purpose: EmbeddingPurpose) -> Result<Vec<f32>, MemoryError> {
        let mut vector = vec![0.0f32; self.dimensions];
        for token in tokenize(text) {
            let mut hasher = DefaultHasher::new();
            token.hash(&mut hasher);
            let digest = hasher.finish();
            let bucket = (digest % self.dimensions as u64) as usize;
            let sign = if digest & (1 << 63) == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }
        normalize(&mut vector);
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Split into lowercase alphanumeric tokens.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|ch: char| !ch.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(|token| token.to_lowercase())
}

/// Scale a vector to unit length; zero vectors are left untouched.
fn normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in vector.iter_mut() {
            *value /= norm;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::HashEmbedder;
    use crate::embedding::{EmbeddingProvider, EmbeddingPurpose};
    use crate::vector::cosine_similarity;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn embeddings_are_deterministic() {
        let embedder = HashEmbedder::new(32);
        let first = embedder
            .embed("My favorite color is blue", EmbeddingPurpose::Add)
            .await
            .expect("embed");
        let second = embedder
            .embed("My favorite color is blue", EmbeddingPurpose::Search)
            .await
            .expect("embed");
        assert_eq!(first, second);
        assert_eq!(first.len(), 32);
    }

    #[tokio::test]
    async fn related_texts_score_higher_than_unrelated() {
        let embedder = HashEmbedder::new(64);
        let fact = embedder
            .embed("My favorite color is blue", EmbeddingPurpose::Add)
            .await
            .expect("embed");
        let query = embedder
            .embed("What is my favorite color?", EmbeddingPurpose::Search)
            .await
            .expect("embed");
        let unrelated = embedder
            .embed("The train departs at noon", EmbeddingPurpose::Search)
            .await
            .expect("embed");

        assert!(cosine_similarity(&fact, &query) > cosine_similarity(&fact, &unrelated));
    }

    #[tokio::test]
    async fn empty_text_embeds_to_zero_vector() {
        let embedder = HashEmbedder::new(8);
        let vector = embedder
            .embed("", EmbeddingPurpose::Add)
            .await
            .expect("embed");
        assert_eq!(vector, vec![0.0; 8]);
    }
}
