//! Embedding gateway and provider implementations.

mod hash;
mod openai;

pub use hash::HashEmbedder;
pub use openai::OpenAiEmbedder;

use crate::error::MemoryError;
use async_trait::async_trait;
use std::sync::Arc;

/// What an embedding will be used for. Advisory; providers that embed the
/// same way for every purpose simply ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingPurpose {
    /// Embedding a new record for indexing.
    Add,
    /// Embedding a retrieval query.
    Search,
    /// Re-embedding an updated record.
    Update,
}

/// Embedding capability wrapped by the gateway.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a text into a fixed-dimension vector.
    async fn embed(&self, text: &str, purpose: EmbeddingPurpose) -> Result<Vec<f32>, MemoryError>;

    /// Dimension of vectors produced by this provider.
    fn dimensions(&self) -> usize;
}

/// Stateless gateway that pins the embedding dimension at construction and
/// verifies every vector the provider returns.
#[derive(Clone)]
pub struct EmbeddingGateway {
    provider: Arc<dyn EmbeddingProvider>,
    dimensions: usize,
}

impl EmbeddingGateway {
    /// Wrap a provider, checking any explicitly configured dimension
    /// against the provider's own. A mismatch is a construction-time error.
    pub fn new(
        provider: Arc<dyn EmbeddingProvider>,
        expected_dimensions: Option<usize>,
    ) -> Result<Self, MemoryError> {
        let dimensions = provider.dimensions();
        if let Some(expected) = expected_dimensions
            && expected != dimensions
        {
            return Err(MemoryError::Dimension {
                expected,
                actual: dimensions,
            });
        }
        Ok(Self {
            provider,
            dimensions,
        })
    }

    /// The pinned embedding dimension.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Embed a text, verifying the returned vector length.
    pub async fn embed(
        &self,
        text: &str,
        purpose: EmbeddingPurpose,
    ) -> Result<Vec<f32>, MemoryError> {
        let vector = self.provider.embed(text, purpose).await?;
        if vector.len() != self.dimensions {
            return Err(MemoryError::Dimension {
                expected: self.dimensions,
                actual: vector.len(),
            });
        }
        Ok(vector)
    }
}

#[cfg(test)]
mod tests {
    use super::{EmbeddingGateway, EmbeddingProvider, EmbeddingPurpose, HashEmbedder};
    use crate::error::MemoryError;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    struct LyingEmbedder;

    #[async_trait]
    impl EmbeddingProvider for LyingEmbedder {
        async fn embed(
            &self,
            _text: &str,
            _purpose: EmbeddingPurpose,
        ) -> Result<Vec<f32>, MemoryError> {
            Ok(vec![1.0; 3])
        }

        fn dimensions(&self) -> usize {
            8
        }
    }

    #[test]
    fn gateway_rejects_dimension_mismatch_at_construction() {
        let provider = Arc::new(HashEmbedder::new(16));
        let err = EmbeddingGateway::new(provider, Some(32)).expect_err("mismatch");
        match err {
            MemoryError::Dimension { expected, actual } => {
                assert_eq!(expected, 32);
                assert_eq!(actual, 16);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn gateway_verifies_returned_vector_length() {
        let gateway = EmbeddingGateway::new(Arc::new(LyingEmbedder), None).expect("gateway");
        let err = gateway
            .embed("hello", EmbeddingPurpose::Add)
            .await
            .expect_err("short vector");
        assert!(matches!(err, MemoryError::Dimension { .. }));
    }

    #[tokio::test]
    async fn gateway_passes_valid_vectors_through() {
        let gateway =
            EmbeddingGateway::new(Arc::new(HashEmbedder::new(16)), Some(16)).expect("gateway");
        let vector = gateway
            .embed("hello world", EmbeddingPurpose::Search)
            .await
            .expect("embed");
        assert_eq!(vector.len(), 16);
    }
}
