//! Vector-backed memory, embedding, and fact-graph support for Mnemon.

pub mod embedding;
pub mod error;
pub mod graph;
pub mod model;
pub mod store;
pub mod vector;

/// Memory error type.
pub use error::MemoryError;
/// Embedding gateway, purpose, and providers.
pub use embedding::{EmbeddingGateway, EmbeddingProvider, EmbeddingPurpose, HashEmbedder, OpenAiEmbedder};
/// Fact graph interface and backends.
pub use graph::{GraphStore, InMemoryGraphStore, NoopGraphStore};
/// Record model and search results.
pub use model::{GraphRelation, MemoryRecord, SCOPE_KEYS, ScoredRecord};
/// Memory store over embedding and index.
pub use store::MemoryStore;
/// Vector index interface and backends.
pub use vector::{InMemoryVectorIndex, JsonlVectorIndex, VectorIndex, cosine_similarity};
