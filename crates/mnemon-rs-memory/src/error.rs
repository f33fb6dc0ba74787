//! Error types for memory operations.

use uuid::Uuid;

/// Errors returned by memory stores, indexes, and embedding providers.
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    /// No record exists with the given id.
    #[error("memory record not found: {0}")]
    NotFound(Uuid),
    /// Embedding dimension does not match the configured dimension.
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    Dimension { expected: usize, actual: usize },
    /// Backend request or state error.
    #[error("backend error: {0}")]
    Backend(String),
    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
