//! Error types for the core orchestration crate.

use mnemon_rs_memory::MemoryError;
use thiserror::Error;

/// Errors returned by orchestration and augmentation operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No session identifier was supplied; rejected before any backend I/O.
    #[error("at least one of user_id, agent_id, or run_id must be provided")]
    MissingScope,
    /// Memory store error; the store is the source of truth and its
    /// failures always surface.
    #[error("memory error: {0}")]
    Memory(#[from] MemoryError),
    /// Upstream LLM failure, propagated unchanged to the caller.
    #[error("upstream llm error: {0}")]
    Upstream(String),
    /// Config named a provider the registry does not know.
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
}
