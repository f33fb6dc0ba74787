//! Fact graph capability and reference backends.

mod memory;
mod noop;

pub use memory::InMemoryGraphStore;
pub use noop::NoopGraphStore;

use crate::error::MemoryError;
use crate::model::GraphRelation;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Entity/relationship store layered beside the vector-backed memory.
///
/// Always best-effort from the orchestrator's point of view: failures are
/// contained at the call site and never degrade the memory store path.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Record graph data extracted from a piece of text, scoped by filters.
    async fn add(&self, text: &str, filters: &Map<String, Value>) -> Result<(), MemoryError>;

    /// Return relations relevant to a query within the filter scope.
    async fn search(
        &self,
        query: &str,
        filters: &Map<String, Value>,
        limit: usize,
    ) -> Result<Vec<GraphRelation>, MemoryError>;

    /// Return every relation within the filter scope.
    async fn get_all(
        &self,
        filters: &Map<String, Value>,
        limit: usize,
    ) -> Result<Vec<GraphRelation>, MemoryError>;

    /// Remove every relation within the filter scope.
    async fn delete_all(&self, filters: &Map<String, Value>) -> Result<(), MemoryError>;

    /// Destroy all graph data unconditionally.
    async fn reset(&self) -> Result<(), MemoryError>;
}
