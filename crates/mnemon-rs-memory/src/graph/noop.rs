//! No-op graph store used when no graph backend is configured.

use crate::error::MemoryError;
use crate::graph::GraphStore;
use crate::model::GraphRelation;
use async_trait::async_trait;
use log::debug;
use serde_json::{Map, Value};

/// Graph store that accepts every operation and returns empty results.
#[derive(Debug, Default)]
pub struct NoopGraphStore;

impl NoopGraphStore {
    /// Create a new no-op graph store.
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait]
impl GraphStore for NoopGraphStore {
    async fn add(&self, text: &str, _filters: &Map<String, Value>) -> Result<(), MemoryError> {
        debug!("noop graph add (text_len={})", text.len());
        Ok(())
    }

    async fn search(
        &self,
        query: &str,
        _filters: &Map<String, Value>,
        _limit: usize,
    ) -> Result<Vec<GraphRelation>, MemoryError> {
        debug!("noop graph search (query_len={})", query.len());
        Ok(Vec::new())
    }

    async fn get_all(
        &self,
        _filters: &Map<String, Value>,
        _limit: usize,
    ) -> Result<Vec<GraphRelation>, MemoryError> {
        debug!("noop graph get_all");
        Ok(Vec::new())
    }

    async fn delete_all(&self, _filters: &Map<String, Value>) -> Result<(), MemoryError> {
        debug!("noop graph delete_all");
        Ok(())
    }

    async fn reset(&self) -> Result<(), MemoryError> {
        debug!("noop graph reset");
        Ok(())
    }
}
