use async_trait::async_trait;
use mnemon_rs_memory::{GraphRelation, GraphStore, MemoryError};
use parking_lot::Mutex;
use serde_json::{Map, Value};

/// Graph store that records adds and serves canned relations.
#[derive(Default)]
pub struct RecordingGraphStore {
    adds: Mutex<Vec<String>>,
    relations: Vec<GraphRelation>,
}

impl RecordingGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_relations(relations: Vec<GraphRelation>) -> Self {
        Self {
            adds: Mutex::new(Vec::new()),
            relations,
        }
    }

    /// Texts passed to `add`, in call order.
    pub fn added_texts(&self) -> Vec<String> {
        self.adds.lock().clone()
    }
}

#[async_trait]
impl GraphStore for RecordingGraphStore {
    async fn add(&self, text: &str, _filters: &Map<String, Value>) -> Result<(), MemoryError> {
        self.adds.lock().push(text.to_string());
        Ok(())
    }

    async fn search(
        &self,
        _query: &str,
        _filters: &Map<String, Value>,
        _limit: usize,
    ) -> Result<Vec<GraphRelation>, MemoryError> {
        Ok(self.relations.clone())
    }

    async fn get_all(
        &self,
        _filters: &Map<String, Value>,
        _limit: usize,
    ) -> Result<Vec<GraphRelation>, MemoryError> {
        Ok(self.relations.clone())
    }

    async fn delete_all(&self, _filters: &Map<String, Value>) -> Result<(), MemoryError> {
        Ok(())
    }

    async fn reset(&self) -> Result<(), MemoryError> {
        self.adds.lock().clear();
        Ok(())
    }
}

/// Graph store where every operation fails.
#[derive(Debug, Default)]
pub struct FailingGraphStore;

impl FailingGraphStore {
    pub fn new() -> Self {
        Self {}
    }

    fn unavailable() -> MemoryError {
        MemoryError::Backend("graph store unavailable".to_string())
    }
}

#[async_trait]
impl GraphStore for FailingGraphStore {
    async fn add(&self, _text: &str, _filters: &Map<String, Value>) -> Result<(), MemoryError> {
        Err(Self::unavailable())
    }

    async fn search(
        &self,
        _query: &str,
        _filters: &Map<String, Value>,
        _limit: usize,
    ) -> Result<Vec<GraphRelation>, MemoryError> {
        Err(Self::unavailable())
    }

    async fn get_all(
        &self,
        _filters: &Map<String, Value>,
        _limit: usize,
    ) -> Result<Vec<GraphRelation>, MemoryError> {
        Err(Self::unavailable())
    }

    async fn delete_all(&self, _filters: &Map<String, Value>) -> Result<(), MemoryError> {
        Err(Self::unavailable())
    }

    async fn reset(&self) -> Result<(), MemoryError> {
        Err(Self::unavailable())
    }
}
