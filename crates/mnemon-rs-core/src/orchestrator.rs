//! Memory orchestration across the vector store and the fact graph.

use crate::error::CoreError;
use crate::scope::ScopeArgs;
use log::{debug, info, warn};
use mnemon_rs_memory::{GraphRelation, GraphStore, MemoryRecord, MemoryStore, ScoredRecord};
use mnemon_rs_memory::embedding::EmbeddingPurpose;
use mnemon_rs_protocol::ChatMessage;
use std::sync::Arc;
use uuid::Uuid;

/// One memory created by an `add` call.
#[derive(Debug, Clone, PartialEq)]
pub struct AddedMemory {
    /// Generated record id.
    pub id: Uuid,
    /// Stored text.
    pub text: String,
}

/// Merged result of a memory search.
///
/// `results` are ranked nearest-first by the memory store; `relations` are
/// unordered hints from the fact graph, empty whenever the graph is absent
/// or degraded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOutcome {
    /// Ranked memory store hits.
    pub results: Vec<ScoredRecord>,
    /// Graph relation hints, appended as-is.
    pub relations: Vec<GraphRelation>,
}

/// Stateless façade implementing memory operations over both stores.
///
/// The memory store is the source of truth: its errors propagate. The fact
/// graph is best-effort throughout and never fails an operation.
pub struct MemoryOrchestrator {
    store: MemoryStore,
    graph: Arc<dyn GraphStore>,
}

impl MemoryOrchestrator {
    /// Compose an orchestrator over a store and a graph backend.
    pub fn new(store: MemoryStore, graph: Arc<dyn GraphStore>) -> Self {
        Self { store, graph }
    }

    /// The underlying memory store.
    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    /// Persist each textual message under the resolved scope.
    ///
    /// Fan-out is independent: the graph write is attempted per message and
    /// swallowed on failure, while a store failure aborts and propagates.
    pub async fn add(
        &self,
        messages: &[ChatMessage],
        scope: &ScopeArgs,
    ) -> Result<Vec<AddedMemory>, CoreError> {
        let resolved = scope.resolve()?;
        let mut added = Vec::new();
        for message in messages {
            let text = message.content.trim();
            if text.is_empty() {
                continue;
            }
            let id = self.store.add(text, resolved.metadata.clone()).await?;
            if let Err(err) = self.graph.add(text, &resolved.filters).await {
                warn!("graph add failed, proceeding without graph (err={err})");
            }
            added.push(AddedMemory {
                id,
                text: text.to_string(),
            });
        }
        info!("memories added (count={})", added.len());
        Ok(added)
    }

    /// Retrieve memories and graph hints for a query under the scope.
    pub async fn search(
        &self,
        query: &str,
        scope: &ScopeArgs,
        limit: usize,
    ) -> Result<SearchOutcome, CoreError> {
        let resolved = scope.resolve()?;
        let vector = self
            .store
            .embedder()
            .embed(query, EmbeddingPurpose::Search)
            .await?;

        let (results, relations) = tokio::join!(
            self.store.search(&vector, &resolved.filters, limit),
            self.graph.search(query, &resolved.filters, limit),
        );
        let results = results?;
        let relations = match relations {
            Ok(relations) => relations,
            Err(err) => {
                debug!("graph search degraded to empty relations (err={err})");
                Vec::new()
            }
        };
        debug!(
            "search complete (results={}, relations={})",
            results.len(),
            relations.len()
        );
        Ok(SearchOutcome { results, relations })
    }

    /// Re-embed and overwrite a single record in the memory store.
    pub async fn update(&self, id: Uuid, text: &str) -> Result<(), CoreError> {
        self.store.update(id, text, None).await?;
        Ok(())
    }

    /// Delete one record from the memory store.
    pub async fn delete(&self, id: Uuid) -> Result<(), CoreError> {
        self.store.delete(id).await?;
        Ok(())
    }

    /// Delete every record within the scope, then ask the graph to do the
    /// same with identical filters.
    pub async fn delete_all(&self, scope: &ScopeArgs) -> Result<usize, CoreError> {
        let resolved = scope.resolve()?;
        let records = self.store.get_all(&resolved.filters).await?;
        let count = records.len();
        for record in records {
            self.store.delete(record.id).await?;
        }
        if let Err(err) = self.graph.delete_all(&resolved.filters).await {
            warn!("graph delete_all failed, proceeding (err={err})");
        }
        info!("scope wiped (deleted={})", count);
        Ok(count)
    }

    /// Fetch one record by id.
    pub async fn get(&self, id: Uuid) -> Result<Option<MemoryRecord>, CoreError> {
        Ok(self.store.get(id).await?)
    }

    /// Fetch every record within the scope.
    pub async fn get_all(&self, scope: &ScopeArgs) -> Result<Vec<MemoryRecord>, CoreError> {
        let resolved = scope.resolve()?;
        Ok(self.store.get_all(&resolved.filters).await?)
    }

    /// Unconditional wipe of both stores; maintenance and testing only.
    pub async fn reset(&self) -> Result<(), CoreError> {
        self.store.reset().await?;
        if let Err(err) = self.graph.reset().await {
            warn!("graph reset failed, proceeding (err={err})");
        }
        info!("memory reset complete");
        Ok(())
    }
}
