//! Provider selection and runtime wiring.
//!
//! One registry object, constructed at process start and passed by
//! reference: a closed mapping from config provider names to constructors
//! for each capability. No module-level provider tables.

use crate::augment::ConversationAugmentor;
use crate::error::CoreError;
use crate::llm::{ChatProvider, OpenAiChatProvider};
use crate::orchestrator::MemoryOrchestrator;
use crate::writer::MemoryWriter;
use directories::BaseDirs;
use log::{debug, info};
use mnemon_rs_config::{
    EmbedderConfig, GraphStoreConfig, LlmConfig, MnemonConfig, VectorStoreConfig,
};
use mnemon_rs_memory::{
    EmbeddingGateway, EmbeddingProvider, GraphStore, HashEmbedder, InMemoryGraphStore,
    InMemoryVectorIndex, JsonlVectorIndex, MemoryStore, NoopGraphStore, OpenAiEmbedder,
    VectorIndex,
};
use std::path::PathBuf;
use std::sync::Arc;

const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// Registry mapping provider names to capability constructors.
#[derive(Debug, Default)]
pub struct ProviderRegistry;

impl ProviderRegistry {
    /// Create the registry.
    pub fn new() -> Self {
        Self {}
    }

    /// Build the embedding provider named by config.
    pub fn build_embedder(
        &self,
        config: &EmbedderConfig,
    ) -> Result<Arc<dyn EmbeddingProvider>, CoreError> {
        info!(
            "initializing embedder (provider={}, dimensions={})",
            config.provider, config.dimensions
        );
        match config.provider.as_str() {
            "hash" => Ok(Arc::new(HashEmbedder::new(config.dimensions))),
            "openai" => Ok(Arc::new(OpenAiEmbedder::new(
                config.base_url.clone(),
                config
                    .model
                    .clone()
                    .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
                api_key_from_env(&config.api_key_env),
                config.dimensions,
            ))),
            other => Err(CoreError::UnknownProvider(format!("embedder: {other}"))),
        }
    }

    /// Build the vector index named by config.
    pub fn build_vector_index(
        &self,
        config: &VectorStoreConfig,
    ) -> Result<Arc<dyn VectorIndex>, CoreError> {
        info!("initializing vector index (provider={})", config.provider);
        match config.provider.as_str() {
            "memory" => Ok(Arc::new(InMemoryVectorIndex::new())),
            "jsonl" => {
                let root = resolve_storage_root(config.path.as_ref(), "memories");
                Ok(Arc::new(JsonlVectorIndex::new(root)?))
            }
            other => Err(CoreError::UnknownProvider(format!("vector store: {other}"))),
        }
    }

    /// Build the graph store named by config; `noop` when unconfigured.
    pub fn build_graph_store(
        &self,
        config: &GraphStoreConfig,
    ) -> Result<Arc<dyn GraphStore>, CoreError> {
        info!("initializing graph store (provider={})", config.provider);
        match config.provider.as_str() {
            "noop" | "" => Ok(Arc::new(NoopGraphStore::new())),
            "memory" => Ok(Arc::new(InMemoryGraphStore::new())),
            other => Err(CoreError::UnknownProvider(format!("graph store: {other}"))),
        }
    }

    /// Build the upstream chat provider named by config.
    pub fn build_chat_provider(
        &self,
        config: &LlmConfig,
    ) -> Result<Arc<dyn ChatProvider>, CoreError> {
        info!("initializing chat provider (provider={})", config.provider);
        match config.provider.as_str() {
            "openai" => Ok(Arc::new(OpenAiChatProvider::new(
                Some(config.base_url.clone()),
                api_key_from_env(&config.api_key_env),
            ))),
            other => Err(CoreError::UnknownProvider(format!("llm: {other}"))),
        }
    }
}

/// Fully wired Mnemon runtime.
pub struct MnemonRuntime {
    /// Memory operations façade.
    pub orchestrator: Arc<MemoryOrchestrator>,
    /// Chat wrapper with memory augmentation.
    pub augmentor: Arc<ConversationAugmentor>,
    /// Background write queue; call `shutdown` to drain on exit.
    pub writer: Arc<MemoryWriter>,
}

/// Construct every component from config through the registry.
pub fn bootstrap(
    config: &MnemonConfig,
    registry: &ProviderRegistry,
) -> Result<MnemonRuntime, CoreError> {
    let embedder = registry.build_embedder(&config.embedder)?;
    let gateway = EmbeddingGateway::new(embedder, Some(config.embedder.dimensions))?;
    let index = registry.build_vector_index(&config.vector_store)?;
    let graph = registry.build_graph_store(&config.graph_store)?;
    let llm = registry.build_chat_provider(&config.llm)?;

    let store = MemoryStore::new(gateway, index);
    let orchestrator = Arc::new(MemoryOrchestrator::new(store, graph));
    let writer = Arc::new(MemoryWriter::spawn(
        orchestrator.clone(),
        config.memory.write_queue_depth,
    ));
    let augmentor = Arc::new(ConversationAugmentor::new(
        orchestrator.clone(),
        llm,
        writer.clone(),
        &config.memory,
    ));
    info!("mnemon runtime initialized");
    Ok(MnemonRuntime {
        orchestrator,
        augmentor,
        writer,
    })
}

/// Read an API key from the environment, if set.
fn api_key_from_env(var: &str) -> Option<String> {
    match std::env::var(var) {
        Ok(value) if !value.is_empty() => Some(value),
        _ => {
            debug!("no api key in environment (var={var})");
            None
        }
    }
}

/// Resolve an absolute storage root for config-specified paths.
fn resolve_storage_root(path: Option<&String>, fallback_dir: &str) -> PathBuf {
    if let Some(path) = path {
        let path = PathBuf::from(path);
        if path.is_absolute() {
            return path;
        }
        if let Ok(cwd) = std::env::current_dir() {
            return cwd.join(path);
        }
        return path;
    }

    if let Some(home) = BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf()) {
        return home.join(".mnemon").join(fallback_dir);
    }
    PathBuf::from(".mnemon").join(fallback_dir)
}

#[cfg(test)]
mod tests {
    use super::{ProviderRegistry, bootstrap, resolve_storage_root};
    use crate::error::CoreError;
    use crate::scope::ScopeArgs;
    use mnemon_rs_config::{MnemonConfig, VectorStoreConfig};
    use mnemon_rs_protocol::ChatMessage;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn unknown_provider_names_are_rejected() {
        let registry = ProviderRegistry::new();
        let mut config = MnemonConfig::default();
        config.embedder.provider = "quantum".to_string();
        let err = registry
            .build_embedder(&config.embedder)
            .expect_err("unknown");
        assert!(matches!(err, CoreError::UnknownProvider(_)));
    }

    #[test]
    fn resolve_storage_root_respects_absolute_paths() {
        let temp = tempdir().expect("tempdir");
        let absolute = temp.path().join("memories");
        let absolute_str = absolute.to_string_lossy().to_string();
        assert_eq!(resolve_storage_root(Some(&absolute_str), "memories"), absolute);
    }

    #[tokio::test]
    async fn bootstrap_wires_a_working_runtime() {
        let temp = tempdir().expect("tempdir");
        let config = MnemonConfig::builder()
            .vector_store(VectorStoreConfig {
                provider: "jsonl".to_string(),
                path: Some(temp.path().to_string_lossy().to_string()),
            })
            .build();
        let registry = ProviderRegistry::new();
        let runtime = bootstrap(&config, &registry).expect("bootstrap");

        let added = runtime
            .orchestrator
            .add(
                &[ChatMessage::user("bootstrap fact")],
                &ScopeArgs::for_user("u1"),
            )
            .await
            .expect("add");
        assert_eq!(added.len(), 1);

        let outcome = runtime
            .orchestrator
            .search("bootstrap fact", &ScopeArgs::for_user("u1"), 5)
            .await
            .expect("search");
        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.relations, Vec::new());

        runtime.writer.shutdown().await;
    }
}
