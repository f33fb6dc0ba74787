//! Configuration schema for Mnemon.

use serde::{Deserialize, Serialize};

/// Root config for the Mnemon runtime.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MnemonConfig {
    #[serde(default, rename = "$schema")]
    pub schema: Option<String>,
    #[serde(default)]
    pub embedder: EmbedderConfig,
    #[serde(default)]
    pub vector_store: VectorStoreConfig,
    #[serde(default)]
    pub graph_store: GraphStoreConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub memory: MemorySettings,
    #[serde(default)]
    pub server: ServerConfig,
}

impl MnemonConfig {
    /// Start building a config programmatically with defaults applied.
    pub fn builder() -> MnemonConfigBuilder {
        MnemonConfigBuilder::new()
    }
}

/// Builder for assembling a `MnemonConfig` in code.
#[derive(Debug, Default, Clone)]
pub struct MnemonConfigBuilder {
    config: MnemonConfig,
}

impl MnemonConfigBuilder {
    /// Create a new builder seeded with default config values.
    pub fn new() -> Self {
        Self {
            config: MnemonConfig::default(),
        }
    }

    /// Replace the embedder configuration.
    pub fn embedder(mut self, embedder: EmbedderConfig) -> Self {
        self.config.embedder = embedder;
        self
    }

    /// Replace the vector store configuration.
    pub fn vector_store(mut self, vector_store: VectorStoreConfig) -> Self {
        self.config.vector_store = vector_store;
        self
    }

    /// Replace the graph store configuration.
    pub fn graph_store(mut self, graph_store: GraphStoreConfig) -> Self {
        self.config.graph_store = graph_store;
        self
    }

    /// Replace the upstream LLM configuration.
    pub fn llm(mut self, llm: LlmConfig) -> Self {
        self.config.llm = llm;
        self
    }

    /// Replace the memory behavior settings.
    pub fn memory(mut self, memory: MemorySettings) -> Self {
        self.config.memory = memory;
        self
    }

    /// Replace the server configuration.
    pub fn server(mut self, server: ServerConfig) -> Self {
        self.config.server = server;
        self
    }

    /// Finalize and return the built `MnemonConfig`.
    pub fn build(self) -> MnemonConfig {
        self.config
    }
}

/// Embedding provider selection and model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedderConfig {
    /// Provider name, `hash` or `openai`.
    #[serde(default = "default_embedder_provider")]
    pub provider: String,
    /// Model identifier for remote providers.
    #[serde(default)]
    pub model: Option<String>,
    /// Expected embedding dimension.
    #[serde(default = "default_embedding_dimensions")]
    pub dimensions: usize,
    /// Base URL override for remote providers.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Environment variable holding the provider API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self {
            provider: default_embedder_provider(),
            model: None,
            dimensions: default_embedding_dimensions(),
            base_url: None,
            api_key_env: default_api_key_env(),
        }
    }
}

/// Vector index provider selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorStoreConfig {
    /// Provider name, `memory` or `jsonl`.
    #[serde(default = "default_vector_provider")]
    pub provider: String,
    /// Storage root for persistent providers; resolved under the home
    /// directory when unset.
    #[serde(default)]
    pub path: Option<String>,
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            provider: default_vector_provider(),
            path: None,
        }
    }
}

/// Graph store provider selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphStoreConfig {
    /// Provider name, `noop` or `memory`.
    #[serde(default = "default_graph_provider")]
    pub provider: String,
}

impl Default for GraphStoreConfig {
    fn default() -> Self {
        Self {
            provider: default_graph_provider(),
        }
    }
}

/// Upstream chat provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider name, currently `openai`.
    #[serde(default = "default_llm_provider")]
    pub provider: String,
    /// Default model when a request does not name one.
    #[serde(default = "default_llm_model")]
    pub model: String,
    /// Base URL for the provider API.
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    /// Environment variable holding the provider API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            model: default_llm_model(),
            base_url: default_llm_base_url(),
            api_key_env: default_api_key_env(),
        }
    }
}

/// Behavior settings for memory retrieval and background writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemorySettings {
    /// Default number of memories fetched per search.
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,
    /// How many trailing messages form the retrieval query.
    #[serde(default = "default_query_window")]
    pub query_window: usize,
    /// Capacity of the background write queue.
    #[serde(default = "default_write_queue_depth")]
    pub write_queue_depth: usize,
}

impl Default for MemorySettings {
    fn default() -> Self {
        Self {
            search_limit: default_search_limit(),
            query_window: default_query_window(),
            write_queue_depth: default_write_queue_depth(),
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_embedder_provider() -> String {
    "hash".to_string()
}

fn default_embedding_dimensions() -> usize {
    384
}

fn default_vector_provider() -> String {
    "memory".to_string()
}

fn default_graph_provider() -> String {
    "noop".to_string()
}

fn default_llm_provider() -> String {
    "openai".to_string()
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_llm_base_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_search_limit() -> usize {
    10
}

fn default_query_window() -> usize {
    6
}

fn default_write_queue_depth() -> usize {
    64
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8420
}
