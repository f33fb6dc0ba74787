//! OpenAI-compatible embeddings client.

use crate::embedding::{EmbeddingProvider, EmbeddingPurpose};
use crate::error::MemoryError;
use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Embedding provider backed by an OpenAI-compatible `/v1/embeddings` API.
pub struct OpenAiEmbedder {
    base_url: String,
    model: String,
    api_key: Option<String>,
    dimensions: usize,
    http_client: reqwest::Client,
}

impl OpenAiEmbedder {
    /// Create a client for the given model, producing `dimensions`-sized
    /// vectors. The dimension is declared by configuration; the gateway
    /// rejects any response that disagrees.
    pub fn new(
        base_url: Option<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        dimensions: usize,
    ) -> Self {
        Self {
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: model.into(),
            api_key,
            dimensions,
            http_client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbedder {
    /// Embed via a fresh inference call. The purpose is ignored; the API
    /// embeds identically for indexing and querying.
    async fn embed(&self, text: &str, purpose: EmbeddingPurpose) -> Result<Vec<f32>, MemoryError> {
        debug!(
            "embedding request (model={}, purpose={:?}, text_len={})",
            self.model,
            purpose,
            text.len()
        );
        let url = format!("{}/v1/embeddings", self.base_url);
        let body = EmbeddingsRequest {
            model: &self.model,
            input: vec![text],
        };

        let mut request = self.http_client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|err| MemoryError::Backend(format!("embeddings request failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(MemoryError::Backend(format!(
                "embeddings API error {status}: {body_text}"
            )));
        }

        let parsed: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|err| MemoryError::Backend(format!("invalid embeddings response: {err}")))?;

        parsed
            .data
            .into_iter()
            .next()
            .map(|data| data.embedding)
            .ok_or_else(|| MemoryError::Backend("empty embeddings response".to_string()))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
