//! Upstream chat-completion capability.

mod openai;

pub use openai::OpenAiChatProvider;

use crate::error::CoreError;
use async_trait::async_trait;
use futures_util::Stream;
use mnemon_rs_protocol::{ChatCompletionChunk, ChatCompletionRequest, ChatCompletionResponse};
use std::pin::Pin;

/// Stream of completion chunks from an upstream provider.
pub type ChunkStream =
    Pin<Box<dyn Stream<Item = Result<ChatCompletionChunk, CoreError>> + Send>>;

/// Chat completion capability.
///
/// Errors from either call are upstream failures and propagate unchanged;
/// memory side effects for the failed turn are skipped by the caller.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Run a completion and return the full response.
    async fn chat(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, CoreError>;

    /// Run a completion and stream partial chunks.
    async fn chat_stream(&self, request: &ChatCompletionRequest) -> Result<ChunkStream, CoreError>;
}
