//! Conversation augmentation around an upstream chat call.
//!
//! Wraps a completion with a synchronous memory pre-fetch and fire-and-
//! forget post-writes, so the write path never adds user-visible latency.

use crate::error::CoreError;
use crate::llm::{ChatProvider, ChunkStream};
use crate::orchestrator::{MemoryOrchestrator, SearchOutcome};
use crate::scope::ScopeArgs;
use crate::writer::{MemoryWriter, WriteJob};
use futures_util::StreamExt;
use log::debug;
use mnemon_rs_config::MemorySettings;
use mnemon_rs_protocol::{
    ChatCompletionChunk, ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ChatRole,
};
use std::sync::Arc;

/// System prompt inserted when the conversation does not start with one.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant with access to the \
user's stored memories. Ground your answers in the provided memories and facts, and say so \
when they do not contain the answer.";

/// Hook applied to each streamed chunk before it is forwarded.
pub type ChunkHook = Arc<dyn Fn(ChatCompletionChunk) -> ChatCompletionChunk + Send + Sync>;

/// Memory-augmenting wrapper over an upstream chat provider.
pub struct ConversationAugmentor {
    orchestrator: Arc<MemoryOrchestrator>,
    llm: Arc<dyn ChatProvider>,
    writer: Arc<MemoryWriter>,
    search_limit: usize,
    query_window: usize,
    chunk_hook: Option<ChunkHook>,
}

impl ConversationAugmentor {
    /// Compose an augmentor over the orchestrator, provider, and writer.
    pub fn new(
        orchestrator: Arc<MemoryOrchestrator>,
        llm: Arc<dyn ChatProvider>,
        writer: Arc<MemoryWriter>,
        settings: &MemorySettings,
    ) -> Self {
        Self {
            orchestrator,
            llm,
            writer,
            search_limit: settings.search_limit,
            query_window: settings.query_window,
            chunk_hook: None,
        }
    }

    /// Install a post-processing hook for streamed chunks.
    pub fn with_chunk_hook(mut self, hook: ChunkHook) -> Self {
        self.chunk_hook = Some(hook);
        self
    }

    /// Run a non-streaming completion with memory augmentation.
    ///
    /// The assistant reply is persisted asynchronously after the response
    /// value is built; the caller never waits on that write.
    pub async fn create(
        &self,
        request: ChatCompletionRequest,
        scope: ScopeArgs,
        limit: Option<usize>,
    ) -> Result<ChatCompletionResponse, CoreError> {
        let messages = self.prepare(&request, &scope, limit).await?;
        let outgoing = ChatCompletionRequest {
            messages,
            stream: false,
            ..request
        };
        let response = self.llm.chat(&outgoing).await?;

        if let Some(content) = response.content() {
            self.writer.submit(WriteJob {
                messages: vec![ChatMessage::assistant(content)],
                scope,
            });
        }
        Ok(response)
    }

    /// Run a streaming completion with memory augmentation.
    ///
    /// Chunks pass through the configured hook before forwarding. Fact
    /// capture for streamed output is best-effort: only the pre-call write
    /// of the incoming messages is issued.
    pub async fn create_stream(
        &self,
        request: ChatCompletionRequest,
        scope: ScopeArgs,
        limit: Option<usize>,
    ) -> Result<ChunkStream, CoreError> {
        let messages = self.prepare(&request, &scope, limit).await?;
        let outgoing = ChatCompletionRequest {
            messages,
            stream: true,
            ..request
        };
        let stream = self.llm.chat_stream(&outgoing).await?;
        let Some(hook) = self.chunk_hook.clone() else {
            return Ok(stream);
        };
        Ok(Box::pin(
            stream.map(move |chunk| chunk.map(|chunk| hook(chunk))),
        ))
    }

    /// Validate scope, normalize messages, and inject retrieved context.
    async fn prepare(
        &self,
        request: &ChatCompletionRequest,
        scope: &ScopeArgs,
        limit: Option<usize>,
    ) -> Result<Vec<ChatMessage>, CoreError> {
        scope.resolve()?;

        let mut prepared = prepare_messages(&request.messages);
        let ends_with_user = prepared
            .last()
            .is_some_and(|message| message.role == ChatRole::User);
        if !ends_with_user {
            return Ok(prepared);
        }

        self.writer.submit(WriteJob {
            messages: request.messages.clone(),
            scope: scope.clone(),
        });

        let query = render_query(&request.messages, self.query_window);
        let limit = limit.unwrap_or(self.search_limit);
        let outcome = self.orchestrator.search(&query, scope, limit).await?;
        debug!("retrieved {} relevant memories", outcome.results.len());

        if let Some(last) = prepared.last_mut() {
            last.content = format_query_with_memories(&outcome, &last.content);
        }
        Ok(prepared)
    }
}

/// Ensure the outgoing conversation starts with a system message.
fn prepare_messages(messages: &[ChatMessage]) -> Vec<ChatMessage> {
    if messages
        .first()
        .is_some_and(|message| message.role == ChatRole::System)
    {
        return messages.to_vec();
    }
    let mut prepared = Vec::with_capacity(messages.len() + 1);
    prepared.push(ChatMessage::system(DEFAULT_SYSTEM_PROMPT));
    prepared.extend(messages.iter().cloned());
    prepared
}

/// Render the trailing messages as the retrieval query.
fn render_query(messages: &[ChatMessage], window: usize) -> String {
    let start = messages.len().saturating_sub(window);
    messages[start..]
        .iter()
        .map(|message| format!("{}: {}", message.role, message.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prepend retrieved memories and relations to the user's question.
fn format_query_with_memories(outcome: &SearchOutcome, question: &str) -> String {
    let memories_text = outcome
        .results
        .iter()
        .map(|hit| hit.record.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    let entities = outcome
        .relations
        .iter()
        .map(|relation| {
            format!(
                "{} {} {}",
                relation.source, relation.relationship, relation.target
            )
        })
        .collect::<Vec<_>>()
        .join("; ");
    format!(
        "- Relevant Memories/Facts: {memories_text}\n\n- Entities: {entities}\n\n- User Question: {question}"
    )
}
