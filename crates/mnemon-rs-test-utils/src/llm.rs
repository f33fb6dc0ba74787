use async_trait::async_trait;
use futures_util::stream;
use mnemon_rs_core::error::CoreError;
use mnemon_rs_core::llm::{ChatProvider, ChunkStream};
use mnemon_rs_protocol::{
    ChatCompletionChunk, ChatCompletionRequest, ChatCompletionResponse, ChatMessage,
};
use parking_lot::Mutex;

/// Chat provider returning a fixed reply and recording what it was sent.
pub struct RecordingChatProvider {
    response: String,
    last_messages: Mutex<Vec<ChatMessage>>,
    calls: Mutex<usize>,
}

impl RecordingChatProvider {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            last_messages: Mutex::new(Vec::new()),
            calls: Mutex::new(0),
        }
    }

    /// Messages from the most recent call.
    pub fn last_messages(&self) -> Vec<ChatMessage> {
        self.last_messages.lock().clone()
    }

    /// Number of completion calls made, streaming included.
    pub fn call_count(&self) -> usize {
        *self.calls.lock()
    }

    fn record(&self, request: &ChatCompletionRequest) {
        *self.last_messages.lock() = request.messages.clone();
        *self.calls.lock() += 1;
    }
}

#[async_trait]
impl ChatProvider for RecordingChatProvider {
    async fn chat(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, CoreError> {
        self.record(request);
        Ok(ChatCompletionResponse::from_message(
            request.model.clone(),
            ChatMessage::assistant(self.response.clone()),
        ))
    }

    /// Stream the fixed reply split into word chunks.
    async fn chat_stream(&self, request: &ChatCompletionRequest) -> Result<ChunkStream, CoreError> {
        self.record(request);
        let model = request.model.clone();
        let mut pieces = Vec::new();
        let mut rest = self.response.as_str();
        while let Some(position) = rest.find(' ') {
            let (head, tail) = rest.split_at(position + 1);
            pieces.push(head.to_string());
            rest = tail;
        }
        if !rest.is_empty() {
            pieces.push(rest.to_string());
        }
        let chunks: Vec<Result<ChatCompletionChunk, CoreError>> = pieces
            .into_iter()
            .map(|piece| Ok(ChatCompletionChunk::from_content(model.clone(), piece)))
            .collect();
        Ok(Box::pin(stream::iter(chunks)))
    }
}

/// Chat provider where every call fails with an upstream error.
pub struct FailingChatProvider {
    message: String,
}

impl FailingChatProvider {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl ChatProvider for FailingChatProvider {
    async fn chat(
        &self,
        _request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, CoreError> {
        Err(CoreError::Upstream(self.message.clone()))
    }

    async fn chat_stream(
        &self,
        _request: &ChatCompletionRequest,
    ) -> Result<ChunkStream, CoreError> {
        Err(CoreError::Upstream(self.message.clone()))
    }
}
