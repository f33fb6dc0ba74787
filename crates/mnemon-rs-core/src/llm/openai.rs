//! OpenAI-compatible chat completions client.

use crate::error::CoreError;
use crate::llm::{ChatProvider, ChunkStream};
use async_trait::async_trait;
use futures_util::StreamExt;
use log::{debug, warn};
use mnemon_rs_protocol::{ChatCompletionChunk, ChatCompletionRequest, ChatCompletionResponse};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const STREAM_CHANNEL_BUFFER: usize = 32;

/// Chat provider backed by an OpenAI-compatible `/v1/chat/completions` API.
pub struct OpenAiChatProvider {
    base_url: String,
    api_key: Option<String>,
    http_client: reqwest::Client,
}

impl OpenAiChatProvider {
    /// Create a client against the given base URL.
    pub fn new(base_url: Option<String>, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key,
            http_client: reqwest::Client::new(),
        }
    }

    async fn send(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<reqwest::Response, CoreError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        debug!(
            "chat completion request (model={}, messages={}, stream={})",
            request.model,
            request.messages.len(),
            request.stream
        );
        let mut http_request = self.http_client.post(&url).json(request);
        if let Some(key) = &self.api_key {
            http_request = http_request.bearer_auth(key);
        }

        let response = http_request
            .send()
            .await
            .map_err(|err| CoreError::Upstream(format!("chat request failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(CoreError::Upstream(format!(
                "chat API error {status}: {body_text}"
            )));
        }
        Ok(response)
    }
}

#[async_trait]
impl ChatProvider for OpenAiChatProvider {
    async fn chat(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, CoreError> {
        let mut request = request.clone();
        request.stream = false;
        let response = self.send(&request).await?;
        response
            .json()
            .await
            .map_err(|err| CoreError::Upstream(format!("invalid chat response: {err}")))
    }

    /// Stream chunks parsed from the provider's SSE response.
    async fn chat_stream(&self, request: &ChatCompletionRequest) -> Result<ChunkStream, CoreError> {
        let mut request = request.clone();
        request.stream = true;
        let response = self.send(&request).await?;

        let (sender, receiver) = mpsc::channel(STREAM_CHANNEL_BUFFER);
        tokio::spawn(async move {
            let mut bytes = response.bytes_stream();
            let mut buffer = Vec::new();
            while let Some(part) = bytes.next().await {
                let part = match part {
                    Ok(part) => part,
                    Err(err) => {
                        let _ = sender
                            .send(Err(CoreError::Upstream(format!("stream failed: {err}"))))
                            .await;
                        return;
                    }
                };
                buffer.extend_from_slice(&part);
                while let Some(line) = next_line(&mut buffer) {
                    match parse_sse_line(&line) {
                        SseEvent::Chunk(chunk) => {
                            if sender.send(Ok(chunk)).await.is_err() {
                                return;
                            }
                        }
                        SseEvent::Done => return,
                        SseEvent::Skip => {}
                    }
                }
            }
        });

        Ok(Box::pin(ReceiverStream::new(receiver)))
    }
}

enum SseEvent {
    Chunk(ChatCompletionChunk),
    Done,
    Skip,
}

/// Pop one newline-terminated line off the front of the buffer.
fn next_line(buffer: &mut Vec<u8>) -> Option<String> {
    let position = buffer.iter().position(|byte| *byte == b'\n')?;
    let line: Vec<u8> = buffer.drain(..=position).collect();
    Some(String::from_utf8_lossy(&line).trim().to_string())
}

/// Decode one SSE line into a chunk, the terminator, or nothing.
fn parse_sse_line(line: &str) -> SseEvent {
    let Some(payload) = line.strip_prefix("data:") else {
        return SseEvent::Skip;
    };
    let payload = payload.trim();
    if payload.is_empty() {
        return SseEvent::Skip;
    }
    if payload == "[DONE]" {
        return SseEvent::Done;
    }
    match serde_json::from_str::<ChatCompletionChunk>(payload) {
        Ok(chunk) => SseEvent::Chunk(chunk),
        Err(err) => {
            warn!("skipping unparseable stream chunk (err={err})");
            SseEvent::Skip
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{SseEvent, next_line, parse_sse_line};
    use pretty_assertions::assert_eq;

    #[test]
    fn next_line_splits_on_newlines() {
        let mut buffer = b"data: one\ndata: two\npartial".to_vec();
        assert_eq!(next_line(&mut buffer), Some("data: one".to_string()));
        assert_eq!(next_line(&mut buffer), Some("data: two".to_string()));
        assert_eq!(next_line(&mut buffer), None);
        assert_eq!(buffer, b"partial".to_vec());
    }

    #[test]
    fn parse_sse_line_decodes_chunks_and_terminator() {
        let payload = concat!(
            "data: {\"id\":\"c1\",\"object\":\"chat.completion.chunk\",\"created\":1,",
            "\"model\":\"m\",\"choices\":[{\"index\":0,\"delta\":{\"content\":\"hi\"}}]}"
        );
        match parse_sse_line(payload) {
            SseEvent::Chunk(chunk) => assert_eq!(chunk.content(), Some("hi")),
            _ => panic!("expected chunk"),
        }
        assert!(matches!(parse_sse_line("data: [DONE]"), SseEvent::Done));
        assert!(matches!(parse_sse_line(": keepalive"), SseEvent::Skip));
        assert!(matches!(parse_sse_line(""), SseEvent::Skip));
    }
}
