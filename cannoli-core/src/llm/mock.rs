//! A scripted `LlmProvider` for tests: returns queued responses in order,
//! and never makes a network call. The `is_mock` flag the scheduler checks
//! before pausing between repeat-loop iterations is derived from whether a
//! run was built with this provider.

use std::sync::Mutex;

use async_trait::async_trait;
use futures::stream;

use crate::error::CannoliError;
use crate::message::Message;

use super::{CompletionRequest, CompletionStream, LlmProvider};

pub struct MockLlm {
    responses: Mutex<Vec<Message>>,
    stream_chunks: Mutex<Vec<Vec<String>>>,
}

impl MockLlm {
    pub fn new() -> Self {
        Self { responses: Mutex::new(Vec::new()), stream_chunks: Mutex::new(Vec::new()) }
    }

    /// Queues a response `complete` will return the next time it's called,
    /// earliest-queued first.
    pub fn with_response(self, message: Message) -> Self {
        self.responses.lock().expect("mock llm lock poisoned").push(message);
        self
    }

    /// Queues a sequence of chunks `complete_stream` will yield the next
    /// time it's called.
    pub fn with_stream(self, chunks: Vec<&str>) -> Self {
        self.stream_chunks
            .lock()
            .expect("mock llm lock poisoned")
            .push(chunks.into_iter().map(|s| s.to_string()).collect());
        self
    }
}

impl Default for MockLlm {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmProvider for MockLlm {
    async fn complete(&self, _request: CompletionRequest) -> Result<Message, CannoliError> {
        let mut guard = self.responses.lock().expect("mock llm lock poisoned");
        if guard.is_empty() {
            return Err(CannoliError::LlmFailed("mock llm has no queued response".to_string()));
        }
        Ok(guard.remove(0))
    }

    async fn complete_stream(&self, _request: CompletionRequest) -> Result<CompletionStream, CannoliError> {
        let mut guard = self.stream_chunks.lock().expect("mock llm lock poisoned");
        if guard.is_empty() {
            return Err(CannoliError::LlmFailed("mock llm has no queued stream".to_string()));
        }
        let chunks = guard.remove(0);
        Ok(Box::pin(stream::iter(chunks.into_iter().map(Ok))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    /// **Scenario**: queued responses are returned in FIFO order.
    #[tokio::test]
    async fn mock_llm_returns_queued_responses_in_order() {
        let llm = MockLlm::new().with_response(Message::assistant("first")).with_response(Message::assistant("second"));
        let first = llm.complete(CompletionRequest::new(vec![])).await.unwrap();
        let second = llm.complete(CompletionRequest::new(vec![])).await.unwrap();
        assert_eq!(first.text(), "first");
        assert_eq!(second.text(), "second");
    }

    /// **Scenario**: `complete` with no queued response is a fatal `LlmFailed` error.
    #[tokio::test]
    async fn mock_llm_empty_queue_errors() {
        let llm = MockLlm::new();
        let result = llm.complete(CompletionRequest::new(vec![])).await;
        assert!(matches!(result, Err(CannoliError::LlmFailed(_))));
    }

    /// **Scenario**: `complete_stream` yields the queued chunks in order.
    #[tokio::test]
    async fn mock_llm_stream_yields_chunks_in_order() {
        let llm = MockLlm::new().with_stream(vec!["Hel", "lo"]);
        let mut stream = llm.complete_stream(CompletionRequest::new(vec![])).await.unwrap();
        let mut out = String::new();
        while let Some(chunk) = stream.next().await {
            out.push_str(&chunk.unwrap());
        }
        assert_eq!(out, "Hello");
    }
}
