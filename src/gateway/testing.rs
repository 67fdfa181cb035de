//! Mock gateways for testing
//!
//! These mocks enable testing the send orchestration without real I/O.

use super::{AssistantReply, ChatTurn, CompletionGateway, GatewayError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

/// Mock gateway that returns queued replies
pub struct MockGateway {
    replies: Mutex<VecDeque<Result<AssistantReply, GatewayError>>>,
    /// Record of all histories sent
    pub requests: Mutex<Vec<Vec<ChatTurn>>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful reply
    pub fn queue_reply(&self, text: impl Into<String>) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Ok(AssistantReply::new(text)));
    }

    /// Queue an error reply
    pub fn queue_error(&self, error: GatewayError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded request histories
    pub fn recorded_requests(&self) -> Vec<Vec<ChatTurn>> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionGateway for MockGateway {
    async fn complete(&self, history: &[ChatTurn]) -> Result<AssistantReply, GatewayError> {
        if history.is_empty() {
            return Err(GatewayError::invalid_input("message history is empty"));
        }
        self.requests.lock().unwrap().push(history.to_vec());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GatewayError::network("No mock reply queued")))
    }

    fn model_id(&self) -> &str {
        "mock-model"
    }
}

/// Mock gateway with configurable delay (for in-flight interleaving tests)
pub struct DelayedMockGateway {
    inner: MockGateway,
    delay: Duration,
    /// Notified when a request starts (for test synchronization)
    pub request_started: Arc<Notify>,
}

impl DelayedMockGateway {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: MockGateway::new(),
            delay,
            request_started: Arc::new(Notify::new()),
        }
    }

    pub fn queue_reply(&self, text: impl Into<String>) {
        self.inner.queue_reply(text);
    }
}

#[async_trait]
impl CompletionGateway for DelayedMockGateway {
    async fn complete(&self, history: &[ChatTurn]) -> Result<AssistantReply, GatewayError> {
        self.request_started.notify_waiters();
        tokio::time::sleep(self.delay).await;
        self.inner.complete(history).await
    }

    fn model_id(&self) -> &str {
        self.inner.model_id()
    }
}
