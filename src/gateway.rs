//! Completion gateway
//!
//! Stateless boundary that turns an ordered message history into one
//! assistant reply from an external provider. One round trip per call:
//! no streaming, no retries, no stored state.

mod error;
mod openai;
mod types;

#[cfg(test)]
mod proptests;
#[cfg(test)]
pub mod testing;

pub use error::{GatewayError, GatewayErrorKind};
pub use openai::{GatewayConfig, OpenAIGateway};
pub use types::{AssistantReply, ChatTurn, WireRole};

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for completion providers
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    /// Make a completion request over the given history.
    ///
    /// The history must be non-empty; an empty one fails with
    /// `InvalidInput` before any network interaction.
    async fn complete(&self, history: &[ChatTurn]) -> Result<AssistantReply, GatewayError>;

    /// Get the model ID
    fn model_id(&self) -> &str;
}

/// Logging wrapper for completion gateways
pub struct LoggingGateway {
    inner: Arc<dyn CompletionGateway>,
    model_id: String,
}

impl LoggingGateway {
    pub fn new(inner: Arc<dyn CompletionGateway>) -> Self {
        let model_id = inner.model_id().to_string();
        Self { inner, model_id }
    }
}

#[async_trait]
impl CompletionGateway for LoggingGateway {
    async fn complete(&self, history: &[ChatTurn]) -> Result<AssistantReply, GatewayError> {
        let start = std::time::Instant::now();
        let result = self.inner.complete(history).await;
        let duration = start.elapsed();

        match &result {
            Ok(reply) => {
                tracing::info!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    history_len = history.len(),
                    reply_chars = reply.content.chars().count(),
                    "Completion request succeeded"
                );
            }
            Err(e) => {
                tracing::error!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    history_len = history.len(),
                    kind = ?e.kind,
                    error = %e.message,
                    "Completion request failed"
                );
            }
        }

        result
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
