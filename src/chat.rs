//! Send orchestration
//!
//! The one flow that ties the store to the gateway: append the user's
//! message, send the conversation's full history out for completion, and
//! append whatever comes back. The user always gets a reply in the
//! conversation, even when the provider fails.

use crate::gateway::{ChatTurn, CompletionGateway};
use crate::store::{Message, SessionStore, StoreError, StoreResult};

/// Reply appended in place of a real completion when the gateway fails.
pub const FALLBACK_REPLY: &str = "很抱歉，发生了一个错误。请稍后再试。";

/// Result of one send: the appended user message and the reply that
/// followed it.
#[derive(Debug, Clone)]
pub struct SendOutcome {
    pub user_message: Message,
    pub reply: Message,
}

/// Append `text` as a user message and complete one assistant reply.
///
/// The gateway call is awaited without any lock held, so the store stays
/// mutable while the request is in flight. Concurrent sends against the
/// same conversation race, and both replies land in arrival order. The
/// reply is appended to the conversation the send started in, whether or
/// not it is still active; if that conversation was deleted mid-request,
/// the reply is dropped.
pub async fn send_message(
    store: &SessionStore,
    gateway: &dyn CompletionGateway,
    conversation_id: &str,
    text: &str,
) -> StoreResult<SendOutcome> {
    let user_message = store.append_user_message(conversation_id, text)?;

    let history: Vec<ChatTurn> = store
        .conversation(conversation_id)?
        .messages
        .iter()
        .map(|m| ChatTurn::new(m.role, m.content.clone()))
        .collect();

    let reply_text = match gateway.complete(&history).await {
        Ok(reply) => reply.content,
        Err(e) => {
            tracing::warn!(
                conversation_id,
                kind = ?e.kind,
                error = %e.message,
                "Completion failed, replying with the fallback message"
            );
            FALLBACK_REPLY.to_string()
        }
    };

    match store.append_assistant_message(conversation_id, &reply_text) {
        Ok(reply) => Ok(SendOutcome {
            user_message,
            reply,
        }),
        Err(StoreError::ConversationNotFound(id)) => {
            tracing::info!(
                conversation_id = %id,
                "Conversation deleted while its completion was in flight, dropping the reply"
            );
            Err(StoreError::ConversationNotFound(id))
        }
        Err(e) => Err(e),
    }
}
