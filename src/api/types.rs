//! API request and response types
//!
//! Field names are camelCase to match what the browser client already
//! reads and writes.

use serde::{Deserialize, Serialize};

use crate::gateway::{ChatTurn, WireRole};
use crate::store::{Conversation, Message};

/// Response with the full session: every conversation plus the active id
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub conversations: Vec<Conversation>,
    pub active_conversation_id: String,
}

/// Response with the sidebar view of all conversations
#[derive(Debug, Serialize)]
pub struct ConversationListResponse {
    pub conversations: Vec<ConversationSummary>,
}

/// Sidebar entry for one conversation
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub id: String,
    pub title: String,
    pub message_count: usize,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<&Conversation> for ConversationSummary {
    fn from(conv: &Conversation) -> Self {
        Self {
            id: conv.id.clone(),
            title: conv.title.clone(),
            message_count: conv.messages.len(),
            updated_at: conv.updated_at,
        }
    }
}

/// Response with a single full conversation
#[derive(Debug, Serialize)]
pub struct ConversationResponse {
    pub conversation: Conversation,
}

/// Response for the activate action
#[derive(Debug, Serialize)]
pub struct ActivateResponse {
    /// Whether the id existed (unknown ids are a no-op)
    pub activated: bool,
}

/// Response for the delete action
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub deleted: bool,
    /// Valid active pointer after the delete
    pub active_conversation_id: String,
}

/// Request to send a chat message into a conversation
#[derive(Debug, Deserialize)]
pub struct SendRequest {
    pub text: String,
}

/// Response for a send: the appended user message and the reply
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendResponse {
    pub user_message: Message,
    pub reply: Message,
}

/// Request body of the stateless completion route
#[derive(Debug, Deserialize)]
pub struct CompletionRequest {
    #[serde(default)]
    pub messages: Vec<ChatTurn>,
}

/// Response body of the stateless completion route, with the wire-side
/// `assistant` label exactly as the original route returned it
#[derive(Debug, Serialize)]
pub struct CompletionResponse {
    pub content: String,
    pub role: WireRole,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
