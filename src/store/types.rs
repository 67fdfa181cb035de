//! Session, conversation, and message types
//!
//! Serialized field names match the persisted conversation record, which
//! predates this server and must stay readable by existing clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::{StoreError, StoreResult};

/// Greeting seeded into every new conversation.
pub const WELCOME_MESSAGE: &str = "你好！我是AI助手，有什么我可以帮助你的吗？";

/// Title a conversation carries until the first user message names it.
pub const DEFAULT_TITLE: &str = "新的对话";

/// Message author as the conversation record labels it.
///
/// `ai` is the stored label for assistant messages; `assistant` is accepted
/// on input because provider-facing clients tend to send it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum Role {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "ai", alias = "assistant")]
    Ai,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Ai => write!(f, "ai"),
        }
    }
}

/// Single message in a conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: String,
    pub content: String,
    pub role: Role,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(content, Role::User)
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(content, Role::Ai)
    }

    fn with_role(content: impl Into<String>, role: Role) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: content.into(),
            role,
            timestamp: Utc::now(),
        }
    }
}

/// Conversation record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub title: String,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Create a fresh conversation seeded with the welcome greeting
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title: DEFAULT_TITLE.to_string(),
            messages: vec![Message::assistant(WELCOME_MESSAGE)],
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the user has sent anything yet (the title derives from the
    /// first user message, so this gates retitling)
    pub fn has_user_messages(&self) -> bool {
        self.messages.iter().any(|m| m.role == Role::User)
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

/// Full session state: every conversation plus the active pointer
///
/// Not serialized as-is: the durable record stores only the conversation
/// list, and the active pointer is re-derived on load.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub conversations: Vec<Conversation>,
    pub active_conversation_id: String,
}

impl Session {
    /// Fresh session: one seeded conversation, which is active
    pub fn seeded() -> Self {
        let conversation = Conversation::new();
        let active_conversation_id = conversation.id.clone();
        Self {
            conversations: vec![conversation],
            active_conversation_id,
        }
    }

    /// Rebuild a session from a persisted conversation list. The first
    /// conversation becomes active, matching how clients of the record
    /// select on load.
    pub fn from_record(conversations: Vec<Conversation>) -> StoreResult<Self> {
        let first = conversations.first().ok_or_else(|| {
            StoreError::Deserialization("conversation record is empty".to_string())
        })?;
        let active_conversation_id = first.id.clone();
        Ok(Self {
            conversations,
            active_conversation_id,
        })
    }

    pub(super) fn conversation_mut(&mut self, id: &str) -> StoreResult<&mut Conversation> {
        self.conversations
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| StoreError::ConversationNotFound(id.to_string()))
    }
}
