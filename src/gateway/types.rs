//! Completion gateway request and reply types

use serde::{Deserialize, Serialize};

use crate::store::Role;

/// One turn of conversation history sent to the provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Normalized assistant reply, expressed in store vocabulary
#[derive(Debug, Clone, PartialEq)]
pub struct AssistantReply {
    pub content: String,
    pub role: Role,
}

impl AssistantReply {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            role: Role::Ai,
        }
    }
}

/// Role labels on the provider wire. The provider says "assistant" where
/// the store says "ai"; the mapping is total in both directions so a
/// role can round-trip without loss.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WireRole {
    User,
    Assistant,
}

impl From<Role> for WireRole {
    fn from(role: Role) -> Self {
        match role {
            Role::User => WireRole::User,
            Role::Ai => WireRole::Assistant,
        }
    }
}

impl From<WireRole> for Role {
    fn from(role: WireRole) -> Self {
        match role {
            WireRole::User => Role::User,
            WireRole::Assistant => Role::Ai,
        }
    }
}
