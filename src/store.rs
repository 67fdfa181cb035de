//! Conversation store for Ember Chat
//!
//! Owns the session — every conversation, its messages, and the active
//! pointer — behind a thread-safe handle, and writes each change through
//! to the durable record on a best-effort basis.

mod persist;
mod title;
mod types;

#[cfg(test)]
mod proptests;

pub use persist::{SessionPersister, RECORD_FILE_NAME};
pub use types::{Conversation, Message, Role, Session, DEFAULT_TITLE, WELCOME_MESSAGE};

use std::sync::{Arc, Mutex};

use thiserror::Error;

use title::derive_title;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Conversation not found: {0}")]
    ConversationNotFound(String),
    #[error("Malformed conversation record: {0}")]
    Deserialization(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Thread-safe session handle
#[derive(Clone)]
pub struct SessionStore {
    session: Arc<Mutex<Session>>,
    persister: Option<Arc<SessionPersister>>,
}

impl SessionStore {
    /// Open the store backed by the given record.
    ///
    /// Never fails: a missing record seeds a fresh session, and a corrupt
    /// one is discarded with a warning and reseeded rather than repaired.
    pub async fn open(persister: SessionPersister) -> Self {
        let session = match persister.load().await {
            Ok(Some(conversations)) => match Session::from_record(conversations) {
                Ok(session) => session,
                Err(e) => {
                    tracing::warn!(error = %e, "Discarding unusable conversation record");
                    Session::seeded()
                }
            },
            Ok(None) => Session::seeded(),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    path = %persister.path().display(),
                    "Failed to load conversation record, starting fresh"
                );
                Session::seeded()
            }
        };

        let store = Self {
            session: Arc::new(Mutex::new(session)),
            persister: Some(Arc::new(persister)),
        };
        // Matches the write-through contract from the first mutation on,
        // and replaces a corrupt record with the seeded session.
        store.persist_snapshot();
        store
    }

    /// In-memory store with a seeded session (for testing)
    #[allow(dead_code)] // Used in tests
    pub fn in_memory() -> Self {
        Self {
            session: Arc::new(Mutex::new(Session::seeded())),
            persister: None,
        }
    }

    // ==================== Conversation Operations ====================

    /// Create a new conversation and make it active
    pub fn create_conversation(&self) -> Conversation {
        let conversation = Conversation::new();
        {
            let mut session = self.session.lock().unwrap();
            session.conversations.push(conversation.clone());
            session.active_conversation_id = conversation.id.clone();
        }
        self.persist_snapshot();
        conversation
    }

    /// Delete a conversation, if present. Returns whether anything was
    /// removed.
    ///
    /// Deleting the active conversation moves the pointer to the first
    /// remaining one; deleting the last one seeds a replacement, so the
    /// pointer is valid again by the time this returns.
    pub fn delete_conversation(&self, conversation_id: &str) -> bool {
        {
            let mut session = self.session.lock().unwrap();
            let before = session.conversations.len();
            session.conversations.retain(|c| c.id != conversation_id);
            if session.conversations.len() == before {
                return false;
            }

            if session.active_conversation_id == conversation_id {
                match session.conversations.first() {
                    Some(first) => session.active_conversation_id = first.id.clone(),
                    None => {
                        let replacement = Conversation::new();
                        session.active_conversation_id = replacement.id.clone();
                        session.conversations.push(replacement);
                    }
                }
            }
        }
        self.persist_snapshot();
        true
    }

    /// Make a conversation active. Unknown ids are a no-op and return
    /// false.
    ///
    /// No persistence side effect: the record stores only the conversation
    /// list, and the pointer is re-derived on load.
    pub fn set_active(&self, conversation_id: &str) -> bool {
        let mut session = self.session.lock().unwrap();
        if session.conversations.iter().any(|c| c.id == conversation_id) {
            session.active_conversation_id = conversation_id.to_string();
            true
        } else {
            false
        }
    }

    /// Currently active conversation id
    pub fn active_conversation_id(&self) -> String {
        self.session.lock().unwrap().active_conversation_id.clone()
    }

    /// Fetch one conversation by id
    pub fn conversation(&self, conversation_id: &str) -> StoreResult<Conversation> {
        let session = self.session.lock().unwrap();
        session
            .conversations
            .iter()
            .find(|c| c.id == conversation_id)
            .cloned()
            .ok_or_else(|| StoreError::ConversationNotFound(conversation_id.to_string()))
    }

    // ==================== Message Operations ====================

    /// Append a user message.
    ///
    /// The first user message in a conversation also sets its title, once,
    /// to a truncated prefix of the text.
    pub fn append_user_message(
        &self,
        conversation_id: &str,
        text: &str,
    ) -> StoreResult<Message> {
        if text.trim().is_empty() {
            return Err(StoreError::InvalidInput(
                "message text is empty".to_string(),
            ));
        }

        let message = Message::user(text);
        {
            let mut session = self.session.lock().unwrap();
            let conversation = session.conversation_mut(conversation_id)?;
            if !conversation.has_user_messages() {
                conversation.title = derive_title(text);
            }
            conversation.updated_at = message.timestamp;
            conversation.messages.push(message.clone());
        }
        self.persist_snapshot();
        Ok(message)
    }

    /// Append an assistant message. No title side effect.
    pub fn append_assistant_message(
        &self,
        conversation_id: &str,
        text: &str,
    ) -> StoreResult<Message> {
        let message = Message::assistant(text);
        {
            let mut session = self.session.lock().unwrap();
            let conversation = session.conversation_mut(conversation_id)?;
            conversation.updated_at = message.timestamp;
            conversation.messages.push(message.clone());
        }
        self.persist_snapshot();
        Ok(message)
    }

    // ==================== Session Operations ====================

    /// Current view of the whole session
    pub fn snapshot(&self) -> Session {
        self.session.lock().unwrap().clone()
    }

    /// Replace the session wholesale from a previously captured snapshot.
    ///
    /// The snapshot must hold at least one conversation and an active
    /// pointer naming one of them; anything else is rejected and the
    /// current session is left untouched.
    pub fn restore(&self, snapshot: Session) -> StoreResult<()> {
        if snapshot.conversations.is_empty() {
            return Err(StoreError::Deserialization(
                "conversation record is empty".to_string(),
            ));
        }
        let active_exists = snapshot
            .conversations
            .iter()
            .any(|c| c.id == snapshot.active_conversation_id);
        if !active_exists {
            return Err(StoreError::Deserialization(format!(
                "active conversation {} is not in the record",
                snapshot.active_conversation_id
            )));
        }

        *self.session.lock().unwrap() = snapshot;
        self.persist_snapshot();
        Ok(())
    }

    /// Kick off a write of the current state to the durable record.
    ///
    /// Best effort: the in-memory mutation has already happened, callers
    /// never wait on the write, and a failure is only logged.
    fn persist_snapshot(&self) {
        if let Some(persister) = &self.persister {
            let persister = Arc::clone(persister);
            let session = Arc::clone(&self.session);
            tokio::spawn(async move {
                if let Err(e) = persister.save_latest(&session).await {
                    tracing::warn!(
                        error = %e,
                        path = %persister.path().display(),
                        "Failed to persist conversation record"
                    );
                }
            });
        }
    }
}
