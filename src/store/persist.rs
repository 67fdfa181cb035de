//! Durable conversation record
//!
//! The whole session persists as one JSON file holding the conversation
//! list. Writes land in a temp file first and rename into place, so a
//! crash mid-write never leaves a torn record behind.

use std::path::{Path, PathBuf};
use std::sync::Mutex as StdMutex;

use tokio::fs;
use tokio::sync::Mutex;

use super::types::{Conversation, Session};
use super::{StoreError, StoreResult};

/// File name of the conversation record, shared with prior clients of it.
pub const RECORD_FILE_NAME: &str = "ai-conversations.json";

/// Reads and writes the conversation record file.
pub struct SessionPersister {
    path: PathBuf,
    // Serializes writers: concurrent saves to the same temp path would
    // interleave and could rename a torn file into place.
    write_gate: Mutex<()>,
}

impl SessionPersister {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_gate: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted conversation list.
    ///
    /// A missing file is `Ok(None)` (first launch). An unreadable or
    /// unparsable record is an error, and the caller decides whether to
    /// reseed.
    pub async fn load(&self) -> StoreResult<Option<Vec<Conversation>>> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::Io(e)),
        };

        let conversations = serde_json::from_str(&raw)
            .map_err(|e| StoreError::Deserialization(e.to_string()))?;
        Ok(Some(conversations))
    }

    /// Write the given conversation list, replacing the previous record.
    pub async fn save(&self, conversations: &[Conversation]) -> StoreResult<()> {
        let _gate = self.write_gate.lock().await;
        self.write_record(conversations).await
    }

    /// Write the newest session state.
    ///
    /// The snapshot is taken after the previous writer finishes, so an
    /// older snapshot can never land on disk after a newer one.
    pub async fn save_latest(&self, session: &StdMutex<Session>) -> StoreResult<()> {
        let _gate = self.write_gate.lock().await;
        let conversations = {
            let session = session.lock().unwrap();
            session.conversations.clone()
        };
        self.write_record(&conversations).await
    }

    async fn write_record(&self, conversations: &[Conversation]) -> StoreResult<()> {
        let json = serde_json::to_string_pretty(conversations).unwrap();
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}
