//! File-based snapshot storage.
//!
//! Directory structure:
//! ```text
//! {conversations_dir}/
//!   {conversation_id}/
//!     state.yaml         # Atomic snapshot
//! ```
//!
//! Snapshots are written to a temp file and renamed into place, so a crash
//! mid-save leaves the previous snapshot intact.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use super::error::{StoreError, StoreResult};
use super::snapshot::{ConversationSnapshot, SnapshotStore};

/// File-based implementation of `SnapshotStore`.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    conversations_dir: PathBuf,
}

impl FileSnapshotStore {
    /// Create a new file store. The directory is created when the first
    /// snapshot is saved.
    #[must_use]
    pub fn new(conversations_dir: impl Into<PathBuf>) -> Self {
        Self {
            conversations_dir: conversations_dir.into(),
        }
    }

    fn conversation_dir(&self, conversation_id: &str) -> PathBuf {
        self.conversations_dir.join(conversation_id)
    }

    fn snapshot_path(&self, conversation_id: &str) -> PathBuf {
        self.conversation_dir(conversation_id).join("state.yaml")
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn list(&self) -> StoreResult<Vec<String>> {
        let mut conversations = Vec::new();

        let mut entries = match fs::read_dir(&self.conversations_dir).await {
            Ok(e) => e,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::file_io(&self.conversations_dir, e)),
        };

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::file_io(&self.conversations_dir, e))?
        {
            let path = entry.path();
            // Only directories holding a snapshot count; stray files and
            // half-created directories are skipped.
            if path.is_dir() && path.join("state.yaml").exists() {
                if let Some(name) = path.file_name() {
                    conversations.push(name.to_string_lossy().to_string());
                }
            }
        }

        Ok(conversations)
    }

    async fn load(&self, conversation_id: &str) -> StoreResult<Option<ConversationSnapshot>> {
        let path = self.snapshot_path(conversation_id);

        let contents = match fs::read_to_string(&path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::file_io(&path, e)),
        };

        let snapshot: ConversationSnapshot = serde_yaml::from_str(&contents)
            .map_err(|e| StoreError::file_deserialization(&path, e.to_string()))?;

        if !snapshot.is_compatible() {
            return Err(StoreError::incompatible_schema(
                &path,
                ConversationSnapshot::SCHEMA_VERSION,
                &snapshot.schema_version,
            ));
        }

        Ok(Some(snapshot))
    }

    async fn save(&self, snapshot: &ConversationSnapshot) -> StoreResult<()> {
        let dir = self.conversation_dir(snapshot.conversation_id());
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| StoreError::file_io(&dir, e))?;

        let final_path = self.snapshot_path(snapshot.conversation_id());
        let temp_path = dir.join("state.yaml.tmp");

        let yaml = serde_yaml::to_string(snapshot)
            .map_err(|e| StoreError::serialization(e.to_string()))?;

        // Write to temp file first, then atomic rename.
        fs::write(&temp_path, yaml.as_bytes())
            .await
            .map_err(|e| StoreError::file_io(&temp_path, e))?;
        fs::rename(&temp_path, &final_path)
            .await
            .map_err(|e| StoreError::file_io(&final_path, e))?;

        Ok(())
    }

    async fn delete(&self, conversation_id: &str) -> StoreResult<()> {
        let dir = self.conversation_dir(conversation_id);

        match fs::remove_dir_all(&dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::file_io(&dir, e)),
        }
    }
}
