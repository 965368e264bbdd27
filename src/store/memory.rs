//! In-memory snapshot storage.
//!
//! Snapshots live in a concurrent map and vanish when the store is dropped.
//! Useful for tests and for embedding the engine without a data directory.

use dashmap::DashMap;

use async_trait::async_trait;

use super::error::StoreResult;
use super::snapshot::{ConversationSnapshot, SnapshotStore};

/// In-memory implementation of `SnapshotStore`.
///
/// Thread-safe; wrap in an `Arc` to share between tasks.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    snapshots: DashMap<String, ConversationSnapshot>,
}

impl MemorySnapshotStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn list(&self) -> StoreResult<Vec<String>> {
        Ok(self
            .snapshots
            .iter()
            .map(|entry| entry.key().clone())
            .collect())
    }

    async fn load(&self, conversation_id: &str) -> StoreResult<Option<ConversationSnapshot>> {
        Ok(self
            .snapshots
            .get(conversation_id)
            .map(|entry| entry.value().clone()))
    }

    async fn save(&self, snapshot: &ConversationSnapshot) -> StoreResult<()> {
        self.snapshots
            .insert(snapshot.conversation_id().to_string(), snapshot.clone());
        Ok(())
    }

    async fn delete(&self, conversation_id: &str) -> StoreResult<()> {
        self.snapshots.remove(conversation_id);
        Ok(())
    }
}
