//! Snapshot type and storage contract.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::StoreResult;
use crate::conversation::Conversation;
use crate::session::SessionState;

/// A durable point-in-time copy of one conversation and its session.
///
/// Saved between turns, never during one: a snapshot always captures the
/// aggregate at a consistent boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSnapshot {
    /// Schema version for forward-compatibility checks on load.
    pub schema_version: String,
    pub conversation: Conversation,
    pub session: SessionState,
    pub saved_at: DateTime<Utc>,
}

impl ConversationSnapshot {
    pub const SCHEMA_VERSION: &'static str = "1";

    #[must_use]
    pub fn new(conversation: Conversation, session: SessionState) -> Self {
        Self {
            schema_version: Self::SCHEMA_VERSION.to_string(),
            conversation,
            session,
            saved_at: Utc::now(),
        }
    }

    pub fn conversation_id(&self) -> &str {
        self.conversation.id()
    }

    pub fn is_compatible(&self) -> bool {
        self.schema_version == Self::SCHEMA_VERSION
    }
}

/// Storage backend for conversation snapshots.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Ids of every stored conversation.
    async fn list(&self) -> StoreResult<Vec<String>>;

    /// Load a snapshot, or `None` if this conversation was never saved.
    async fn load(&self, conversation_id: &str) -> StoreResult<Option<ConversationSnapshot>>;

    /// Persist a snapshot, replacing any previous one for the same
    /// conversation.
    async fn save(&self, snapshot: &ConversationSnapshot) -> StoreResult<()>;

    /// Remove a stored conversation. Deleting a missing one is not an error.
    async fn delete(&self, conversation_id: &str) -> StoreResult<()>;
}

/// Type alias for a shared snapshot store.
pub type SharedSnapshotStore = Arc<dyn SnapshotStore>;
