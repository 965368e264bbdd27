//! In-process conversation registry with exclusive turn leases.
//!
//! The engine itself enforces one active turn per conversation through
//! `&mut` access. Hosts that keep many conversations alive across tasks get
//! the same guarantee from this registry: checking a conversation out
//! returns a [`ConversationLease`] and marks the slot active, a second
//! checkout fails with [`RegistryError::TurnActive`], and dropping the lease
//! checks the entry back in — including when the task driving the turn is
//! cancelled, so a conversation is never left permanently claimed.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use dashmap::DashMap;
use thiserror::Error;
use tracing::debug;

use crate::session::SessionState;

use super::log::Conversation;

// ============================================================================
// Types
// ============================================================================

/// Errors from registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("conversation '{0}' is not registered")]
    NotFound(String),

    /// The conversation is checked out by a running turn.
    #[error("conversation '{0}' has an active turn")]
    TurnActive(String),

    #[error("conversation '{0}' is already registered")]
    AlreadyRegistered(String),
}

/// A conversation and the session that travels with it.
#[derive(Debug, Clone)]
pub struct ConversationEntry {
    pub conversation: Conversation,
    pub session: SessionState,
}

#[derive(Debug)]
enum Slot {
    Idle(ConversationEntry),
    /// Entry is checked out; the lease holds it.
    Active,
}

/// Registry of live conversations, safe to clone and share across tasks.
#[derive(Debug, Clone, Default)]
pub struct ConversationRegistry {
    slots: Arc<DashMap<String, Slot>>,
}

/// Exclusive access to one registered conversation for the duration of a
/// turn. Derefs to [`ConversationEntry`]; returning the entry happens in
/// `Drop`, which releases the active-turn claim.
#[derive(Debug)]
pub struct ConversationLease {
    slots: Arc<DashMap<String, Slot>>,
    id: String,
    entry: Option<ConversationEntry>,
}

// ============================================================================
// Implementation
// ============================================================================

impl ConversationRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fresh empty conversation and return its id.
    pub fn create(&self) -> String {
        let conversation = Conversation::new();
        let id = conversation.id().to_string();
        self.slots.insert(
            id.clone(),
            Slot::Idle(ConversationEntry {
                conversation,
                session: SessionState::new(),
            }),
        );
        debug!(conversation_id = %id, "conversation registered");
        id
    }

    /// Register an existing conversation (e.g. recovered from a snapshot).
    pub fn insert(
        &self,
        conversation: Conversation,
        session: SessionState,
    ) -> Result<String, RegistryError> {
        let id = conversation.id().to_string();
        if self.slots.contains_key(&id) {
            return Err(RegistryError::AlreadyRegistered(id));
        }
        self.slots.insert(
            id.clone(),
            Slot::Idle(ConversationEntry {
                conversation,
                session,
            }),
        );
        Ok(id)
    }

    /// Check a conversation out for a turn.
    pub fn checkout(&self, id: &str) -> Result<ConversationLease, RegistryError> {
        let mut slot = self
            .slots
            .get_mut(id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;

        match std::mem::replace(slot.value_mut(), Slot::Active) {
            Slot::Idle(entry) => Ok(ConversationLease {
                slots: Arc::clone(&self.slots),
                id: id.to_string(),
                entry: Some(entry),
            }),
            Slot::Active => Err(RegistryError::TurnActive(id.to_string())),
        }
    }

    /// Remove an idle conversation, returning its entry. Refuses while a
    /// turn holds the lease.
    pub fn remove(&self, id: &str) -> Result<ConversationEntry, RegistryError> {
        match self.slots.remove_if(id, |_, slot| matches!(slot, Slot::Idle(_))) {
            Some((_, Slot::Idle(entry))) => Ok(entry),
            Some((_, Slot::Active)) => unreachable!("remove_if predicate excludes active slots"),
            None if self.slots.contains_key(id) => {
                Err(RegistryError::TurnActive(id.to_string()))
            }
            None => Err(RegistryError::NotFound(id.to_string())),
        }
    }

    /// Ids of every registered conversation, active or idle.
    pub fn ids(&self) -> Vec<String> {
        self.slots.iter().map(|e| e.key().clone()).collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.slots.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl ConversationLease {
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Deref for ConversationLease {
    type Target = ConversationEntry;

    fn deref(&self) -> &Self::Target {
        // The entry only vacates inside Drop, after which no borrow exists.
        self.entry.as_ref().expect("lease entry present until drop")
    }
}

impl DerefMut for ConversationLease {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.entry.as_mut().expect("lease entry present until drop")
    }
}

impl Drop for ConversationLease {
    fn drop(&mut self) {
        if let Some(entry) = self.entry.take() {
            match self.slots.get_mut(&self.id) {
                Some(mut slot) => *slot.value_mut() = Slot::Idle(entry),
                // Slot can only be gone if the registry itself was dropped.
                None => {
                    self.slots.insert(self.id.clone(), Slot::Idle(entry));
                }
            }
            debug!(conversation_id = %self.id, "turn lease released");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
