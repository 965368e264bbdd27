//! The conversation aggregate: append-only history plus approval state.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;
use ulid::Ulid;

use crate::api::CONVERSATION_ID_PREFIX;
use crate::approval::{ApprovalDecision, DecisionAction};

use super::error::ConversationError;
use super::message::Message;
use super::tool_call::{ToolCall, ToolCallStatus};

/// Aggregate root owning a conversation's message history, every tool call
/// it has ever registered, and the set of calls awaiting a human decision.
///
/// Two invariants hold at all times:
/// - a user message may not be appended while `pending_approvals` is
///   non-empty (the caller must resolve every pending call first);
/// - tool call ids are unique for the conversation's lifetime, with no
///   reuse even after a call resolves.
///
/// All operations validate before they mutate: a failed call leaves the
/// aggregate exactly as it was.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    id: String,
    messages: Vec<Message>,
    /// Every call ever registered, keyed by id. Entries are never removed;
    /// this is what distinguishes "unknown id" from "already resolved".
    tool_calls: HashMap<String, ToolCall>,
    /// Ids awaiting a decision, in registration order.
    pending_approvals: Vec<String>,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    /// Create an empty conversation with a generated `conv_<ulid>` id.
    #[must_use]
    pub fn new() -> Self {
        Self::with_id(format!("{CONVERSATION_ID_PREFIX}{}", Ulid::new()))
    }

    /// Create an empty conversation under a caller-supplied id.
    #[must_use]
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            messages: Vec::new(),
            tool_calls: HashMap::new(),
            pending_approvals: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Look up a registered tool call by id, whatever its state.
    pub fn tool_call(&self, id: &str) -> Option<&ToolCall> {
        self.tool_calls.get(id)
    }

    /// Calls awaiting a decision, in registration order.
    pub fn pending_approvals(&self) -> Vec<&ToolCall> {
        self.pending_approvals
            .iter()
            .filter_map(|id| self.tool_calls.get(id))
            .collect()
    }

    pub fn has_pending_approvals(&self) -> bool {
        !self.pending_approvals.is_empty()
    }

    // ------------------------------------------------------------------------
    // Appends
    // ------------------------------------------------------------------------

    /// Append a user contribution.
    ///
    /// Blocked while approvals are pending: the history must not advance past
    /// an unresolved checkpoint.
    pub fn append_user_message(
        &mut self,
        content: impl Into<String>,
    ) -> Result<(), ConversationError> {
        if !self.pending_approvals.is_empty() {
            return Err(ConversationError::Blocked {
                id: self.id.clone(),
                pending: self.pending_approvals.len(),
            });
        }
        self.messages.push(Message::user(content));
        Ok(())
    }

    /// Append an assistant message and register its proposed tool calls.
    ///
    /// Never blocked by pending approvals, but every call id must be new for
    /// this conversation and unique within the batch; on a duplicate nothing
    /// is appended or registered.
    pub fn append_assistant_message(
        &mut self,
        content: impl Into<String>,
        calls: Vec<ToolCall>,
    ) -> Result<(), ConversationError> {
        let mut seen: Vec<&str> = Vec::with_capacity(calls.len());
        for call in &calls {
            if self.tool_calls.contains_key(call.id()) || seen.contains(&call.id()) {
                return Err(ConversationError::DuplicateToolCallId(call.id().to_string()));
            }
            seen.push(call.id());
        }

        let ids: Vec<String> = calls.iter().map(|c| c.id().to_string()).collect();
        for call in calls {
            if call.status() == ToolCallStatus::Pending {
                debug!(
                    conversation_id = %self.id,
                    call_id = call.id(),
                    tool = call.name(),
                    "tool call awaiting approval"
                );
                self.pending_approvals.push(call.id().to_string());
            }
            self.tool_calls.insert(call.id().to_string(), call);
        }
        self.messages.push(Message::assistant(content, ids));
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Approval resolution
    // ------------------------------------------------------------------------

    /// Apply a batch of approval decisions.
    ///
    /// Every decision is validated first; if any id is unknown, already
    /// resolved, or repeated within the batch, nothing is applied. On
    /// success, approved calls are returned in their original registration
    /// order, ready for execution; rejected calls record their reason and
    /// go terminal. All decided ids leave the pending set.
    pub fn resolve(
        &mut self,
        decisions: &[ApprovalDecision],
    ) -> Result<Vec<ToolCall>, ConversationError> {
        let mut seen: Vec<&str> = Vec::with_capacity(decisions.len());
        for decision in decisions {
            let id = decision.tool_call_id.as_str();
            if !self.tool_calls.contains_key(id) {
                return Err(ConversationError::UnknownToolCall(id.to_string()));
            }
            if !self.pending_approvals.iter().any(|p| p == id) || seen.contains(&id) {
                return Err(ConversationError::AlreadyResolved(id.to_string()));
            }
            seen.push(id);
        }

        // Registration order, captured before ids start leaving the set.
        let original_order = self.pending_approvals.clone();

        for decision in decisions {
            let id = decision.tool_call_id.as_str();
            let call = self
                .tool_calls
                .get_mut(id)
                .ok_or_else(|| ConversationError::UnknownToolCall(id.to_string()))?;
            match &decision.action {
                DecisionAction::Approve => call.approve()?,
                DecisionAction::Reject { reason } => call.reject(reason.clone())?,
            }
            self.pending_approvals.retain(|p| p != id);
            debug!(conversation_id = %self.id, call_id = id, action = %decision.action, "approval resolved");
        }

        let approved = original_order
            .iter()
            .filter_map(|id| self.tool_calls.get(id))
            .filter(|call| call.status() == ToolCallStatus::Approved)
            .cloned()
            .collect();
        Ok(approved)
    }

    // ------------------------------------------------------------------------
    // Execution bookkeeping
    // ------------------------------------------------------------------------

    /// Record a successful execution, returning the updated call.
    pub fn record_success(
        &mut self,
        id: &str,
        output: impl Into<String>,
    ) -> Result<ToolCall, ConversationError> {
        let call = self
            .tool_calls
            .get_mut(id)
            .ok_or_else(|| ConversationError::UnknownToolCall(id.to_string()))?;
        call.mark_executed(output)?;
        Ok(call.clone())
    }

    /// Record a failed execution, returning the updated call. The error text
    /// becomes the call's output; the call does not become executed.
    pub fn record_failure(
        &mut self,
        id: &str,
        error: impl Into<String>,
    ) -> Result<ToolCall, ConversationError> {
        let call = self
            .tool_calls
            .get_mut(id)
            .ok_or_else(|| ConversationError::UnknownToolCall(id.to_string()))?;
        call.mark_failed(error)?;
        Ok(call.clone())
    }
}

// ============================================================================
// Tests
// ============================================================================
