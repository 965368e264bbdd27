//! Conversation aggregate errors.

use thiserror::Error;

use super::tool_call::ToolCallStatus;

/// Errors raised by the conversation aggregate and its tool-call machine.
#[derive(Debug, Error)]
pub enum ConversationError {
    /// A user message arrived while approvals are still pending. Recoverable:
    /// the caller must resolve every pending call first.
    #[error("conversation '{id}' is blocked by {pending} pending approval(s)")]
    Blocked { id: String, pending: usize },

    /// A decision referenced an id this conversation has never registered.
    #[error("unknown tool call id '{0}'")]
    UnknownToolCall(String),

    /// A decision referenced an id that has already been resolved.
    #[error("tool call '{0}' is already resolved")]
    AlreadyResolved(String),

    /// A registered tool call id was proposed a second time. Ids are unique
    /// for the lifetime of a conversation, including after resolution.
    #[error("duplicate tool call id '{0}'")]
    DuplicateToolCallId(String),

    /// The state machine refused a transition.
    #[error("invalid transition for tool call '{id}': {from} -> {to}")]
    InvalidTransition {
        id: String,
        from: ToolCallStatus,
        to: ToolCallStatus,
    },
}
