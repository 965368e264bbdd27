//! Turn event vocabulary.

use serde::{Deserialize, Serialize};

use crate::conversation::ToolInput;
use crate::engine::StopReason;
use crate::llm::Usage;

/// Discriminant of a [`TurnEvent`], used for subscription filtering and for
/// tolerant wire decoding. Serializes to the same snake_case tag the full
/// event carries in its `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    MessageStart,
    TextDelta,
    ToolCallStarted,
    ToolCallCompleted,
    ToolCallFailed,
    ApprovalRequest,
    Done,
    Error,
}

impl EventKind {
    pub const ALL: [EventKind; 8] = [
        EventKind::MessageStart,
        EventKind::TextDelta,
        EventKind::ToolCallStarted,
        EventKind::ToolCallCompleted,
        EventKind::ToolCallFailed,
        EventKind::ApprovalRequest,
        EventKind::Done,
        EventKind::Error,
    ];

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

/// Everything observable about a turn, in emission order.
///
/// Exactly one terminal event (`Done` or `Error`) closes every streamed
/// turn, whatever path the turn took.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnEvent {
    /// The engine accepted the input and started the turn.
    MessageStart { conversation_id: String },
    /// A chunk of assistant text, in stream order.
    TextDelta { text: String },
    /// An approved call is about to execute.
    ToolCallStarted { tool_call_id: String, name: String },
    /// An approved call finished successfully.
    ToolCallCompleted {
        tool_call_id: String,
        name: String,
        output: String,
    },
    /// An approved call ran and failed.
    ToolCallFailed {
        tool_call_id: String,
        name: String,
        error: String,
    },
    /// A proposed call needs a human decision before it can run.
    ApprovalRequest {
        tool_call_id: String,
        name: String,
        input: ToolInput,
    },
    /// The turn finished without an engine error.
    Done {
        stop_reason: StopReason,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        usage: Option<Usage>,
    },
    /// The turn failed.
    Error { message: String },
}

impl TurnEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            TurnEvent::MessageStart { .. } => EventKind::MessageStart,
            TurnEvent::TextDelta { .. } => EventKind::TextDelta,
            TurnEvent::ToolCallStarted { .. } => EventKind::ToolCallStarted,
            TurnEvent::ToolCallCompleted { .. } => EventKind::ToolCallCompleted,
            TurnEvent::ToolCallFailed { .. } => EventKind::ToolCallFailed,
            TurnEvent::ApprovalRequest { .. } => EventKind::ApprovalRequest,
            TurnEvent::Done { .. } => EventKind::Done,
            TurnEvent::Error { .. } => EventKind::Error,
        }
    }
}
