//! Turn outcomes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::conversation::ToolCall;
use crate::llm::Usage;
use crate::session::SessionState;

/// Why a turn stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The model produced a final response with no outstanding calls.
    Completed,
    /// At least one proposed call is waiting for a human decision.
    PendingApproval,
    /// The model invocation limit was reached before the model finished.
    TurnLimit,
    /// A veto or recoverable failure ended the turn early.
    Error,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StopReason::Completed => "completed",
            StopReason::PendingApproval => "pending_approval",
            StopReason::TurnLimit => "turn_limit",
            StopReason::Error => "error",
        };
        write!(f, "{s}")
    }
}

/// Everything a caller learns from one finished turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnResult {
    /// Final assistant text. For `Error` stops this carries the veto or
    /// failure message instead.
    pub text: String,
    /// Calls that executed during this turn, in execution order, including
    /// ones whose execution failed.
    pub executed_tool_calls: Vec<ToolCall>,
    /// Calls still waiting for a decision, in proposal order.
    pub pending_tool_calls: Vec<ToolCall>,
    pub stop_reason: StopReason,
    /// Session state as of the end of the turn.
    pub session: SessionState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl TurnResult {
    /// Whether the caller must collect approval decisions before the
    /// conversation can move forward.
    pub fn awaiting_approval(&self) -> bool {
        self.stop_reason == StopReason::PendingApproval
    }
}
