//! Shared API types used by engine hosts and their clients.
//!
//! These types define the contract between a process embedding the engine
//! and whatever talks to it. Changes here affect both sides, preventing
//! silent drift.

use serde::{Deserialize, Serialize};

use crate::approval::ApprovalDecision;
use crate::conversation::ToolCall;
use crate::engine::{StopReason, TurnResult};
use crate::llm::Usage;
use crate::session::SessionState;

// ============================================================================
// ID Prefixes
// ============================================================================

/// ID prefix for conversations.
pub const CONVERSATION_ID_PREFIX: &str = "conv_";

/// ID prefix for engine-assigned tool call ids.
pub const TOOL_CALL_ID_PREFIX: &str = "call_";

// ============================================================================
// Event Type Names
// ============================================================================

/// Wire names of streamed turn events, as they appear in the `type` field.
pub mod event_types {
    pub const MESSAGE_START: &str = "message_start";
    pub const TEXT_DELTA: &str = "text_delta";
    pub const TOOL_CALL_STARTED: &str = "tool_call_started";
    pub const TOOL_CALL_COMPLETED: &str = "tool_call_completed";
    pub const TOOL_CALL_FAILED: &str = "tool_call_failed";
    pub const APPROVAL_REQUEST: &str = "approval_request";
    pub const DONE: &str = "done";
    pub const ERROR: &str = "error";
}

// ============================================================================
// Turn Types
// ============================================================================

/// Request to advance a conversation by one turn.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TurnRequest {
    /// User message text, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Decisions for pending tool calls, if any.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decisions: Vec<ApprovalDecision>,
    /// Initial session entries; honored only when the conversation is new.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionState>,
}

impl TurnRequest {
    pub fn into_parts(self) -> (Option<String>, Vec<ApprovalDecision>, Option<SessionState>) {
        (self.message, self.decisions, self.session)
    }
}

/// Response for a finished turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnResponse {
    pub conversation_id: String,
    pub text: String,
    pub stop_reason: StopReason,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub executed_tool_calls: Vec<ToolCall>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pending_tool_calls: Vec<ToolCall>,
    pub session: SessionState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl TurnResponse {
    pub fn from_result(conversation_id: impl Into<String>, result: TurnResult) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            text: result.text,
            stop_reason: result.stop_reason,
            executed_tool_calls: result.executed_tool_calls,
            pending_tool_calls: result.pending_tool_calls,
            session: result.session,
            usage: result.usage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[test]
    fn event_type_names_match_wire_tags() {
        let cases = [
            (EventKind::MessageStart, event_types::MESSAGE_START),
            (EventKind::TextDelta, event_types::TEXT_DELTA),
            (EventKind::ToolCallStarted, event_types::TOOL_CALL_STARTED),
            (EventKind::ToolCallCompleted, event_types::TOOL_CALL_COMPLETED),
            (EventKind::ToolCallFailed, event_types::TOOL_CALL_FAILED),
            (EventKind::ApprovalRequest, event_types::APPROVAL_REQUEST),
            (EventKind::Done, event_types::DONE),
            (EventKind::Error, event_types::ERROR),
        ];
        for (kind, name) in cases {
            assert_eq!(serde_json::to_value(kind).unwrap(), name);
        }
    }

    #[test]
    fn turn_request_empty_fields_stay_off_the_wire() {
        let request = TurnRequest {
            message: Some("hi".to_string()),
            decisions: Vec::new(),
            session: None,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"message":"hi"}"#);

        let parsed: TurnRequest = serde_json::from_str(r#"{"message":"hi"}"#).unwrap();
        assert_eq!(parsed.message.as_deref(), Some("hi"));
        assert!(parsed.decisions.is_empty());
        assert!(parsed.session.is_none());
    }

    #[test]
    fn turn_response_carries_result_fields() {
        let result = TurnResult {
            text: "done".to_string(),
            executed_tool_calls: Vec::new(),
            pending_tool_calls: Vec::new(),
            stop_reason: StopReason::Completed,
            session: SessionState::new(),
            usage: None,
        };
        let response = TurnResponse::from_result("conv_1", result);
        assert_eq!(response.conversation_id, "conv_1");
        assert_eq!(response.stop_reason, StopReason::Completed);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["stop_reason"], "completed");
        assert!(json.get("executed_tool_calls").is_none());
    }
}
