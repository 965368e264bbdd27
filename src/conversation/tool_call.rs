//! Tool call entity and its approval/execution state machine.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::ConversationError;

/// Ordered argument map for a tool invocation, argument name → JSON value.
pub type ToolInput = Map<String, Value>;

// ============================================================================
// Types
// ============================================================================

/// Lifecycle of a proposed tool invocation.
///
/// ```text
///   PENDING ──approve──▶ APPROVED ──successful run──▶ EXECUTED
///      │
///      └───reject──▶ REJECTED
/// ```
///
/// Calls that never require approval are created directly in `Approved` and
/// never visibly occupy `Pending`. A failed run records its error as the
/// call's output but does not reach `Executed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCallStatus {
    Pending,
    Approved,
    Rejected,
    Executed,
}

impl ToolCallStatus {
    /// Whether the state machine permits moving from `self` to `to`.
    #[must_use]
    pub fn can_transition_to(self, to: ToolCallStatus) -> bool {
        matches!(
            (self, to),
            (ToolCallStatus::Pending, ToolCallStatus::Approved)
                | (ToolCallStatus::Pending, ToolCallStatus::Rejected)
                | (ToolCallStatus::Approved, ToolCallStatus::Executed)
        )
    }

    /// Terminal states accept no further transitions.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, ToolCallStatus::Rejected | ToolCallStatus::Executed)
    }
}

impl std::fmt::Display for ToolCallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ToolCallStatus::Pending => "pending",
            ToolCallStatus::Approved => "approved",
            ToolCallStatus::Rejected => "rejected",
            ToolCallStatus::Executed => "executed",
        };
        write!(f, "{s}")
    }
}

/// A single proposed tool invocation.
///
/// Identity is the `id` (stable across the approval round-trip); two calls
/// are never merged by value. `requires_approval` is decided once, at
/// creation, and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    id: String,
    name: String,
    input: ToolInput,
    status: ToolCallStatus,
    requires_approval: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rejection_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    output: Option<String>,
}

// ============================================================================
// Implementation
// ============================================================================

impl ToolCall {
    /// Create a call. When `requires_approval` is false the call starts out
    /// logically approved and is eligible for immediate execution.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        input: ToolInput,
        requires_approval: bool,
    ) -> Self {
        let status = if requires_approval {
            ToolCallStatus::Pending
        } else {
            ToolCallStatus::Approved
        };
        Self {
            id: id.into(),
            name: name.into(),
            input,
            status,
            requires_approval,
            rejection_reason: None,
            output: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn input(&self) -> &ToolInput {
        &self.input
    }

    pub fn status(&self) -> ToolCallStatus {
        self.status
    }

    pub fn requires_approval(&self) -> bool {
        self.requires_approval
    }

    pub fn rejection_reason(&self) -> Option<&str> {
        self.rejection_reason.as_deref()
    }

    /// Tool output on success, or the recorded failure text.
    pub fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }

    // ------------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------------

    /// `Pending` → `Approved`.
    pub fn approve(&mut self) -> Result<(), ConversationError> {
        self.transition(ToolCallStatus::Approved)
    }

    /// `Pending` → `Rejected`, recording the reason.
    pub fn reject(&mut self, reason: Option<String>) -> Result<(), ConversationError> {
        self.transition(ToolCallStatus::Rejected)?;
        self.rejection_reason = reason;
        Ok(())
    }

    /// `Approved` → `Executed`, recording the tool's output.
    pub fn mark_executed(&mut self, output: impl Into<String>) -> Result<(), ConversationError> {
        self.transition(ToolCallStatus::Executed)?;
        self.output = Some(output.into());
        Ok(())
    }

    /// Record a failed execution. The error text becomes the call's output;
    /// the status stays `Approved` — failure is not `Executed`.
    pub fn mark_failed(&mut self, error: impl Into<String>) -> Result<(), ConversationError> {
        if self.status != ToolCallStatus::Approved {
            return Err(ConversationError::InvalidTransition {
                id: self.id.clone(),
                from: self.status,
                to: ToolCallStatus::Executed,
            });
        }
        self.output = Some(error.into());
        Ok(())
    }

    fn transition(&mut self, to: ToolCallStatus) -> Result<(), ConversationError> {
        if !self.status.can_transition_to(to) {
            return Err(ConversationError::InvalidTransition {
                id: self.id.clone(),
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input() -> ToolInput {
        let mut map = ToolInput::new();
        map.insert("path".to_string(), json!("/tmp/a"));
        map
    }

    #[test]
    fn gated_call_starts_pending() {
        let call = ToolCall::new("call_1", "delete_pod", input(), true);
        assert_eq!(call.status(), ToolCallStatus::Pending);
        assert!(call.requires_approval());
    }

    #[test]
    fn ungated_call_starts_approved() {
        let call = ToolCall::new("call_1", "read_file", input(), false);
        assert_eq!(call.status(), ToolCallStatus::Approved);
        assert!(!call.requires_approval());
    }

    #[test]
    fn approve_then_execute() {
        let mut call = ToolCall::new("call_1", "delete_pod", input(), true);
        call.approve().unwrap();
        assert_eq!(call.status(), ToolCallStatus::Approved);

        call.mark_executed("pod deleted").unwrap();
        assert_eq!(call.status(), ToolCallStatus::Executed);
        assert_eq!(call.output(), Some("pod deleted"));
        assert!(call.status().is_terminal());
    }

    #[test]
    fn reject_records_reason_and_is_terminal() {
        let mut call = ToolCall::new("call_1", "delete_pod", input(), true);
        call.reject(Some("too risky".to_string())).unwrap();

        assert_eq!(call.status(), ToolCallStatus::Rejected);
        assert_eq!(call.rejection_reason(), Some("too risky"));
        assert!(call.status().is_terminal());

        let err = call.approve().unwrap_err();
        assert!(matches!(err, ConversationError::InvalidTransition { .. }));
    }

    #[test]
    fn executed_call_cannot_move_again() {
        let mut call = ToolCall::new("call_1", "read_file", input(), false);
        call.mark_executed("contents").unwrap();

        assert!(call.reject(None).is_err());
        assert!(call.mark_executed("again").is_err());
    }

    #[test]
    fn pending_call_cannot_execute_without_approval() {
        let mut call = ToolCall::new("call_1", "delete_pod", input(), true);
        let err = call.mark_executed("nope").unwrap_err();
        assert!(matches!(
            err,
            ConversationError::InvalidTransition {
                from: ToolCallStatus::Pending,
                ..
            }
        ));
    }

    #[test]
    fn failure_keeps_approved_status_with_error_output() {
        let mut call = ToolCall::new("call_1", "read_file", input(), false);
        call.mark_failed("file not found").unwrap();

        assert_eq!(call.status(), ToolCallStatus::Approved);
        assert_eq!(call.output(), Some("file not found"));
    }

    #[test]
    fn status_serializes_snake_case() {
        let call = ToolCall::new("call_1", "read_file", input(), false);
        let json = serde_json::to_value(&call).unwrap();
        assert_eq!(json["status"], json!("approved"));
        assert_eq!(json["requires_approval"], json!(false));
    }
}
