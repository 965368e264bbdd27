//! Approval decisions submitted by a caller.

use serde::{Deserialize, Serialize};

/// What the human decided for one pending tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum DecisionAction {
    Approve,
    Reject {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
}

impl std::fmt::Display for DecisionAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecisionAction::Approve => write!(f, "approve"),
            DecisionAction::Reject { .. } => write!(f, "reject"),
        }
    }
}

/// A decision bound to the tool call it resolves.
///
/// Wire shape: `{"tool_call_id":"call_1","action":"approve"}` or
/// `{"tool_call_id":"call_1","action":"reject","reason":"too risky"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalDecision {
    pub tool_call_id: String,
    #[serde(flatten)]
    pub action: DecisionAction,
}

impl ApprovalDecision {
    #[must_use]
    pub fn approve(tool_call_id: impl Into<String>) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            action: DecisionAction::Approve,
        }
    }

    #[must_use]
    pub fn reject(tool_call_id: impl Into<String>, reason: Option<String>) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            action: DecisionAction::Reject { reason },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approve_wire_shape() {
        let decision = ApprovalDecision::approve("call_1");
        let json = serde_json::to_string(&decision).unwrap();
        assert_eq!(json, r#"{"tool_call_id":"call_1","action":"approve"}"#);
    }

    #[test]
    fn reject_wire_shape_with_reason() {
        let decision = ApprovalDecision::reject("call_1", Some("too risky".to_string()));
        let json = serde_json::to_string(&decision).unwrap();
        assert_eq!(
            json,
            r#"{"tool_call_id":"call_1","action":"reject","reason":"too risky"}"#
        );
    }

    #[test]
    fn reject_without_reason_omits_field() {
        let decision = ApprovalDecision::reject("call_1", None);
        let json = serde_json::to_string(&decision).unwrap();
        assert!(!json.contains("reason"));

        let back: ApprovalDecision = serde_json::from_str(&json).unwrap();
        assert_eq!(back, decision);
    }
}
