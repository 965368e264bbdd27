//! Immutable conversation messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who authored a message. Tool outputs re-enter the history as `User`
/// contributions, so these two roles are the whole model-facing alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// One entry in a conversation's append-only history. Immutable once
/// appended; `tool_calls` holds the ids of calls attached to this message,
/// in proposal order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// A plain user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            tool_calls: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    /// An assistant message, optionally carrying proposed tool call ids.
    #[must_use]
    pub fn assistant(content: impl Into<String>, tool_calls: Vec<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            tool_calls,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_display_matches_wire_name() {
        assert_eq!(Role::User.to_string(), "user");
        assert_eq!(Role::Assistant.to_string(), "assistant");
    }

    #[test]
    fn empty_tool_calls_are_omitted_from_json() {
        let message = Message::user("hello");
        let json = serde_json::to_string(&message).unwrap();
        assert!(!json.contains("tool_calls"));

        let message = Message::assistant("run it", vec!["call_1".to_string()]);
        let json = serde_json::to_string(&message).unwrap();
        assert!(json.contains("tool_calls"));
    }
}
