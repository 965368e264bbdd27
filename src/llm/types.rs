//! Canonical model request/response types.
//!
//! These are vendor-free: a concrete provider translates them to and from
//! its own wire format. The engine only ever sees this shape.

use serde::{Deserialize, Serialize};

use crate::conversation::{Message, ToolInput};
use crate::tools::ToolDescriptor;

// ============================================================================
// Request
// ============================================================================

/// One model invocation: the accumulated history, optional system
/// instructions, and the descriptors of every tool the model may propose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDescriptor>,
}

impl ModelRequest {
    #[must_use]
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            system: None,
            messages,
            tools: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    #[must_use]
    pub fn with_tools(mut self, tools: Vec<ToolDescriptor>) -> Self {
        self.tools = tools;
        self
    }
}

// ============================================================================
// Response
// ============================================================================

/// A tool invocation the model asked for. The id is optional on the way in;
/// the engine assigns one when the provider did not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposedToolCall {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub input: ToolInput,
}

impl ProposedToolCall {
    #[must_use]
    pub fn new(name: impl Into<String>, input: ToolInput) -> Self {
        Self {
            id: None,
            name: name.into(),
            input,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Token accounting reported by a provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl Usage {
    /// Accumulate another report into this one.
    pub fn add(&mut self, other: &Usage) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.total_tokens += other.total_tokens;
    }
}

/// Canonical model output: text plus zero or more proposed tool calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelResponse {
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub proposed_calls: Vec<ProposedToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl ModelResponse {
    /// A text-only response.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            proposed_calls: Vec::new(),
            usage: None,
        }
    }

    #[must_use]
    pub fn with_calls(mut self, calls: Vec<ProposedToolCall>) -> Self {
        self.proposed_calls = calls;
        self
    }

    #[must_use]
    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = Some(usage);
        self
    }
}

// ============================================================================
// Streaming
// ============================================================================

/// Incremental pieces of a model response, in arrival order. `Done` is
/// always the final fragment of a well-formed stream.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamFragment {
    TextDelta(String),
    ProposedCalls(Vec<ProposedToolCall>),
    Done { usage: Option<Usage> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_accumulates() {
        let mut total = Usage::default();
        total.add(&Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        });
        total.add(&Usage {
            prompt_tokens: 4,
            completion_tokens: 2,
            total_tokens: 6,
        });
        assert_eq!(total.prompt_tokens, 14);
        assert_eq!(total.completion_tokens, 7);
        assert_eq!(total.total_tokens, 21);
    }

    #[test]
    fn response_builder_defaults_are_empty() {
        let response = ModelResponse::text("hi");
        assert!(response.proposed_calls.is_empty());
        assert!(response.usage.is_none());

        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("proposed_calls"));
        assert!(!json.contains("usage"));
    }
}
