//! Tool trait for extensible tool execution.
//!
//! Tools are self-contained structs that hold their own dependencies and
//! know how to execute themselves, so new capabilities never require
//! touching the executor.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::ToolError;
use crate::conversation::ToolInput;
use crate::session::SessionState;

// ============================================================================
// Descriptor
// ============================================================================

/// Static metadata about a tool: what the model sees, and what the approval
/// policy reasons over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// JSON Schema for the tool input, if the tool declares one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<Value>,
    /// Read-only tools never mutate session state or the outside world.
    #[serde(default)]
    pub read_only: bool,
    /// Whether the tool asks for human approval by default.
    #[serde(default)]
    pub requires_approval: bool,
}

impl ToolDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: None,
            read_only: false,
            requires_approval: false,
        }
    }

    /// Descriptor for a tool the registry knows nothing about.
    ///
    /// Conservative on purpose: treated as mutating and approval-gated, so
    /// policies fail safe when the model proposes a name we cannot vouch for.
    #[must_use]
    pub fn unknown(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            input_schema: None,
            read_only: false,
            requires_approval: true,
        }
    }

    #[must_use]
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    #[must_use]
    pub fn with_requires_approval(mut self, requires_approval: bool) -> Self {
        self.requires_approval = requires_approval;
        self
    }

    #[must_use]
    pub fn with_input_schema(mut self, schema: Value) -> Self {
        self.input_schema = Some(schema);
        self
    }
}

// ============================================================================
// Contract
// ============================================================================

/// Ambient information about the call being executed.
#[derive(Debug, Clone)]
pub struct ToolContext {
    pub conversation_id: String,
    pub tool_call_id: String,
}

impl ToolContext {
    #[must_use]
    pub fn new(conversation_id: impl Into<String>, tool_call_id: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            tool_call_id: tool_call_id.into(),
        }
    }
}

/// A tool the executor can run.
///
/// Tools receive the session mutably: execution is sequential within a turn,
/// so each tool observes the writes of every tool that ran before it.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool.
    fn name(&self) -> &str;

    /// Metadata advertised to the model and consulted by approval policies.
    fn descriptor(&self) -> ToolDescriptor;

    /// Execute the tool, returning output for model consumption.
    async fn execute(
        &self,
        input: &ToolInput,
        session: &mut SessionState,
        ctx: &ToolContext,
    ) -> Result<String, ToolError>;
}

/// Type alias for a shared tool reference.
pub type SharedTool = Arc<dyn Tool>;
