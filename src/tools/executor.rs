//! Tool executor for running approved tool calls.

use std::collections::HashMap;

use tracing::debug;

use super::error::ToolError;
use super::tool::{SharedTool, ToolContext, ToolDescriptor};
use crate::conversation::ToolCall;
use crate::session::SessionState;

/// Registry and dispatcher for tools.
///
/// Calls execute one at a time against the shared session, in the order the
/// model proposed them.
#[derive(Default)]
pub struct ToolExecutor {
    /// Tool implementations by name.
    tools: HashMap<String, SharedTool>,
}

impl ToolExecutor {
    /// Create an empty executor.
    ///
    /// Use `register()` or `register_all()` to add tools after construction.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a single tool.
    #[must_use]
    pub fn register(mut self, tool: SharedTool) -> Self {
        self.tools.insert(tool.name().to_string(), tool);
        self
    }

    /// Register multiple tools.
    #[must_use]
    pub fn register_all(mut self, tools: Vec<SharedTool>) -> Self {
        for tool in tools {
            self.tools.insert(tool.name().to_string(), tool);
        }
        self
    }

    /// Whether a tool with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Check if any tools are configured.
    pub fn has_tools(&self) -> bool {
        !self.tools.is_empty()
    }

    /// Descriptor for one tool, if registered.
    pub fn descriptor(&self, name: &str) -> Option<ToolDescriptor> {
        self.tools.get(name).map(|tool| tool.descriptor())
    }

    /// Descriptors for every registered tool, sorted by name so requests
    /// built from them are deterministic.
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        let mut descriptors: Vec<ToolDescriptor> =
            self.tools.values().map(|tool| tool.descriptor()).collect();
        descriptors.sort_by(|a, b| a.name.cmp(&b.name));
        descriptors
    }

    /// Execute a tool call and return its output.
    ///
    /// The caller is responsible for having settled approval first; the
    /// executor runs whatever it is handed.
    pub async fn execute(
        &self,
        call: &ToolCall,
        session: &mut SessionState,
        ctx: &ToolContext,
    ) -> Result<String, ToolError> {
        let tool = self
            .tools
            .get(call.name())
            .ok_or_else(|| ToolError::UnknownTool(call.name().to_string()))?;

        debug!(
            tool = %call.name(),
            tool_call_id = %call.id(),
            "executing tool"
        );
        tool.execute(call.input(), session, ctx).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use serde_json::{Value, json};

    use super::*;
    use crate::conversation::ToolInput;
    use crate::tools::Tool;

    // ------------------------------------------------------------------------
    // Test Helpers
    // ------------------------------------------------------------------------

    struct Echo;

    #[async_trait]
    impl Tool for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        fn descriptor(&self) -> ToolDescriptor {
            ToolDescriptor::new("echo", "Echo the text argument back").with_read_only(true)
        }

        async fn execute(
            &self,
            input: &ToolInput,
            _session: &mut SessionState,
            _ctx: &ToolContext,
        ) -> Result<String, ToolError> {
            let text = input
                .get("text")
                .and_then(Value::as_str)
                .ok_or_else(|| ToolError::invalid_arguments("echo", "missing 'text'"))?;
            Ok(text.to_string())
        }
    }

    struct Counter;

    #[async_trait]
    impl Tool for Counter {
        fn name(&self) -> &str {
            "counter"
        }

        fn descriptor(&self) -> ToolDescriptor {
            ToolDescriptor::new("counter", "Increment the session counter")
        }

        async fn execute(
            &self,
            _input: &ToolInput,
            session: &mut SessionState,
            _ctx: &ToolContext,
        ) -> Result<String, ToolError> {
            let count = session
                .get("count")
                .and_then(Value::as_u64)
                .unwrap_or(0)
                + 1;
            session.set("count", json!(count));
            Ok(count.to_string())
        }
    }

    fn input(pairs: &[(&str, Value)]) -> ToolInput {
        let mut map = ToolInput::new();
        for (key, value) in pairs {
            map.insert((*key).to_string(), value.clone());
        }
        map
    }

    fn call(name: &str, input: ToolInput) -> ToolCall {
        ToolCall::new("call_1", name, input, false)
    }

    fn ctx() -> ToolContext {
        ToolContext::new("conv_1", "call_1")
    }

    // ------------------------------------------------------------------------
    // Tests
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn execute_dispatches_by_name() {
        let executor = ToolExecutor::new().register(Arc::new(Echo));
        let mut session = SessionState::new();

        let output = executor
            .execute(
                &call("echo", input(&[("text", json!("hello"))])),
                &mut session,
                &ctx(),
            )
            .await
            .unwrap();

        assert_eq!(output, "hello");
    }

    #[tokio::test]
    async fn execute_returns_unknown_for_unregistered_tool() {
        let executor = ToolExecutor::new();
        let mut session = SessionState::new();

        let result = executor
            .execute(&call("nonexistent", ToolInput::new()), &mut session, &ctx())
            .await;

        assert!(matches!(result, Err(ToolError::UnknownTool(name)) if name == "nonexistent"));
    }

    #[tokio::test]
    async fn execute_surfaces_invalid_arguments() {
        let executor = ToolExecutor::new().register(Arc::new(Echo));
        let mut session = SessionState::new();

        let result = executor
            .execute(&call("echo", ToolInput::new()), &mut session, &ctx())
            .await;

        assert!(matches!(
            result,
            Err(ToolError::InvalidArguments { tool, .. }) if tool == "echo"
        ));
    }

    #[tokio::test]
    async fn sequential_calls_observe_prior_session_writes() {
        let executor = ToolExecutor::new().register(Arc::new(Counter));
        let mut session = SessionState::new();

        for expected in ["1", "2", "3"] {
            let output = executor
                .execute(&call("counter", ToolInput::new()), &mut session, &ctx())
                .await
                .unwrap();
            assert_eq!(output, expected);
        }

        assert_eq!(session.get("count"), Some(&json!(3)));
    }

    #[test]
    fn descriptors_are_sorted_by_name() {
        let executor = ToolExecutor::new().register_all(vec![Arc::new(Counter), Arc::new(Echo)]);

        let names: Vec<String> = executor
            .descriptors()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["counter", "echo"]);
    }

    #[test]
    fn has_tools_reflects_registration() {
        assert!(!ToolExecutor::new().has_tools());
        assert!(ToolExecutor::new().register(Arc::new(Echo)).has_tools());
    }
}
