//! Common test utilities: a scripted model provider and a small tool chest.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};

use turngate::conversation::ToolInput;
use turngate::llm::{
    ModelError, ModelProvider, ModelRequest, ModelResponse, ProposedToolCall, Usage,
};
use turngate::session::SessionState;
use turngate::tools::{Tool, ToolContext, ToolDescriptor, ToolError, ToolExecutor};

// ============================================================================
// Scripted Provider
// ============================================================================

/// A model provider that plays back a fixed script of responses.
///
/// Each invocation pops the next response; invoking past the end of the
/// script is a provider error, which doubles as a way to test mid-turn
/// provider failures.
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<ModelResponse>>,
    invocations: AtomicUsize,
    last_request: Mutex<Option<ModelRequest>>,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<ModelResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            invocations: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// How many times the engine invoked the model.
    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }

    /// The most recent request the engine sent, if any.
    pub fn last_request(&self) -> Option<ModelRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn invoke(&self, request: &ModelRequest) -> Result<ModelResponse, ModelError> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ModelError::request("scripted responses exhausted"))
    }
}

// ============================================================================
// Tools
// ============================================================================

/// Read-only tool echoing its `text` argument.
pub struct EchoTool;

#[async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }

    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new("echo", "Echo the given text back").with_read_only(true)
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
        Ok(format!("echo: {text}"))
    }
}

/// Mutating but auto-approved tool: increments the session `tally` counter
/// and reports the new value.
pub struct TallyTool;

#[async_trait]
impl Tool for TallyTool {
    fn name(&self) -> &str {
        "tally"
    }

    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new("tally", "Increment the session tally")
    }

    async fn execute(
        &self,
        _input: &ToolInput,
        session: &mut SessionState,
        _ctx: &ToolContext,
    ) -> Result<String, ToolError> {
        let count = session.get("tally").and_then(Value::as_u64).unwrap_or(0) + 1;
        session.set("tally", json!(count));
        Ok(count.to_string())
    }
}

/// Auto-approved tool that always fails.
pub struct BrokenTool;

#[async_trait]
impl Tool for BrokenTool {
    fn name(&self) -> &str {
        "broken"
    }

    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new("broken", "Always fails")
    }

    async fn execute(
        &self,
        _input: &ToolInput,
        _session: &mut SessionState,
        _ctx: &ToolContext,
    ) -> Result<String, ToolError> {
        Err(ToolError::execution_failed("broken", "out of disk"))
    }
}

/// Approval-gated tool: deploys its `target` argument.
pub struct DeployTool;

#[async_trait]
impl Tool for DeployTool {
    fn name(&self) -> &str {
        "deploy"
    }

    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new("deploy", "Deploy a service").with_requires_approval(true)
    }

    async fn execute(
        &self,
        input: &ToolInput,
        _session: &mut SessionState,
        _ctx: &ToolContext,
    ) -> Result<String, ToolError> {
        let target = input
            .get("target")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::invalid_arguments("deploy", "missing 'target'"))?;
        Ok(format!("deployed {target}"))
    }
}

// ============================================================================
// Builders
// ============================================================================

/// An executor with every fixture tool registered.
pub fn tool_chest() -> ToolExecutor {
    ToolExecutor::new()
        .register(Arc::new(EchoTool))
        .register(Arc::new(TallyTool))
        .register(Arc::new(BrokenTool))
        .register(Arc::new(DeployTool))
}

/// Build a tool input map from key-value pairs.
pub fn input_of(pairs: &[(&str, Value)]) -> ToolInput {
    let mut input = ToolInput::new();
    for (key, value) in pairs {
        input.insert((*key).to_string(), value.clone());
    }
    input
}

/// A proposed call with an explicit id.
pub fn proposal(name: &str, id: &str, input: ToolInput) -> ProposedToolCall {
    ProposedToolCall::new(name, input).with_id(id)
}

pub fn usage(prompt: u32, completion: u32) -> Usage {
    Usage {
        prompt_tokens: prompt,
        completion_tokens: completion,
        total_tokens: prompt + completion,
    }
}
