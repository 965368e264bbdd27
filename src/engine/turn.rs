//! The turn engine.
//!
//! One call to [`TurnEngine::run`] drives a complete turn:
//! 1. Intake: settle approval decisions, execute newly approved calls, and
//!    append the user contribution (tool outputs plus any message text).
//! 2. Run request interceptors, then invoke the model.
//! 3. Validate proposed calls and consult the approval policy for each one.
//! 4. Execute auto-approved calls sequentially, then run response
//!    interceptors over the settled reply.
//! 5. Stop on final text, on the first pending approval, or at the
//!    invocation limit; otherwise feed tool outputs back as the next user
//!    message and loop.
//!
//! Approved calls execute one at a time in proposal order, each seeing the
//! session writes of the calls before it. The engine holds `&mut` on the
//! conversation for the whole turn, so a conversation can never run two
//! turns at once.

use std::sync::Arc;

use futures::StreamExt;
use tracing::{debug, warn};
use ulid::Ulid;

use crate::api::TOOL_CALL_ID_PREFIX;
use crate::approval::{ApprovalContext, ApprovalPolicy, DefaultApprovalPolicy};
use crate::config::EngineConfig;
use crate::conversation::{Conversation, ToolCall, ToolCallStatus};
use crate::events::{EventKind, TurnEmitter, TurnEvent};
use crate::interceptor::{ChainOutcome, InterceptorChain, TurnContext};
use crate::llm::{ModelRequest, ModelResponse, SharedModelProvider, StreamFragment, Usage};
use crate::session::SessionState;
use crate::tools::{ToolContext, ToolDescriptor, ToolExecutor};

use super::error::EngineError;
use super::result::{StopReason, TurnResult};

// ============================================================================
// Input
// ============================================================================

/// What the caller hands the engine for one turn: a user message, approval
/// decisions, or both.
#[derive(Debug, Clone, Default)]
pub struct TurnInput {
    pub message: Option<String>,
    pub decisions: Vec<crate::approval::ApprovalDecision>,
}

impl TurnInput {
    /// A plain user message.
    #[must_use]
    pub fn message(text: impl Into<String>) -> Self {
        Self {
            message: Some(text.into()),
            decisions: Vec::new(),
        }
    }

    /// Approval decisions with no accompanying message.
    #[must_use]
    pub fn decisions(decisions: Vec<crate::approval::ApprovalDecision>) -> Self {
        Self {
            message: None,
            decisions,
        }
    }

    #[must_use]
    pub fn with_message(mut self, text: impl Into<String>) -> Self {
        self.message = Some(text.into());
        self
    }

    #[must_use]
    pub fn with_decisions(mut self, decisions: Vec<crate::approval::ApprovalDecision>) -> Self {
        self.decisions = decisions;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.message.is_none() && self.decisions.is_empty()
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Drives conversations through model invocations, approval gating, and
/// tool execution.
///
/// The engine is cheap to share: it holds no per-conversation state. All
/// conversation and session state lives in the arguments to [`run`](Self::run).
pub struct TurnEngine {
    provider: SharedModelProvider,
    executor: ToolExecutor,
    policy: Arc<dyn ApprovalPolicy>,
    interceptors: InterceptorChain,
    config: EngineConfig,
}

impl TurnEngine {
    /// Engine with the default policy, no interceptors, and default config.
    #[must_use]
    pub fn new(provider: SharedModelProvider, executor: ToolExecutor) -> Self {
        Self {
            provider,
            executor,
            policy: Arc::new(DefaultApprovalPolicy),
            interceptors: InterceptorChain::new(),
            config: EngineConfig::default(),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: Arc<dyn ApprovalPolicy>) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_interceptors(mut self, interceptors: InterceptorChain) -> Self {
        self.interceptors = interceptors;
        self
    }

    /// Apply engine configuration. Also pushes the configured interceptor
    /// error mode into the current chain, so call this after
    /// [`with_interceptors`](Self::with_interceptors).
    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.interceptors = self
            .interceptors
            .with_error_mode(config.interceptor_error_mode);
        self.config = config;
        self
    }

    /// Run one turn without event streaming.
    pub async fn run(
        &self,
        conversation: &mut Conversation,
        session: &mut SessionState,
        input: TurnInput,
    ) -> Result<TurnResult, EngineError> {
        self.run_with_emitter(conversation, session, input, &TurnEmitter::disabled())
            .await
    }

    /// Run one turn, streaming events through the emitter.
    ///
    /// Exactly one terminal event closes the stream: `Done` when the turn
    /// produced a result, `Error` when it vetoed or failed.
    pub async fn run_with_emitter(
        &self,
        conversation: &mut Conversation,
        session: &mut SessionState,
        input: TurnInput,
        emitter: &TurnEmitter,
    ) -> Result<TurnResult, EngineError> {
        let outcome = self.drive(conversation, session, input, emitter).await;

        match &outcome {
            Ok(result) if result.stop_reason == StopReason::Error => {
                emitter.emit_with(EventKind::Error, || TurnEvent::Error {
                    message: result.text.clone(),
                });
            }
            Ok(result) => {
                emitter.emit_with(EventKind::Done, || TurnEvent::Done {
                    stop_reason: result.stop_reason,
                    usage: result.usage,
                });
            }
            Err(err) => {
                emitter.emit_with(EventKind::Error, || TurnEvent::Error {
                    message: err.to_string(),
                });
            }
        }

        outcome
    }

    // ------------------------------------------------------------------------
    // Turn driver
    // ------------------------------------------------------------------------

    async fn drive(
        &self,
        conversation: &mut Conversation,
        session: &mut SessionState,
        input: TurnInput,
        emitter: &TurnEmitter,
    ) -> Result<TurnResult, EngineError> {
        if input.is_empty() {
            return Err(EngineError::EmptyInput);
        }

        emitter.emit_with(EventKind::MessageStart, || TurnEvent::MessageStart {
            conversation_id: conversation.id().to_string(),
        });

        let mut executed: Vec<ToolCall> = Vec::new();
        let mut total_usage: Option<Usage> = None;

        self.intake(conversation, session, input, emitter, &mut executed)
            .await?;

        let mut last_text = String::new();

        for turn_index in 0..self.config.max_turns {
            let ctx = TurnContext::new(conversation.id(), turn_index);

            let mut request = ModelRequest::new(conversation.messages().to_vec())
                .with_tools(self.executor.descriptors());
            if let Some(system) = &self.config.system_prompt {
                request = request.with_system(system.clone());
            }

            match self
                .interceptors
                .run_request(&mut request, session, &ctx)
                .await?
            {
                ChainOutcome::Continue => {}
                ChainOutcome::Veto {
                    interceptor,
                    message,
                } => {
                    debug!(
                        conversation_id = %conversation.id(),
                        interceptor = %interceptor,
                        "model request vetoed"
                    );
                    return Ok(self.error_result(message, executed, session, total_usage));
                }
            }

            debug!(
                conversation_id = %conversation.id(),
                turn = turn_index,
                messages = conversation.messages().len(),
                "invoking model"
            );
            let mut response = self.invoke_model(&request, emitter).await?;
            if let Some(usage) = response.usage {
                merge_usage(&mut total_usage, usage);
            }

            // Reject the whole proposal batch before anything executes, so
            // a half-known batch leaves no partial side effects behind.
            for proposal in &response.proposed_calls {
                if !self.executor.contains(&proposal.name) {
                    return Err(EngineError::UnknownTool(proposal.name.clone()));
                }
            }

            // Settle approval per proposal before touching the aggregate.
            let mut gated: Vec<bool> = Vec::with_capacity(response.proposed_calls.len());
            {
                let approval_ctx = ApprovalContext {
                    conversation_id: conversation.id(),
                    session,
                };
                for proposal in &response.proposed_calls {
                    let descriptor = self
                        .executor
                        .descriptor(&proposal.name)
                        .unwrap_or_else(|| ToolDescriptor::unknown(&proposal.name));
                    gated.push(self.policy.requires_approval(&descriptor, &approval_ctx));
                }
            }

            let calls: Vec<ToolCall> = response
                .proposed_calls
                .iter()
                .zip(&gated)
                .map(|(proposal, requires)| {
                    let id = proposal.id.clone().unwrap_or_else(new_tool_call_id);
                    ToolCall::new(id, &proposal.name, proposal.input.clone(), *requires)
                })
                .collect();

            conversation.append_assistant_message(response.text.clone(), calls.clone())?;

            // Walk the batch in proposal order: approved calls execute now,
            // gated calls surface approval requests. Approved siblings of a
            // gated call still run, so its output is not lost to the wait.
            let mut pending: Vec<ToolCall> = Vec::new();
            let mut feedback: Vec<String> = Vec::new();

            for call in &calls {
                if call.status() == ToolCallStatus::Pending {
                    emitter.emit_with(EventKind::ApprovalRequest, || {
                        TurnEvent::ApprovalRequest {
                            tool_call_id: call.id().to_string(),
                            name: call.name().to_string(),
                            input: call.input().clone(),
                        }
                    });
                    pending.push(call.clone());
                } else {
                    let updated = self
                        .execute_call(conversation, session, call, emitter)
                        .await?;
                    if let Some(line) = feedback_line(&updated) {
                        feedback.push(line);
                    }
                    executed.push(updated);
                }
            }

            // The reply is settled and its calls dispatched; response
            // interceptors see the final shape and may still veto the turn,
            // keeping the work already done.
            match self
                .interceptors
                .run_response(&mut response, session, &ctx)
                .await?
            {
                ChainOutcome::Continue => {}
                ChainOutcome::Veto {
                    interceptor,
                    message,
                } => {
                    debug!(
                        conversation_id = %conversation.id(),
                        interceptor = %interceptor,
                        "model response vetoed"
                    );
                    return Ok(self.error_result(message, executed, session, total_usage));
                }
            }
            last_text = response.text;

            if !pending.is_empty() {
                return Ok(TurnResult {
                    text: last_text,
                    executed_tool_calls: executed,
                    pending_tool_calls: pending,
                    stop_reason: StopReason::PendingApproval,
                    session: session.clone(),
                    usage: total_usage,
                });
            }

            if calls.is_empty() {
                return Ok(TurnResult {
                    text: last_text,
                    executed_tool_calls: executed,
                    pending_tool_calls: Vec::new(),
                    stop_reason: StopReason::Completed,
                    session: session.clone(),
                    usage: total_usage,
                });
            }

            conversation.append_user_message(feedback.join("\n\n"))?;
        }

        debug!(
            conversation_id = %conversation.id(),
            max_turns = self.config.max_turns,
            "invocation limit reached"
        );
        Ok(TurnResult {
            text: last_text,
            executed_tool_calls: executed,
            pending_tool_calls: Vec::new(),
            stop_reason: StopReason::TurnLimit,
            session: session.clone(),
            usage: total_usage,
        })
    }

    // ------------------------------------------------------------------------
    // Private Helpers
    // ------------------------------------------------------------------------

    /// Settle the turn input: apply decisions, execute newly approved calls,
    /// and append the combined user contribution.
    ///
    /// The decision batch must cover every outstanding approval. That is
    /// checked before anything is applied, so a short batch leaves the
    /// conversation untouched.
    ///
    /// The appended feedback reports the entire interrupted proposal batch in
    /// proposal order — rejections, the calls just executed, and siblings
    /// that already executed before the pause (their outputs never reached
    /// the history; the pause preempted that append).
    async fn intake(
        &self,
        conversation: &mut Conversation,
        session: &mut SessionState,
        input: TurnInput,
        emitter: &TurnEmitter,
        executed: &mut Vec<ToolCall>,
    ) -> Result<(), EngineError> {
        let TurnInput { message, decisions } = input;

        let undecided = conversation
            .pending_approvals()
            .iter()
            .filter(|call| !decisions.iter().any(|d| d.tool_call_id == call.id()))
            .count();
        if undecided > 0 {
            return Err(crate::conversation::ConversationError::Blocked {
                id: conversation.id().to_string(),
                pending: undecided,
            }
            .into());
        }

        let mut lines: Vec<String> = Vec::new();

        if !decisions.is_empty() {
            // Call ids of the proposal that paused the turn, in proposal
            // order.
            let batch: Vec<String> = conversation
                .messages()
                .iter()
                .rev()
                .find(|entry| !entry.tool_calls.is_empty())
                .map(|entry| entry.tool_calls.clone())
                .unwrap_or_default();

            let approved = conversation.resolve(&decisions)?;
            for call in approved {
                let updated = self
                    .execute_call(conversation, session, &call, emitter)
                    .await?;
                executed.push(updated);
            }

            for id in &batch {
                if let Some(line) = conversation.tool_call(id).and_then(feedback_line) {
                    lines.push(line);
                }
            }
        }

        if let Some(text) = message {
            lines.push(text);
        }

        conversation.append_user_message(lines.join("\n\n"))?;
        Ok(())
    }

    /// Execute one approved call: events, session-threaded execution, and
    /// bookkeeping. Returns the updated call.
    ///
    /// A failing tool is not a failing turn: the error text is recorded as
    /// the call's output and fed back for the model to react to.
    async fn execute_call(
        &self,
        conversation: &mut Conversation,
        session: &mut SessionState,
        call: &ToolCall,
        emitter: &TurnEmitter,
    ) -> Result<ToolCall, EngineError> {
        emitter.emit_with(EventKind::ToolCallStarted, || TurnEvent::ToolCallStarted {
            tool_call_id: call.id().to_string(),
            name: call.name().to_string(),
        });

        let ctx = ToolContext::new(conversation.id(), call.id());
        match self.executor.execute(call, session, &ctx).await {
            Ok(output) => {
                let updated = conversation.record_success(call.id(), output.clone())?;
                emitter.emit_with(EventKind::ToolCallCompleted, || {
                    TurnEvent::ToolCallCompleted {
                        tool_call_id: call.id().to_string(),
                        name: call.name().to_string(),
                        output,
                    }
                });
                Ok(updated)
            }
            Err(err) => {
                warn!(
                    conversation_id = %conversation.id(),
                    call_id = call.id(),
                    tool = call.name(),
                    error = %err,
                    "tool execution failed"
                );
                let error_text = err.to_string();
                let updated = conversation.record_failure(call.id(), error_text.clone())?;
                emitter.emit_with(EventKind::ToolCallFailed, || TurnEvent::ToolCallFailed {
                    tool_call_id: call.id().to_string(),
                    name: call.name().to_string(),
                    error: error_text,
                });
                Ok(updated)
            }
        }
    }

    /// Invoke the model, streaming text deltas only when someone is
    /// subscribed to them.
    async fn invoke_model(
        &self,
        request: &ModelRequest,
        emitter: &TurnEmitter,
    ) -> Result<ModelResponse, EngineError> {
        if !emitter.wants(EventKind::TextDelta) {
            return Ok(self.provider.invoke(request).await?);
        }

        let mut stream = self.provider.invoke_streamed(request).await?;
        let mut text = String::new();
        let mut proposed_calls = Vec::new();
        let mut usage = None;

        while let Some(fragment) = stream.next().await {
            match fragment? {
                StreamFragment::TextDelta(delta) => {
                    emitter.emit_with(EventKind::TextDelta, || TurnEvent::TextDelta {
                        text: delta.clone(),
                    });
                    text.push_str(&delta);
                }
                StreamFragment::ProposedCalls(calls) => proposed_calls.extend(calls),
                StreamFragment::Done { usage: u } => usage = u,
            }
        }

        Ok(ModelResponse {
            text,
            proposed_calls,
            usage,
        })
    }

    fn error_result(
        &self,
        message: String,
        executed: Vec<ToolCall>,
        session: &SessionState,
        usage: Option<Usage>,
    ) -> TurnResult {
        TurnResult {
            text: message,
            executed_tool_calls: executed,
            pending_tool_calls: Vec::new(),
            stop_reason: StopReason::Error,
            session: session.clone(),
            usage,
        }
    }
}

fn new_tool_call_id() -> String {
    format!("{TOOL_CALL_ID_PREFIX}{}", Ulid::new())
}

/// The feedback block a settled call contributes to the next user message.
///
/// `None` for calls with nothing to report: still pending, or approved but
/// not yet executed.
fn feedback_line(call: &ToolCall) -> Option<String> {
    match call.status() {
        ToolCallStatus::Executed => Some(format!(
            "[tool {} id {}]\n{}",
            call.name(),
            call.id(),
            call.output().unwrap_or_default()
        )),
        // Approved with output recorded means the execution failed.
        ToolCallStatus::Approved => call
            .output()
            .map(|error| format!("[tool {} id {}] failed: {error}", call.name(), call.id())),
        ToolCallStatus::Rejected => Some(match call.rejection_reason() {
            Some(reason) => {
                format!("[tool {} id {}] rejected: {reason}", call.name(), call.id())
            }
            None => format!("[tool {} id {}] rejected", call.name(), call.id()),
        }),
        ToolCallStatus::Pending => None,
    }
}

fn merge_usage(total: &mut Option<Usage>, new: Usage) {
    match total {
        Some(total) => total.add(&new),
        None => *total = Some(new),
    }
}
