//! Interceptor contracts.
//!
//! Interceptors are application-supplied hooks that observe and may mutate
//! traffic between the engine and the model. They return `anyhow::Result`
//! so implementations can bubble up whatever error type they work with.

use std::sync::Arc;

use async_trait::async_trait;

use crate::llm::{ModelRequest, ModelResponse};
use crate::session::SessionState;

/// Where in the turn an interceptor is running.
#[derive(Debug, Clone)]
pub struct TurnContext {
    pub conversation_id: String,
    /// Zero-based index of the model invocation within this turn.
    pub turn_index: u32,
}

impl TurnContext {
    #[must_use]
    pub fn new(conversation_id: impl Into<String>, turn_index: u32) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            turn_index,
        }
    }
}

/// What an interceptor decided about the value it inspected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterceptorFlow {
    /// Proceed with the (possibly mutated) value.
    Continue,
    /// Halt the turn. The message is surfaced to the caller as the result
    /// text in place of model output.
    Veto { message: String },
}

impl InterceptorFlow {
    pub fn veto(message: impl Into<String>) -> Self {
        Self::Veto {
            message: message.into(),
        }
    }
}

/// Runs before each model invocation, against the outgoing request.
#[async_trait]
pub trait RequestInterceptor: Send + Sync {
    /// A short identifier used in logs and failure reports.
    fn name(&self) -> &str;

    async fn intercept(
        &self,
        request: &mut ModelRequest,
        session: &mut SessionState,
        ctx: &TurnContext,
    ) -> anyhow::Result<InterceptorFlow>;
}

/// Runs after each model invocation, against the incoming response.
///
/// By the time these hooks run the iteration's tool calls have already been
/// dispatched, so the session reflects their writes and a veto keeps the
/// work already done.
#[async_trait]
pub trait ResponseInterceptor: Send + Sync {
    /// A short identifier used in logs and failure reports.
    fn name(&self) -> &str;

    async fn intercept(
        &self,
        response: &mut ModelResponse,
        session: &mut SessionState,
        ctx: &TurnContext,
    ) -> anyhow::Result<InterceptorFlow>;
}

pub type SharedRequestInterceptor = Arc<dyn RequestInterceptor>;
pub type SharedResponseInterceptor = Arc<dyn ResponseInterceptor>;
