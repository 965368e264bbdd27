//! Ordered interceptor chains with configurable failure handling.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use super::contract::{
    InterceptorFlow, SharedRequestInterceptor, SharedResponseInterceptor, TurnContext,
};
use crate::llm::{ModelRequest, ModelResponse};
use crate::session::SessionState;

// ============================================================================
// Types
// ============================================================================

/// How the chain treats an interceptor that returns `Err`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterceptorErrorMode {
    /// Fail the whole turn. The default: a broken hook should be loud.
    #[default]
    Abort,
    /// Log, restore the pre-hook view, and run the next interceptor.
    Continue,
}

/// An interceptor error escalated in abort mode.
#[derive(Debug, Error)]
#[error("interceptor '{interceptor}' failed: {source}")]
pub struct InterceptorFailure {
    pub interceptor: String,
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

/// Outcome of running a chain to completion or first veto.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainOutcome {
    Continue,
    Veto { interceptor: String, message: String },
}

// ============================================================================
// Chain
// ============================================================================

/// Request and response interceptors, run in registration order.
///
/// A veto short-circuits: interceptors registered after the vetoing one do
/// not run. In continue mode a failing interceptor is skipped and any
/// mutations it made before failing are rolled back, so later interceptors
/// see a consistent view.
#[derive(Default)]
pub struct InterceptorChain {
    request: Vec<SharedRequestInterceptor>,
    response: Vec<SharedResponseInterceptor>,
    error_mode: InterceptorErrorMode,
}

impl InterceptorChain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_request(mut self, interceptor: SharedRequestInterceptor) -> Self {
        self.request.push(interceptor);
        self
    }

    #[must_use]
    pub fn with_response(mut self, interceptor: SharedResponseInterceptor) -> Self {
        self.response.push(interceptor);
        self
    }

    #[must_use]
    pub fn with_error_mode(mut self, mode: InterceptorErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    pub fn error_mode(&self) -> InterceptorErrorMode {
        self.error_mode
    }

    pub fn is_empty(&self) -> bool {
        self.request.is_empty() && self.response.is_empty()
    }

    /// Run every request interceptor against the outgoing request.
    pub async fn run_request(
        &self,
        request: &mut ModelRequest,
        session: &mut SessionState,
        ctx: &TurnContext,
    ) -> Result<ChainOutcome, InterceptorFailure> {
        for interceptor in &self.request {
            let checkpoint = match self.error_mode {
                InterceptorErrorMode::Continue => Some((request.clone(), session.clone())),
                InterceptorErrorMode::Abort => None,
            };

            match interceptor.intercept(request, session, ctx).await {
                Ok(InterceptorFlow::Continue) => {}
                Ok(InterceptorFlow::Veto { message }) => {
                    return Ok(ChainOutcome::Veto {
                        interceptor: interceptor.name().to_string(),
                        message,
                    });
                }
                Err(err) => match self.error_mode {
                    InterceptorErrorMode::Abort => {
                        return Err(InterceptorFailure {
                            interceptor: interceptor.name().to_string(),
                            source: err.into(),
                        });
                    }
                    InterceptorErrorMode::Continue => {
                        warn!(
                            interceptor = interceptor.name(),
                            error = %err,
                            "request interceptor failed, skipping"
                        );
                        if let Some((saved_request, saved_session)) = checkpoint {
                            *request = saved_request;
                            *session = saved_session;
                        }
                    }
                },
            }
        }
        Ok(ChainOutcome::Continue)
    }

    /// Run every response interceptor against the incoming response.
    pub async fn run_response(
        &self,
        response: &mut ModelResponse,
        session: &mut SessionState,
        ctx: &TurnContext,
    ) -> Result<ChainOutcome, InterceptorFailure> {
        for interceptor in &self.response {
            let checkpoint = match self.error_mode {
                InterceptorErrorMode::Continue => Some((response.clone(), session.clone())),
                InterceptorErrorMode::Abort => None,
            };

            match interceptor.intercept(response, session, ctx).await {
                Ok(InterceptorFlow::Continue) => {}
                Ok(InterceptorFlow::Veto { message }) => {
                    return Ok(ChainOutcome::Veto {
                        interceptor: interceptor.name().to_string(),
                        message,
                    });
                }
                Err(err) => match self.error_mode {
                    InterceptorErrorMode::Abort => {
                        return Err(InterceptorFailure {
                            interceptor: interceptor.name().to_string(),
                            source: err.into(),
                        });
                    }
                    InterceptorErrorMode::Continue => {
                        warn!(
                            interceptor = interceptor.name(),
                            error = %err,
                            "response interceptor failed, skipping"
                        );
                        if let Some((saved_response, saved_session)) = checkpoint {
                            *response = saved_response;
                            *session = saved_session;
                        }
                    }
                },
            }
        }
        Ok(ChainOutcome::Continue)
    }
}
