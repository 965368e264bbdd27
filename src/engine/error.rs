//! Engine errors.

use thiserror::Error;

use crate::conversation::ConversationError;
use crate::interceptor::InterceptorFailure;
use crate::llm::ModelError;

/// Fatal turn failures.
///
/// Interceptor vetoes and tool execution failures are deliberately not
/// represented here: they end the turn with a normal
/// [`TurnResult`](super::TurnResult) so the conversation stays usable.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Conversation(#[from] ConversationError),

    /// The model proposed a tool nothing registered.
    #[error("model proposed unknown tool '{0}'")]
    UnknownTool(String),

    #[error("model provider error: {0}")]
    Provider(#[from] ModelError),

    #[error(transparent)]
    Interceptor(#[from] InterceptorFailure),

    /// Neither a user message nor approval decisions were supplied.
    #[error("turn input is empty")]
    EmptyInput,
}
