//! Model provider errors.

use thiserror::Error;

/// Errors raised by a model provider.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model request failed: {0}")]
    Request(String),

    #[error("model stream failed: {0}")]
    Stream(String),

    #[error("invalid model response: {0}")]
    InvalidResponse(String),
}

impl ModelError {
    pub fn request(message: impl Into<String>) -> Self {
        Self::Request(message.into())
    }

    pub fn stream(message: impl Into<String>) -> Self {
        Self::Stream(message.into())
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse(message.into())
    }
}
