//! Session state errors.

use thiserror::Error;

/// Errors from typed reads/writes against [`crate::session::SessionState`].
#[derive(Debug, Error)]
pub enum SessionError {
    /// A stored value could not be reconstructed into the requested type.
    #[error("failed to decode session value at '{key}': {message}")]
    Decode { key: String, message: String },

    /// A value could not be serialized for storage under the given key.
    #[error("failed to encode session value at '{key}': {message}")]
    Encode { key: String, message: String },
}

impl SessionError {
    pub(crate) fn decode(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            key: key.into(),
            message: message.into(),
        }
    }

    pub(crate) fn encode(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Encode {
            key: key.into(),
            message: message.into(),
        }
    }
}
