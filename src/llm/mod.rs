//! Model provider port.
//!
//! The engine never talks to a vendor SDK directly: it builds a
//! [`ModelRequest`] from conversation state and hands it to a
//! [`ModelProvider`], which returns either a complete [`ModelResponse`] or a
//! [`ModelStream`] of incremental fragments.

mod error;
mod provider;
mod types;

pub use error::ModelError;
pub use provider::{ModelProvider, ModelStream, SharedModelProvider};
pub use types::{ModelRequest, ModelResponse, ProposedToolCall, StreamFragment, Usage};
