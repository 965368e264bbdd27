//! Conversation state: history, tool calls, approvals.
//!
//! # Architecture
//!
//! ```text
//!  ┌──────────────────────┐   checkout / lease   ┌──────────────────────┐
//!  │ ConversationRegistry │─────────────────────▶│  ConversationLease   │
//!  │  (id → entry slots)  │◀──────drop───────────│ (exclusive per turn) │
//!  └──────────────────────┘                      └──────────┬───────────┘
//!                                                           │ &mut
//!                                                ┌──────────▼───────────┐
//!                                                │    Conversation      │
//!                                                │ messages (append-    │
//!                                                │ only) + tool calls   │
//!                                                │ + pending approvals  │
//!                                                └──────────────────────┘
//! ```
//!
//! - **Conversation** — the aggregate: append-only [`Message`] history, a
//!   table of every [`ToolCall`] registered, and the pending-approval set.
//!   A user message cannot land while approvals are pending; tool call ids
//!   never repeat for the conversation's lifetime.
//! - **ConversationRegistry** — shares conversations across tasks while
//!   keeping turns exclusive via checkout leases.

mod error;
mod log;
mod message;
mod registry;
mod tool_call;

pub use error::ConversationError;
pub use log::Conversation;
pub use message::{Message, Role};
pub use registry::{ConversationEntry, ConversationLease, ConversationRegistry, RegistryError};
pub use tool_call::{ToolCall, ToolCallStatus, ToolInput};
