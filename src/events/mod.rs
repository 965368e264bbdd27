//! Turn event streaming.
//!
//! ```text
//!   engine ──emit_with(kind, ||event)──▶ TurnEmitter ──mpsc──▶ consumer
//!                  │                          │
//!                  │                          └── SubscriptionSet filter
//!                  └── closure never runs when nobody is listening
//! ```
//!
//! Consumers declare a [`SubscriptionSet`] up front; the [`TurnEmitter`]
//! filters at the emission site. The [`wire`] module frames events as NDJSON
//! for transport.

mod emitter;
mod event;
pub mod wire;

pub use emitter::{SubscriptionSet, TurnEmitter};
pub use event::{EventKind, TurnEvent};
pub use wire::WireError;
