//! Turn orchestration.
//!
//! ```text
//!   TurnInput ──▶ intake ──▶ ┌─────────────────────────────┐
//!   (message,     (resolve,  │ request chain ─▶ model      │
//!    decisions)    execute)  │ response chain ─▶ policy    │──▶ TurnResult
//!                            │ execute approved ─▶ loop ───┤
//!                            └─────────────────────────────┘
//! ```
//!
//! [`TurnEngine::run`] is the single entry point for advancing a
//! conversation; everything observable about a turn streams through a
//! [`TurnEmitter`](crate::events::TurnEmitter) when one is attached.

mod error;
mod result;
mod turn;

pub use error::EngineError;
pub use result::{StopReason, TurnResult};
pub use turn::{TurnEngine, TurnInput};
