//! Per-conversation key-value state carried across turns.
//!
//! A [`SessionState`] is a flat string-keyed bag of JSON values. Tools and
//! interceptors mutate it during a turn; the engine returns it as a snapshot
//! at turn end and round-trips untouched keys unchanged.

mod error;
mod state;

pub use error::SessionError;
pub use state::SessionState;
