//! Request/response interception.
//!
//! ```text
//!                ┌────────────────────┐
//!   request ────▶│ request chain      │────▶ model
//!                │  (mutate or veto)  │
//!                └────────────────────┘
//!                ┌────────────────────┐
//!   response ◀───│ response chain     │◀──── model
//!                │  (mutate or veto)  │
//!                └────────────────────┘
//! ```
//!
//! Chains run in registration order around every model invocation. A veto
//! halts the turn without surfacing an error; a hook failure is handled per
//! [`InterceptorErrorMode`].

mod chain;
mod contract;

pub use chain::{ChainOutcome, InterceptorChain, InterceptorErrorMode, InterceptorFailure};
pub use contract::{
    InterceptorFlow, RequestInterceptor, ResponseInterceptor, SharedRequestInterceptor,
    SharedResponseInterceptor, TurnContext,
};
