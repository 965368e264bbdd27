//! Turngate is an embeddable turn engine for tool-using LLM agents with
//! human-in-the-loop approval gates.
//!
//! # Architecture
//!
//! ```text
//!  ┌──────────────┐   TurnInput    ┌─────────────────────────────────┐
//!  │    caller    │───────────────▶│           TurnEngine            │
//!  │ (server/CLI) │◀───────────────│  request interceptors           │
//!  └──────────────┘   TurnResult   │    → model provider (port)      │
//!         │                        │    → approval policy            │
//!         │ TurnEvent stream       │    → tool executor (port)       │
//!         ▼                        │  response interceptors          │
//!  ┌──────────────┐                └───────────────┬─────────────────┘
//!  │ TurnEmitter  │                                │ owns per turn
//!  └──────────────┘                ┌───────────────▼─────────────────┐
//!                                  │ Conversation (history, pending  │
//!                                  │ approvals) + SessionState (KV)  │
//!                                  └─────────────────────────────────┘
//! ```
//!
//! - **Conversation** — append-only message history plus the pending-approval
//!   set; a user message cannot land while approvals are outstanding.
//! - **TurnEngine** — drives the model-call/tool-dispatch loop until the turn
//!   completes, pauses for approval, hits the turn limit, or fails.
//! - **ApprovalPolicy** — pure decision function gating each proposed call.
//! - **TurnEmitter** — lazily constructs typed progress events for the kinds
//!   a consumer subscribed to; `events::wire` frames them as NDJSON.
//! - **ConversationRegistry** — checkout leases guaranteeing a single active
//!   turn per conversation across tasks.
//!
//! The model provider and the tools themselves are ports: implement
//! [`llm::ModelProvider`] and [`tools::Tool`] and hand them to the engine.

pub mod api;
pub mod approval;
pub mod config;
pub mod conversation;
pub mod engine;
pub mod events;
pub mod interceptor;
pub mod llm;
pub mod session;
pub mod store;
pub mod tools;
