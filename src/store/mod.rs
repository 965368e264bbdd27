//! Conversation persistence.
//!
//! A [`SnapshotStore`] persists a conversation aggregate together with its
//! session state as one atomic snapshot, keyed by conversation id. Loading a
//! snapshot and handing it back to the engine resumes the conversation
//! exactly where it stopped, pending approvals included.
//!
//! Two implementations ship with the crate:
//!
//! - [`FileSnapshotStore`] — one YAML file per conversation under a data
//!   directory; writes are tmp-file-then-rename atomic.
//! - [`MemorySnapshotStore`] — concurrent map, nothing outlives the process.
//!
//! # Naming Conventions
//!
//! - `list` - enumerate persisted conversation ids
//! - `load` - read a single snapshot, returns `Option` if not found
//! - `save` - create or update (upsert semantics, must be atomic)
//! - `delete` - remove a snapshot; missing is not an error

mod error;
mod file;
mod memory;
mod snapshot;

pub use error::{StoreError, StoreResult};
pub use file::FileSnapshotStore;
pub use memory::MemorySnapshotStore;
pub use snapshot::{ConversationSnapshot, SharedSnapshotStore, SnapshotStore};
