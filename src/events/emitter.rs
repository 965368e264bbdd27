//! Subscription-aware event emission.
//!
//! Callers declare the event kinds they want before the turn starts.
//! Everything else is filtered at the emission site, before the event is
//! even constructed, so an unobserved turn pays nothing for streaming.

use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

use super::event::{EventKind, TurnEvent};

// ============================================================================
// Subscriptions
// ============================================================================

/// The set of event kinds a consumer asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionSet {
    enabled: [bool; EventKind::ALL.len()],
}

impl SubscriptionSet {
    /// Subscribe to every event kind.
    #[must_use]
    pub fn all() -> Self {
        Self {
            enabled: [true; EventKind::ALL.len()],
        }
    }

    /// Subscribe to nothing. Combine with [`with`](Self::with) to opt in.
    #[must_use]
    pub fn none() -> Self {
        Self {
            enabled: [false; EventKind::ALL.len()],
        }
    }

    #[must_use]
    pub fn with(mut self, kind: EventKind) -> Self {
        self.enabled[kind.index()] = true;
        self
    }

    #[must_use]
    pub fn without(mut self, kind: EventKind) -> Self {
        self.enabled[kind.index()] = false;
        self
    }

    pub fn wants(&self, kind: EventKind) -> bool {
        self.enabled[kind.index()]
    }
}

impl Default for SubscriptionSet {
    fn default() -> Self {
        Self::all()
    }
}

// ============================================================================
// Emitter
// ============================================================================

/// Sends [`TurnEvent`]s to at most one consumer, honoring its subscriptions.
///
/// A disabled emitter drops everything; the engine runs identically either
/// way, which is what keeps the streamed and unstreamed paths from drifting
/// apart.
#[derive(Debug, Clone)]
pub struct TurnEmitter {
    tx: Option<mpsc::UnboundedSender<TurnEvent>>,
    subscriptions: SubscriptionSet,
}

impl TurnEmitter {
    /// An emitter that discards every event.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            tx: None,
            subscriptions: SubscriptionSet::none(),
        }
    }

    /// An emitter wired to an in-process stream of events.
    #[must_use]
    pub fn channel(subscriptions: SubscriptionSet) -> (Self, UnboundedReceiverStream<TurnEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let emitter = Self {
            tx: Some(tx),
            subscriptions,
        };
        (emitter, UnboundedReceiverStream::new(rx))
    }

    /// Whether an event of this kind would actually be delivered.
    ///
    /// Callers use this to skip work that only matters when someone is
    /// listening, like requesting a streamed model invocation.
    pub fn wants(&self, kind: EventKind) -> bool {
        match &self.tx {
            Some(tx) => !tx.is_closed() && self.subscriptions.wants(kind),
            None => false,
        }
    }

    /// Emit an event, constructing it only if it would be delivered.
    pub fn emit_with<F>(&self, kind: EventKind, build: F)
    where
        F: FnOnce() -> TurnEvent,
    {
        if !self.wants(kind) {
            return;
        }
        if let Some(tx) = &self.tx {
            // A consumer that hung up mid-turn is indistinguishable from one
            // that never subscribed; dropped sends are fine.
            let _ = tx.send(build());
        }
    }
}
