//! Store change events for reactive consumers.
//!
//! The note store emits an event after every cache mutation. Downstream
//! consumers (UI view models, tests) subscribe independently through a
//! broadcast channel; slow consumers lag rather than block the store.

use tokio::sync::broadcast;
use uuid::Uuid;

use crate::defaults;

/// A cache mutation that reactive consumers may want to re-render on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// The note cache was rebuilt from a full re-query.
    NotesRefreshed { count: usize },
    NoteCreated { id: Uuid },
    NoteUpdated { id: Uuid },
    /// A note left the cache (deleted, or archived out of the active view).
    NoteRemoved { id: Uuid },
    /// The catalog cache was rebuilt.
    CatalogsRefreshed { count: usize },
    CatalogCreated { id: Uuid },
    CatalogUpdated { id: Uuid },
    CatalogRemoved { id: Uuid },
}

/// Broadcast fan-out for [`StoreEvent`]s.
#[derive(Debug, Clone)]
pub struct StoreEventBus {
    tx: broadcast::Sender<StoreEvent>,
}

impl StoreEventBus {
    /// Create a bus with the default channel capacity.
    pub fn new() -> Self {
        Self::with_capacity(defaults::STORE_EVENT_CAPACITY)
    }

    /// Create a bus with a custom channel capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to store events from this point forward.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all current subscribers.
    ///
    /// Emitting with no subscribers is not an error.
    pub fn emit(&self, event: StoreEvent) {
        let _ = self.tx.send(event);
    }

    /// Number of active subscribers.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for StoreEventBus {
    fn default() -> Self {
        Self::new()
    }
}
