//! Store change notifications
//!
//! Every mutation of a collection store publishes a [`StoreEvent`] on an
//! [`EventBus`]. It is the only channel through which filtered and sorted
//! views learn that the record set changed.
//!
//! # Architecture
//!
//! ```text
//! store.create() ──┐
//! store.update() ──┼──▶ EventBus::publish() ──▶ broadcast channel ──▶ CatalogView::sync()
//! store.delete() ──┘                                               ──▶ other subscribers
//! ```
//!
//! Stores publish while holding their write lock, so subscribers observe
//! events in mutation order and revisions increase by exactly one per event.
//!
//! # Usage
//!
//! ```rust,ignore
//! let mut rx = store.subscribe();
//! store.create(product)?;
//!
//! if let Ok(event) = rx.try_recv() {
//!     println!("revision {} now holds {} records", event.revision, event.snapshot.len());
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

/// What a mutation did to the record set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RecordChange {
    /// A record was created
    Created { id: Uuid },
    /// A record was patched
    Updated { id: Uuid },
    /// One or more records were deleted
    Deleted { ids: Vec<Uuid> },
}

impl RecordChange {
    /// Get the action name (created, updated, deleted)
    pub fn action(&self) -> &'static str {
        match self {
            RecordChange::Created { .. } => "created",
            RecordChange::Updated { .. } => "updated",
            RecordChange::Deleted { .. } => "deleted",
        }
    }

    /// Ids touched by this change
    pub fn ids(&self) -> Vec<Uuid> {
        match self {
            RecordChange::Created { id } | RecordChange::Updated { id } => vec![*id],
            RecordChange::Deleted { ids } => ids.clone(),
        }
    }
}

/// A record-set change together with the new snapshot
#[derive(Debug, Clone)]
pub struct StoreEvent<T> {
    /// Resource the store holds (e.g., "products")
    pub resource: &'static str,
    /// Monotonic mutation counter of the publishing store
    pub revision: u64,
    /// When the mutation happened
    pub timestamp: DateTime<Utc>,
    /// The change itself
    pub change: RecordChange,
    /// The full record list after the change, in insertion order
    pub snapshot: Arc<Vec<T>>,
}

impl<T> StoreEvent<T> {
    /// Create a new event stamped with the current time
    pub fn new(
        resource: &'static str,
        revision: u64,
        change: RecordChange,
        snapshot: Arc<Vec<T>>,
    ) -> Self {
        Self {
            resource,
            revision,
            timestamp: Utc::now(),
            change,
            snapshot,
        }
    }
}

/// Broadcast-based event bus for store notifications
///
/// The bus is cheap to clone and can be shared across threads. Slow receivers
/// that fall more than `capacity` events behind get a `Lagged` error and
/// should resynchronize from the store.
#[derive(Debug)]
pub struct EventBus<T> {
    sender: broadcast::Sender<StoreEvent<T>>,
}

impl<T> Clone for EventBus<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<T: Clone> EventBus<T> {
    /// Create a new EventBus with the given channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish an event to all subscribers
    ///
    /// Never fails: with no subscribers the event is dropped. Returns the
    /// number of receivers that will see it.
    pub fn publish(&self, event: StoreEvent<T>) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Subscribe to events published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent<T>> {
        self.sender.subscribe()
    }

    /// Get the current number of active subscribers
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl<T: Clone> Default for EventBus<T> {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(revision: u64, change: RecordChange) -> StoreEvent<String> {
        StoreEvent::new("notes", revision, change, Arc::new(vec!["a".to_string()]))
    }

    #[test]
    fn test_record_change_serialization() {
        let id = Uuid::new_v4();
        let json = serde_json::to_value(RecordChange::Created { id }).unwrap();
        assert_eq!(json["action"], "created");
        assert_eq!(json["id"], id.to_string());
    }

    #[test]
    fn test_record_change_ids() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(RecordChange::Updated { id: a }.ids(), vec![a]);
        assert_eq!(RecordChange::Deleted { ids: vec![a, b] }.ids(), vec![a, b]);
        assert_eq!(RecordChange::Deleted { ids: vec![] }.action(), "deleted");
    }

    #[test]
    fn test_event_bus_publish_subscribe() {
        let bus: EventBus<String> = EventBus::new(16);
        let mut rx = bus.subscribe();

        let id = Uuid::new_v4();
        assert_eq!(bus.publish(event(1, RecordChange::Created { id })), 1);

        let received = rx.try_recv().unwrap();
        assert_eq!(received.revision, 1);
        assert_eq!(received.change, RecordChange::Created { id });
        assert_eq!(received.snapshot.len(), 1);
    }

    #[test]
    fn test_event_bus_preserves_order() {
        let bus: EventBus<String> = EventBus::new(16);
        let mut rx = bus.subscribe();

        for revision in 1..=3 {
            bus.publish(event(revision, RecordChange::Updated { id: Uuid::nil() }));
        }

        let revisions: Vec<u64> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|e| e.revision)
            .collect();
        assert_eq!(revisions, vec![1, 2, 3]);
    }

    #[test]
    fn test_event_bus_publish_without_subscribers() {
        let bus: EventBus<String> = EventBus::new(16);
        assert_eq!(bus.publish(event(1, RecordChange::Deleted { ids: vec![] })), 0);
    }

    #[test]
    fn test_event_bus_clone_shares_channel() {
        let bus: EventBus<String> = EventBus::default();
        let _rx = bus.subscribe();

        let bus2 = bus.clone();
        assert_eq!(bus2.receiver_count(), 1);

        let _rx2 = bus2.subscribe();
        assert_eq!(bus.receiver_count(), 2);
    }
}
