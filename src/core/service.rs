//! Service trait for collection stores

use crate::core::entity::Record;
use crate::core::error::CatalogResult;
use crate::core::events::StoreEvent;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Result of a batch delete
///
/// Ids that were already gone are reported, never raised.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeleteReport {
    pub deleted: Vec<Uuid>,
    pub missing: Vec<Uuid>,
}

impl DeleteReport {
    /// Whether nothing was removed
    pub fn is_noop(&self) -> bool {
        self.deleted.is_empty()
    }
}

/// Service trait owning the canonical record list of one collection
///
/// Implementations keep records in insertion order and publish a
/// [`StoreEvent`] for every mutation that changes the list. Every other
/// structure (views, selections, pending actions) is derived from this one.
pub trait CollectionStore<T: Record>: Send + Sync {
    /// Insert a record and return its id
    ///
    /// A nil id is replaced by a fresh one; an id already present is rejected.
    fn create(&self, record: T) -> CatalogResult<Uuid>;

    /// Get a record by id
    fn get(&self, id: &Uuid) -> CatalogResult<Option<T>>;

    /// Shallow-merge a JSON patch into an existing record
    fn update(&self, id: &Uuid, patch: &Value) -> CatalogResult<T>;

    /// Delete a record
    fn delete(&self, id: &Uuid) -> CatalogResult<()>;

    /// Delete several records, reporting which ids were already missing
    fn delete_many(&self, ids: &[Uuid]) -> CatalogResult<DeleteReport>;

    /// All records in insertion order
    fn all(&self) -> CatalogResult<Vec<T>>;

    /// Number of records
    fn len(&self) -> CatalogResult<usize>;

    /// Whether the store is empty
    fn is_empty(&self) -> CatalogResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Whether a record with this id exists
    fn contains(&self, id: &Uuid) -> CatalogResult<bool> {
        Ok(self.get(id)?.is_some())
    }

    /// Receive change notifications published from now on
    fn subscribe(&self) -> broadcast::Receiver<StoreEvent<T>>;
}
