//! In-memory implementation of CollectionStore for the catalog screens
//!
//! Records live in an insertion-ordered map behind an `RwLock`. Every
//! mutation bumps a revision counter and publishes the new snapshot while the
//! write lock is still held, so subscribers see changes in mutation order.

use crate::core::entity::Record;
use crate::core::error::{CatalogError, CatalogResult, StorageError, ValidationError};
use crate::core::events::{EventBus, RecordChange, StoreEvent};
use crate::core::service::{CollectionStore, DeleteReport};
use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;
use uuid::Uuid;

struct Inner<T> {
    records: IndexMap<Uuid, T>,
    revision: u64,
}

/// In-memory collection store
///
/// Cloning is cheap and every clone shares the same records and event bus.
pub struct InMemoryCollectionStore<T: Record> {
    inner: Arc<RwLock<Inner<T>>>,
    events: EventBus<T>,
}

impl<T: Record> Clone for InMemoryCollectionStore<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            events: self.events.clone(),
        }
    }
}

impl<T: Record> fmt::Debug for InMemoryCollectionStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryCollectionStore")
            .field("resource", &T::resource_name())
            .field("subscribers", &self.events.receiver_count())
            .finish()
    }
}

impl<T: Record> InMemoryCollectionStore<T> {
    /// Create an empty store
    pub fn new() -> Self {
        Self::with_event_capacity(1024)
    }

    /// Create an empty store whose event channel buffers `capacity` events
    pub fn with_event_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                records: IndexMap::new(),
                revision: 0,
            })),
            events: EventBus::new(capacity),
        }
    }

    /// Create a store pre-loaded with records
    ///
    /// Each record goes through `create`, so ids are assigned and rules run.
    pub fn seeded<I>(records: I) -> CatalogResult<Self>
    where
        I: IntoIterator<Item = T>,
    {
        let store = Self::new();
        for record in records {
            store.create(record)?;
        }
        Ok(store)
    }

    /// Number of mutations applied so far
    pub fn revision(&self) -> CatalogResult<u64> {
        let inner = self.read()?;
        Ok(inner.revision)
    }

    fn read(&self) -> CatalogResult<std::sync::RwLockReadGuard<'_, Inner<T>>> {
        self.inner
            .read()
            .map_err(|e| lock_error(T::resource_name(), "read", e))
    }

    fn write(&self) -> CatalogResult<std::sync::RwLockWriteGuard<'_, Inner<T>>> {
        self.inner
            .write()
            .map_err(|e| lock_error(T::resource_name(), "write", e))
    }

    /// Bump the revision and publish the current snapshot
    fn publish(&self, inner: &mut Inner<T>, change: RecordChange) {
        inner.revision += 1;
        let snapshot = Arc::new(inner.records.values().cloned().collect::<Vec<_>>());
        let delivered = self.events.publish(StoreEvent::new(
            T::resource_name(),
            inner.revision,
            change,
            snapshot,
        ));
        tracing::trace!(
            resource = T::resource_name(),
            revision = inner.revision,
            delivered,
            "published store event"
        );
    }

    /// Run normalizers and validators registered for the record type
    fn prepare(record: T) -> CatalogResult<T> {
        let Some(rules) = T::rules() else {
            return Ok(record);
        };

        let record = if rules.has_filters() {
            let value = serde_json::to_value(&record).map_err(serialization_error::<T>)?;
            serde_json::from_value(rules.normalize(value)).map_err(serialization_error::<T>)?
        } else {
            record
        };

        rules.check(&record)?;
        Ok(record)
    }
}

impl<T: Record> Default for InMemoryCollectionStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> CollectionStore<T> for InMemoryCollectionStore<T> {
    fn create(&self, mut record: T) -> CatalogResult<Uuid> {
        if record.id().is_nil() {
            record.set_id(Uuid::new_v4());
        }
        let id = record.id();

        record.on_create();
        let record = Self::prepare(record).inspect_err(|e| {
            tracing::warn!(resource = T::resource_name(), record_id = %id, error = %e, "create rejected");
        })?;

        let mut inner = self.write()?;
        if inner.records.contains_key(&id) {
            tracing::warn!(resource = T::resource_name(), record_id = %id, "duplicate id");
            return Err(CatalogError::DuplicateId {
                resource: T::resource_name().to_string(),
                id,
            });
        }

        inner.records.insert(id, record);
        self.publish(&mut inner, RecordChange::Created { id });
        tracing::debug!(resource = T::resource_name(), record_id = %id, "record created");

        Ok(id)
    }

    fn get(&self, id: &Uuid) -> CatalogResult<Option<T>> {
        let inner = self.read()?;
        Ok(inner.records.get(id).cloned())
    }

    fn update(&self, id: &Uuid, patch: &Value) -> CatalogResult<T> {
        let Some(changes) = patch.as_object() else {
            return Err(ValidationError::InvalidPatch {
                message: "patch must be a JSON object".to_string(),
            }
            .into());
        };

        if let Some(patched_id) = changes.get("id") {
            let unchanged = patched_id
                .as_str()
                .and_then(|s| Uuid::parse_str(s).ok())
                .is_some_and(|patched| patched == *id);
            if !unchanged {
                tracing::warn!(resource = T::resource_name(), record_id = %id, "patch tried to change id");
                return Err(ValidationError::ImmutableField {
                    field: "id".to_string(),
                }
                .into());
            }
        }

        let mut inner = self.write()?;
        let current = inner
            .records
            .get(id)
            .ok_or_else(|| CatalogError::not_found(T::resource_name(), *id))?;

        let mut merged = serde_json::to_value(current).map_err(serialization_error::<T>)?;
        if let Some(object) = merged.as_object_mut() {
            for (field, value) in changes {
                object.insert(field.clone(), value.clone());
            }
        }

        let mut updated: T =
            serde_json::from_value(merged).map_err(|e| ValidationError::InvalidPatch {
                message: e.to_string(),
            })?;
        updated.on_update();
        let updated = Self::prepare(updated).inspect_err(|e| {
            tracing::warn!(resource = T::resource_name(), record_id = %id, error = %e, "update rejected");
        })?;

        inner.records.insert(*id, updated.clone());
        self.publish(&mut inner, RecordChange::Updated { id: *id });
        tracing::debug!(resource = T::resource_name(), record_id = %id, "record updated");

        Ok(updated)
    }

    fn delete(&self, id: &Uuid) -> CatalogResult<()> {
        let mut inner = self.write()?;
        if inner.records.shift_remove(id).is_none() {
            return Err(CatalogError::not_found(T::resource_name(), *id));
        }

        self.publish(&mut inner, RecordChange::Deleted { ids: vec![*id] });
        tracing::debug!(resource = T::resource_name(), record_id = %id, "record deleted");
        Ok(())
    }

    fn delete_many(&self, ids: &[Uuid]) -> CatalogResult<DeleteReport> {
        let mut inner = self.write()?;
        let mut report = DeleteReport::default();

        for id in ids {
            if report.deleted.contains(id) || report.missing.contains(id) {
                continue;
            }
            if inner.records.shift_remove(id).is_some() {
                report.deleted.push(*id);
            } else {
                report.missing.push(*id);
            }
        }

        if !report.is_noop() {
            self.publish(
                &mut inner,
                RecordChange::Deleted {
                    ids: report.deleted.clone(),
                },
            );
        }
        tracing::debug!(
            resource = T::resource_name(),
            deleted = report.deleted.len(),
            missing = report.missing.len(),
            "batch delete"
        );

        Ok(report)
    }

    fn all(&self) -> CatalogResult<Vec<T>> {
        let inner = self.read()?;
        Ok(inner.records.values().cloned().collect())
    }

    fn len(&self) -> CatalogResult<usize> {
        let inner = self.read()?;
        Ok(inner.records.len())
    }

    fn contains(&self, id: &Uuid) -> CatalogResult<bool> {
        let inner = self.read()?;
        Ok(inner.records.contains_key(id))
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreEvent<T>> {
        self.events.subscribe()
    }
}

fn lock_error<E: fmt::Display>(resource: &str, kind: &'static str, err: E) -> CatalogError {
    StorageError::Lock {
        resource: resource.to_string(),
        kind,
        message: err.to_string(),
    }
    .into()
}

fn serialization_error<T: Record>(err: serde_json::Error) -> CatalogError {
    StorageError::Serialization {
        resource: T::resource_name().to_string(),
        message: err.to_string(),
    }
    .into()
}
