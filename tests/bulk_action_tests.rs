//! Integration tests for the bulk action orchestrator
//!
//! The orchestrator is driven directly against stores, including one that
//! rejects writes to chosen records, to cover partial failures.

#[macro_use]
mod store_harness;

use catalog::prelude::*;
use serde_json::Value;
use std::collections::HashSet;
use store_harness::*;
use tokio::sync::broadcast;

// =============================================================================
// A store that refuses to write some records
// =============================================================================

struct RejectingStore {
    inner: InMemoryCollectionStore<Ticket>,
    rejected: HashSet<Uuid>,
    unreadable: HashSet<Uuid>,
}

impl RejectingStore {
    fn new(inner: InMemoryCollectionStore<Ticket>, rejected: &[Uuid]) -> Self {
        Self {
            inner,
            rejected: rejected.iter().copied().collect(),
            unreadable: HashSet::new(),
        }
    }

    fn with_unreadable(mut self, ids: &[Uuid]) -> Self {
        self.unreadable.extend(ids.iter().copied());
        self
    }

    fn check(&self, id: &Uuid) -> CatalogResult<()> {
        if self.rejected.contains(id) {
            return Err(CatalogError::Internal(format!("record {} is locked", id)));
        }
        Ok(())
    }
}

impl CollectionStore<Ticket> for RejectingStore {
    fn create(&self, record: Ticket) -> CatalogResult<Uuid> {
        self.inner.create(record)
    }

    fn get(&self, id: &Uuid) -> CatalogResult<Option<Ticket>> {
        if self.unreadable.contains(id) {
            return Err(CatalogError::Internal(format!("record {} is unreadable", id)));
        }
        self.inner.get(id)
    }

    fn update(&self, id: &Uuid, patch: &Value) -> CatalogResult<Ticket> {
        self.check(id)?;
        self.inner.update(id, patch)
    }

    fn delete(&self, id: &Uuid) -> CatalogResult<()> {
        self.check(id)?;
        self.inner.delete(id)
    }

    fn delete_many(&self, ids: &[Uuid]) -> CatalogResult<DeleteReport> {
        self.inner.delete_many(ids)
    }

    fn all(&self) -> CatalogResult<Vec<Ticket>> {
        self.inner.all()
    }

    fn len(&self) -> CatalogResult<usize> {
        self.inner.len()
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreEvent<Ticket>> {
        self.inner.subscribe()
    }
}

fn seeded(n: usize) -> (InMemoryCollectionStore<Ticket>, Vec<Uuid>) {
    let store = InMemoryCollectionStore::seeded(sample_batch(n)).unwrap();
    let ids = store.all().unwrap().iter().map(|t| t.id).collect();
    (store, ids)
}

fn orchestrator() -> BulkActionOrchestrator<Ticket> {
    BulkActionOrchestrator::new(BulkPolicy::default())
}

// =============================================================================
// State machine
// =============================================================================

mod state_machine_tests {
    use super::*;

    #[test]
    fn test_mutating_action_waits_for_confirmation() {
        let (store, ids) = seeded(2);
        let mut bulk = orchestrator();

        let submission = bulk.submit(&store, BulkActionKind::Deactivate, &ids).unwrap();
        let pending = submission.pending().unwrap();
        assert_eq!(pending.target_ids, ids);
        assert!(pending.requires_confirmation);
        assert_eq!(pending.prompt.title, "Deactivate 2 tickets?");
        assert_eq!(bulk.state(), BulkState::AwaitingConfirmation);

        // Nothing happens before confirmation
        assert!(store.all().unwrap().iter().all(|t| t.status == TicketStatus::Open));

        let outcome = bulk.confirm(&store).unwrap();
        assert_eq!(outcome.succeeded, ids);
        assert_eq!(bulk.state(), BulkState::Idle);
        assert!(store.all().unwrap().iter().all(|t| t.status == TicketStatus::Closed));
    }

    #[test]
    fn test_second_submit_while_pending_is_rejected() {
        let (store, ids) = seeded(1);
        let mut bulk = orchestrator();
        bulk.submit(&store, BulkActionKind::Delete, &ids).unwrap();

        let err = bulk
            .submit(&store, BulkActionKind::Activate, &ids)
            .unwrap_err();
        assert_eq!(err.error_code(), "ACTION_PENDING");
        assert_eq!(bulk.pending().unwrap().kind, BulkActionKind::Delete);
    }

    #[test]
    fn test_confirm_without_pending_action() {
        let (store, _) = seeded(1);
        let mut bulk = orchestrator();
        let err = bulk.confirm(&store).unwrap_err();
        assert_eq!(err.error_code(), "NO_PENDING_ACTION");
    }

    #[test]
    fn test_cancel_leaves_store_untouched() {
        let (store, ids) = seeded(3);
        let mut bulk = orchestrator();
        bulk.submit(&store, BulkActionKind::Delete, &ids).unwrap();

        let cancelled = bulk.cancel().unwrap();
        assert_eq!(cancelled.target_ids, ids);
        assert_eq!(bulk.state(), BulkState::Idle);
        assert!(bulk.cancel().is_none());
        assert_eq!(store.len().unwrap(), 3);
    }

    #[test]
    fn test_repeated_targets_are_deduplicated() {
        let (store, ids) = seeded(2);
        let mut bulk = orchestrator();
        let targets = [ids[0], ids[1], ids[0]];

        let submission = bulk.submit(&store, BulkActionKind::Activate, &targets).unwrap();
        assert_eq!(submission.pending().unwrap().target_ids, ids);
        assert_eq!(submission.pending().unwrap().prompt.title, "Activate 2 tickets?");
    }

    #[test]
    fn test_policy_can_require_confirmation_for_export() {
        let (store, ids) = seeded(1);
        let policy = BulkPolicy {
            confirm_read_only: true,
            ..BulkPolicy::default()
        };
        let mut bulk = BulkActionOrchestrator::<Ticket>::new(policy);

        let submission = bulk.submit(&store, BulkActionKind::Export, &ids).unwrap();
        assert!(submission.pending().is_some());
        let outcome = bulk.confirm(&store).unwrap();
        assert_eq!(outcome.export.unwrap().record_count, 1);
    }

    #[test]
    fn test_policy_restricts_actions() {
        let (store, ids) = seeded(1);
        let policy = BulkPolicy {
            actions: vec![BulkActionKind::Export],
            ..BulkPolicy::default()
        };
        let mut bulk = BulkActionOrchestrator::<Ticket>::new(policy);

        assert_eq!(bulk.available_actions(), vec![BulkActionKind::Export]);
        let err = bulk.submit(&store, BulkActionKind::Delete, &ids).unwrap_err();
        assert_eq!(err.error_code(), "UNSUPPORTED_ACTION");
        assert_eq!(bulk.state(), BulkState::Idle);
    }
}

// =============================================================================
// Per-kind behavior
// =============================================================================

mod action_kind_tests {
    use super::*;

    #[test]
    fn test_transition_skips_missing_records() {
        let (store, ids) = seeded(2);
        let mut bulk = orchestrator();
        bulk.submit(&store, BulkActionKind::Deactivate, &ids).unwrap();
        store.delete(&ids[1]).unwrap();

        let outcome = bulk.confirm(&store).unwrap();
        assert_eq!(outcome.succeeded, vec![ids[0]]);
        assert_eq!(outcome.missing, vec![ids[1]]);
        assert!(outcome.failed.is_empty());
    }

    #[test]
    fn test_delete_reports_deleted_and_missing() {
        let (store, ids) = seeded(2);
        store.delete(&ids[1]).unwrap();

        let mut bulk = orchestrator();
        bulk.submit(&store, BulkActionKind::Delete, &ids).unwrap();
        let outcome = bulk.confirm(&store).unwrap();

        assert_eq!(outcome.succeeded, vec![ids[0]]);
        assert_eq!(outcome.missing, vec![ids[1]]);
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_duplicate_skips_taken_keys() {
        let store = InMemoryCollectionStore::seeded([
            ticket("BUG", "Crash", 1),
            ticket("BUG-COPY", "Older copy", 1),
        ])
        .unwrap();
        let source = store.all().unwrap()[0].id;

        let mut bulk = orchestrator();
        bulk.submit(&store, BulkActionKind::Duplicate, &[source]).unwrap();
        let outcome = bulk.confirm(&store).unwrap();

        let copy = store.get(&outcome.created[0]).unwrap().unwrap();
        assert_eq!(copy.code, "BUG-COPY-2");
        assert_eq!(copy.title, "Crash (Copy)");
        assert_eq!(copy.priority, 1);
    }

    #[test]
    fn test_duplicate_several_sources_at_once() {
        let (store, ids) = seeded(3);
        let mut bulk = orchestrator();
        bulk.submit(&store, BulkActionKind::Duplicate, &ids).unwrap();
        let outcome = bulk.confirm(&store).unwrap();

        assert_eq!(outcome.created.len(), 3);
        let codes: HashSet<String> = store.all().unwrap().into_iter().map(|t| t.code).collect();
        assert_eq!(codes.len(), 6, "every natural key stays unique");
        assert!(codes.contains("T-000-COPY"));
    }

    #[test]
    fn test_custom_duplicate_policy() {
        let (store, ids) = seeded(1);
        let mut bulk = orchestrator().with_duplicate_policy(DuplicatePolicy {
            key_suffix: "-B".to_string(),
            name_suffix: None,
        });
        bulk.submit(&store, BulkActionKind::Duplicate, &ids).unwrap();
        let outcome = bulk.confirm(&store).unwrap();

        let copy = store.get(&outcome.created[0]).unwrap().unwrap();
        assert_eq!(copy.code, "T-000-B");
        assert_eq!(copy.title, "Ticket 0");
    }

    #[test]
    fn test_export_yaml_snapshot() {
        let (store, ids) = seeded(2);
        let mut bulk = orchestrator().with_export_format(ExportFormat::Yaml);

        let submission = bulk.submit(&store, BulkActionKind::Export, &ids[..1]).unwrap();
        let export = submission.outcome().unwrap().export.clone().unwrap();
        assert_eq!(export.format, ExportFormat::Yaml);
        assert_eq!(export.record_count, 1);
        assert!(export.payload.contains("T-000"));
        assert!(!export.payload.contains("T-001"));
        assert!(export.file_name().ends_with(".yaml"));
    }
}

// =============================================================================
// Partial failure
// =============================================================================

mod partial_failure_tests {
    use super::*;

    #[test]
    fn test_rejected_targets_do_not_abort_the_batch() {
        let (inner, ids) = seeded(3);
        let store = RejectingStore::new(inner.clone(), &[ids[1]]);
        let mut bulk = orchestrator();

        bulk.submit(&store, BulkActionKind::Deactivate, &ids).unwrap();
        let outcome = bulk.confirm(&store).unwrap();

        assert!(outcome.is_partial_failure());
        assert_eq!(outcome.succeeded, vec![ids[0], ids[2]]);
        assert_eq!(outcome.failed_ids(), vec![ids[1]]);
        assert!(outcome.failed[0].reason.contains("locked"));

        // No rollback of the targets that went through
        assert_eq!(inner.get(&ids[0]).unwrap().unwrap().status, TicketStatus::Closed);
        assert_eq!(inner.get(&ids[1]).unwrap().unwrap().status, TicketStatus::Open);
    }

    #[test]
    fn test_unreadable_source_does_not_abort_duplicate() {
        let (inner, ids) = seeded(2);
        let store = RejectingStore::new(inner.clone(), &[]).with_unreadable(&[ids[1]]);
        let mut bulk = orchestrator();

        bulk.submit(&store, BulkActionKind::Duplicate, &ids).unwrap();
        let outcome = bulk.confirm(&store).unwrap();

        assert_eq!(outcome.succeeded, vec![ids[0]]);
        assert_eq!(outcome.failed_ids(), vec![ids[1]]);
        assert!(outcome.failed[0].reason.contains("unreadable"));

        // The copy that went through is reported
        assert_eq!(outcome.created.len(), 1);
        assert_eq!(inner.len().unwrap(), 3);
        let copy = inner.get(&outcome.created[0]).unwrap().unwrap();
        assert_eq!(copy.code, "T-000-COPY");
    }

    #[test]
    fn test_unreadable_target_is_left_out_of_export() {
        let (inner, ids) = seeded(2);
        let store = RejectingStore::new(inner, &[]).with_unreadable(&[ids[0]]);
        let mut bulk = orchestrator();

        let submission = bulk.submit(&store, BulkActionKind::Export, &ids).unwrap();
        let outcome = submission.outcome().unwrap();

        assert_eq!(outcome.succeeded, vec![ids[1]]);
        assert_eq!(outcome.failed_ids(), vec![ids[0]]);
        let export = outcome.export.clone().unwrap();
        assert_eq!(export.record_count, 1);
        assert!(export.payload.contains("T-001"));
        assert!(!export.payload.contains("T-000"));
    }

    #[test]
    fn test_outcome_serializes_for_display() {
        let (inner, ids) = seeded(2);
        let store = RejectingStore::new(inner, &[ids[0]]);
        let mut bulk = orchestrator();

        bulk.submit(&store, BulkActionKind::Activate, &ids).unwrap();
        let outcome = bulk.confirm(&store).unwrap();
        let value = serde_json::to_value(&outcome).unwrap();

        assert_eq!(value["kind"], "activate");
        assert_eq!(value["failed"][0]["id"], ids[0].to_string());
        assert_eq!(value["succeeded"].as_array().unwrap().len(), 1);
        assert!(value.get("export").is_none());
    }
}
