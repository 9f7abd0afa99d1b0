//! Macro-generated test suite for `CollectionStore<Ticket>` contract validation.
//!
//! The `collection_store_tests!` macro generates a test module that validates
//! any `CollectionStore<Ticket>` implementation against the full contract:
//! CRUD operations, ordering, batch deletes, normalization, change
//! notifications and concurrent access.
//!
//! # Usage
//!
//! ```rust,ignore
//! #[macro_use]
//! mod store_harness;
//!
//! use store_harness::*;
//! use catalog::storage::InMemoryCollectionStore;
//!
//! collection_store_tests!(InMemoryCollectionStore::<Ticket>::new());
//! ```
//!
//! # Generated Tests
//!
//! ## CRUD
//! - `test_create_assigns_id`: nil ids are replaced, explicit ids are kept
//! - `test_create_duplicate_id`: a second insert with the same id is rejected
//! - `test_get_nonexistent`: unknown id returns None
//! - `test_all_preserves_insertion_order`
//! - `test_update_merges_patch`
//! - `test_update_rejects_id_change`
//! - `test_update_nonexistent`
//! - `test_delete_existing` / `test_delete_nonexistent`
//!
//! ## Batch
//! - `test_delete_many_reports_missing`
//! - `test_delete_many_keeps_order_of_survivors`
//!
//! ## Rules and Events
//! - `test_rules_normalize_and_validate`
//! - `test_events_carry_revision_and_snapshot`
//! - `test_noop_batch_delete_is_silent`
//! - `test_concurrent_access`

/// Generate a full `CollectionStore<Ticket>` conformance test suite.
///
/// `$factory` must be an expression that evaluates to an instance implementing
/// `CollectionStore<Ticket>`. It is re-evaluated for each test to ensure
/// isolation. For the concurrent access test, the returned store must also
/// implement `Clone + 'static` (shared state via Arc pattern).
#[macro_export]
macro_rules! collection_store_tests {
    ($factory:expr) => {
        mod collection_store_contract_tests {
            use super::*;
            use catalog::core::entity::Record;
            use catalog::core::events::RecordChange;
            use catalog::core::service::CollectionStore;
            use serde_json::json;
            use uuid::Uuid;

            // ==================================================================
            // CRUD
            // ==================================================================

            #[test]
            fn test_create_assigns_id() {
                let store = $factory;

                let id = store.create(ticket("A-1", "First", 1)).unwrap();
                assert!(!id.is_nil(), "store should replace a nil id");

                let explicit = Uuid::new_v4();
                let mut record = ticket("A-2", "Second", 2);
                record.id = explicit;
                assert_eq!(store.create(record).unwrap(), explicit);

                let stored = store.get(&id).unwrap().expect("created record");
                assert_eq!(stored.id(), id);
                assert_eq!(stored.title, "First");
                assert_eq!(store.len().unwrap(), 2);
            }

            #[test]
            fn test_create_duplicate_id() {
                let store = $factory;
                let id = store.create(ticket("A-1", "First", 1)).unwrap();

                let mut clash = ticket("A-2", "Clash", 2);
                clash.id = id;
                let err = store.create(clash).unwrap_err();
                assert_eq!(err.error_code(), "DUPLICATE_ID");
                assert_eq!(store.get(&id).unwrap().unwrap().title, "First");
            }

            #[test]
            fn test_get_nonexistent() {
                let store = $factory;
                assert!(store.get(&Uuid::new_v4()).unwrap().is_none());
                assert!(!store.contains(&Uuid::new_v4()).unwrap());
                assert!(store.is_empty().unwrap());
            }

            #[test]
            fn test_all_preserves_insertion_order() {
                let store = $factory;
                let mut expected = Vec::new();
                for record in sample_batch(5).into_iter().rev() {
                    expected.push(store.create(record).unwrap());
                }

                let ids: Vec<Uuid> = store.all().unwrap().iter().map(|t| t.id()).collect();
                assert_ids(&ids, &expected);
            }

            #[test]
            fn test_update_merges_patch() {
                let store = $factory;
                let id = store.create(tagged_ticket("A-1", "First", 1, &["ui"])).unwrap();

                let updated = store
                    .update(&id, &json!({"title": "Renamed", "priority": 5}))
                    .unwrap();
                assert_eq!(updated.title, "Renamed");
                assert_eq!(updated.priority, 5);
                assert_eq!(updated.tags, vec!["ui".to_string()]);
                assert_eq!(updated.code, "A-1");
                assert_eq!(store.get(&id).unwrap().unwrap(), updated);
            }

            #[test]
            fn test_update_rejects_id_change() {
                let store = $factory;
                let id = store.create(ticket("A-1", "First", 1)).unwrap();

                let err = store
                    .update(&id, &json!({"id": Uuid::new_v4().to_string()}))
                    .unwrap_err();
                assert_eq!(err.error_code(), "VALIDATION_ERROR");

                // Restating the same id is harmless
                let same = store
                    .update(&id, &json!({"id": id.to_string(), "priority": 3}))
                    .unwrap();
                assert_eq!(same.id(), id);
                assert_eq!(same.priority, 3);
            }

            #[test]
            fn test_update_nonexistent() {
                let store = $factory;
                let err = store
                    .update(&Uuid::new_v4(), &json!({"title": "Ghost"}))
                    .unwrap_err();
                assert!(err.is_not_found());
            }

            #[test]
            fn test_delete_existing() {
                let store = $factory;
                let id = store.create(ticket("A-1", "First", 1)).unwrap();
                store.delete(&id).unwrap();
                assert!(store.get(&id).unwrap().is_none());
            }

            #[test]
            fn test_delete_nonexistent() {
                let store = $factory;
                let err = store.delete(&Uuid::new_v4()).unwrap_err();
                assert_eq!(err.error_code(), "RECORD_NOT_FOUND");
            }

            // ==================================================================
            // Batch
            // ==================================================================

            #[test]
            fn test_delete_many_reports_missing() {
                let store = $factory;
                let first = store.create(ticket("A-1", "First", 1)).unwrap();
                let ghost = Uuid::new_v4();

                let report = store.delete_many(&[first, ghost, first]).unwrap();
                assert_ids(&report.deleted, &[first]);
                assert_ids(&report.missing, &[ghost]);
                assert!(store.is_empty().unwrap());
            }

            #[test]
            fn test_delete_many_keeps_order_of_survivors() {
                let store = $factory;
                let ids: Vec<Uuid> = sample_batch(5)
                    .into_iter()
                    .map(|t| store.create(t).unwrap())
                    .collect();

                store.delete_many(&[ids[3], ids[1]]).unwrap();
                let remaining: Vec<Uuid> = store.all().unwrap().iter().map(|t| t.id()).collect();
                assert_ids(&remaining, &[ids[0], ids[2], ids[4]]);
            }

            // ==================================================================
            // Rules and Events
            // ==================================================================

            #[test]
            fn test_rules_normalize_and_validate() {
                let store = $factory;
                let id = store.create(ticket("  ab-7 ", "Normalized", 1)).unwrap();
                assert_eq!(store.get(&id).unwrap().unwrap().code, "AB-7");

                let err = store.create(ticket("", "No code", 1)).unwrap_err();
                assert_eq!(err.error_code(), "VALIDATION_ERROR");

                let err = store.update(&id, &json!({"title": ""})).unwrap_err();
                assert_eq!(err.error_code(), "VALIDATION_ERROR");
                assert_eq!(store.get(&id).unwrap().unwrap().title, "Normalized");
            }

            #[test]
            fn test_events_carry_revision_and_snapshot() {
                let store = $factory;
                let mut events = store.subscribe();

                let id = store.create(ticket("A-1", "First", 1)).unwrap();
                store.update(&id, &json!({"status": "closed"})).unwrap();
                store.delete(&id).unwrap();

                let created = events.try_recv().unwrap();
                assert_eq!(created.change, RecordChange::Created { id });
                assert_eq!(created.snapshot.len(), 1);

                let updated = events.try_recv().unwrap();
                assert_eq!(updated.change, RecordChange::Updated { id });
                assert_eq!(updated.snapshot[0].status(), "closed");
                assert!(updated.revision > created.revision);

                let deleted = events.try_recv().unwrap();
                assert_eq!(deleted.change, RecordChange::Deleted { ids: vec![id] });
                assert!(deleted.snapshot.is_empty());
                assert_eq!(deleted.resource, "tickets");
            }

            #[test]
            fn test_noop_batch_delete_is_silent() {
                let store = $factory;
                store.create(ticket("A-1", "First", 1)).unwrap();
                let mut events = store.subscribe();

                let report = store.delete_many(&[Uuid::new_v4()]).unwrap();
                assert!(report.is_noop());
                assert!(events.try_recv().is_err(), "no event for a no-op delete");
            }

            #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
            async fn test_concurrent_access() {
                let store = $factory;
                let mut handles = Vec::new();

                for i in 0..10 {
                    let store = store.clone();
                    handles.push(tokio::task::spawn_blocking(move || {
                        store.create(ticket(&format!("C-{}", i), "Concurrent", i))
                    }));
                }

                for handle in handles {
                    handle.await.unwrap().unwrap();
                }
                assert_eq!(store.len().unwrap(), 10);
            }
        }
    };
}
