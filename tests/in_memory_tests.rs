//! Integration tests for InMemoryCollectionStore using the store test harness.
//!
//! This file invokes `collection_store_tests!` to validate that
//! InMemoryCollectionStore fully conforms to the CollectionStore<T> contract.

#[macro_use]
mod store_harness;

use catalog::storage::InMemoryCollectionStore;
use store_harness::*;

collection_store_tests!(InMemoryCollectionStore::<Ticket>::new());

mod seeded_store_tests {
    use super::*;
    use catalog::core::service::CollectionStore;

    #[test]
    fn test_seeded_store_starts_at_seed_revision() {
        let store = InMemoryCollectionStore::seeded(sample_batch(3)).unwrap();
        assert_eq!(store.len().unwrap(), 3);
        assert_eq!(store.revision().unwrap(), 3);
    }

    #[test]
    fn test_seeded_store_rejects_invalid_record() {
        let result = InMemoryCollectionStore::seeded(vec![ticket("", "No code", 1)]);
        assert!(result.is_err());
    }

    #[test]
    fn test_clones_share_records() {
        let store = InMemoryCollectionStore::<Ticket>::new();
        let other = store.clone();
        let id = store.create(ticket("A-1", "Shared", 1)).unwrap();
        assert!(other.contains(&id).unwrap());
    }
}
