//! Core module containing the record abstraction and the derived-view machinery

pub mod bulk;
pub mod entity;
pub mod error;
pub mod events;
pub mod field;
pub mod filter;
pub mod progress;
pub mod selection;
pub mod service;
pub mod sort;
pub mod store;
pub mod validation;

pub use bulk::{BulkActionKind, BulkActionOrchestrator, BulkOutcome, Submission};
pub use entity::{Record, StatusTransition};
pub use error::{CatalogError, CatalogResult};
pub use events::{EventBus, RecordChange, StoreEvent};
pub use field::FieldValue;
pub use filter::{FilterCriteria, FilterSchema};
pub use selection::SelectionSet;
pub use service::{CollectionStore, DeleteReport};
pub use sort::SortConfig;
pub use store::QueryableStore;
