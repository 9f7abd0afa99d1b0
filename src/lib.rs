//! # Catalog Engine
//!
//! The state engine behind catalog administration screens: filterable,
//! sortable record views with multi-select and confirmation-gated bulk
//! actions, generic over the record type.
//!
//! ## Features
//!
//! - **Collection Store**: insertion-ordered CRUD with change notifications
//! - **Filter Compiler**: search, equality, membership and range criteria compiled into one predicate
//! - **Sorting**: numeric-aware, case-insensitive, stable in both directions
//! - **Selection**: first-class selection set, pruned whenever the view changes
//! - **Bulk Actions**: activate, deactivate, delete, duplicate and export with partial-failure reporting
//! - **Progress**: cancellable scheduled-step progress driven by a single timer
//! - **Configuration-Based**: list screens described in YAML
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use catalog::prelude::*;
//!
//! let store = InMemoryCollectionStore::<Product>::new();
//! store.create(
//!     Product::new("TSH001", "Classic White T-Shirt", 19.99)
//!         .with_sizes(["S", "M", "L"])
//!         .with_colors(["#FFFFFF"])
//!         .with_fit("regular")
//!         .with_occasions(["casual"]),
//! )?;
//!
//! let config = CatalogConfig::default_config();
//! let mut view = CatalogView::new(store.clone(), config.collection("products")?.clone())?;
//!
//! view.set_filter("search", "shirt")?;
//! view.select_all();
//! view.submit_bulk_action(BulkActionKind::Duplicate)?;
//! let outcome = view.confirm_bulk_action()?;
//! ```

pub mod config;
pub mod core;
pub mod entities;
pub mod storage;
pub mod view;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core Traits ===
    pub use crate::core::{
        entity::{Record, StatusTransition},
        field::FieldValue,
        service::{CollectionStore, DeleteReport},
        store::QueryableStore,
    };

    // === Querying ===
    pub use crate::core::{
        filter::{CompiledFilter, FilterCriteria, FilterField, FilterKind, FilterSchema},
        selection::SelectionSet,
        sort::{SortConfig, SortDirection},
    };

    // === Bulk Actions ===
    pub use crate::core::bulk::{
        BulkActionKind, BulkActionOrchestrator, BulkOutcome, BulkPolicy, BulkState,
        ConfirmationPrompt, DuplicatePolicy, ExportFormat, ExportSnapshot, PendingBulkAction,
        Submission,
    };

    // === Progress ===
    pub use crate::core::progress::{
        ProgressHandle, ProgressMachine, ProgressPhase, ProgressRunner, ProgressSequence,
        ProgressSnapshot, TickOutcome,
    };

    // === Errors and Events ===
    pub use crate::core::error::{
        CatalogError, CatalogResult, ConfigError, StorageError, ValidationError,
    };
    pub use crate::core::events::{RecordChange, StoreEvent};

    // === Validation ===
    pub use crate::core::validation::{RecordRules, filters, validators};

    // === Macros ===
    pub use crate::{impl_record, impl_status};

    // === Records ===
    pub use crate::entities::{
        Product, ProductStatus, ProductSummary, Session, SessionStatus, TopMatch,
    };

    // === Storage ===
    #[cfg(feature = "in-memory")]
    pub use crate::storage::InMemoryCollectionStore;

    // === Config and View ===
    pub use crate::config::{CatalogConfig, CollectionConfig};
    pub use crate::view::CatalogView;

    // === External dependencies ===
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use uuid::Uuid;
}
