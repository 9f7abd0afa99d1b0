//! Typed error handling for the catalog engine
//!
//! Single-record store operations raise these errors to their caller. Bulk
//! operations never raise for per-target failures; those are aggregated into a
//! [`BulkOutcome`](crate::core::bulk::BulkOutcome) instead.
//!
//! # Error Categories
//!
//! - [`CatalogError::NotFound`]: a mutation referenced an unknown id
//! - [`CatalogError::DuplicateId`]: a create collided with an existing id
//! - [`ValidationError`]: malformed input, unknown keys, empty selection, rule violations
//! - [`StorageError`]: lock poisoning and (de)serialization failures
//! - [`ConfigError`]: invalid collection configuration
//!
//! # Example
//!
//! ```rust,ignore
//! match store.update(&id, &json!({"price": 12.5})) {
//!     Ok(product) => println!("updated {}", product.sku),
//!     Err(CatalogError::NotFound { id, .. }) => println!("{} is gone", id),
//!     Err(e) => eprintln!("{}", e.to_response().message),
//! }
//! ```

use serde::Serialize;
use uuid::Uuid;

/// The main error type for the catalog engine
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Mutation referenced an id the store does not hold
    #[error("{resource} with id '{id}' not found")]
    NotFound { resource: String, id: Uuid },

    /// Create collided with an existing id
    #[error("{resource} with id '{id}' already exists")]
    DuplicateId { resource: String, id: Uuid },

    /// Malformed input or a rule violation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Storage backend errors
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Internal errors (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response structure handed to the UI layer
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl CatalogError {
    /// Build a `NotFound` error for the given resource name
    pub fn not_found(resource: &str, id: Uuid) -> Self {
        CatalogError::NotFound {
            resource: resource.to_string(),
            id,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            CatalogError::NotFound { .. } => "RECORD_NOT_FOUND",
            CatalogError::DuplicateId { .. } => "DUPLICATE_ID",
            CatalogError::Validation(e) => e.error_code(),
            CatalogError::Storage(_) => "STORAGE_ERROR",
            CatalogError::Config(_) => "CONFIG_ERROR",
            CatalogError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether this error means the referenced record does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::NotFound { .. })
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            CatalogError::NotFound { resource, id } | CatalogError::DuplicateId { resource, id } => {
                Some(serde_json::json!({
                    "resource": resource,
                    "id": id.to_string()
                }))
            }
            CatalogError::Validation(ValidationError::FieldErrors(errors)) => {
                Some(serde_json::json!({ "fields": errors }))
            }
            _ => None,
        }
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// A single field-level validation error
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FieldValidationError {
    /// Field name that failed validation
    pub field: String,
    /// Error message
    pub message: String,
}

/// Errors related to input validation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// One or more record fields violate their rules
    #[error("Validation failed: {}", format_field_errors(.0))]
    FieldErrors(Vec<FieldValidationError>),

    /// Criteria referenced a key the filter schema does not define
    #[error("Unknown filter key '{key}'")]
    UnknownFilterKey { key: String },

    /// Sort requested on a key that is not sortable
    #[error("Unknown sort key '{key}'")]
    UnknownSortKey { key: String },

    /// Sort expression could not be parsed
    #[error("Invalid sort expression '{expression}': {message}")]
    InvalidSort { expression: String, message: String },

    /// Filter input was not a JSON object of scalar values
    #[error("Invalid filter input: {message}")]
    InvalidFilter { message: String },

    /// Patch tried to change a field that is fixed at creation
    #[error("Field '{field}' cannot be changed once the record exists")]
    ImmutableField { field: String },

    /// Patch was not an object or did not produce a valid record
    #[error("Invalid patch: {message}")]
    InvalidPatch { message: String },

    /// Bulk action requested with nothing selected
    #[error("Select at least one record before running '{kind}'")]
    EmptySelection { kind: String },

    /// The record type cannot perform this bulk action
    #[error("'{kind}' is not supported for {resource}")]
    UnsupportedAction { kind: String, resource: String },

    /// Another bulk action is still waiting for confirmation
    #[error("'{kind}' is still awaiting confirmation")]
    ActionPending { kind: String },

    /// Confirm was called with no pending action
    #[error("No bulk action is awaiting confirmation")]
    NoPendingAction,

    /// Selection referenced a record that is not in the visible sequence
    #[error("Record '{id}' is not visible")]
    NotVisible { id: Uuid },
}

fn format_field_errors(errors: &[FieldValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}

impl ValidationError {
    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            ValidationError::EmptySelection { .. } => "EMPTY_SELECTION",
            ValidationError::UnsupportedAction { .. } => "UNSUPPORTED_ACTION",
            ValidationError::ActionPending { .. } => "ACTION_PENDING",
            ValidationError::NoPendingAction => "NO_PENDING_ACTION",
            _ => "VALIDATION_ERROR",
        }
    }

    /// Single-field convenience constructor
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        ValidationError::FieldErrors(vec![FieldValidationError {
            field: field.to_string(),
            message: message.into(),
        }])
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors raised by a store implementation
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A lock guarding the record list was poisoned
    #[error("Failed to acquire {kind} lock on {resource}: {message}")]
    Lock {
        resource: String,
        kind: &'static str,
        message: String,
    },

    /// A record could not be converted to or from JSON
    #[error("Failed to serialize/deserialize {resource}: {message}")]
    Serialization { resource: String, message: String },
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to collection configuration
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// Two filter fields share the same key
    #[error("Collection '{collection}' defines filter key '{key}' more than once")]
    DuplicateFilterKey { collection: String, key: String },

    /// The default sort key is not listed as sortable
    #[error("Collection '{collection}' sorts by '{key}' which is not sortable")]
    DefaultSortNotSortable { collection: String, key: String },

    /// Duplicate policy would produce the source key again
    #[error("Collection '{collection}' has an empty duplicate key suffix")]
    EmptyDuplicateSuffix { collection: String },

    /// Collection is not defined
    #[error("Collection '{name}' is not configured")]
    UnknownCollection { name: String },

    /// Progress sequence is malformed
    #[error("Invalid progress sequence: {message}")]
    InvalidSequence { message: String },
}

// =============================================================================
// Conversions
// =============================================================================

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Storage(StorageError::Serialization {
            resource: "record".to_string(),
            message: err.to_string(),
        })
    }
}

impl From<serde_yaml::Error> for CatalogError {
    fn from(err: serde_yaml::Error) -> Self {
        CatalogError::Storage(StorageError::Serialization {
            resource: "record".to_string(),
            message: err.to_string(),
        })
    }
}

/// A specialized Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

// =============================================================================
// Tests
// =============================================================================
