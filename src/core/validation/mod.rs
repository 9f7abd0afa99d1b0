//! Validation and filtering system
//!
//! This module provides a declarative approach to normalizing and validating
//! record data before it reaches a store. A record type exposes its
//! [`RecordRules`] through [`Record::rules`](crate::core::entity::Record::rules);
//! the store runs the filters on the record's JSON form and then checks every
//! validator, reporting all failing fields at once.

pub mod filters;
pub mod validators;

use crate::core::entity::Record;
use crate::core::error::{FieldValidationError, ValidationError};
use crate::core::field::FieldValue;
use serde_json::Value;

type Filter = Box<dyn Fn(Value) -> Value + Send + Sync>;
type Validator = Box<dyn Fn(&str, &FieldValue) -> Result<(), String> + Send + Sync>;

/// Per-field normalizers and validators for one record type
///
/// # Example
/// ```rust,ignore
/// static RULES: OnceLock<RecordRules> = OnceLock::new();
/// RULES.get_or_init(|| {
///     RecordRules::new()
///         .filter("sku", filters::trim())
///         .filter("sku", filters::uppercase())
///         .validate("sku", validators::required())
///         .validate("price", validators::positive())
/// })
/// ```
#[derive(Default)]
pub struct RecordRules {
    filters: Vec<(&'static str, Filter)>,
    validators: Vec<(&'static str, Validator)>,
}

impl RecordRules {
    /// Create an empty rule set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a normalizer for a field (applied in insertion order)
    pub fn filter<F>(mut self, field: &'static str, filter: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.filters.push((field, Box::new(filter)));
        self
    }

    /// Add a validator for a field
    pub fn validate<V>(mut self, field: &'static str, validator: V) -> Self
    where
        V: Fn(&str, &FieldValue) -> Result<(), String> + Send + Sync + 'static,
    {
        self.validators.push((field, Box::new(validator)));
        self
    }

    /// Whether any normalizer is registered
    pub fn has_filters(&self) -> bool {
        !self.filters.is_empty()
    }

    /// Apply every normalizer to the fields of a record's JSON object
    pub fn normalize(&self, mut value: Value) -> Value {
        if let Some(object) = value.as_object_mut() {
            for (field, filter) in &self.filters {
                if let Some(slot) = object.get_mut(*field) {
                    let current = slot.take();
                    *slot = filter(current);
                }
            }
        }
        value
    }

    /// Run every validator and collect all failures
    pub fn check<T: Record>(&self, record: &T) -> Result<(), ValidationError> {
        let mut errors: Vec<FieldValidationError> = Vec::new();
        for (field, validator) in &self.validators {
            // Fields already rejected keep only their first message
            if errors.iter().any(|e| e.field == *field) {
                continue;
            }
            let value = record.field_value(field).unwrap_or(FieldValue::Null);
            if let Err(message) = validator(field, &value) {
                errors.push(FieldValidationError {
                    field: field.to_string(),
                    message,
                });
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::FieldErrors(errors))
        }
    }
}

impl std::fmt::Debug for RecordRules {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordRules")
            .field(
                "filters",
                &self.filters.iter().map(|(k, _)| *k).collect::<Vec<_>>(),
            )
            .field(
                "validators",
                &self.validators.iter().map(|(k, _)| *k).collect::<Vec<_>>(),
            )
            .finish()
    }
}
