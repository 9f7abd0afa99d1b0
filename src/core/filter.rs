//! Filter criteria and the predicate compiler
//!
//! A [`FilterSchema`] names the filterable keys of one collection and what
//! each key means. [`FilterCriteria`] holds the user's current input for
//! every one of those keys, and [`FilterSchema::compile`] turns the pair into
//! a [`CompiledFilter`] that ANDs one clause per non-empty criterion.
//!
//! # Example
//! ```rust,ignore
//! let schema = FilterSchema::new(vec![
//!     FilterField::search("search", ["name", "sku"]),
//!     FilterField::equals("status", "status"),
//!     FilterField::min("min_price", "price"),
//!     FilterField::max("max_price", "price"),
//! ]);
//!
//! let mut criteria = schema.empty_criteria();
//! criteria.set("status", "active")?;
//! criteria.set("min_price", "15")?;
//!
//! let visible = schema.compile(&criteria).apply(store.all()?);
//! ```

use crate::core::entity::Record;
use crate::core::error::ValidationError;
use crate::core::field::{DateEdge, FieldValue, parse_date, parse_number};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What a filter key constrains
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FilterKind {
    /// Case-insensitive substring match against any of the fields
    Search { fields: Vec<String> },
    /// Exact equality, or membership when the field is a list
    Equals {
        field: String,
        #[serde(default)]
        case_insensitive: bool,
    },
    /// Field must be greater than or equal to the bound
    Min { field: String },
    /// Field must be less than or equal to the bound
    Max { field: String },
}

/// One filterable key of a collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterField {
    /// Criteria key (e.g., "min_price")
    pub key: String,

    /// Semantics of the key
    #[serde(flatten)]
    pub kind: FilterKind,

    /// Value meaning "no constraint" besides the empty string (e.g., "all")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wildcard: Option<String>,
}

impl FilterField {
    /// Search across several fields
    pub fn search<I, S>(key: &str, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            key,
            FilterKind::Search {
                fields: fields.into_iter().map(Into::into).collect(),
            },
        )
    }

    /// Case-sensitive equality / membership
    pub fn equals(key: &str, field: &str) -> Self {
        Self::new(
            key,
            FilterKind::Equals {
                field: field.to_string(),
                case_insensitive: false,
            },
        )
    }

    /// Lower bound
    pub fn min(key: &str, field: &str) -> Self {
        Self::new(
            key,
            FilterKind::Min {
                field: field.to_string(),
            },
        )
    }

    /// Upper bound
    pub fn max(key: &str, field: &str) -> Self {
        Self::new(
            key,
            FilterKind::Max {
                field: field.to_string(),
            },
        )
    }

    fn new(key: &str, kind: FilterKind) -> Self {
        Self {
            key: key.to_string(),
            kind,
            wildcard: None,
        }
    }

    /// Compare case-insensitively (only meaningful for equality)
    pub fn case_insensitive(mut self) -> Self {
        if let FilterKind::Equals {
            case_insensitive, ..
        } = &mut self.kind
        {
            *case_insensitive = true;
        }
        self
    }

    /// Treat `wildcard` like an empty value
    pub fn with_wildcard(mut self, wildcard: &str) -> Self {
        self.wildcard = Some(wildcard.to_string());
        self
    }

    /// Whether `value` leaves this key unconstrained
    pub fn is_unconstrained(&self, value: &str) -> bool {
        let trimmed = value.trim();
        trimmed.is_empty() || self.wildcard.as_deref() == Some(trimmed)
    }
}

/// Current filter input: every schema key is present, possibly empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterCriteria {
    values: IndexMap<String, String>,
}

impl FilterCriteria {
    /// Set the value for a known key
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<(), ValidationError> {
        match self.values.get_mut(key) {
            Some(slot) => {
                *slot = value.into();
                Ok(())
            }
            None => Err(ValidationError::UnknownFilterKey {
                key: key.to_string(),
            }),
        }
    }

    /// Reset a key to "no constraint"
    pub fn clear(&mut self, key: &str) -> Result<(), ValidationError> {
        self.set(key, String::new())
    }

    /// Reset every key to "no constraint"
    pub fn clear_all(&mut self) {
        for value in self.values.values_mut() {
            value.clear();
        }
    }

    /// Current value of a key (empty for unknown keys)
    pub fn get(&self, key: &str) -> &str {
        self.values.get(key).map(String::as_str).unwrap_or("")
    }

    /// Iterate keys and values in schema order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Whether every value is blank
    pub fn is_empty(&self) -> bool {
        self.values.values().all(|v| v.trim().is_empty())
    }
}

/// Ordered list of the filterable keys of a collection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSchema {
    fields: Vec<FilterField>,
}

impl FilterSchema {
    /// Create a schema from its fields
    pub fn new(fields: Vec<FilterField>) -> Self {
        Self { fields }
    }

    /// The schema's fields in order
    pub fn fields(&self) -> &[FilterField] {
        &self.fields
    }

    /// Look up a field by key
    pub fn field(&self, key: &str) -> Option<&FilterField> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// Criteria with every key present and empty
    pub fn empty_criteria(&self) -> FilterCriteria {
        FilterCriteria {
            values: self
                .fields
                .iter()
                .map(|f| (f.key.clone(), String::new()))
                .collect(),
        }
    }

    /// Build criteria from a JSON object such as `{"status": "active", "min_price": 10}`
    ///
    /// Numbers and booleans are stringified; `null` clears the key.
    pub fn criteria_from_json(&self, filter: &Value) -> Result<FilterCriteria, ValidationError> {
        let object = filter
            .as_object()
            .ok_or_else(|| ValidationError::InvalidFilter {
                message: "expected a JSON object".to_string(),
            })?;

        let mut criteria = self.empty_criteria();
        for (key, value) in object {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null => String::new(),
                _ => {
                    return Err(ValidationError::InvalidFilter {
                        message: format!("value for '{}' must be a scalar", key),
                    });
                }
            };
            criteria.set(key, text)?;
        }
        Ok(criteria)
    }

    /// Whether any criterion actually constrains the result
    pub fn has_active_filters(&self, criteria: &FilterCriteria) -> bool {
        self.fields
            .iter()
            .any(|f| !f.is_unconstrained(criteria.get(&f.key)))
    }

    /// Compile criteria into one predicate
    ///
    /// Blank and wildcard values add no clause. Bounds that parse neither as
    /// a number nor as a date are dropped. A date bound leaves numeric
    /// fields unconstrained.
    pub fn compile(&self, criteria: &FilterCriteria) -> CompiledFilter {
        let mut clauses = Vec::new();

        for field in &self.fields {
            let raw = criteria.get(&field.key);
            if field.is_unconstrained(raw) {
                continue;
            }
            let value = raw.trim();

            let clause = match &field.kind {
                FilterKind::Search { fields } => Some(Clause::Search {
                    fields: fields.clone(),
                    needle: value.to_lowercase(),
                }),
                FilterKind::Equals {
                    field,
                    case_insensitive,
                } => Some(Clause::Equals {
                    field: field.clone(),
                    expected: value.to_string(),
                    case_insensitive: *case_insensitive,
                }),
                FilterKind::Min { field } => {
                    Bound::parse(value, DateEdge::Start).map(|bound| Clause::AtLeast {
                        field: field.clone(),
                        bound,
                    })
                }
                FilterKind::Max { field } => {
                    Bound::parse(value, DateEdge::End).map(|bound| Clause::AtMost {
                        field: field.clone(),
                        bound,
                    })
                }
            };

            match clause {
                Some(clause) => clauses.push(clause),
                None => tracing::debug!(
                    key = %field.key,
                    value = %value,
                    "ignoring unparsable filter bound"
                ),
            }
        }

        CompiledFilter { clauses }
    }
}

/// A parsed range bound
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    Number(f64),
    Instant(DateTime<Utc>),
}

impl Bound {
    /// Numbers first, then dates; anything else is no bound at all
    pub fn parse(input: &str, edge: DateEdge) -> Option<Self> {
        parse_number(input)
            .map(Bound::Number)
            .or_else(|| parse_date(input, edge).map(Bound::Instant))
    }

    fn satisfied_by(&self, value: &FieldValue, at_least: bool) -> bool {
        match self {
            Bound::Number(bound) => match value.as_f64() {
                Some(n) if at_least => n >= *bound,
                Some(n) => n <= *bound,
                None => false,
            },
            Bound::Instant(bound) => match value.as_datetime() {
                Some(dt) if at_least => dt >= *bound,
                Some(dt) => dt <= *bound,
                // A date typed against a numeric field does not constrain it
                None => matches!(value, FieldValue::Integer(_) | FieldValue::Float(_)),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Clause {
    Search {
        fields: Vec<String>,
        needle: String,
    },
    Equals {
        field: String,
        expected: String,
        case_insensitive: bool,
    },
    AtLeast {
        field: String,
        bound: Bound,
    },
    AtMost {
        field: String,
        bound: Bound,
    },
}

impl Clause {
    fn matches<T: Record>(&self, record: &T) -> bool {
        match self {
            Clause::Search { fields, needle } => fields.iter().any(|f| {
                record
                    .field_value(f)
                    .is_some_and(|value| value.contains_text(needle))
            }),
            Clause::Equals {
                field,
                expected,
                case_insensitive,
            } => record
                .field_value(field)
                .is_some_and(|value| value.equals_text(expected, *case_insensitive)),
            Clause::AtLeast { field, bound } => record
                .field_value(field)
                .is_some_and(|value| bound.satisfied_by(&value, true)),
            Clause::AtMost { field, bound } => record
                .field_value(field)
                .is_some_and(|value| bound.satisfied_by(&value, false)),
        }
    }
}

/// Conjunction of the clauses compiled from one criteria snapshot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledFilter {
    clauses: Vec<Clause>,
}

impl CompiledFilter {
    /// Number of active clauses
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// True when nothing is constrained
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Whether a record satisfies every clause
    pub fn matches<T: Record>(&self, record: &T) -> bool {
        self.clauses.iter().all(|clause| clause.matches(record))
    }

    /// Keep matching records, preserving input order
    pub fn apply<T: Record>(&self, records: Vec<T>) -> Vec<T> {
        if self.is_empty() {
            return records;
        }
        records.into_iter().filter(|r| self.matches(r)).collect()
    }

    /// Turn the filter into a standalone predicate
    pub fn into_predicate<T: Record>(self) -> Box<dyn Fn(&T) -> bool + Send + Sync> {
        Box::new(move |record: &T| self.matches(record))
    }
}
