//! Sort configuration and the comparator builder
//!
//! Sort expressions follow the `field`, `field:asc`, `field:desc` format.
//! Comparison is numeric when both values coerce to numbers and falls back to
//! case-insensitive text otherwise.

use crate::core::entity::Record;
use crate::core::error::ValidationError;
use crate::core::field::FieldValue;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    #[serde(alias = "ascending")]
    Asc,
    #[serde(alias = "descending")]
    Desc,
}

impl SortDirection {
    /// The opposite direction
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// The single active sort key and its direction
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortConfig {
    pub key: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortConfig {
    /// Ascending sort on `key`
    pub fn asc(key: &str) -> Self {
        Self {
            key: key.to_string(),
            direction: SortDirection::Asc,
        }
    }

    /// Descending sort on `key`
    pub fn desc(key: &str) -> Self {
        Self {
            key: key.to_string(),
            direction: SortDirection::Desc,
        }
    }

    /// Column-header behavior: the same key flips, a new key starts ascending
    pub fn toggle(&mut self, key: &str) {
        if self.key == key {
            self.direction = self.direction.flipped();
        } else {
            *self = Self::asc(key);
        }
    }

    /// Compare two records under this configuration
    pub fn compare<T: Record>(&self, a: &T, b: &T) -> Ordering {
        let natural = compare_by(&self.key, a, b);
        match self.direction {
            SortDirection::Asc => natural,
            SortDirection::Desc => natural.reverse(),
        }
    }

    /// Owned comparator for callers that want to sort themselves
    pub fn comparator<T: Record>(&self) -> impl Fn(&T, &T) -> Ordering + Send + Sync + Clone + use<T> {
        let config = self.clone();
        move |a: &T, b: &T| config.compare(a, b)
    }

    /// Stable sort; equal keys keep their input order in either direction
    pub fn sort<T: Record>(&self, records: &mut [T]) {
        records.sort_by(|a, b| self.compare(a, b));
    }
}

impl fmt::Display for SortConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.key, self.direction.as_str())
    }
}

impl FromStr for SortConfig {
    type Err = ValidationError;

    fn from_str(expression: &str) -> Result<Self, Self::Err> {
        let invalid = |message: &str| ValidationError::InvalidSort {
            expression: expression.to_string(),
            message: message.to_string(),
        };

        let (key, direction) = match expression.trim().split_once(':') {
            Some((key, dir)) => {
                let direction = match dir.trim().to_lowercase().as_str() {
                    "asc" | "ascending" => SortDirection::Asc,
                    "desc" | "descending" => SortDirection::Desc,
                    _ => return Err(invalid("direction must be 'asc' or 'desc'")),
                };
                (key.trim(), direction)
            }
            None => (expression.trim(), SortDirection::Asc),
        };

        if key.is_empty() {
            return Err(invalid("missing field name"));
        }

        Ok(Self {
            key: key.to_string(),
            direction,
        })
    }
}

/// Natural (ascending) ordering of two records on one field
pub fn compare_by<T: Record>(key: &str, a: &T, b: &T) -> Ordering {
    compare_values(a.field_value(key).as_ref(), b.field_value(key).as_ref())
}

/// Numeric when both sides are numeric, lowercase text otherwise
pub fn compare_values(a: Option<&FieldValue>, b: Option<&FieldValue>) -> Ordering {
    let numbers = (a.and_then(FieldValue::as_f64), b.and_then(FieldValue::as_f64));
    if let (Some(x), Some(y)) = numbers {
        return x.partial_cmp(&y).unwrap_or(Ordering::Equal);
    }

    let text = |v: Option<&FieldValue>| v.map(|v| v.to_text().to_lowercase()).unwrap_or_default();
    text(a).cmp(&text(b))
}
