//! Field value types and coercions
//!
//! Filtering and sorting never look at concrete record structs. They go
//! through [`Record::field_value`](crate::core::entity::Record::field_value)
//! and compare the resulting [`FieldValue`]s using the coercions below.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A polymorphic field value that can hold different types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FieldValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Uuid(Uuid),
    DateTime(DateTime<Utc>),
    List(Vec<FieldValue>),
    Null,
}

impl FieldValue {
    /// Build a list value from anything yielding strings
    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldValue::List(
            items
                .into_iter()
                .map(|s| FieldValue::String(s.into()))
                .collect(),
        )
    }

    /// Get the value as a string if possible
    pub fn as_string(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the value as an integer if possible
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get the value as a UUID if possible
    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            FieldValue::Uuid(u) => Some(*u),
            _ => None,
        }
    }

    /// Get the list items if this is a list
    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Null, blank strings and empty lists count as empty
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::String(s) => s.trim().is_empty(),
            FieldValue::List(items) => items.is_empty(),
            _ => false,
        }
    }

    /// Numeric view of the value
    ///
    /// Strings count when they parse after stripping one leading currency
    /// symbol and thousands separators (`"$1,247.50"` is `1247.5`).
    /// Datetimes are epoch milliseconds.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(i) => Some(*i as f64),
            FieldValue::Float(f) => Some(*f),
            FieldValue::String(s) => parse_number(s),
            FieldValue::DateTime(dt) => Some(dt.timestamp_millis() as f64),
            _ => None,
        }
    }

    /// Date view of the value
    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            FieldValue::DateTime(dt) => Some(*dt),
            FieldValue::String(s) => parse_date(s, DateEdge::Start),
            _ => None,
        }
    }

    /// Text form used by search, equality and text sorting
    pub fn to_text(&self) -> String {
        match self {
            FieldValue::String(s) => s.clone(),
            FieldValue::Integer(i) => i.to_string(),
            FieldValue::Float(f) => f.to_string(),
            FieldValue::Boolean(b) => b.to_string(),
            FieldValue::Uuid(u) => u.to_string(),
            FieldValue::DateTime(dt) => dt.format("%Y-%m-%d").to_string(),
            FieldValue::List(items) => items
                .iter()
                .map(FieldValue::to_text)
                .collect::<Vec<_>>()
                .join(", "),
            FieldValue::Null => String::new(),
        }
    }

    /// Case-insensitive substring match; lists match when any item does
    ///
    /// `needle` must already be lowercase.
    pub fn contains_text(&self, needle: &str) -> bool {
        match self {
            FieldValue::List(items) => items.iter().any(|item| item.contains_text(needle)),
            FieldValue::Null => false,
            other => other.to_text().to_lowercase().contains(needle),
        }
    }

    /// Exact equality against the text form; lists test membership
    pub fn equals_text(&self, expected: &str, case_insensitive: bool) -> bool {
        match self {
            FieldValue::List(items) => items
                .iter()
                .any(|item| item.equals_text(expected, case_insensitive)),
            FieldValue::Null => false,
            FieldValue::Integer(_) | FieldValue::Float(_) => {
                match (self.as_f64(), parse_number(expected)) {
                    (Some(a), Some(b)) => a == b,
                    _ => false,
                }
            }
            other => {
                let text = other.to_text();
                if case_insensitive {
                    text.to_lowercase() == expected.to_lowercase()
                } else {
                    text == expected
                }
            }
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Integer(i64::from(value))
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<Uuid> for FieldValue {
    fn from(value: Uuid) -> Self {
        FieldValue::Uuid(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        FieldValue::list(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::DateTime(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

/// Which end of a day a date-only string resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateEdge {
    Start,
    End,
}

/// Parse a number, tolerating a currency prefix and thousands separators
pub fn parse_number(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    let trimmed = trimmed
        .strip_prefix(&['$', '€', '£'][..])
        .unwrap_or(trimmed)
        .trim_start();
    if trimmed.is_empty() {
        return None;
    }
    let cleaned: String = trimmed.chars().filter(|c| *c != ',').collect();
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parse an RFC 3339 timestamp or a `YYYY-MM-DD` date
///
/// Date-only input resolves to the start or the last millisecond of that day.
pub fn parse_date(input: &str, edge: DateEdge) -> Option<DateTime<Utc>> {
    let trimmed = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok()?;
    let time = match edge {
        DateEdge::Start => NaiveTime::MIN,
        DateEdge::End => NaiveTime::from_hms_milli_opt(23, 59, 59, 999)?,
    };
    Some(Utc.from_utc_datetime(&date.and_time(time)))
}
