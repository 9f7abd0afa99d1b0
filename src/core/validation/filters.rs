//! Reusable field filters
//!
//! These filters transform record field values before validation

use serde_json::Value;

/// Filter: trim whitespace from string
pub fn trim() -> impl Fn(Value) -> Value + Send + Sync + Clone {
    |value: Value| match value {
        Value::String(s) => Value::String(s.trim().to_string()),
        other => other,
    }
}

/// Filter: convert string to uppercase
pub fn uppercase() -> impl Fn(Value) -> Value + Send + Sync + Clone {
    |value: Value| match value {
        Value::String(s) => Value::String(s.to_uppercase()),
        other => other,
    }
}

/// Filter: convert string to lowercase
pub fn lowercase() -> impl Fn(Value) -> Value + Send + Sync + Clone {
    |value: Value| match value {
        Value::String(s) => Value::String(s.to_lowercase()),
        other => other,
    }
}

/// Filter: drop blank entries and duplicates from a list of strings
pub fn dedup_list() -> impl Fn(Value) -> Value + Send + Sync + Clone {
    |value: Value| match value {
        Value::Array(items) => {
            let mut kept: Vec<Value> = Vec::with_capacity(items.len());
            for item in items {
                let blank = item.as_str().is_some_and(|s| s.trim().is_empty());
                if !blank && !kept.contains(&item) {
                    kept.push(item);
                }
            }
            Value::Array(kept)
        }
        other => other,
    }
}

/// Filter: round number to specified decimal places
pub fn round_decimals(decimals: u32) -> impl Fn(Value) -> Value + Send + Sync + Clone {
    move |value: Value| match value.as_f64() {
        Some(num) if value.is_f64() => {
            let factor = 10_f64.powi(decimals as i32);
            let rounded = (num * factor).round() / factor;
            serde_json::json!(rounded)
        }
        _ => value,
    }
}
