//! Reusable field validators
//!
//! Each validator receives the field name and its current value and returns
//! an error message when the value is rejected.

use crate::core::field::FieldValue;
use regex::Regex;
use std::sync::OnceLock;

/// Validator: field is present and not blank
pub fn required() -> impl Fn(&str, &FieldValue) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &FieldValue| {
        if value.is_empty() {
            Err(format!("'{}' is required", field))
        } else {
            Ok(())
        }
    }
}

/// Validator: number must be strictly positive
pub fn positive() -> impl Fn(&str, &FieldValue) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &FieldValue| match value.as_f64() {
        Some(num) if num > 0.0 => Ok(()),
        Some(num) => Err(format!("'{}' must be positive (got {})", field, num)),
        None => Err(format!("'{}' must be a number", field)),
    }
}

/// Validator: list must hold at least one item
pub fn non_empty_list() -> impl Fn(&str, &FieldValue) -> Result<(), String> + Send + Sync + Clone
{
    |field: &str, value: &FieldValue| match value.as_list() {
        Some(items) if !items.is_empty() => Ok(()),
        _ => Err(format!("At least one '{}' must be selected", field)),
    }
}

/// Validator: string length must be within range
pub fn string_length(
    min: usize,
    max: usize,
) -> impl Fn(&str, &FieldValue) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &FieldValue| {
        let Some(s) = value.as_string() else {
            return Ok(());
        };
        let len = s.chars().count();
        if len < min {
            Err(format!(
                "'{}' must be at least {} characters (currently {})",
                field, min, len
            ))
        } else if len > max {
            Err(format!(
                "'{}' must be at most {} characters (currently {})",
                field, max, len
            ))
        } else {
            Ok(())
        }
    }
}

/// Validator: every string (or every list item) matches the pattern
pub fn matches(
    pattern: &'static Regex,
    description: &'static str,
) -> impl Fn(&str, &FieldValue) -> Result<(), String> + Send + Sync + Clone {
    move |field: &str, value: &FieldValue| {
        let bad: Vec<String> = match value {
            FieldValue::List(items) => items
                .iter()
                .map(FieldValue::to_text)
                .filter(|item| !pattern.is_match(item))
                .collect(),
            FieldValue::String(s) if !pattern.is_match(s) => vec![s.clone()],
            _ => Vec::new(),
        };
        if bad.is_empty() {
            Ok(())
        } else {
            Err(format!(
                "'{}' must be {} (invalid: {})",
                field,
                description,
                bad.join(", ")
            ))
        }
    }
}

/// Pattern for `#RRGGBB` color codes
pub fn hex_color() -> &'static Regex {
    static HEX_COLOR_REGEX: OnceLock<Regex> = OnceLock::new();
    HEX_COLOR_REGEX.get_or_init(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_rejects_blank() {
        let v = required();
        assert!(v("sku", &FieldValue::from("TSH001")).is_ok());
        assert!(v("sku", &FieldValue::from("   ")).is_err());
        assert!(v("sku", &FieldValue::Null).is_err());
        assert!(v("sizes", &FieldValue::List(vec![])).is_err());
    }

    #[test]
    fn test_positive() {
        let v = positive();
        assert!(v("price", &FieldValue::Float(19.99)).is_ok());
        let err = v("price", &FieldValue::Float(0.0)).unwrap_err();
        assert!(err.contains("positive"));
        assert!(v("price", &FieldValue::from("free")).is_err());
    }

    #[test]
    fn test_non_empty_list() {
        let v = non_empty_list();
        assert!(v("sizes", &FieldValue::list(["M"])).is_ok());
        assert!(v("sizes", &FieldValue::List(vec![])).is_err());
        assert!(v("sizes", &FieldValue::Null).is_err());
    }

    #[test]
    fn test_string_length() {
        let v = string_length(2, 5);
        assert!(v("fit", &FieldValue::from("slim")).is_ok());
        assert!(v("fit", &FieldValue::from("x")).is_err());
        assert!(v("fit", &FieldValue::from("regular")).is_err());
        assert!(v("fit", &FieldValue::Integer(3)).is_ok());
    }

    #[test]
    fn test_matches_hex_colors() {
        let v = matches(hex_color(), "a #RRGGBB color");
        assert!(v("colors", &FieldValue::list(["#FFFFFF", "#00ff00"])).is_ok());
        let err = v("colors", &FieldValue::list(["#FFFFFF", "white"])).unwrap_err();
        assert!(err.contains("white"));
        assert!(!err.contains("#FFFFFF"));
    }
}
