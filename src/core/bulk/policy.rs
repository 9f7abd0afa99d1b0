//! Configurable policies for bulk actions

use crate::core::bulk::action::BulkActionKind;
use crate::core::error::{CatalogResult, StorageError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Which actions a collection offers and how they are gated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkPolicy {
    /// Actions offered on the collection
    #[serde(default = "BulkActionKind::all")]
    pub actions: Vec<BulkActionKind>,

    /// Ask for confirmation before read-only actions too
    #[serde(default)]
    pub confirm_read_only: bool,
}

impl Default for BulkPolicy {
    fn default() -> Self {
        Self {
            actions: BulkActionKind::all(),
            confirm_read_only: false,
        }
    }
}

impl BulkPolicy {
    /// Whether the collection offers this action
    pub fn allows(&self, kind: BulkActionKind) -> bool {
        self.actions.contains(&kind)
    }

    /// Destructive and status-changing actions always need confirmation
    pub fn requires_confirmation(&self, kind: BulkActionKind) -> bool {
        kind.is_mutating() || self.confirm_read_only
    }
}

/// How duplicates derive their natural key and display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicatePolicy {
    #[serde(default = "default_key_suffix")]
    pub key_suffix: String,

    #[serde(default = "default_name_suffix")]
    pub name_suffix: Option<String>,
}

fn default_key_suffix() -> String {
    "-COPY".to_string()
}

fn default_name_suffix() -> Option<String> {
    Some(" (Copy)".to_string())
}

impl Default for DuplicatePolicy {
    fn default() -> Self {
        Self {
            key_suffix: default_key_suffix(),
            name_suffix: default_name_suffix(),
        }
    }
}

impl DuplicatePolicy {
    /// First key of the form `<key><suffix>`, `<key><suffix>-2`, `-3`, ... not in `taken`
    pub fn derive_key(&self, source: &str, taken: &HashSet<String>) -> String {
        let base = format!("{}{}", source, self.key_suffix);
        if !taken.contains(&base) {
            return base;
        }
        (2..)
            .map(|n| format!("{}-{}", base, n))
            .find(|candidate| !taken.contains(candidate))
            .unwrap_or(base)
    }

    /// Display name of the copy
    pub fn derive_name(&self, source: &str) -> String {
        match &self.name_suffix {
            Some(suffix) => format!("{}{}", source, suffix),
            None => source.to_string(),
        }
    }
}

/// Serialization format of exports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Yaml,
}

impl ExportFormat {
    pub fn file_extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Yaml => "yaml",
        }
    }

    /// Render records in this format (pretty JSON or YAML)
    pub fn render<T: Serialize>(self, resource: &str, records: &[T]) -> CatalogResult<String> {
        let rendered = match self {
            ExportFormat::Json => serde_json::to_string_pretty(records).map_err(|e| e.to_string()),
            ExportFormat::Yaml => serde_yaml::to_string(records).map_err(|e| e.to_string()),
        };
        rendered.map_err(|message| {
            StorageError::Serialization {
                resource: resource.to_string(),
                message,
            }
            .into()
        })
    }
}

/// A rendered, read-only export of some records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSnapshot {
    pub format: ExportFormat,
    pub resource: String,
    pub exported_at: DateTime<Utc>,
    pub record_count: usize,
    pub payload: String,
}

impl ExportSnapshot {
    /// Render `records` and stamp the snapshot with the current time
    pub fn render<T: Serialize>(
        format: ExportFormat,
        resource: &str,
        records: &[T],
    ) -> CatalogResult<Self> {
        Ok(Self {
            format,
            resource: resource.to_string(),
            exported_at: Utc::now(),
            record_count: records.len(),
            payload: format.render(resource, records)?,
        })
    }

    /// Suggested file name, e.g. `products-20250102-103000.json`
    pub fn file_name(&self) -> String {
        format!(
            "{}-{}.{}",
            self.resource,
            self.exported_at.format("%Y%m%d-%H%M%S"),
            self.format.file_extension()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_derive_key_counts_up() {
        let policy = DuplicatePolicy::default();
        let mut taken: HashSet<String> = ["TSH001".to_string()].into_iter().collect();

        let first = policy.derive_key("TSH001", &taken);
        assert_eq!(first, "TSH001-COPY");
        taken.insert(first);

        let second = policy.derive_key("TSH001", &taken);
        assert_eq!(second, "TSH001-COPY-2");
        taken.insert(second);

        assert_eq!(policy.derive_key("TSH001", &taken), "TSH001-COPY-3");
    }

    #[test]
    fn test_derive_name() {
        let policy = DuplicatePolicy::default();
        assert_eq!(policy.derive_name("Polo"), "Polo (Copy)");

        let policy = DuplicatePolicy {
            key_suffix: "-DUP".to_string(),
            name_suffix: None,
        };
        assert_eq!(policy.derive_name("Polo"), "Polo");
    }

    #[test]
    fn test_policy_defaults_from_yaml() {
        let policy: BulkPolicy = serde_yaml::from_str("confirm_read_only: true").unwrap();
        assert_eq!(policy.actions.len(), 5);
        assert!(policy.requires_confirmation(BulkActionKind::Export));

        let policy = BulkPolicy::default();
        assert!(!policy.requires_confirmation(BulkActionKind::Export));
        assert!(policy.requires_confirmation(BulkActionKind::Activate));

        let duplicate: DuplicatePolicy = serde_yaml::from_str("{}").unwrap();
        assert_eq!(duplicate, DuplicatePolicy::default());
    }

    #[test]
    fn test_export_snapshot_json_and_yaml() {
        let records = vec![json!({"sku": "A"}), json!({"sku": "B"})];

        let snapshot = ExportSnapshot::render(ExportFormat::Json, "products", &records).unwrap();
        assert_eq!(snapshot.record_count, 2);
        let parsed: serde_json::Value = serde_json::from_str(&snapshot.payload).unwrap();
        assert_eq!(parsed[1]["sku"], "B");
        assert!(snapshot.file_name().ends_with(".json"));

        let snapshot = ExportSnapshot::render(ExportFormat::Yaml, "products", &records).unwrap();
        assert!(snapshot.payload.contains("sku: A"));
        assert!(snapshot.file_name().starts_with("products-"));
    }
}
