//! Configuration loading and management
//!
//! A [`CatalogConfig`] describes every list screen: which keys can be
//! filtered and what they mean, which fields are sortable, and the policies
//! of the bulk actions. Progress sequences are configured here as well.

use crate::core::bulk::{BulkActionKind, BulkPolicy, DuplicatePolicy, ExportFormat};
use crate::core::error::ConfigError;
use crate::core::filter::{FilterField, FilterSchema};
use crate::core::progress::ProgressSequence;
use crate::core::sort::SortConfig;
use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Configuration of one list screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Resource name of the records (e.g., "products")
    pub name: String,

    /// Filterable keys, in display order
    #[serde(default)]
    pub filters: FilterSchema,

    /// Sortable fields; empty means any field
    #[serde(default)]
    pub sortable: Vec<String>,

    /// Sort applied when the screen opens
    #[serde(default)]
    pub default_sort: Option<SortConfig>,

    #[serde(default)]
    pub duplicate: DuplicatePolicy,

    #[serde(default)]
    pub export: ExportFormat,

    #[serde(default)]
    pub bulk: BulkPolicy,
}

impl CollectionConfig {
    /// Minimal configuration: no filters, everything sortable, default policies
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            filters: FilterSchema::default(),
            sortable: Vec::new(),
            default_sort: None,
            duplicate: DuplicatePolicy::default(),
            export: ExportFormat::default(),
            bulk: BulkPolicy::default(),
        }
    }

    pub fn is_sortable(&self, key: &str) -> bool {
        self.sortable.is_empty() || self.sortable.iter().any(|k| k == key)
    }

    /// Initial sort: the configured default, else the first sortable key, else `id`
    pub fn initial_sort(&self) -> SortConfig {
        self.default_sort.clone().unwrap_or_else(|| {
            SortConfig::asc(self.sortable.first().map(String::as_str).unwrap_or("id"))
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for field in self.filters.fields() {
            if !seen.insert(field.key.as_str()) {
                return Err(ConfigError::DuplicateFilterKey {
                    collection: self.name.clone(),
                    key: field.key.clone(),
                });
            }
        }

        if let Some(sort) = &self.default_sort {
            if !self.is_sortable(&sort.key) {
                return Err(ConfigError::DefaultSortNotSortable {
                    collection: self.name.clone(),
                    key: sort.key.clone(),
                });
            }
        }

        if self.duplicate.key_suffix.is_empty() {
            return Err(ConfigError::EmptyDuplicateSuffix {
                collection: self.name.clone(),
            });
        }

        Ok(())
    }
}

/// Complete configuration of the catalog console
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// One entry per list screen
    pub collections: Vec<CollectionConfig>,

    /// Named progress sequences
    #[serde(default)]
    pub sequences: IndexMap<String, ProgressSequence>,
}

impl CatalogConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every collection and sequence
    pub fn validate(&self) -> Result<(), ConfigError> {
        for collection in &self.collections {
            collection.validate()?;
        }
        for sequence in self.sequences.values() {
            sequence.validate()?;
        }
        Ok(())
    }

    /// Look up a collection by resource name
    pub fn collection(&self, name: &str) -> Result<&CollectionConfig, ConfigError> {
        self.collections
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| ConfigError::UnknownCollection {
                name: name.to_string(),
            })
    }

    /// Look up a progress sequence by name
    pub fn sequence(&self, name: &str) -> Option<&ProgressSequence> {
        self.sequences.get(name)
    }

    /// Combine two configurations; collections and sequences of `other` win on name clashes
    pub fn merge(mut self, other: CatalogConfig) -> Self {
        for collection in other.collections {
            match self.collections.iter_mut().find(|c| c.name == collection.name) {
                Some(existing) => *existing = collection,
                None => self.collections.push(collection),
            }
        }
        self.sequences.extend(other.sequences);
        self
    }

    /// Configuration of the products and sessions screens
    pub fn default_config() -> Self {
        let products = CollectionConfig {
            name: "products".to_string(),
            filters: FilterSchema::new(vec![
                FilterField::search("search", ["name", "sku"]),
                FilterField::equals("status", "status").with_wildcard("all"),
                FilterField::equals("occasion", "occasions").with_wildcard("all"),
                FilterField::equals("category", "occasions").with_wildcard("all"),
                FilterField::equals("fit", "fit")
                    .case_insensitive()
                    .with_wildcard("all"),
                FilterField::min("min_price", "price"),
                FilterField::max("max_price", "price"),
            ]),
            sortable: ["sku", "name", "price", "status", "created_at", "updated_at"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            default_sort: Some(SortConfig::asc("name")),
            duplicate: DuplicatePolicy::default(),
            export: ExportFormat::Json,
            bulk: BulkPolicy::default(),
        };

        let sessions = CollectionConfig {
            name: "sessions".to_string(),
            filters: FilterSchema::new(vec![
                FilterField::search("search", ["occasion", "upload_date"]),
                FilterField::equals("occasion", "occasion")
                    .case_insensitive()
                    .with_wildcard("all"),
                FilterField::equals("status", "status").with_wildcard("all"),
                FilterField::min("date_from", "upload_date"),
                FilterField::max("date_to", "upload_date"),
            ]),
            sortable: ["upload_date", "occasion", "status"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            default_sort: Some(SortConfig::desc("upload_date")),
            duplicate: DuplicatePolicy::default(),
            export: ExportFormat::Json,
            bulk: BulkPolicy {
                actions: vec![BulkActionKind::Delete, BulkActionKind::Export],
                confirm_read_only: false,
            },
        };

        let mut sequences = IndexMap::new();
        sequences.insert("style_analysis".to_string(), ProgressSequence::style_analysis());
        sequences.insert("photo_upload".to_string(), ProgressSequence::photo_upload());

        Self {
            collections: vec![products, sessions],
            sequences,
        }
    }
}
