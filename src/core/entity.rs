//! Record trait defining the core abstraction for every catalog entity

use crate::core::field::FieldValue;
use crate::core::validation::RecordRules;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use uuid::Uuid;

/// Status transitions a bulk action can request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusTransition {
    Activate,
    Deactivate,
}

impl fmt::Display for StatusTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusTransition::Activate => write!(f, "activate"),
            StatusTransition::Deactivate => write!(f, "deactivate"),
        }
    }
}

/// Base trait for all records held by a collection store.
///
/// A record has:
/// - id: unique identifier, assigned at creation and never changed
/// - status: an enumerated lifecycle state
/// - named fields, reachable dynamically through [`Record::field_value`]
///
/// Records round-trip through JSON so stores can merge patches and derive
/// duplicates without knowing the concrete type.
pub trait Record: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// The plural resource name (e.g., "products", "sessions")
    fn resource_name() -> &'static str;

    // === Core Record Fields ===

    /// Get the unique identifier for this record
    fn id(&self) -> Uuid;

    /// Replace the identifier. Only stores call this, before insertion.
    fn set_id(&mut self, id: Uuid);

    /// Get the record status as its wire string
    ///
    /// Status must serialize under the `status` key: transitions are applied
    /// as a `{"status": ...}` patch.
    fn status(&self) -> &str;

    /// Get the value of a specific field by name
    fn field_value(&self, field: &str) -> Option<FieldValue>;

    // === Capabilities ===

    /// Field holding the human-facing unique key (e.g., "sku")
    ///
    /// Records without one cannot be duplicated.
    fn natural_key_field() -> Option<&'static str> {
        None
    }

    /// Field holding the display name, suffixed on duplicates
    fn display_name_field() -> Option<&'static str> {
        None
    }

    /// Status string a transition moves a record to, if supported
    fn status_for(_transition: StatusTransition) -> Option<&'static str> {
        None
    }

    // === Lifecycle Hooks ===

    /// Called by the store right before a record is inserted
    fn on_create(&mut self) {}

    /// Called by the store after a patch has been merged
    fn on_update(&mut self) {}

    /// Normalizers and validators the store runs on every create and update
    fn rules() -> Option<&'static RecordRules> {
        None
    }

    // === Utility Methods ===

    /// Natural key value, when the record type defines one
    fn natural_key(&self) -> Option<String> {
        Self::natural_key_field()
            .and_then(|field| self.field_value(field))
            .map(|value| value.to_text())
    }

    /// Whether the record is in the state `activate` moves it to
    fn is_active(&self) -> bool {
        Self::status_for(StatusTransition::Activate) == Some(self.status())
    }
}
