//! Bulk action kinds, pending actions and outcomes

use crate::core::bulk::policy::ExportSnapshot;
use crate::core::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Actions that apply to every selected record at once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkActionKind {
    Activate,
    Deactivate,
    Delete,
    Duplicate,
    Export,
}

impl BulkActionKind {
    /// Every kind, in menu order
    pub const ALL: [BulkActionKind; 5] = [
        BulkActionKind::Activate,
        BulkActionKind::Deactivate,
        BulkActionKind::Delete,
        BulkActionKind::Duplicate,
        BulkActionKind::Export,
    ];

    pub fn all() -> Vec<BulkActionKind> {
        Self::ALL.to_vec()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BulkActionKind::Activate => "activate",
            BulkActionKind::Deactivate => "deactivate",
            BulkActionKind::Delete => "delete",
            BulkActionKind::Duplicate => "duplicate",
            BulkActionKind::Export => "export",
        }
    }

    /// Whether the action changes the store
    pub fn is_mutating(self) -> bool {
        !matches!(self, BulkActionKind::Export)
    }

    /// Whether the user can undo the action with another action
    pub fn is_reversible(self) -> bool {
        !matches!(self, BulkActionKind::Delete)
    }
}

impl fmt::Display for BulkActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BulkActionKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| ValidationError::UnsupportedAction {
                kind: s.to_string(),
                resource: "bulk actions".to_string(),
            })
    }
}

/// Visual weight of a confirmation dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptTone {
    Danger,
    Warning,
    Info,
}

/// Copy for the confirmation dialog of a pending action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationPrompt {
    pub title: String,
    pub message: String,
    pub confirm_label: String,
    pub tone: PromptTone,
}

impl ConfirmationPrompt {
    /// Build the dialog copy for `count` records of `resource` (plural name)
    pub fn for_action(kind: BulkActionKind, count: usize, resource: &str) -> Self {
        let noun = count_noun(count, resource);
        match kind {
            BulkActionKind::Delete => Self {
                title: format!("Delete {}?", noun),
                message: format!(
                    "This will permanently delete {}. This action cannot be undone.",
                    noun
                ),
                confirm_label: "Delete".to_string(),
                tone: PromptTone::Danger,
            },
            BulkActionKind::Activate => Self {
                title: format!("Activate {}?", noun),
                message: format!("{} will become visible to customers.", capitalize(&noun)),
                confirm_label: "Activate".to_string(),
                tone: PromptTone::Info,
            },
            BulkActionKind::Deactivate => Self {
                title: format!("Deactivate {}?", noun),
                message: format!(
                    "{} will be hidden from customers until reactivated.",
                    capitalize(&noun)
                ),
                confirm_label: "Deactivate".to_string(),
                tone: PromptTone::Warning,
            },
            BulkActionKind::Duplicate => Self {
                title: format!("Duplicate {}?", noun),
                message: format!("A copy of each of the {} will be created.", noun),
                confirm_label: "Duplicate".to_string(),
                tone: PromptTone::Info,
            },
            BulkActionKind::Export => Self {
                title: format!("Export {}?", noun),
                message: format!("{} will be exported.", capitalize(&noun)),
                confirm_label: "Export".to_string(),
                tone: PromptTone::Info,
            },
        }
    }
}

fn count_noun(count: usize, resource: &str) -> String {
    if count != 1 {
        return format!("{} {}", count, resource);
    }
    let singular = match resource {
        r if r.ends_with("ies") && r.len() > 3 => format!("{}y", &r[..r.len() - 3]),
        r if r.ends_with('s') && r.len() > 1 => r[..r.len() - 1].to_string(),
        r => r.to_string(),
    };
    format!("1 {}", singular)
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// An action the user picked that still waits for confirmation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingBulkAction {
    pub kind: BulkActionKind,
    pub target_ids: Vec<Uuid>,
    pub requires_confirmation: bool,
    pub is_reversible: bool,
    pub prompt: ConfirmationPrompt,
}

/// A target the action could not be applied to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedTarget {
    pub id: Uuid,
    pub reason: String,
}

/// Aggregated result of one applied bulk action
///
/// Per-target problems land here instead of aborting the batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkOutcome {
    pub kind: BulkActionKind,
    /// Targets the action was applied to
    pub succeeded: Vec<Uuid>,
    /// Targets that were no longer in the store
    pub missing: Vec<Uuid>,
    /// Targets the store rejected
    pub failed: Vec<FailedTarget>,
    /// Ids of records created by the action (duplicates)
    pub created: Vec<Uuid>,
    /// Rendered export, for `export` only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export: Option<ExportSnapshot>,
}

impl BulkOutcome {
    pub fn new(kind: BulkActionKind) -> Self {
        Self {
            kind,
            succeeded: Vec::new(),
            missing: Vec::new(),
            failed: Vec::new(),
            created: Vec::new(),
            export: None,
        }
    }

    /// Some targets succeeded and some failed
    pub fn is_partial_failure(&self) -> bool {
        !self.succeeded.is_empty() && !self.failed.is_empty()
    }

    /// Nothing failed (missing targets are not failures)
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn failed_ids(&self) -> Vec<Uuid> {
        self.failed.iter().map(|f| f.id).collect()
    }

    pub(crate) fn fail(&mut self, id: Uuid, reason: impl Into<String>) {
        self.failed.push(FailedTarget {
            id,
            reason: reason.into(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parse_and_display() {
        assert_eq!(
            "Duplicate".parse::<BulkActionKind>().unwrap(),
            BulkActionKind::Duplicate
        );
        assert_eq!(BulkActionKind::Export.to_string(), "export");
        let err = "archive".parse::<BulkActionKind>().unwrap_err();
        assert_eq!(err.error_code(), "UNSUPPORTED_ACTION");
    }

    #[test]
    fn test_kind_traits() {
        assert!(!BulkActionKind::Export.is_mutating());
        assert!(BulkActionKind::Activate.is_mutating());
        assert!(!BulkActionKind::Delete.is_reversible());
        assert!(BulkActionKind::Duplicate.is_reversible());
    }

    #[test]
    fn test_delete_prompt_warns_about_undo() {
        let prompt = ConfirmationPrompt::for_action(BulkActionKind::Delete, 3, "products");
        assert_eq!(prompt.title, "Delete 3 products?");
        assert!(prompt.message.contains("cannot be undone"));
        assert_eq!(prompt.tone, PromptTone::Danger);
    }

    #[test]
    fn test_prompt_singular() {
        let prompt = ConfirmationPrompt::for_action(BulkActionKind::Deactivate, 1, "products");
        assert_eq!(prompt.title, "Deactivate 1 product?");
        assert!(prompt.message.starts_with("1 product will"));

        let prompt = ConfirmationPrompt::for_action(BulkActionKind::Export, 1, "categories");
        assert_eq!(prompt.title, "Export 1 category?");
    }

    #[test]
    fn test_partial_failure() {
        let mut outcome = BulkOutcome::new(BulkActionKind::Activate);
        assert!(!outcome.is_partial_failure());
        outcome.succeeded.push(Uuid::new_v4());
        outcome.fail(Uuid::nil(), "rejected");
        assert!(outcome.is_partial_failure());
        assert!(!outcome.is_success());
        assert_eq!(outcome.failed_ids(), vec![Uuid::nil()]);
    }
}
