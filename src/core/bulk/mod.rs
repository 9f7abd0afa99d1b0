//! Bulk Action Orchestrator
//!
//! Turns "apply this to everything selected" into a small state machine:
//!
//! ```text
//! Idle ──submit──▶ ActionChosen ──(mutating)──▶ AwaitingConfirmation ──confirm──▶ Applying ──▶ Idle
//!                        │                              │
//!                        └──(read-only)──▶ Applying     └──cancel──▶ Idle
//! ```
//!
//! Per-target failures never abort a batch. They are collected in a
//! [`BulkOutcome`] so the caller can report partial success.

pub mod action;
pub mod orchestrator;
pub mod policy;

pub use action::{
    BulkActionKind, BulkOutcome, ConfirmationPrompt, FailedTarget, PendingBulkAction, PromptTone,
};
pub use orchestrator::{BulkActionOrchestrator, BulkState, Submission};
pub use policy::{BulkPolicy, DuplicatePolicy, ExportFormat, ExportSnapshot};
