//! Confirmation-gated bulk action state machine

use crate::core::bulk::action::{BulkActionKind, BulkOutcome, ConfirmationPrompt, PendingBulkAction};
use crate::core::bulk::policy::{BulkPolicy, DuplicatePolicy, ExportFormat, ExportSnapshot};
use crate::core::entity::{Record, StatusTransition};
use crate::core::error::{CatalogError, CatalogResult, ValidationError};
use crate::core::service::CollectionStore;
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::HashSet;
use std::marker::PhantomData;
use uuid::Uuid;

/// Lifecycle of a bulk action
///
/// `ActionChosen` and `Applying` only exist inside `submit` and `confirm`;
/// between calls the orchestrator is `Idle` or `AwaitingConfirmation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkState {
    Idle,
    ActionChosen,
    AwaitingConfirmation,
    Applying,
}

/// What `submit` did with the request
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// The action waits for `confirm` or `cancel`
    AwaitingConfirmation(PendingBulkAction),
    /// The action did not need confirmation and has been applied
    Applied(BulkOutcome),
}

impl Submission {
    pub fn pending(&self) -> Option<&PendingBulkAction> {
        match self {
            Submission::AwaitingConfirmation(pending) => Some(pending),
            Submission::Applied(_) => None,
        }
    }

    pub fn outcome(&self) -> Option<&BulkOutcome> {
        match self {
            Submission::Applied(outcome) => Some(outcome),
            Submission::AwaitingConfirmation(_) => None,
        }
    }
}

/// Validates, confirms and applies bulk actions for one record type
///
/// # Example
/// ```rust,ignore
/// let mut bulk = BulkActionOrchestrator::<Product>::new(BulkPolicy::default());
/// if let Submission::AwaitingConfirmation(pending) = bulk.submit(&store, BulkActionKind::Delete, &ids)? {
///     println!("{}", pending.prompt.message);
///     let outcome = bulk.confirm(&store)?;
/// }
/// ```
#[derive(Debug)]
pub struct BulkActionOrchestrator<T: Record> {
    state: BulkState,
    pending: Option<PendingBulkAction>,
    policy: BulkPolicy,
    duplicate: DuplicatePolicy,
    export_format: ExportFormat,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> BulkActionOrchestrator<T> {
    pub fn new(policy: BulkPolicy) -> Self {
        Self {
            state: BulkState::Idle,
            pending: None,
            policy,
            duplicate: DuplicatePolicy::default(),
            export_format: ExportFormat::default(),
            _record: PhantomData,
        }
    }

    pub fn with_duplicate_policy(mut self, duplicate: DuplicatePolicy) -> Self {
        self.duplicate = duplicate;
        self
    }

    pub fn with_export_format(mut self, format: ExportFormat) -> Self {
        self.export_format = format;
        self
    }

    pub fn state(&self) -> BulkState {
        self.state
    }

    /// The action waiting for confirmation, if any
    pub fn pending(&self) -> Option<&PendingBulkAction> {
        self.pending.as_ref()
    }

    pub fn policy(&self) -> &BulkPolicy {
        &self.policy
    }

    /// Whether the record type and the collection both support this action
    pub fn supports(&self, kind: BulkActionKind) -> bool {
        let capable = match kind {
            BulkActionKind::Activate => T::status_for(StatusTransition::Activate).is_some(),
            BulkActionKind::Deactivate => T::status_for(StatusTransition::Deactivate).is_some(),
            BulkActionKind::Duplicate => T::natural_key_field().is_some(),
            BulkActionKind::Delete | BulkActionKind::Export => true,
        };
        capable && self.policy.allows(kind)
    }

    /// Actions the menu should offer
    pub fn available_actions(&self) -> Vec<BulkActionKind> {
        BulkActionKind::ALL
            .into_iter()
            .filter(|kind| self.supports(*kind))
            .collect()
    }

    /// Choose an action for the given targets
    ///
    /// Mutating actions park in `AwaitingConfirmation`. Read-only actions run
    /// immediately unless the policy asks for confirmation.
    pub fn submit<S>(
        &mut self,
        store: &S,
        kind: BulkActionKind,
        ids: &[Uuid],
    ) -> CatalogResult<Submission>
    where
        S: CollectionStore<T> + ?Sized,
    {
        if let Some(pending) = &self.pending {
            return Err(ValidationError::ActionPending {
                kind: pending.kind.to_string(),
            }
            .into());
        }
        if ids.is_empty() {
            return Err(ValidationError::EmptySelection {
                kind: kind.to_string(),
            }
            .into());
        }
        if !self.supports(kind) {
            return Err(ValidationError::UnsupportedAction {
                kind: kind.to_string(),
                resource: T::resource_name().to_string(),
            }
            .into());
        }

        self.state = BulkState::ActionChosen;
        let mut target_ids: Vec<Uuid> = Vec::with_capacity(ids.len());
        for id in ids {
            if !target_ids.contains(id) {
                target_ids.push(*id);
            }
        }

        let pending = PendingBulkAction {
            kind,
            requires_confirmation: self.policy.requires_confirmation(kind),
            is_reversible: kind.is_reversible(),
            prompt: ConfirmationPrompt::for_action(kind, target_ids.len(), T::resource_name()),
            target_ids,
        };

        if pending.requires_confirmation {
            tracing::debug!(
                resource = T::resource_name(),
                kind = %kind,
                targets = pending.target_ids.len(),
                "bulk action awaiting confirmation"
            );
            self.state = BulkState::AwaitingConfirmation;
            self.pending = Some(pending.clone());
            return Ok(Submission::AwaitingConfirmation(pending));
        }

        self.apply(store, pending).map(Submission::Applied)
    }

    /// Apply the pending action
    pub fn confirm<S>(&mut self, store: &S) -> CatalogResult<BulkOutcome>
    where
        S: CollectionStore<T> + ?Sized,
    {
        let pending = self.pending.take().ok_or(ValidationError::NoPendingAction)?;
        self.apply(store, pending)
    }

    /// Discard the pending action without touching the store
    pub fn cancel(&mut self) -> Option<PendingBulkAction> {
        let pending = self.pending.take();
        self.state = BulkState::Idle;
        if let Some(pending) = &pending {
            tracing::debug!(resource = T::resource_name(), kind = %pending.kind, "bulk action cancelled");
        }
        pending
    }

    fn apply<S>(&mut self, store: &S, pending: PendingBulkAction) -> CatalogResult<BulkOutcome>
    where
        S: CollectionStore<T> + ?Sized,
    {
        self.state = BulkState::Applying;
        let ids = &pending.target_ids;

        let result = match pending.kind {
            BulkActionKind::Activate => self.transition(store, ids, StatusTransition::Activate),
            BulkActionKind::Deactivate => self.transition(store, ids, StatusTransition::Deactivate),
            BulkActionKind::Delete => self.delete(store, ids),
            BulkActionKind::Duplicate => self.duplicate(store, ids),
            BulkActionKind::Export => self.export(store, ids),
        };
        self.state = BulkState::Idle;

        match &result {
            Ok(outcome) => tracing::info!(
                resource = T::resource_name(),
                kind = %outcome.kind,
                succeeded = outcome.succeeded.len(),
                missing = outcome.missing.len(),
                failed = outcome.failed.len(),
                "bulk action applied"
            ),
            Err(e) => tracing::warn!(
                resource = T::resource_name(),
                kind = %pending.kind,
                error = %e,
                "bulk action aborted"
            ),
        }
        result
    }

    fn transition<S>(
        &self,
        store: &S,
        ids: &[Uuid],
        transition: StatusTransition,
    ) -> CatalogResult<BulkOutcome>
    where
        S: CollectionStore<T> + ?Sized,
    {
        let kind = match transition {
            StatusTransition::Activate => BulkActionKind::Activate,
            StatusTransition::Deactivate => BulkActionKind::Deactivate,
        };
        let status = T::status_for(transition).ok_or_else(|| ValidationError::UnsupportedAction {
            kind: transition.to_string(),
            resource: T::resource_name().to_string(),
        })?;

        let patch = json!({ "status": status });
        let mut outcome = BulkOutcome::new(kind);
        for id in ids {
            match store.update(id, &patch) {
                Ok(_) => outcome.succeeded.push(*id),
                Err(e) if e.is_not_found() => outcome.missing.push(*id),
                Err(e) => outcome.fail(*id, e.to_string()),
            }
        }
        Ok(outcome)
    }

    fn delete<S>(&self, store: &S, ids: &[Uuid]) -> CatalogResult<BulkOutcome>
    where
        S: CollectionStore<T> + ?Sized,
    {
        let report = store.delete_many(ids)?;
        let mut outcome = BulkOutcome::new(BulkActionKind::Delete);
        outcome.succeeded = report.deleted;
        outcome.missing = report.missing;
        Ok(outcome)
    }

    fn duplicate<S>(&self, store: &S, ids: &[Uuid]) -> CatalogResult<BulkOutcome>
    where
        S: CollectionStore<T> + ?Sized,
    {
        let key_field = T::natural_key_field().ok_or_else(|| ValidationError::UnsupportedAction {
            kind: BulkActionKind::Duplicate.to_string(),
            resource: T::resource_name().to_string(),
        })?;

        let mut taken: HashSet<String> = store
            .all()?
            .iter()
            .filter_map(|record| record.natural_key())
            .collect();

        let mut outcome = BulkOutcome::new(BulkActionKind::Duplicate);
        for id in ids {
            let source = match store.get(id) {
                Ok(Some(source)) => source,
                Ok(None) => {
                    outcome.missing.push(*id);
                    continue;
                }
                Err(e) => {
                    outcome.fail(*id, e.to_string());
                    continue;
                }
            };

            let key = self
                .duplicate
                .derive_key(&source.natural_key().unwrap_or_default(), &taken);
            let copy = match self.derive_copy(&source, key_field, &key) {
                Ok(copy) => copy,
                Err(e) => {
                    outcome.fail(*id, e.to_string());
                    continue;
                }
            };

            match store.create(copy) {
                Ok(new_id) => {
                    tracing::debug!(source_id = %id, record_id = %new_id, key = %key, "record duplicated");
                    taken.insert(key);
                    outcome.succeeded.push(*id);
                    outcome.created.push(new_id);
                }
                Err(e) => outcome.fail(*id, e.to_string()),
            }
        }
        Ok(outcome)
    }

    /// Clone `source` with a nil id, the derived key and the suffixed name
    fn derive_copy(&self, source: &T, key_field: &str, key: &str) -> CatalogResult<T> {
        let mut value = serde_json::to_value(source)?;
        let object = value
            .as_object_mut()
            .ok_or_else(|| CatalogError::Internal(format!("{} is not a JSON object", T::resource_name())))?;

        object.insert(key_field.to_string(), Value::String(key.to_string()));
        let name_field = T::display_name_field();
        if let Some((field, name)) =
            name_field.and_then(|field| source.field_value(field).map(|name| (field, name)))
        {
            let name = self.duplicate.derive_name(&name.to_text());
            object.insert(field.to_string(), Value::String(name));
        }

        let mut copy: T = serde_json::from_value(value)?;
        copy.set_id(Uuid::nil());
        Ok(copy)
    }

    fn export<S>(&self, store: &S, ids: &[Uuid]) -> CatalogResult<BulkOutcome>
    where
        S: CollectionStore<T> + ?Sized,
    {
        let mut outcome = BulkOutcome::new(BulkActionKind::Export);
        let mut records = Vec::with_capacity(ids.len());
        for id in ids {
            match store.get(id) {
                Ok(Some(record)) => {
                    outcome.succeeded.push(*id);
                    records.push(record);
                }
                Ok(None) => outcome.missing.push(*id),
                Err(e) => outcome.fail(*id, e.to_string()),
            }
        }

        outcome.export = Some(ExportSnapshot::render(
            self.export_format,
            T::resource_name(),
            &records,
        )?);
        Ok(outcome)
    }
}
