//! Generic list-screen controller
//!
//! [`CatalogView`] holds the derived state of one list screen: the filter
//! criteria, the active sort, the visible sequence, the selection and the
//! bulk action in progress. The store remains the only source of truth; the
//! view recomputes from it on every change.
//!
//! ```text
//! criteria ─┐
//!           ├─▶ store.query() ─▶ visible ─▶ selection.prune() ─▶ bulk actions ─▶ store
//! sort ─────┘
//! ```

use crate::config::CollectionConfig;
use crate::core::bulk::{
    BulkActionKind, BulkActionOrchestrator, BulkOutcome, BulkState, PendingBulkAction, Submission,
};
use crate::core::entity::Record;
use crate::core::error::{CatalogResult, ValidationError};
use crate::core::events::StoreEvent;
use crate::core::filter::FilterCriteria;
use crate::core::selection::SelectionSet;
use crate::core::service::CollectionStore;
use crate::core::sort::SortConfig;
use crate::core::store::QueryableStore;
use serde_json::Value;
use tokio::sync::broadcast::{self, error::TryRecvError};
use uuid::Uuid;

/// Filterable, sortable, selectable view over a collection store
///
/// # Example
/// ```rust,ignore
/// let config = CatalogConfig::default_config();
/// let mut view = CatalogView::new(store.clone(), config.collection("products")?.clone())?;
///
/// view.set_filter("status", "active")?;
/// view.sort_by("price")?;
/// view.select_all();
///
/// if let Submission::AwaitingConfirmation(pending) = view.submit_bulk_action(BulkActionKind::Deactivate)? {
///     println!("{}", pending.prompt.title);
///     let outcome = view.confirm_bulk_action()?;
/// }
/// ```
pub struct CatalogView<T: Record, S: CollectionStore<T>> {
    store: S,
    config: CollectionConfig,
    criteria: FilterCriteria,
    sort: SortConfig,
    visible: Vec<T>,
    selection: SelectionSet,
    bulk: BulkActionOrchestrator<T>,
    events: broadcast::Receiver<StoreEvent<T>>,
    revision: u64,
}

impl<T: Record, S: CollectionStore<T>> CatalogView<T, S> {
    /// Build a view and compute its first visible sequence
    pub fn new(store: S, config: CollectionConfig) -> CatalogResult<Self> {
        config.validate()?;

        let bulk = BulkActionOrchestrator::new(config.bulk.clone())
            .with_duplicate_policy(config.duplicate.clone())
            .with_export_format(config.export);
        let events = store.subscribe();

        let mut view = Self {
            criteria: config.filters.empty_criteria(),
            sort: config.initial_sort(),
            visible: Vec::new(),
            selection: SelectionSet::new(),
            bulk,
            events,
            revision: 0,
            store,
            config,
        };
        view.refresh()?;
        Ok(view)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &CollectionConfig {
        &self.config
    }

    // =========================================================================
    // Filtering and sorting
    // =========================================================================

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    /// Set one criterion and recompute; returns the ids dropped from the selection
    pub fn set_filter(&mut self, key: &str, value: impl Into<String>) -> CatalogResult<Vec<Uuid>> {
        self.criteria.set(key, value)?;
        self.refresh()
    }

    /// Replace all criteria at once
    pub fn set_criteria(&mut self, criteria: FilterCriteria) -> CatalogResult<Vec<Uuid>> {
        if let Some((key, _)) = criteria
            .iter()
            .find(|(key, _)| self.config.filters.field(key).is_none())
        {
            return Err(ValidationError::UnknownFilterKey {
                key: key.to_string(),
            }
            .into());
        }
        let mut next = self.config.filters.empty_criteria();
        for (key, value) in criteria.iter() {
            next.set(key, value)?;
        }
        self.criteria = next;
        self.refresh()
    }

    /// Replace all criteria from a JSON object
    pub fn set_filters_json(&mut self, filter: &Value) -> CatalogResult<Vec<Uuid>> {
        let criteria = self.config.filters.criteria_from_json(filter)?;
        self.criteria = criteria;
        self.refresh()
    }

    pub fn clear_filters(&mut self) -> CatalogResult<Vec<Uuid>> {
        self.criteria.clear_all();
        self.refresh()
    }

    pub fn has_active_filters(&self) -> bool {
        self.config.filters.has_active_filters(&self.criteria)
    }

    pub fn sort(&self) -> &SortConfig {
        &self.sort
    }

    /// Column-header click: same key flips direction, a new key sorts ascending
    pub fn sort_by(&mut self, key: &str) -> CatalogResult<&SortConfig> {
        self.ensure_sortable(key)?;
        self.sort.toggle(key);
        self.refresh()?;
        Ok(&self.sort)
    }

    pub fn set_sort(&mut self, sort: SortConfig) -> CatalogResult<()> {
        self.ensure_sortable(&sort.key)?;
        self.sort = sort;
        self.refresh()?;
        Ok(())
    }

    fn ensure_sortable(&self, key: &str) -> CatalogResult<()> {
        if self.config.is_sortable(key) {
            Ok(())
        } else {
            Err(ValidationError::UnknownSortKey {
                key: key.to_string(),
            }
            .into())
        }
    }

    // =========================================================================
    // Visible sequence
    // =========================================================================

    /// Filtered and sorted records
    pub fn visible(&self) -> &[T] {
        &self.visible
    }

    pub fn visible_ids(&self) -> Vec<Uuid> {
        self.visible.iter().map(|r| r.id()).collect()
    }

    /// Recompute the visible sequence, then prune the selection
    ///
    /// Returns the ids that were dropped from the selection.
    pub fn refresh(&mut self) -> CatalogResult<Vec<Uuid>> {
        self.visible = self
            .store
            .query(&self.config.filters, &self.criteria, &self.sort)?;
        let pruned = self.selection.prune(&self.visible_ids());

        tracing::debug!(
            resource = T::resource_name(),
            visible = self.visible.len(),
            pruned = pruned.len(),
            sort = %self.sort,
            "view refreshed"
        );
        Ok(pruned)
    }

    /// Apply pending store notifications; returns whether the view changed
    pub fn sync(&mut self) -> CatalogResult<bool> {
        if !self.drain_events() {
            return Ok(false);
        }
        self.refresh()?;
        Ok(true)
    }

    /// Last store revision the view has seen
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn drain_events(&mut self) -> bool {
        let mut changed = false;
        loop {
            match self.events.try_recv() {
                Ok(event) => {
                    self.revision = event.revision;
                    changed = true;
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(resource = T::resource_name(), skipped, "view lagged behind store");
                    changed = true;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        changed
    }

    // =========================================================================
    // Selection
    // =========================================================================

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    /// Toggle one visible record; returns whether it is now selected
    pub fn toggle_selection(&mut self, id: Uuid) -> CatalogResult<bool> {
        if !self.visible.iter().any(|r| r.id() == id) {
            return Err(ValidationError::NotVisible { id }.into());
        }
        Ok(self.selection.toggle(id))
    }

    pub fn select_all(&mut self) {
        self.selection.set_all(&self.visible_ids());
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn is_all_selected(&self) -> bool {
        self.selection.is_all_selected(&self.visible_ids())
    }

    pub fn is_partially_selected(&self) -> bool {
        self.selection.is_partially_selected(&self.visible_ids())
    }

    /// Selected records in visible order
    pub fn selected_records(&self) -> Vec<&T> {
        self.visible
            .iter()
            .filter(|r| self.selection.contains(&r.id()))
            .collect()
    }

    // =========================================================================
    // Bulk actions
    // =========================================================================

    pub fn bulk_state(&self) -> BulkState {
        self.bulk.state()
    }

    pub fn pending_bulk_action(&self) -> Option<&PendingBulkAction> {
        self.bulk.pending()
    }

    pub fn available_actions(&self) -> Vec<BulkActionKind> {
        self.bulk.available_actions()
    }

    /// Run `kind` over the current selection
    pub fn submit_bulk_action(&mut self, kind: BulkActionKind) -> CatalogResult<Submission> {
        let ids = self.selection.ids();
        let submission = self.bulk.submit(&self.store, kind, &ids)?;
        if let Submission::Applied(outcome) = &submission {
            self.finish_bulk_action(outcome)?;
        }
        Ok(submission)
    }

    /// Apply the pending action
    ///
    /// The selection is cleared afterwards, except for targets that failed so
    /// the user can retry them.
    pub fn confirm_bulk_action(&mut self) -> CatalogResult<BulkOutcome> {
        let outcome = self.bulk.confirm(&self.store)?;
        self.finish_bulk_action(&outcome)?;
        Ok(outcome)
    }

    /// Drop the pending action; the selection is kept
    pub fn cancel_bulk_action(&mut self) -> Option<PendingBulkAction> {
        self.bulk.cancel()
    }

    fn finish_bulk_action(&mut self, outcome: &BulkOutcome) -> CatalogResult<()> {
        self.drain_events();
        self.refresh()?;

        let retry: Vec<Uuid> = outcome
            .failed_ids()
            .into_iter()
            .filter(|id| self.selection.contains(id))
            .collect();
        self.selection.clear();
        for id in retry {
            self.selection.select(id);
        }
        Ok(())
    }
}
