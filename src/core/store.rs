//! Store traits for filtering and sorting

use crate::core::entity::Record;
use crate::core::error::CatalogResult;
use crate::core::filter::{FilterCriteria, FilterSchema};
use crate::core::service::CollectionStore;
use crate::core::sort::SortConfig;
use serde_json::Value;

/// Generic querying over any collection store
///
/// Every [`CollectionStore`] gets this trait for free: records expose their
/// fields through [`Record::field_value`], so no per-type filter or sort code
/// is needed.
///
/// # Example
/// ```rust,ignore
/// let visible = store.apply_filters(&schema, &criteria)?;
/// let visible = store.apply_sort(visible, &"price:desc".parse()?);
/// ```
pub trait QueryableStore<T: Record>: CollectionStore<T> {
    /// Records matching every non-empty criterion, in insertion order
    fn apply_filters(
        &self,
        schema: &FilterSchema,
        criteria: &FilterCriteria,
    ) -> CatalogResult<Vec<T>> {
        Ok(schema.compile(criteria).apply(self.all()?))
    }

    /// Same as [`apply_filters`](Self::apply_filters) with criteria given as a
    /// JSON object (e.g., `{"status": "active", "min_price": 10}`)
    fn apply_json_filters(&self, schema: &FilterSchema, filter: &Value) -> CatalogResult<Vec<T>> {
        let criteria = schema.criteria_from_json(filter)?;
        self.apply_filters(schema, &criteria)
    }

    /// Stable sort of a collection
    ///
    /// # Parameters
    /// - `data`: Collection of records to sort
    /// - `sort`: Active sort key and direction
    fn apply_sort(&self, mut data: Vec<T>, sort: &SortConfig) -> Vec<T> {
        sort.sort(&mut data);
        data
    }

    /// Filter then sort: the visible sequence of a list screen
    fn query(
        &self,
        schema: &FilterSchema,
        criteria: &FilterCriteria,
        sort: &SortConfig,
    ) -> CatalogResult<Vec<T>> {
        let filtered = self.apply_filters(schema, criteria)?;
        Ok(self.apply_sort(filtered, sort))
    }

    /// Get all records (unfiltered, unsorted)
    fn list_all(&self) -> CatalogResult<Vec<T>> {
        self.all()
    }
}

impl<T: Record, S: CollectionStore<T> + ?Sized> QueryableStore<T> for S {}
