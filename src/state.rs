use std::collections::BTreeSet;

use log::debug;

use crate::aggregate::{build_aggregates, AggregateViews};
use crate::data::filter::{apply_filters, full_selection, FilterSpec, FilteredView};
use crate::data::model::{Dataset, FilterField};
use crate::metrics::{compute_kpis, MetricsSummary};

// ---------------------------------------------------------------------------
// Dashboard session state
// ---------------------------------------------------------------------------

/// One user's filter selections over a shared immutable dataset.
///
/// Synchronous request/response: a filter change refilters immediately and
/// KPIs/aggregates are recomputed fresh from the resulting view. The
/// dataset itself is never mutated, so it may be shared across sessions.
pub struct DashboardState<'a> {
    dataset: &'a Dataset,
    /// Per-field filter selections.
    filters: FilterSpec,
    /// Indices of records passing the current filters (cached).
    visible_indices: Vec<usize>,
}

impl<'a> DashboardState<'a> {
    /// Start a session with every value selected (identity filter).
    pub fn new(dataset: &'a Dataset) -> Self {
        DashboardState {
            dataset,
            filters: full_selection(dataset),
            visible_indices: (0..dataset.len()).collect(),
        }
    }

    /// The dataset this session is viewing.
    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    /// Current per-field selections.
    pub fn filters(&self) -> &FilterSpec {
        &self.filters
    }

    /// The records passing the current filters.
    pub fn view(&self) -> FilteredView<'a> {
        FilteredView::from_indices(self.dataset, self.visible_indices.clone())
    }

    /// Replace the whole selection and refilter.
    pub fn set_filters(&mut self, filters: FilterSpec) {
        self.filters = filters;
        self.refilter();
    }

    /// Toggle a single value in a field's selection.
    pub fn toggle_filter_value(&mut self, field: FilterField, value: &str) {
        let selected = self.filters.entry(field).or_default();
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
        self.refilter();
    }

    /// Select every observed value of a field.
    pub fn select_all(&mut self, field: FilterField) {
        self.filters.insert(field, self.dataset.domain(field).clone());
        self.refilter();
    }

    /// Deselect every value of a field, hiding all records.
    pub fn select_none(&mut self, field: FilterField) {
        self.filters.insert(field, BTreeSet::new());
        self.refilter();
    }

    /// KPI row for the current view, computed fresh.
    pub fn summary(&self) -> MetricsSummary {
        compute_kpis(&self.view())
    }

    /// Chart aggregates for the current view, computed fresh.
    pub fn aggregates(&self) -> AggregateViews {
        build_aggregates(&self.view())
    }

    /// Recompute `visible_indices` after a filter change.
    fn refilter(&mut self) {
        self.visible_indices = apply_filters(self.dataset, &self.filters)
            .indices()
            .to_vec();
        debug!(
            "refilter: {} of {} records visible",
            self.visible_indices.len(),
            self.dataset.len()
        );
    }
}
