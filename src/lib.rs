//! Shiplens: the filter-and-aggregate pipeline behind a shipment
//! delivery dashboard.
//!
//! The pipeline loads an immutable tabular dataset of shipment records,
//! applies per-field categorical filters, and computes the scalar KPIs
//! and grouped aggregates an external rendering layer turns into charts.
//! Everything is recomputed in full on each filter change; nothing here
//! renders, persists, or runs concurrently.

pub mod aggregate;
pub mod data;
pub mod metrics;
pub mod state;

pub use aggregate::{build_aggregates, AggregateViews};
pub use data::filter::{
    apply_filters, full_selection, spec_from_names, FilterSpec, FilteredView, UnknownField,
};
pub use data::loader::{load_file, DataLoadError};
pub use data::model::{Dataset, FilterField, Record};
pub use metrics::{compute_kpis, Metric, MetricsSummary, UndefinedMetric};
pub use state::DashboardState;
