//! KPI calculator: scalar summary metrics over a filtered view.
//!
//! Every metric is computed independently; a metric that is undefined for
//! the current selection (empty view, no late records, empty high-value
//! partition) carries [`UndefinedMetric`] while its siblings still succeed.
//! The rendering layer substitutes a placeholder for undefined metrics.

use thiserror::Error;

use crate::data::filter::FilteredView;

/// A KPI that has no defined value for the current selection. Carries the
/// metric name for display and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{0} is undefined for the current selection")]
pub struct UndefinedMetric(pub &'static str);

/// One KPI: a value, or a marker that the selection leaves it undefined.
pub type Metric = Result<f64, UndefinedMetric>;

/// The scalar KPI row of the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsSummary {
    /// Number of records in the view.
    pub total_orders: usize,
    /// Percentage of records delivered on time.
    pub on_time_rate: Metric,
    /// `100 − on_time_rate`; undefined exactly when `on_time_rate` is.
    pub late_rate: Metric,
    /// Mean customer-care calls among late records.
    pub avg_calls_late: Metric,
    /// Mean discount offered among late records.
    pub avg_discount_late: Metric,
    /// Late percentage among records costing strictly more than the
    /// view's own median cost. The threshold is filter-relative on
    /// purpose: it follows the current selection, not the full dataset.
    pub high_value_late_rate: Metric,
}

/// Compute all KPIs over a view. One O(n) pass per metric, no metric
/// aborts another.
pub fn compute_kpis(view: &FilteredView) -> MetricsSummary {
    let total_orders = view.len();

    let on_time_rate = if total_orders == 0 {
        Err(UndefinedMetric("on_time_rate"))
    } else {
        let on_time: f64 = view.iter().map(|r| r.on_time_f64()).sum();
        Ok(on_time / total_orders as f64 * 100.0)
    };
    let late_rate = on_time_rate
        .map(|rate| 100.0 - rate)
        .map_err(|_| UndefinedMetric("late_rate"));

    let avg_calls_late = mean(
        view.iter()
            .filter(|r| !r.on_time)
            .map(|r| f64::from(r.customer_care_calls)),
    )
    .ok_or(UndefinedMetric("avg_calls_late"));

    let avg_discount_late = mean(
        view.iter()
            .filter(|r| !r.on_time)
            .map(|r| r.discount_offered),
    )
    .ok_or(UndefinedMetric("avg_discount_late"));

    let high_value_late_rate = high_value_late_rate(view);

    MetricsSummary {
        total_orders,
        on_time_rate,
        late_rate,
        avg_calls_late,
        avg_discount_late,
        high_value_late_rate,
    }
}

fn high_value_late_rate(view: &FilteredView) -> Metric {
    let costs: Vec<f64> = view.iter().map(|r| r.cost_of_product).collect();
    let threshold = median(costs).ok_or(UndefinedMetric("high_value_late_rate"))?;

    let on_time_mean = mean(
        view.iter()
            .filter(|r| r.cost_of_product > threshold)
            .map(|r| r.on_time_f64()),
    )
    .ok_or(UndefinedMetric("high_value_late_rate"))?;

    Ok((1.0 - on_time_mean) * 100.0)
}

/// Arithmetic mean; `None` for an empty iterator.
fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0usize;
    for v in values {
        sum += v;
        count += 1;
    }
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Median with the usual even-count midpoint average; `None` when empty.
fn median(mut values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let n = values.len();
    if n % 2 == 1 {
        Some(values[n / 2])
    } else {
        Some((values[n / 2 - 1] + values[n / 2]) / 2.0)
    }
}
