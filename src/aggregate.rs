//! Aggregation builder: one pure function per chart.
//!
//! Every builder tolerates an empty view by returning an empty or default
//! structure; an empty chart is a valid state, never an error. Each
//! builder is a single O(n) pass over the view (the correlation matrix is
//! O(n) per field pair over a fixed set of four fields).

use std::collections::BTreeMap;

use crate::data::filter::FilteredView;

// ---------------------------------------------------------------------------
// Chart structures
// ---------------------------------------------------------------------------

/// Discount values split by delivery outcome. The consumer derives box-plot
/// quartiles from the raw multisets; nothing is pre-bucketed here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscountSplit {
    pub on_time: Vec<f64>,
    pub late: Vec<f64>,
}

/// One bubble of the calls-vs-discount scatter chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterPoint {
    pub calls: u32,
    pub discount: f64,
    pub cost: f64,
    pub on_time: bool,
}

/// The numeric record fields, in correlation-matrix order.
pub const NUMERIC_FIELDS: [&str; 4] = [
    "customer_care_calls",
    "cost_of_product",
    "discount_offered",
    "on_time",
];

/// Pairwise Pearson correlations over the numeric fields. Symmetric,
/// diagonal 1.0 by definition; an entry involving a zero-variance field
/// is `NaN`, never a silently wrong 0 or 1.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    values: [[f64; NUMERIC_FIELDS.len()]; NUMERIC_FIELDS.len()],
}

impl CorrelationMatrix {
    /// Field labels matching the row/column order of [`get`](Self::get).
    pub fn fields(&self) -> &'static [&'static str] {
        &NUMERIC_FIELDS
    }

    /// Correlation between fields `i` and `j` (indices into `fields()`).
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i][j]
    }
}

/// Everything the six charts consume, computed in one call.
#[derive(Debug, Clone)]
pub struct AggregateViews {
    /// Chart 1: record count per (shipment mode, on-time flag). Pairs not
    /// observed in the view are omitted, not zero-filled.
    pub mode_delivery_counts: BTreeMap<(String, bool), u64>,
    /// Chart 2: mean on-time rate per warehouse block (0.0–1.0).
    pub warehouse_on_time: BTreeMap<String, f64>,
    /// Chart 3: discount multisets by outcome.
    pub discount_by_outcome: DiscountSplit,
    /// Chart 4: per-record pass-through, order preserved.
    pub scatter: Vec<ScatterPoint>,
    /// Chart 5: numeric-field correlation heatmap.
    pub correlation: CorrelationMatrix,
    /// Chart 6: record count per product-importance category.
    pub importance_counts: BTreeMap<String, u64>,
}

/// Build all six chart aggregates for a view.
pub fn build_aggregates(view: &FilteredView) -> AggregateViews {
    AggregateViews {
        mode_delivery_counts: mode_delivery_counts(view),
        warehouse_on_time: warehouse_on_time(view),
        discount_by_outcome: discount_by_outcome(view),
        scatter: scatter_points(view),
        correlation: correlation_matrix(view),
        importance_counts: importance_counts(view),
    }
}

// ---------------------------------------------------------------------------
// Per-chart builders
// ---------------------------------------------------------------------------

/// Counts per (shipment mode, on-time flag) pair observed in the view.
pub fn mode_delivery_counts(view: &FilteredView) -> BTreeMap<(String, bool), u64> {
    let mut counts: BTreeMap<(String, bool), u64> = BTreeMap::new();
    for rec in view.iter() {
        *counts
            .entry((rec.shipment_mode.clone(), rec.on_time))
            .or_default() += 1;
    }
    counts
}

/// Mean on-time rate per warehouse block. Blocks without rows are omitted.
pub fn warehouse_on_time(view: &FilteredView) -> BTreeMap<String, f64> {
    let mut sums: BTreeMap<String, (f64, u64)> = BTreeMap::new();
    for rec in view.iter() {
        let entry = sums.entry(rec.warehouse_block.clone()).or_default();
        entry.0 += rec.on_time_f64();
        entry.1 += 1;
    }
    sums.into_iter()
        .map(|(block, (sum, count))| (block, sum / count as f64))
        .collect()
}

/// Raw discount multisets by delivery outcome, view order preserved.
pub fn discount_by_outcome(view: &FilteredView) -> DiscountSplit {
    let mut split = DiscountSplit::default();
    for rec in view.iter() {
        if rec.on_time {
            split.on_time.push(rec.discount_offered);
        } else {
            split.late.push(rec.discount_offered);
        }
    }
    split
}

/// Per-record projection for the bubble chart, unchanged and in order.
pub fn scatter_points(view: &FilteredView) -> Vec<ScatterPoint> {
    view.iter()
        .map(|rec| ScatterPoint {
            calls: rec.customer_care_calls,
            discount: rec.discount_offered,
            cost: rec.cost_of_product,
            on_time: rec.on_time,
        })
        .collect()
}

/// Pearson correlation matrix over the numeric fields.
pub fn correlation_matrix(view: &FilteredView) -> CorrelationMatrix {
    let columns: [Vec<f64>; NUMERIC_FIELDS.len()] = [
        view.iter().map(|r| f64::from(r.customer_care_calls)).collect(),
        view.iter().map(|r| r.cost_of_product).collect(),
        view.iter().map(|r| r.discount_offered).collect(),
        view.iter().map(|r| r.on_time_f64()).collect(),
    ];

    let n = NUMERIC_FIELDS.len();
    let mut values = [[f64::NAN; NUMERIC_FIELDS.len()]; NUMERIC_FIELDS.len()];
    for i in 0..n {
        values[i][i] = 1.0;
        for j in (i + 1)..n {
            let r = pearson(&columns[i], &columns[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }
    CorrelationMatrix { values }
}

/// Counts per product-importance category observed in the view.
pub fn importance_counts(view: &FilteredView) -> BTreeMap<String, u64> {
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    for rec in view.iter() {
        *counts.entry(rec.product_importance.clone()).or_default() += 1;
    }
    counts
}

/// Pearson correlation coefficient of two equal-length columns.
/// `NaN` when either column has zero variance (including empty columns).
fn pearson(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len();
    if n == 0 {
        return f64::NAN;
    }
    let nf = n as f64;
    let mean_a: f64 = a.iter().sum::<f64>() / nf;
    let mean_b: f64 = b.iter().sum::<f64>() / nf;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (&x, &y) in a.iter().zip(b) {
        cov += (x - mean_a) * (y - mean_b);
        var_a += (x - mean_a) * (x - mean_a);
        var_b += (y - mean_b) * (y - mean_b);
    }

    let denom = (var_a * var_b).sqrt();
    if denom == 0.0 {
        f64::NAN
    } else {
        cov / denom
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::FilteredView;
    use crate::data::model::Dataset;
    use crate::data::test_support::{record, sample_dataset};
    use crate::metrics::compute_kpis;

    #[test]
    fn mode_counts_sum_to_total_orders() {
        let ds = sample_dataset();
        let view = FilteredView::all(&ds);
        let counts = mode_delivery_counts(&view);
        let total: u64 = counts.values().sum();
        assert_eq!(total as usize, compute_kpis(&view).total_orders);
    }

    #[test]
    fn unobserved_pairs_are_omitted() {
        let ds = Dataset::from_records(vec![
            record("Ship", "A", "low", "F", 2, 100.0, 10.0, true),
            record("Ship", "A", "low", "F", 5, 150.0, 20.0, true),
            record("Flight", "B", "low", "M", 3, 200.0, 5.0, false),
        ]);
        let counts = mode_delivery_counts(&FilteredView::all(&ds));
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[&("Ship".to_string(), true)], 2);
        assert_eq!(counts[&("Flight".to_string(), false)], 1);
        assert!(!counts.contains_key(&("Ship".to_string(), false)));
    }

    #[test]
    fn warehouse_means_are_per_block() {
        let ds = Dataset::from_records(vec![
            record("Ship", "A", "low", "F", 2, 100.0, 10.0, true),
            record("Ship", "A", "low", "F", 5, 150.0, 20.0, false),
            record("Ship", "B", "low", "M", 3, 200.0, 5.0, true),
        ]);
        let means = warehouse_on_time(&FilteredView::all(&ds));
        assert_eq!(means["A"], 0.5);
        assert_eq!(means["B"], 1.0);
        assert!(!means.contains_key("C"));
    }

    #[test]
    fn discount_split_partitions_by_outcome() {
        let ds = Dataset::from_records(vec![
            record("Ship", "A", "low", "F", 2, 100.0, 10.0, true),
            record("Ship", "A", "low", "F", 5, 150.0, 44.0, false),
            record("Ship", "B", "low", "M", 3, 200.0, 5.0, true),
        ]);
        let split = discount_by_outcome(&FilteredView::all(&ds));
        assert_eq!(split.on_time, [10.0, 5.0]);
        assert_eq!(split.late, [44.0]);
    }

    #[test]
    fn scatter_is_an_ordered_pass_through() {
        let ds = sample_dataset();
        let view = FilteredView::all(&ds);
        let points = scatter_points(&view);
        assert_eq!(points.len(), ds.len());
        for (point, rec) in points.iter().zip(view.iter()) {
            assert_eq!(point.calls, rec.customer_care_calls);
            assert_eq!(point.discount, rec.discount_offered);
            assert_eq!(point.cost, rec.cost_of_product);
            assert_eq!(point.on_time, rec.on_time);
        }
    }

    #[test]
    fn correlation_diagonal_is_one() {
        let ds = sample_dataset();
        let m = correlation_matrix(&FilteredView::all(&ds));
        for i in 0..m.fields().len() {
            assert_eq!(m.get(i, i), 1.0);
        }
    }

    #[test]
    fn correlation_is_symmetric_and_detects_perfect_correlation() {
        // Discount is exactly 0.1 × cost, so their correlation is 1.
        let ds = Dataset::from_records(vec![
            record("Ship", "A", "low", "F", 2, 100.0, 10.0, true),
            record("Ship", "A", "low", "F", 5, 200.0, 20.0, false),
            record("Ship", "B", "low", "M", 3, 300.0, 30.0, true),
        ]);
        let m = correlation_matrix(&FilteredView::all(&ds));
        let cost = 1;
        let discount = 2;
        assert!((m.get(cost, discount) - 1.0).abs() < 1e-12);
        assert_eq!(m.get(cost, discount), m.get(discount, cost));
    }

    #[test]
    fn constant_field_yields_nan_off_diagonal() {
        // Every record is on time, so the on_time column has no variance.
        let ds = Dataset::from_records(vec![
            record("Ship", "A", "low", "F", 2, 100.0, 10.0, true),
            record("Ship", "A", "low", "F", 5, 200.0, 20.0, true),
            record("Ship", "B", "low", "M", 3, 300.0, 30.0, true),
        ]);
        let m = correlation_matrix(&FilteredView::all(&ds));
        let on_time = 3;
        for other in 0..3 {
            assert!(m.get(on_time, other).is_nan());
            assert!(m.get(other, on_time).is_nan());
        }
        assert_eq!(m.get(on_time, on_time), 1.0);
    }

    #[test]
    fn empty_view_yields_empty_aggregates() {
        let ds = Dataset::from_records(Vec::new());
        let view = FilteredView::all(&ds);
        let aggregates = build_aggregates(&view);

        assert!(aggregates.mode_delivery_counts.is_empty());
        assert!(aggregates.warehouse_on_time.is_empty());
        assert_eq!(aggregates.discount_by_outcome, DiscountSplit::default());
        assert!(aggregates.scatter.is_empty());
        assert!(aggregates.importance_counts.is_empty());
        // Diagonal stays 1.0 by definition; everything else is NaN.
        let m = &aggregates.correlation;
        for i in 0..m.fields().len() {
            for j in 0..m.fields().len() {
                if i == j {
                    assert_eq!(m.get(i, j), 1.0);
                } else {
                    assert!(m.get(i, j).is_nan());
                }
            }
        }
    }

    #[test]
    fn importance_counts_cover_observed_categories_only() {
        let ds = sample_dataset();
        let counts = importance_counts(&FilteredView::all(&ds));
        assert_eq!(counts["low"], 3);
        assert_eq!(counts["high"], 2);
        assert_eq!(counts["medium"], 1);
        assert!(!counts.contains_key("critical"));
    }
}
