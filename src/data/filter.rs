use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use super::model::{Dataset, FilterField, Record};

// ---------------------------------------------------------------------------
// FilterSpec: which categorical values are accepted per field
// ---------------------------------------------------------------------------

/// Per-field selection state: maps field → set of accepted values.
/// A field absent from the map is unconstrained (all records pass it);
/// an empty accepted set means nothing is selected, so nothing passes.
pub type FilterSpec = BTreeMap<FilterField, BTreeSet<String>>;

/// A widget sent a field name the pipeline does not recognize.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized filter field: {0:?}")]
pub struct UnknownField(pub String);

/// Build a [`FilterSpec`] with every observed value selected for every
/// field, i.e. the identity filter.
pub fn full_selection(dataset: &Dataset) -> FilterSpec {
    FilterField::ALL
        .iter()
        .map(|&field| (field, dataset.domain(field).clone()))
        .collect()
}

/// Validate a stringly-keyed selection coming from UI widgets into a
/// typed [`FilterSpec`]. Only field *names* are validated; accepted
/// values outside the dataset's domain are harmless no-ops.
pub fn spec_from_names(
    raw: &BTreeMap<String, BTreeSet<String>>,
) -> Result<FilterSpec, UnknownField> {
    raw.iter()
        .map(|(name, values)| {
            FilterField::from_name(name)
                .map(|field| (field, values.clone()))
                .ok_or_else(|| UnknownField(name.clone()))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// FilteredView: the records passing the current FilterSpec
// ---------------------------------------------------------------------------

/// The subset of a dataset passing a [`FilterSpec`], as retained row
/// indices in original order. Borrowed, never a copy of the records.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    /// View over the whole dataset (identity filter).
    pub fn all(dataset: &'a Dataset) -> Self {
        FilteredView {
            dataset,
            indices: (0..dataset.len()).collect(),
        }
    }

    /// View over an explicit index set. Callers must pass in-bounds,
    /// ascending indices; [`apply_filters`] always does.
    pub fn from_indices(dataset: &'a Dataset, indices: Vec<usize>) -> Self {
        FilteredView { dataset, indices }
    }

    /// Number of retained records.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Whether no record passed the filter.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Retained row indices into the underlying dataset, original order.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Iterate the retained records in original order.
    pub fn iter(&self) -> impl Iterator<Item = &'a Record> + '_ {
        let dataset = self.dataset;
        self.indices.iter().map(move |&i| &dataset.records[i])
    }
}

/// Apply a [`FilterSpec`] to a dataset.
///
/// A record is retained iff, for every constrained field, its value is a
/// member of that field's accepted set. Pure and deterministic: the same
/// inputs always yield the same indices in original row order. O(n · f)
/// over the dataset for f = 4 filterable fields.
pub fn apply_filters<'a>(dataset: &'a Dataset, spec: &FilterSpec) -> FilteredView<'a> {
    // An empty accepted set hides everything; skip the row scan entirely.
    if spec.values().any(|accepted| accepted.is_empty()) {
        return FilteredView::from_indices(dataset, Vec::new());
    }

    // Fields whose selection covers the full domain impose no constraint.
    // This must be a containment check, not a cardinality one: an accepted
    // set holding unknown values can match the domain's size while still
    // excluding domain values.
    let active: Vec<(FilterField, &BTreeSet<String>)> = spec
        .iter()
        .filter(|(&field, accepted)| !accepted.is_superset(dataset.domain(field)))
        .map(|(&field, accepted)| (field, accepted))
        .collect();

    let indices = dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| {
            active
                .iter()
                .all(|(field, accepted)| accepted.contains(rec.field(*field)))
        })
        .map(|(i, _)| i)
        .collect();

    FilteredView::from_indices(dataset, indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::test_support::{record, sample_dataset};

    fn only(field: FilterField, value: &str, dataset: &Dataset) -> FilterSpec {
        let mut spec = full_selection(dataset);
        spec.insert(field, BTreeSet::from([value.to_string()]));
        spec
    }

    #[test]
    fn identity_filter_retains_every_record() {
        let ds = sample_dataset();
        let view = apply_filters(&ds, &full_selection(&ds));
        assert_eq!(view.len(), ds.len());
        let expected: Vec<usize> = (0..ds.len()).collect();
        assert_eq!(view.indices(), expected.as_slice());
    }

    #[test]
    fn empty_spec_is_unconstrained() {
        let ds = sample_dataset();
        let view = apply_filters(&ds, &FilterSpec::new());
        assert_eq!(view.len(), ds.len());
    }

    #[test]
    fn empty_accepted_set_hides_everything() {
        let ds = sample_dataset();
        let mut spec = full_selection(&ds);
        spec.insert(FilterField::Gender, BTreeSet::new());
        let view = apply_filters(&ds, &spec);
        assert!(view.is_empty());
    }

    #[test]
    fn single_value_filter_keeps_original_order() {
        let ds = Dataset::from_records(vec![
            record("Ship", "A", "low", "F", 2, 100.0, 10.0, true),
            record("Flight", "B", "low", "M", 4, 250.0, 5.0, false),
            record("Ship", "C", "high", "F", 3, 180.0, 8.0, true),
            record("Road", "A", "low", "M", 5, 90.0, 40.0, false),
            record("Ship", "B", "medium", "F", 2, 120.0, 12.0, true),
        ]);
        let view = apply_filters(&ds, &only(FilterField::ShipmentMode, "Ship", &ds));
        assert_eq!(view.indices(), &[0, 2, 4]);
        let blocks: Vec<&str> = view.iter().map(|r| r.warehouse_block.as_str()).collect();
        assert_eq!(blocks, ["A", "C", "B"]);
    }

    #[test]
    fn filters_conjoin_across_fields() {
        let ds = sample_dataset();
        let mut spec = full_selection(&ds);
        spec.insert(
            FilterField::ShipmentMode,
            BTreeSet::from(["Ship".to_string()]),
        );
        spec.insert(FilterField::Gender, BTreeSet::from(["F".to_string()]));
        let view = apply_filters(&ds, &spec);
        assert!(view
            .iter()
            .all(|r| r.shipment_mode == "Ship" && r.gender == "F"));
        assert!(!view.is_empty());
    }

    #[test]
    fn unknown_values_are_harmless() {
        let ds = sample_dataset();
        let mut spec = full_selection(&ds);
        spec.get_mut(&FilterField::WarehouseBlock)
            .unwrap()
            .insert("Z-does-not-exist".to_string());
        // A superset of the domain still passes every record.
        let view = apply_filters(&ds, &spec);
        assert_eq!(view.len(), ds.len());
    }

    #[test]
    fn unknown_values_do_not_widen_the_selection() {
        // Gender domain is {F, M}; {F, X} has the same size but excludes M,
        // so only F records may pass. Membership, not cardinality, decides.
        let ds = sample_dataset();
        let mut spec = full_selection(&ds);
        spec.insert(
            FilterField::Gender,
            BTreeSet::from(["F".to_string(), "X".to_string()]),
        );
        let view = apply_filters(&ds, &spec);
        assert!(!view.is_empty());
        assert!(view.iter().all(|r| r.gender == "F"));
    }

    #[test]
    fn filtering_is_idempotent() {
        let ds = sample_dataset();
        let spec = only(FilterField::ProductImportance, "high", &ds);
        let first = apply_filters(&ds, &spec);
        let second = apply_filters(&ds, &spec);
        assert_eq!(first.indices(), second.indices());
    }

    #[test]
    fn spec_from_names_validates_field_names() {
        let mut raw = BTreeMap::new();
        raw.insert(
            "shipment_mode".to_string(),
            BTreeSet::from(["Ship".to_string()]),
        );
        let spec = spec_from_names(&raw).unwrap();
        assert!(spec.contains_key(&FilterField::ShipmentMode));

        raw.insert("warehouse".to_string(), BTreeSet::new());
        assert_eq!(
            spec_from_names(&raw),
            Err(UnknownField("warehouse".to_string()))
        );
    }
}
