use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Deserializer};

// ---------------------------------------------------------------------------
// FilterField – the four categorical fields the dashboard filters on
// ---------------------------------------------------------------------------

/// One of the four filterable categorical fields of a shipment record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterField {
    ShipmentMode,
    WarehouseBlock,
    ProductImportance,
    Gender,
}

impl FilterField {
    /// All filterable fields, in a fixed display order.
    pub const ALL: [FilterField; 4] = [
        FilterField::ShipmentMode,
        FilterField::WarehouseBlock,
        FilterField::ProductImportance,
        FilterField::Gender,
    ];

    /// Stable wire name used at the widget boundary.
    pub fn name(self) -> &'static str {
        match self {
            FilterField::ShipmentMode => "shipment_mode",
            FilterField::WarehouseBlock => "warehouse_block",
            FilterField::ProductImportance => "product_importance",
            FilterField::Gender => "gender",
        }
    }

    /// Parse a widget-supplied field name. `None` for unrecognized names.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "shipment_mode" => Some(FilterField::ShipmentMode),
            "warehouse_block" => Some(FilterField::WarehouseBlock),
            "product_importance" => Some(FilterField::ProductImportance),
            "gender" => Some(FilterField::Gender),
            _ => None,
        }
    }
}

impl fmt::Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Record – one shipment (one row of the source table)
// ---------------------------------------------------------------------------

/// A single shipment record. Serde renames bind the source column names
/// so CSV and JSON rows deserialize directly.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Record {
    #[serde(rename = "Mode_of_Shipment")]
    pub shipment_mode: String,
    #[serde(rename = "Warehouse_block")]
    pub warehouse_block: String,
    #[serde(rename = "Product_importance")]
    pub product_importance: String,
    #[serde(rename = "Gender")]
    pub gender: String,
    #[serde(rename = "Customer_care_calls")]
    pub customer_care_calls: u32,
    #[serde(rename = "Cost_of_the_Product")]
    pub cost_of_product: f64,
    #[serde(rename = "Discount_offered")]
    pub discount_offered: f64,
    /// Source column is a 0/1 indicator: 1 = delivered on time, 0 = late.
    #[serde(rename = "Reached.on.Time_Y.N", deserialize_with = "de_on_time_flag")]
    pub on_time: bool,
}

impl Record {
    /// Value of one of the filterable categorical fields.
    pub fn field(&self, field: FilterField) -> &str {
        match field {
            FilterField::ShipmentMode => &self.shipment_mode,
            FilterField::WarehouseBlock => &self.warehouse_block,
            FilterField::ProductImportance => &self.product_importance,
            FilterField::Gender => &self.gender,
        }
    }

    /// On-time flag as 0.0 / 1.0 for averaging and correlation.
    pub fn on_time_f64(&self) -> f64 {
        if self.on_time {
            1.0
        } else {
            0.0
        }
    }
}

fn de_on_time_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match u8::deserialize(deserializer)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(serde::de::Error::custom(format!(
            "on-time flag must be 0 or 1, got {other}"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full loaded dataset with the categorical domain of each filterable
/// field pre-computed at construction. Immutable after load.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// All shipment records, in source order.
    pub records: Vec<Record>,
    /// For each filterable field the sorted set of values observed in the data.
    domains: BTreeMap<FilterField, BTreeSet<String>>,
}

impl Dataset {
    /// Build the dataset and its per-field domains at load time; domains
    /// are never re-scanned per filter event.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut domains = BTreeMap::new();
        for &field in &FilterField::ALL {
            let domain: BTreeSet<String> = records
                .iter()
                .map(|rec| rec.field(field).to_string())
                .collect();
            domains.insert(field, domain);
        }
        Dataset { records, domains }
    }

    /// Observed categorical domain of one filterable field.
    pub fn domain(&self, field: FilterField) -> &BTreeSet<String> {
        &self.domains[&field]
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::test_support::record;

    #[test]
    fn domains_are_computed_at_construction() {
        let ds = Dataset::from_records(vec![
            record("Ship", "A", "low", "F", 2, 100.0, 10.0, true),
            record("Flight", "B", "high", "M", 4, 250.0, 5.0, false),
            record("Ship", "A", "medium", "F", 3, 180.0, 8.0, true),
        ]);

        let modes: Vec<_> = ds.domain(FilterField::ShipmentMode).iter().collect();
        assert_eq!(modes, ["Flight", "Ship"]);
        assert_eq!(ds.domain(FilterField::WarehouseBlock).len(), 2);
        assert_eq!(ds.domain(FilterField::ProductImportance).len(), 3);
        assert_eq!(ds.domain(FilterField::Gender).len(), 2);
    }

    #[test]
    fn empty_dataset_has_empty_domains() {
        let ds = Dataset::from_records(Vec::new());
        assert!(ds.is_empty());
        for field in FilterField::ALL {
            assert!(ds.domain(field).is_empty());
        }
    }

    #[test]
    fn field_names_round_trip() {
        for field in FilterField::ALL {
            assert_eq!(FilterField::from_name(field.name()), Some(field));
        }
        assert_eq!(FilterField::from_name("zip_code"), None);
    }
}
