//! Report rows and their reshaped forms.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use quickdrop_core::GeoPoint;

use super::lenient;

// =============================================================================
// Inventory over time
// =============================================================================

/// Total stock of one product in one warehouse on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryPoint {
    pub warehouse: String,
    pub date: String,
    pub total_inventory: i64,
}

/// `$group` row of the inventory pipeline: `{_id: {warehouse, date}, totalInventory}`.
#[derive(Debug, Deserialize)]
pub(crate) struct InventoryRow {
    #[serde(rename = "_id")]
    pub key: InventoryKey,
    #[serde(rename = "totalInventory", deserialize_with = "lenient::whole_number")]
    pub total_inventory: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct InventoryKey {
    #[serde(default)]
    pub warehouse: Option<String>,
    #[serde(deserialize_with = "lenient::date_label")]
    pub date: String,
}

impl From<InventoryRow> for InventoryPoint {
    fn from(row: InventoryRow) -> Self {
        Self {
            warehouse: row.key.warehouse.unwrap_or_else(|| "Unknown".to_string()),
            date: row.key.date,
            total_inventory: row.total_inventory,
        }
    }
}

/// Inventory pivoted to dates × warehouses; absent combinations are zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryPivot {
    pub product_name: String,
    /// Sorted ascending.
    pub dates: Vec<String>,
    /// Sorted ascending.
    pub warehouses: Vec<String>,
    /// `totals[d][w]` is the stock on `dates[d]` in `warehouses[w]`.
    pub totals: Vec<Vec<i64>>,
}

impl InventoryPivot {
    /// Pivot points into a dense table. Duplicate `(date, warehouse)` points
    /// are summed.
    #[must_use]
    pub fn from_points(product_name: impl Into<String>, points: &[InventoryPoint]) -> Self {
        let dates: BTreeSet<&str> = points.iter().map(|p| p.date.as_str()).collect();
        let warehouses: BTreeSet<&str> = points.iter().map(|p| p.warehouse.as_str()).collect();

        let mut cells: BTreeMap<(&str, &str), i64> = BTreeMap::new();
        for p in points {
            *cells.entry((p.date.as_str(), p.warehouse.as_str())).or_insert(0) += p.total_inventory;
        }

        let totals = dates
            .iter()
            .map(|d| {
                warehouses
                    .iter()
                    .map(|w| cells.get(&(*d, *w)).copied().unwrap_or(0))
                    .collect()
            })
            .collect();

        Self {
            product_name: product_name.into(),
            dates: dates.into_iter().map(str::to_string).collect(),
            warehouses: warehouses.into_iter().map(str::to_string).collect(),
            totals,
        }
    }

    /// Column of totals for one warehouse, in date order.
    #[must_use]
    pub fn series_for(&self, warehouse_index: usize) -> Vec<i64> {
        self.totals
            .iter()
            .map(|row| row.get(warehouse_index).copied().unwrap_or(0))
            .collect()
    }
}

// =============================================================================
// Sales
// =============================================================================

/// Cost, profit and revenue for one product, in minor units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesLine {
    /// Product name (the `$group` key).
    #[serde(rename = "_id", default)]
    pub label: Option<String>,
    #[serde(deserialize_with = "lenient::whole_number")]
    pub total_cost: i64,
    #[serde(deserialize_with = "lenient::whole_number")]
    pub total_profit: i64,
    #[serde(deserialize_with = "lenient::whole_number")]
    pub total_revenue: i64,
}

impl SalesLine {
    /// Label for charts; unnamed products show as "Unknown".
    #[must_use]
    pub fn display_label(&self) -> String {
        self.label.clone().unwrap_or_else(|| "Unknown".to_string())
    }
}

// =============================================================================
// Product stats
// =============================================================================

/// A product and its average rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatedProduct {
    pub name: String,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub avg_rating_score: Option<f64>,
}

/// How many past-order lines mention a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequencyStat {
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(deserialize_with = "lenient::whole_number")]
    pub count: i64,
}

/// The lowest-rated and least-ordered products.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductStats {
    pub lowest_rated: Vec<RatedProduct>,
    pub least_frequent: Vec<FrequencyStat>,
}

// =============================================================================
// Low inventory
// =============================================================================

/// A store holding an item at its lowest stock level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStock {
    pub store_name: String,
    #[serde(deserialize_with = "lenient::whole_number")]
    pub availability: i64,
    #[serde(default)]
    pub address: Option<String>,
    pub location: GeoPoint,
}

/// An inventory item and the stores where it is scarcest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LowInventoryItem {
    #[serde(default)]
    pub item_name: Option<String>,
    #[serde(deserialize_with = "lenient::whole_number")]
    pub lowest_inventory: i64,
    pub stores: Vec<StoreStock>,
}

// =============================================================================
// Ratings refresh
// =============================================================================

/// Counts from a rating recompute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RatingRefresh {
    /// Products with at least one rating.
    pub averaged: u64,
    /// Products whose `avgRatingScore` was written.
    pub updated: u64,
}
