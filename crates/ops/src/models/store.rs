//! Store documents and their embedded inventory.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use quickdrop_core::{GeoPoint, ProductId, StoreId};

use super::lenient;

/// A store with its inventory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Store {
    #[serde(rename = "_id")]
    pub id: StoreId,
    pub name: String,
    #[serde(default)]
    pub address: String,
    pub location: GeoPoint,
    #[serde(default)]
    pub inventory: Vec<InventoryEntry>,
}

/// One product line in a store's inventory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryEntry {
    #[serde(rename = "productID")]
    pub product_id: ProductId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub availability: Option<i64>,
    #[serde(deserialize_with = "lenient::whole_number")]
    pub std_price: i64,
}

impl Store {
    /// Whether every requested product appears in the inventory.
    #[must_use]
    pub fn stocks_all(&self, product_ids: &[ProductId]) -> bool {
        let stocked: HashSet<&ProductId> = self.inventory.iter().map(|e| &e.product_id).collect();
        product_ids.iter().all(|id| stocked.contains(id))
    }

    /// Sum of `stdPrice` over inventory entries whose product was requested.
    ///
    /// Each matching inventory entry counts once, so a product listed twice
    /// in the inventory is charged twice.
    #[must_use]
    pub fn price_of(&self, product_ids: &[ProductId]) -> i64 {
        let wanted: HashSet<&ProductId> = product_ids.iter().collect();
        self.inventory
            .iter()
            .filter(|e| wanted.contains(&e.product_id))
            .map(|e| e.std_price)
            .sum()
    }
}
