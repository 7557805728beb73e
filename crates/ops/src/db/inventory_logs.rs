//! Inventory log repository.

use bson::{Document, doc};
use mongodb::{Collection, Database};

use quickdrop_core::ProductId;

use super::{RepositoryError, collect_as, collections};
use crate::models::InventoryPoint;
use crate::models::report::InventoryRow;

/// Repository for warehouse stock snapshots.
pub struct InventoryLogRepository<'a> {
    db: &'a Database,
}

impl<'a> InventoryLogRepository<'a> {
    /// Create a new inventory log repository.
    #[must_use]
    pub const fn new(db: &'a Database) -> Self {
        Self { db }
    }

    fn collection(&self) -> Collection<Document> {
        self.db.collection(collections::INVENTORY_LOGS)
    }

    /// Total stock of a product per warehouse and date, ordered by date.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the aggregation fails.
    pub async fn totals_by_warehouse_and_date(
        &self,
        product_id: &ProductId,
    ) -> Result<Vec<InventoryPoint>, RepositoryError> {
        let cursor = self
            .collection()
            .aggregate(inventory_pipeline(product_id))
            .await?;
        let rows: Vec<InventoryRow> = collect_as(cursor).await?;
        Ok(rows.into_iter().map(InventoryPoint::from).collect())
    }
}

pub(crate) fn inventory_pipeline(product_id: &ProductId) -> Vec<Document> {
    vec![
        doc! { "$match": { "productID": product_id } },
        doc! {
            "$group": {
                "_id": { "warehouse": "$storageWarehouseName", "date": "$date" },
                "totalInventory": { "$sum": "$inventoryQuantity" },
            }
        },
        doc! { "$sort": { "_id.date": 1, "_id.warehouse": 1 } },
    ]
}
