//! Product catalogue repository.

use bson::{Bson, Document, doc};
use mongodb::{Collection, Database};
use serde::Deserialize;

use quickdrop_core::ProductId;

use super::{RepositoryError, collect_as, collections, first_as};
use crate::models::order::OrderTotals;
use crate::models::{OrderLine, Product, RatedProduct};

/// Repository for product documents.
pub struct ProductRepository<'a> {
    db: &'a Database,
}

#[derive(Debug, Deserialize)]
struct NameOnly {
    name: String,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(db: &'a Database) -> Self {
        Self { db }
    }

    fn collection(&self) -> Collection<Document> {
        self.db.collection(collections::PRODUCTS)
    }

    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::Deserialize` if the document has an unexpected shape.
    pub async fn get_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let found = self.collection().find_one(doc! { "_id": id }).await?;
        Ok(found.map(bson::from_document).transpose()?)
    }

    /// Get only a product's name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_name(&self, id: &ProductId) -> Result<Option<String>, RepositoryError> {
        let found = self
            .collection()
            .find_one(doc! { "_id": id })
            .projection(doc! { "name": 1 })
            .await?;
        match found {
            Some(d) => Ok(Some(bson::from_document::<NameOnly>(d)?.name)),
            None => Ok(None),
        }
    }

    /// Price a set of order lines in the database. Lines whose product does
    /// not exist are dropped; `None` means no line matched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the aggregation fails.
    pub(crate) async fn order_totals(
        &self,
        lines: &[OrderLine],
    ) -> Result<Option<OrderTotals>, RepositoryError> {
        let cursor = self.collection().aggregate(order_totals_pipeline(lines)).await?;
        first_as(cursor).await
    }

    /// The `limit` products with the lowest `avgRatingScore`, ascending.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn lowest_rated(&self, limit: u32) -> Result<Vec<RatedProduct>, RepositoryError> {
        let cursor = self
            .collection()
            .find(doc! {})
            .projection(doc! { "name": 1, "avgRatingScore": 1 })
            .sort(doc! { "avgRatingScore": 1, "_id": 1 })
            .limit(i64::from(limit))
            .await?;
        collect_as(cursor).await
    }

    /// Set `avgRatingScore` on one product. Returns `false` if no product
    /// matched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn set_avg_rating(&self, id: &Bson, avg: f64) -> Result<bool, RepositoryError> {
        let result = self
            .collection()
            .update_one(
                doc! { "_id": id.clone() },
                doc! { "$set": { "avgRatingScore": avg } },
            )
            .await?;
        Ok(result.matched_count > 0)
    }
}

/// Join requested quantities onto the matching products and total them.
///
/// Output is one `{totalCost, orderItems, orderItemNames}` row.
pub(crate) fn order_totals_pipeline(lines: &[OrderLine]) -> Vec<Document> {
    let ids: Vec<&str> = lines.iter().map(|l| l.product_id.as_str()).collect();
    let entries: Vec<Document> = lines
        .iter()
        .map(|l| doc! { "_id": l.product_id.as_str(), "quantity": l.quantity })
        .collect();

    vec![
        doc! { "$match": { "_id": { "$in": ids } } },
        doc! {
            "$addFields": {
                "quantity": {
                    "$filter": {
                        "input": entries,
                        "as": "entry",
                        "cond": { "$eq": ["$$entry._id", "$_id"] },
                    }
                }
            }
        },
        doc! { "$unwind": "$quantity" },
        doc! { "$set": { "quantity": "$quantity.quantity" } },
        doc! {
            "$group": {
                "_id": Bson::Null,
                "totalCost": { "$sum": { "$multiply": ["$stdPrice", "$quantity"] } },
                "orderItems": { "$push": { "productID": "$_id", "quantity": "$quantity" } },
                "orderItemNames": { "$push": { "name": "$name", "quantity": "$quantity" } },
            }
        },
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(id: &str, quantity: i64) -> OrderLine {
        OrderLine {
            product_id: ProductId::new(id),
            quantity,
        }
    }

    #[test]
    fn test_order_totals_pipeline_matches_requested_ids() {
        let pipeline = order_totals_pipeline(&[line("a", 3), line("b", 1)]);

        assert_eq!(pipeline.len(), 5);
        assert_eq!(pipeline[0], doc! { "$match": { "_id": { "$in": ["a", "b"] } } });
        let input = pipeline[1]
            .get_document("$addFields")
            .and_then(|d| d.get_document("quantity"))
            .and_then(|d| d.get_document("$filter"))
            .and_then(|d| d.get_array("input"))
            .unwrap();
        assert_eq!(
            input.first(),
            Some(&Bson::Document(doc! { "_id": "a", "quantity": 3_i64 }))
        );
    }

    #[test]
    fn test_order_totals_row_decodes() {
        let row: OrderTotals = bson::from_document(doc! {
            "_id": Bson::Null,
            "totalCost": 27_260_i64,
            "orderItems": [{ "productID": "a", "quantity": 3_i64 }],
            "orderItemNames": [{ "name": "Mea Culpa", "quantity": 3_i64 }],
        })
        .unwrap();
        assert_eq!(row.total_cost, 27_260);
        assert_eq!(row.order_items, vec![line("a", 3)]);
        assert_eq!(row.order_item_names[0].name, "Mea Culpa");
    }
}
