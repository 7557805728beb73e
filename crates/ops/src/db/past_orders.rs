//! Past order repository: archived orders and the sales analytics over them.

use bson::oid::ObjectId;
use bson::{Bson, Document, doc};
use mongodb::{Collection, Database};

use quickdrop_core::{CustomerId, ProductId};

use super::{RepositoryError, collect_as, collections};
use crate::models::{FrequencyStat, SalesLine};

/// Repository for the `past_orders` collection.
pub struct PastOrderRepository<'a> {
    db: &'a Database,
}

impl<'a> PastOrderRepository<'a> {
    /// Create a new past order repository.
    #[must_use]
    pub const fn new(db: &'a Database) -> Self {
        Self { db }
    }

    fn collection(&self) -> Collection<Document> {
        self.db.collection(collections::PAST_ORDERS)
    }

    /// Insert archived copies of orders, returning their new ids in order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert_archived(
        &self,
        customer_id: &CustomerId,
        orders: &[Document],
    ) -> Result<Vec<ObjectId>, RepositoryError> {
        if orders.is_empty() {
            return Ok(Vec::new());
        }
        let archived: Vec<(ObjectId, Document)> = orders
            .iter()
            .map(|o| {
                let id = ObjectId::new();
                (id, past_order_document(id, customer_id, o))
            })
            .collect();
        let ids = archived.iter().map(|(id, _)| *id).collect();

        self.collection()
            .insert_many(archived.into_iter().map(|(_, d)| d))
            .await?;
        Ok(ids)
    }

    /// Cost and profit per item bought by one customer, highest revenue first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the aggregation fails.
    pub async fn sales_for_customer(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Vec<SalesLine>, RepositoryError> {
        let cursor = self
            .collection()
            .aggregate(customer_sales_pipeline(customer_id))
            .await?;
        collect_as(cursor).await
    }

    /// Cost, profit and revenue per product across all customers, highest
    /// revenue first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the aggregation fails.
    pub async fn sales_for_products(
        &self,
        product_ids: &[ProductId],
    ) -> Result<Vec<SalesLine>, RepositoryError> {
        let cursor = self
            .collection()
            .aggregate(product_sales_pipeline(product_ids))
            .await?;
        collect_as(cursor).await
    }

    /// The `limit` products appearing on the fewest past-order lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the aggregation fails.
    pub async fn least_frequent(&self, limit: u32) -> Result<Vec<FrequencyStat>, RepositoryError> {
        let cursor = self
            .collection()
            .aggregate(least_frequent_pipeline(limit))
            .await?;
        collect_as(cursor).await
    }
}

/// A past order built from a closed current order. Cost and items are copied
/// as stored.
pub(crate) fn past_order_document(id: ObjectId, customer_id: &CustomerId, order: &Document) -> Document {
    doc! {
        "_id": id,
        "customerID": customer_id,
        "totalOrderCost": order.get("totalOrderCost").cloned().unwrap_or(Bson::Null),
        "orderItems": order.get("orderItems").cloned().unwrap_or_else(|| Bson::Array(Vec::new())),
    }
}

fn product_lookup() -> Document {
    doc! {
        "$lookup": {
            "from": collections::PRODUCTS,
            "localField": "orderItems.productID",
            "foreignField": "_id",
            "as": "productDetails",
        }
    }
}

pub(crate) fn customer_sales_pipeline(customer_id: &CustomerId) -> Vec<Document> {
    vec![
        doc! { "$match": { "customerID": customer_id } },
        doc! { "$unwind": "$orderItems" },
        product_lookup(),
        doc! { "$unwind": "$productDetails" },
        doc! {
            "$group": {
                "_id": { "$ifNull": ["$orderItems.productName", "$productDetails.name"] },
                "totalCost": {
                    "$sum": { "$multiply": ["$orderItems.quantity", "$productDetails.supplierPrice"] }
                },
                "totalProfit": {
                    "$sum": {
                        "$multiply": [
                            "$orderItems.quantity",
                            { "$subtract": ["$productDetails.stdPrice", "$productDetails.supplierPrice"] },
                        ]
                    }
                },
            }
        },
        doc! {
            "$project": {
                "totalCost": 1,
                "totalProfit": 1,
                "totalRevenue": { "$add": ["$totalCost", "$totalProfit"] },
            }
        },
        doc! { "$sort": { "totalRevenue": -1, "_id": 1 } },
    ]
}

pub(crate) fn product_sales_pipeline(product_ids: &[ProductId]) -> Vec<Document> {
    let ids: Vec<&str> = product_ids.iter().map(ProductId::as_str).collect();
    vec![
        doc! { "$unwind": "$orderItems" },
        doc! { "$match": { "orderItems.productID": { "$in": ids } } },
        product_lookup(),
        doc! { "$unwind": "$productDetails" },
        doc! {
            "$group": {
                "_id": "$productDetails.name",
                "totalCost": {
                    "$sum": { "$multiply": ["$orderItems.quantity", "$productDetails.supplierPrice"] }
                },
                "totalRevenue": {
                    "$sum": { "$multiply": ["$orderItems.quantity", "$productDetails.stdPrice"] }
                },
            }
        },
        doc! {
            "$project": {
                "totalCost": 1,
                "totalProfit": { "$subtract": ["$totalRevenue", "$totalCost"] },
                "totalRevenue": 1,
            }
        },
        doc! { "$sort": { "totalRevenue": -1, "_id": 1 } },
    ]
}

pub(crate) fn least_frequent_pipeline(limit: u32) -> Vec<Document> {
    vec![
        doc! { "$unwind": "$orderItems" },
        doc! { "$group": { "_id": "$orderItems.productID", "count": { "$sum": 1 } } },
        doc! { "$sort": { "count": 1, "_id": 1 } },
        doc! { "$limit": i64::from(limit) },
        doc! {
            "$lookup": {
                "from": collections::PRODUCTS,
                "localField": "_id",
                "foreignField": "_id",
                "as": "productInfo",
            }
        },
        doc! { "$unwind": "$productInfo" },
        doc! { "$project": { "productName": "$productInfo.name", "count": 1 } },
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_past_order_document_copies_fields() {
        let id = ObjectId::new();
        let order = doc! {
            "_id": ObjectId::new(),
            "totalOrderCost": 650,
            "status": "Closed",
            "orderItems": [{ "productID": "a", "quantity": 1 }],
        };
        let past = past_order_document(id, &CustomerId::new("c1"), &order);

        assert_eq!(past.get_object_id("_id"), Ok(id));
        assert_eq!(past.get_str("customerID"), Ok("c1"));
        assert_eq!(past.get_i32("totalOrderCost"), Ok(650));
        assert!(!past.contains_key("status"));
        assert_eq!(past.get_array("orderItems").unwrap().len(), 1);
    }

    #[test]
    fn test_customer_sales_pipeline_sorts_by_revenue() {
        let pipeline = customer_sales_pipeline(&CustomerId::new("c1"));

        assert_eq!(pipeline[0], doc! { "$match": { "customerID": "c1" } });
        let project = pipeline[5].get_document("$project").unwrap();
        assert_eq!(
            project.get_document("totalRevenue").unwrap(),
            &doc! { "$add": ["$totalCost", "$totalProfit"] }
        );
        assert_eq!(pipeline[6], doc! { "$sort": { "totalRevenue": -1, "_id": 1 } });
    }

    #[test]
    fn test_product_sales_pipeline_unwinds_before_match() {
        let pipeline = product_sales_pipeline(&[ProductId::new("a")]);

        assert_eq!(pipeline[0], doc! { "$unwind": "$orderItems" });
        assert_eq!(
            pipeline[1],
            doc! { "$match": { "orderItems.productID": { "$in": ["a"] } } }
        );
        let group = pipeline[4].get_document("$group").unwrap();
        assert_eq!(group.get_str("_id"), Ok("$productDetails.name"));
    }

    #[test]
    fn test_least_frequent_pipeline_limits_before_lookup() {
        let pipeline = least_frequent_pipeline(10);
        assert_eq!(pipeline[3], doc! { "$limit": 10_i64 });
        assert!(pipeline[4].contains_key("$lookup"));
    }
}
