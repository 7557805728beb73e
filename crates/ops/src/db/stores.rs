//! Store repository: nearest-store search, fresh product discovery and
//! inventory scarcity.

use bson::{Document, doc};
use mongodb::{Collection, Database};

use quickdrop_core::{GeoPoint, ProductId};

use super::{RepositoryError, collect_as, collections, first_as, point_document};
use crate::models::{LowInventoryItem, ProductListing, Store};

/// Repository for store documents.
pub struct StoreRepository<'a> {
    db: &'a Database,
}

impl<'a> StoreRepository<'a> {
    /// Create a new store repository.
    #[must_use]
    pub const fn new(db: &'a Database) -> Self {
        Self { db }
    }

    fn collection(&self) -> Collection<Document> {
        self.db.collection(collections::STORES)
    }

    /// The store nearest to `near` whose inventory lists every product.
    ///
    /// Requires the `2dsphere` index on `location`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the aggregation fails.
    /// Returns `RepositoryError::Deserialize` if the store has an unexpected shape.
    pub async fn nearest_stocking(
        &self,
        near: &GeoPoint,
        product_ids: &[ProductId],
    ) -> Result<Option<Store>, RepositoryError> {
        let cursor = self
            .collection()
            .aggregate(nearest_stocking_pipeline(near, product_ids))
            .await?;
        first_as(cursor).await
    }

    /// Products of `segment` stocked by stores within `max_distance_m` metres
    /// of `near`, one listing per inventory line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the aggregation fails.
    pub async fn fresh_products(
        &self,
        near: &GeoPoint,
        max_distance_m: f64,
        segment: &str,
    ) -> Result<Vec<ProductListing>, RepositoryError> {
        let cursor = self
            .collection()
            .aggregate(fresh_products_pipeline(near, max_distance_m, segment))
            .await?;
        collect_as(cursor).await
    }

    /// The `limit` inventory items with the lowest availability, each with
    /// the stores holding it at that level.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the aggregation fails.
    pub async fn lowest_inventory_items(
        &self,
        limit: u32,
    ) -> Result<Vec<LowInventoryItem>, RepositoryError> {
        let cursor = self
            .collection()
            .aggregate(lowest_inventory_pipeline(limit))
            .await?;
        collect_as(cursor).await
    }
}

// =============================================================================
// Pipelines
// =============================================================================

pub(crate) fn nearest_stocking_pipeline(near: &GeoPoint, product_ids: &[ProductId]) -> Vec<Document> {
    let ids: Vec<&str> = product_ids.iter().map(ProductId::as_str).collect();
    vec![
        doc! {
            "$geoNear": {
                "near": point_document(near),
                "distanceField": "dist.calculated",
                "spherical": true,
            }
        },
        doc! { "$match": { "inventory.productID": { "$all": ids } } },
        doc! { "$limit": 1 },
    ]
}

pub(crate) fn fresh_products_pipeline(
    near: &GeoPoint,
    max_distance_m: f64,
    segment: &str,
) -> Vec<Document> {
    vec![
        doc! {
            "$geoNear": {
                "near": point_document(near),
                "distanceField": "distance",
                "maxDistance": max_distance_m,
                "spherical": true,
            }
        },
        doc! { "$unwind": "$inventory" },
        doc! {
            "$lookup": {
                "from": collections::PRODUCTS,
                "localField": "inventory.productID",
                "foreignField": "_id",
                "as": "productDetails",
            }
        },
        doc! { "$unwind": "$productDetails" },
        doc! { "$match": { "productDetails.productSegment": segment } },
        doc! {
            "$project": {
                "_id": 0,
                "name": "$productDetails.name",
                "category": "$productDetails.attributes.freshAttributes.category",
                "countryOfOrigin": "$productDetails.attributes.freshAttributes.countryOfOrigin",
                "expiryDate": "$productDetails.attributes.freshAttributes.expiryDate",
                "averageRating": "$productDetails.avgRatingScore",
                "dimensions": "$productDetails.dimensions",
                "description": "$productDetails.shortDescription",
                "price": "$productDetails.stdPrice",
                "distanceM": "$distance",
            }
        },
    ]
}

pub(crate) fn lowest_inventory_pipeline(limit: u32) -> Vec<Document> {
    vec![
        doc! { "$unwind": "$inventory" },
        doc! {
            "$group": {
                "_id": "$inventory.name",
                "lowestInventory": { "$min": "$inventory.availability" },
                "stores": {
                    "$push": {
                        "storeName": "$name",
                        "availability": "$inventory.availability",
                        "address": "$address",
                        "location": "$location",
                    }
                },
            }
        },
        doc! { "$sort": { "lowestInventory": 1, "_id": 1 } },
        doc! { "$limit": i64::from(limit) },
        doc! {
            "$project": {
                "_id": 0,
                "itemName": "$_id",
                "lowestInventory": 1,
                "stores": {
                    "$filter": {
                        "input": "$stores",
                        "as": "store",
                        "cond": { "$eq": ["$$store.availability", "$lowestInventory"] },
                    }
                },
            }
        },
    ]
}
