//! Database operations against MongoDB.
//!
//! # Collections
//!
//! - `customers` - Customers with embedded `currentOrders`
//! - `stores` - Stores with embedded `inventory`
//! - `partners` - Delivery partners with embedded `deliveryTasks`
//! - `products` - Product catalogue
//! - `past_orders` - Archived customer orders
//! - `delivery_tasks` - Archived delivery tasks
//! - `inventory_logs` - Warehouse stock snapshots
//! - `ratings` - Individual product ratings
//! - `addresses` - Address book (loaded by `seed` only)
//!
//! Every query and aggregation runs inside the database; the repositories
//! build filters and pipelines and decode the results.

pub mod customers;
pub mod delivery_tasks;
pub mod inventory_logs;
pub mod partners;
pub mod past_orders;
pub mod products;
pub mod ratings;
pub mod stores;

use bson::{Document, doc};
use futures::TryStreamExt;
use mongodb::options::ClientOptions;
use mongodb::{Client, Cursor, Database, IndexModel};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};

use quickdrop_core::GeoPoint;

use crate::config::OpsConfig;

pub use customers::CustomerRepository;
pub use delivery_tasks::DeliveryTaskRepository;
pub use inventory_logs::InventoryLogRepository;
pub use partners::{PartnerRepository, PartnerTasks};
pub use past_orders::PastOrderRepository;
pub use products::ProductRepository;
pub use ratings::{AverageRating, RatingRepository};
pub use stores::StoreRepository;

/// Collection names.
pub mod collections {
    pub const ADDRESSES: &str = "addresses";
    pub const CUSTOMERS: &str = "customers";
    pub const DELIVERY_TASKS: &str = "delivery_tasks";
    pub const INVENTORY_LOGS: &str = "inventory_logs";
    pub const PARTNERS: &str = "partners";
    pub const PAST_ORDERS: &str = "past_orders";
    pub const PRODUCTS: &str = "products";
    pub const RATINGS: &str = "ratings";
    pub const STORES: &str = "stores";
    /// Scratch collection used while recomputing average ratings.
    pub const TEMP_AVG_RATINGS: &str = "tempAvgRatings";
}

const APP_NAME: &str = "quickdrop";

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Error from the MongoDB driver.
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),

    /// A document did not match the expected shape.
    #[error("could not decode document: {0}")]
    Deserialize(#[from] bson::de::Error),

    /// A value could not be encoded as BSON.
    #[error("could not encode document: {0}")]
    Serialize(#[from] bson::ser::Error),
}

/// Connect to MongoDB and return a handle to the configured database.
///
/// The driver connects lazily, so this does not fail when the server is down;
/// call [`ping`] to check reachability.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the connection string is invalid.
#[instrument(skip(config), fields(database = %config.database))]
pub async fn connect(config: &OpsConfig) -> Result<Database, RepositoryError> {
    let mut options = ClientOptions::parse(config.mongodb_uri.expose_secret()).await?;
    options.app_name = Some(APP_NAME.to_string());
    options.server_selection_timeout = Some(config.server_selection_timeout);

    let client = Client::with_options(options)?;
    Ok(client.database(&config.database))
}

/// Round-trip a `ping` command to the server.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if no server can be selected in time.
#[instrument(skip(db), fields(database = %db.name()))]
pub async fn ping(db: &Database) -> Result<(), RepositoryError> {
    db.run_command(doc! { "ping": 1 }).await?;
    debug!("Ping succeeded");
    Ok(())
}

/// Create the indexes the queries rely on. Idempotent.
///
/// - `2dsphere` on `stores.location` and `partners.location` (required by `$geoNear`)
/// - ascending on `stores.inventory.productID`
/// - ascending on `ratings.productID`
///
/// # Errors
///
/// Returns `RepositoryError::Database` if index creation fails.
#[instrument(skip(db))]
pub async fn ensure_indexes(db: &Database) -> Result<(), RepositoryError> {
    for (collection, keys) in index_keys() {
        db.collection::<Document>(collection)
            .create_index(IndexModel::builder().keys(keys).build())
            .await?;
    }
    debug!("Indexes ensured");
    Ok(())
}

fn index_keys() -> Vec<(&'static str, Document)> {
    vec![
        (collections::STORES, doc! { "location": "2dsphere" }),
        (collections::PARTNERS, doc! { "location": "2dsphere" }),
        (collections::STORES, doc! { "inventory.productID": 1 }),
        (collections::RATINGS, doc! { "productID": 1 }),
    ]
}

/// A GeoJSON point as a BSON document, for `$geoNear.near`.
pub(crate) fn point_document(point: &GeoPoint) -> Document {
    doc! {
        "type": "Point",
        "coordinates": [point.longitude(), point.latitude()],
    }
}

/// Drain a cursor and decode every document into `T`.
pub(crate) async fn collect_as<T: DeserializeOwned>(
    cursor: Cursor<Document>,
) -> Result<Vec<T>, RepositoryError> {
    let docs: Vec<Document> = cursor.try_collect().await?;
    docs.into_iter()
        .map(|d| bson::from_document(d).map_err(RepositoryError::from))
        .collect()
}

/// Decode the first document of a cursor, if any.
pub(crate) async fn first_as<T: DeserializeOwned>(
    mut cursor: Cursor<Document>,
) -> Result<Option<T>, RepositoryError> {
    match cursor.try_next().await? {
        Some(d) => Ok(Some(bson::from_document(d)?)),
        None => Ok(None),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_index_keys_cover_geo_collections() {
        let keys = index_keys();
        let geo: Vec<_> = keys
            .iter()
            .filter(|(_, keys)| keys.get_str("location") == Ok("2dsphere"))
            .map(|(c, _)| *c)
            .collect();
        assert_eq!(geo, vec![collections::STORES, collections::PARTNERS]);
    }

    #[test]
    fn test_point_document_is_lng_lat() {
        let point = GeoPoint::new(-2.24, 53.48).unwrap();
        assert_eq!(
            point_document(&point),
            doc! { "type": "Point", "coordinates": [-2.24, 53.48] }
        );
    }

    #[test]
    fn test_repository_error_display() {
        let err = bson::from_document::<crate::models::Partner>(doc! { "name": 7 })
            .map_err(RepositoryError::from)
            .unwrap_err();
        assert!(err.to_string().starts_with("could not decode document"));
    }
}
