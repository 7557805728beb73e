//! Customer repository.
//!
//! Customers carry their open orders inline (`currentOrders`) and keep only
//! the ids of archived ones (`pastOrders`).

use bson::oid::ObjectId;
use bson::{Bson, Document, doc};
use mongodb::{Collection, Database};
use serde::Deserialize;

use quickdrop_core::{CustomerId, GeoPoint, OrderStatus};

use super::{RepositoryError, collections};
use crate::models::{Customer, NewOrder};

/// Repository for customer documents.
pub struct CustomerRepository<'a> {
    db: &'a Database,
}

#[derive(Debug, Deserialize)]
struct LocationOnly {
    location: GeoPoint,
}

#[derive(Debug, Default, Deserialize)]
struct CurrentOrdersOnly {
    #[serde(rename = "currentOrders", default)]
    current_orders: Vec<Document>,
}

impl<'a> CustomerRepository<'a> {
    /// Create a new customer repository.
    #[must_use]
    pub const fn new(db: &'a Database) -> Self {
        Self { db }
    }

    fn collection(&self) -> Collection<Document> {
        self.db.collection(collections::CUSTOMERS)
    }

    /// Get a customer by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::Deserialize` if the document has an unexpected shape.
    pub async fn get_by_id(&self, id: &CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let found = self.collection().find_one(doc! { "_id": id }).await?;
        Ok(found.map(bson::from_document).transpose()?)
    }

    /// Get only a customer's location.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::Deserialize` if the location is not a valid point.
    pub async fn get_location(&self, id: &CustomerId) -> Result<Option<GeoPoint>, RepositoryError> {
        let found = self
            .collection()
            .find_one(doc! { "_id": id })
            .projection(doc! { "location": 1 })
            .await?;

        match found {
            Some(d) => {
                let only: LocationOnly = bson::from_document(d)?;
                Ok(Some(only.location))
            }
            None => Ok(None),
        }
    }

    /// Get the raw `currentOrders` of a customer, or `None` if the customer
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_current_orders(
        &self,
        id: &CustomerId,
    ) -> Result<Option<Vec<Document>>, RepositoryError> {
        let found = self
            .collection()
            .find_one(doc! { "_id": id })
            .projection(doc! { "currentOrders": 1 })
            .await?;

        match found {
            Some(d) => {
                let only: CurrentOrdersOnly = bson::from_document(d)?;
                Ok(Some(only.current_orders))
            }
            None => Ok(None),
        }
    }

    /// Append an order to the customer's `currentOrders`.
    ///
    /// Returns `false` if no customer matched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Serialize` if the order cannot be encoded.
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn push_current_order(
        &self,
        id: &CustomerId,
        order: &NewOrder,
    ) -> Result<bool, RepositoryError> {
        let result = self
            .collection()
            .update_one(doc! { "_id": id }, push_order_update(order)?)
            .await?;
        Ok(result.matched_count > 0)
    }

    /// Drop closed orders from `currentOrders` and record the ids of their
    /// archived copies in `pastOrders`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn record_archived_orders(
        &self,
        id: &CustomerId,
        past_order_ids: &[ObjectId],
    ) -> Result<bool, RepositoryError> {
        let result = self
            .collection()
            .update_one(doc! { "_id": id }, archive_update(past_order_ids))
            .await?;
        Ok(result.matched_count > 0)
    }
}

fn push_order_update(order: &NewOrder) -> Result<Document, RepositoryError> {
    Ok(doc! { "$push": { "currentOrders": bson::to_document(order)? } })
}

/// `$pull` every closed order and `$addToSet` the archived ids in one update.
pub(crate) fn archive_update(past_order_ids: &[ObjectId]) -> Document {
    let ids: Vec<Bson> = past_order_ids.iter().copied().map(Bson::ObjectId).collect();
    doc! {
        "$pull": { "currentOrders": { "status": OrderStatus::Closed.as_str() } },
        "$addToSet": { "pastOrders": { "$each": ids } },
    }
}
