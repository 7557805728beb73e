//! Delivery partner repository.

use bson::{Document, doc};
use mongodb::{Collection, Database};
use serde::Deserialize;

use quickdrop_core::{DeliveryStatus, GeoPoint, PartnerId};

use super::{RepositoryError, collections, first_as, point_document};
use crate::models::{NewDeliveryTask, Partner, PartnerSelector};

/// Repository for delivery partner documents.
pub struct PartnerRepository<'a> {
    db: &'a Database,
}

/// A partner's id and raw `deliveryTasks`.
#[derive(Debug, Deserialize)]
pub struct PartnerTasks {
    #[serde(rename = "_id")]
    pub id: PartnerId,
    #[serde(rename = "deliveryTasks", default)]
    pub delivery_tasks: Vec<Document>,
}

impl<'a> PartnerRepository<'a> {
    /// Create a new partner repository.
    #[must_use]
    pub const fn new(db: &'a Database) -> Self {
        Self { db }
    }

    fn collection(&self) -> Collection<Document> {
        self.db.collection(collections::PARTNERS)
    }

    /// The partner nearest to `near`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the aggregation fails.
    pub async fn nearest(&self, near: &GeoPoint) -> Result<Option<Partner>, RepositoryError> {
        let cursor = self.collection().aggregate(nearest_pipeline(near)).await?;
        first_as(cursor).await
    }

    /// Append a delivery task to a partner's `deliveryTasks`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Serialize` if the task cannot be encoded.
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn push_delivery_task(
        &self,
        id: &PartnerId,
        task: &NewDeliveryTask,
    ) -> Result<bool, RepositoryError> {
        let update = doc! { "$push": { "deliveryTasks": bson::to_document(task)? } };
        let result = self
            .collection()
            .update_one(doc! { "_id": id }, update)
            .await?;
        Ok(result.matched_count > 0)
    }

    /// Load the selected partner's id and tasks.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_tasks(
        &self,
        selector: &PartnerSelector,
    ) -> Result<Option<PartnerTasks>, RepositoryError> {
        let found = self
            .collection()
            .find_one(selector.filter())
            .projection(doc! { "deliveryTasks": 1 })
            .await?;
        Ok(found.map(bson::from_document).transpose()?)
    }

    /// Remove every settled task from the selected partner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn pull_settled_tasks(&self, selector: &PartnerSelector) -> Result<u64, RepositoryError> {
        let result = self
            .collection()
            .update_one(selector.filter(), pull_settled_update())
            .await?;
        Ok(result.modified_count)
    }
}

pub(crate) fn nearest_pipeline(near: &GeoPoint) -> Vec<Document> {
    vec![
        doc! {
            "$geoNear": {
                "near": point_document(near),
                "distanceField": "dist.calculated",
                "spherical": true,
            }
        },
        doc! { "$limit": 1 },
    ]
}

pub(crate) fn pull_settled_update() -> Document {
    doc! {
        "$pull": {
            "deliveryTasks": { "deliveryStatus": { "$in": DeliveryStatus::settled_strs() } }
        }
    }
}

/// Whether a raw task document has a settled `deliveryStatus`.
pub(crate) fn is_settled(task: &Document) -> bool {
    task.get_str("deliveryStatus")
        .ok()
        .and_then(|s| s.parse::<DeliveryStatus>().ok())
        .is_some_and(DeliveryStatus::is_settled)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_nearest_pipeline() {
        let point = GeoPoint::new(2.617_389, -62.821_071).unwrap();
        let pipeline = nearest_pipeline(&point);
        assert!(pipeline[0].contains_key("$geoNear"));
        assert_eq!(pipeline[1], doc! { "$limit": 1 });
    }

    #[test]
    fn test_pull_settled_update_lists_statuses() {
        assert_eq!(
            pull_settled_update(),
            doc! {
                "$pull": {
                    "deliveryTasks": {
                        "deliveryStatus": {
                            "$in": ["Complete", "Canceled", "Customer Canceled", "Rescheduled"]
                        }
                    }
                }
            }
        );
    }

    #[test]
    fn test_is_settled() {
        assert!(is_settled(&doc! { "deliveryStatus": "Customer Canceled" }));
        assert!(is_settled(&doc! { "deliveryStatus": "Complete" }));
        assert!(!is_settled(&doc! { "deliveryStatus": "Pending" }));
        assert!(!is_settled(&doc! { "deliveryStatus": "Lost" }));
        assert!(!is_settled(&doc! {}));
    }

    #[test]
    fn test_partner_tasks_default_empty() {
        let tasks: PartnerTasks = bson::from_document(doc! { "_id": "p1" }).unwrap();
        assert_eq!(tasks.id.as_str(), "p1");
        assert!(tasks.delivery_tasks.is_empty());
    }
}
