//! Archived delivery task repository.

use bson::{Document, doc};
use mongodb::{Collection, Database};

use quickdrop_core::PartnerId;

use super::{RepositoryError, collections};

/// Repository for the `delivery_tasks` archive.
pub struct DeliveryTaskRepository<'a> {
    db: &'a Database,
}

impl<'a> DeliveryTaskRepository<'a> {
    /// Create a new delivery task repository.
    #[must_use]
    pub const fn new(db: &'a Database) -> Self {
        Self { db }
    }

    fn collection(&self) -> Collection<Document> {
        self.db.collection(collections::DELIVERY_TASKS)
    }

    /// Copy tasks into the archive, tagging each with its partner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert_archived(
        &self,
        partner_id: &PartnerId,
        tasks: &[Document],
    ) -> Result<u64, RepositoryError> {
        if tasks.is_empty() {
            return Ok(0);
        }
        let docs = tasks.iter().map(|t| archived_task(partner_id, t));
        let result = self.collection().insert_many(docs).await?;
        Ok(result.inserted_ids.len() as u64)
    }
}

/// The stored task with `partner` set; every other field is kept as is.
pub(crate) fn archived_task(partner_id: &PartnerId, task: &Document) -> Document {
    let mut archived = task.clone();
    archived.insert("partner", partner_id);
    archived
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archived_task_adds_partner() {
        let task = doc! { "_id": 1, "deliveryStatus": "Complete", "totalOrderCost": 650 };
        let archived = archived_task(&PartnerId::new("p1"), &task);
        assert_eq!(
            archived,
            doc! { "_id": 1, "deliveryStatus": "Complete", "totalOrderCost": 650, "partner": "p1" }
        );
    }
}
