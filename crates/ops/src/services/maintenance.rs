//! Periodic maintenance: rating recompute and archiving of finished work.
//!
//! Archiving copies documents out before removing them, with no transaction
//! around the two steps. A failure in between leaves the records in both
//! places; rerunning copies them again.

use bson::oid::ObjectId;
use bson::{Bson, Document};
use mongodb::Database;
use serde::Serialize;
use tracing::{info, instrument, warn};

use quickdrop_core::{CustomerId, OrderStatus};

use crate::db::{
    self, CustomerRepository, DeliveryTaskRepository, PartnerRepository, PastOrderRepository,
    ProductRepository, RatingRepository, partners,
};
use crate::error::OpsError;
use crate::models::{PartnerSelector, RatingRefresh};

/// Result of an archive run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ArchiveOutcome {
    /// Documents were moved; `ids` are the ids of the archived copies.
    Archived { ids: Vec<String> },
    /// Nothing matched, nothing was written.
    NothingToArchive,
}

/// Maintenance jobs over ratings, orders and delivery tasks.
pub struct MaintenanceService<'a> {
    db: &'a Database,
    customers: CustomerRepository<'a>,
    partners: PartnerRepository<'a>,
    products: ProductRepository<'a>,
    ratings: RatingRepository<'a>,
    past_orders: PastOrderRepository<'a>,
    delivery_tasks: DeliveryTaskRepository<'a>,
}

impl<'a> MaintenanceService<'a> {
    #[must_use]
    pub const fn new(db: &'a Database) -> Self {
        Self {
            db,
            customers: CustomerRepository::new(db),
            partners: PartnerRepository::new(db),
            products: ProductRepository::new(db),
            ratings: RatingRepository::new(db),
            past_orders: PastOrderRepository::new(db),
            delivery_tasks: DeliveryTaskRepository::new(db),
        }
    }

    // =========================================================================
    // Ratings
    // =========================================================================

    /// Recompute every product's `avgRatingScore` from the `ratings`
    /// collection.
    ///
    /// Averages go through the `tempAvgRatings` scratch collection, which is
    /// dropped afterwards. Products without ratings keep their current score.
    ///
    /// # Errors
    ///
    /// Returns `OpsError::Repository` if any aggregation, update or drop fails.
    #[instrument(skip(self))]
    pub async fn update_product_ratings(&self) -> Result<RatingRefresh, OpsError> {
        db::ensure_indexes(self.db).await?;

        self.ratings.merge_averages().await?;
        let averages = self.ratings.read_averages().await?;

        let mut refresh = RatingRefresh::default();
        for average in &averages {
            let Some(avg) = average.avg_rating else {
                continue;
            };
            refresh.averaged += 1;
            if self.products.set_avg_rating(&average.product_id, avg).await? {
                refresh.updated += 1;
            } else {
                warn!(product_id = %average.product_id, "Rated product not in catalogue");
            }
        }

        self.ratings.drop_averages().await?;
        info!(averaged = refresh.averaged, updated = refresh.updated, "Ratings refreshed");
        Ok(refresh)
    }

    // =========================================================================
    // Archiving
    // =========================================================================

    /// Move a customer's closed orders into `past_orders`.
    ///
    /// # Errors
    ///
    /// Returns `OpsError::CustomerNotFound` if the customer does not exist,
    /// including when it disappears after the copies were inserted.
    #[instrument(skip(self), fields(customer_id = %customer_id))]
    pub async fn archive_closed_orders(&self, customer_id: &CustomerId) -> Result<ArchiveOutcome, OpsError> {
        let orders = self
            .customers
            .get_current_orders(customer_id)
            .await?
            .ok_or_else(|| OpsError::CustomerNotFound(customer_id.clone()))?;

        let closed = closed_orders(orders);
        if closed.is_empty() {
            info!("No closed orders for this customer");
            return Ok(ArchiveOutcome::NothingToArchive);
        }

        let ids = self.past_orders.insert_archived(customer_id, &closed).await?;
        let recorded = self.customers.record_archived_orders(customer_id, &ids).await?;

        let outcome = archived_orders_outcome(customer_id, &ids, recorded)?;
        info!(count = ids.len(), "Closed orders moved to past orders");
        Ok(outcome)
    }

    /// Move a partner's settled delivery tasks into `delivery_tasks`.
    ///
    /// # Errors
    ///
    /// Returns `OpsError::PartnerNotFound` if no partner matches the selector.
    #[instrument(skip(self), fields(partner = %selector))]
    pub async fn archive_settled_delivery_tasks(
        &self,
        selector: &PartnerSelector,
    ) -> Result<ArchiveOutcome, OpsError> {
        let partner = self
            .partners
            .get_tasks(selector)
            .await?
            .ok_or_else(|| OpsError::PartnerNotFound(selector.clone()))?;

        let settled: Vec<Document> = partner
            .delivery_tasks
            .into_iter()
            .filter(partners::is_settled)
            .collect();
        if settled.is_empty() {
            info!("No relevant delivery tasks for this partner");
            return Ok(ArchiveOutcome::NothingToArchive);
        }

        self.delivery_tasks
            .insert_archived(&partner.id, &settled)
            .await?;
        let removed = self.partners.pull_settled_tasks(selector).await?;

        info!(count = settled.len(), removed, "Settled delivery tasks moved");
        Ok(ArchiveOutcome::Archived {
            ids: settled.iter().map(|t| id_label(t.get("_id"))).collect(),
        })
    }
}

/// The orders whose `status` is `Closed`.
fn closed_orders(orders: Vec<Document>) -> Vec<Document> {
    orders
        .into_iter()
        .filter(|o| o.get_str("status") == Ok(OrderStatus::Closed.as_str()))
        .collect()
}

/// Outcome of an order archive once the copies exist. The customer update
/// must have matched, otherwise the copies in `past_orders` belong to nobody.
fn archived_orders_outcome(
    customer_id: &CustomerId,
    ids: &[ObjectId],
    recorded: bool,
) -> Result<ArchiveOutcome, OpsError> {
    if !recorded {
        warn!(orphaned = ids.len(), "Customer vanished after closed orders were copied");
        return Err(OpsError::CustomerNotFound(customer_id.clone()));
    }
    Ok(ArchiveOutcome::Archived {
        ids: ids.iter().copied().map(ObjectId::to_hex).collect(),
    })
}

/// Display form of a document id: hex for `ObjectId`s, the raw string for
/// strings.
fn id_label(id: Option<&Bson>) -> String {
    match id {
        Some(Bson::ObjectId(oid)) => oid.to_hex(),
        Some(Bson::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}
