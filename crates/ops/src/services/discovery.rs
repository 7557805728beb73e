//! Product discovery near a customer.

use mongodb::Database;
use tracing::{debug, instrument};

use quickdrop_core::CustomerId;

use crate::db::{self, CustomerRepository, StoreRepository};
use crate::error::OpsError;
use crate::models::ProductListing;

/// Product segment searched when none is given.
pub const DEFAULT_SEGMENT: &str = "Fresh";

/// Finds products stocked near a customer.
pub struct DiscoveryService<'a> {
    db: &'a Database,
    customers: CustomerRepository<'a>,
    stores: StoreRepository<'a>,
}

impl<'a> DiscoveryService<'a> {
    #[must_use]
    pub const fn new(db: &'a Database) -> Self {
        Self {
            db,
            customers: CustomerRepository::new(db),
            stores: StoreRepository::new(db),
        }
    }

    /// Products of `segment` in stores within `max_distance_m` metres of the
    /// customer. A product stocked by several stores is listed once per store.
    ///
    /// # Errors
    ///
    /// Returns `OpsError::InvalidInput` if the distance is negative or not finite.
    /// Returns `OpsError::CustomerNotFound` if the customer does not exist.
    #[instrument(skip(self), fields(customer_id = %customer_id))]
    pub async fn find_fresh_products(
        &self,
        customer_id: &CustomerId,
        max_distance_m: f64,
        segment: &str,
    ) -> Result<Vec<ProductListing>, OpsError> {
        if !max_distance_m.is_finite() || max_distance_m < 0.0 {
            return Err(OpsError::InvalidInput(format!(
                "max distance must be a non-negative number of metres, got {max_distance_m}"
            )));
        }

        db::ensure_indexes(self.db).await?;

        let location = self
            .customers
            .get_location(customer_id)
            .await?
            .ok_or_else(|| OpsError::CustomerNotFound(customer_id.clone()))?;

        let listings = self
            .stores
            .fresh_products(&location, max_distance_m, segment)
            .await?;
        debug!(count = listings.len(), "Products found");
        Ok(listings)
    }
}
