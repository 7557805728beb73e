//! Errors returned by the query operations.

use thiserror::Error;

use quickdrop_core::{CustomerId, ProductId};

use crate::charts::ChartError;
use crate::db::RepositoryError;
use crate::models::PartnerSelector;

/// Errors that can occur while running an operation.
#[derive(Debug, Error)]
pub enum OpsError {
    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Chart rendering or writing failed.
    #[error("chart error: {0}")]
    Chart(#[from] ChartError),

    /// Arguments rejected before touching the database.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("Customer not found: {0}")]
    CustomerNotFound(CustomerId),

    #[error("Partner not found: {0}")]
    PartnerNotFound(PartnerSelector),

    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// No store stocks every requested product.
    #[error("No store with all items found!")]
    NoStoreWithItems,

    /// The matched store's inventory does not list every product.
    #[error("No available store found!")]
    NoAvailableStore,

    #[error("No delivery partner available")]
    NoPartnerAvailable,

    /// None of the requested products exist.
    #[error("No products found")]
    NoProductsFound,

    #[error("No inventory data found for product {0}")]
    NoInventoryData(ProductId),

    #[error("No sales data found")]
    NoSalesData,
}
