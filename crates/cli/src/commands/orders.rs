//! Order assignment, placement and product discovery.

use quickdrop_core::{CustomerId, ProductId};
use quickdrop_ops::models::OrderLine;
use quickdrop_ops::services::{DiscoveryService, FulfillmentService};

use super::{Context, print_json};

/// Assign a one-of-each order to the nearest store and partner.
///
/// # Errors
///
/// Returns an error if no store or partner can take the order, or a
/// database operation fails.
pub async fn assign(
    ctx: &Context,
    customer: &CustomerId,
    products: &[ProductId],
) -> Result<(), Box<dyn std::error::Error>> {
    let service = FulfillmentService::new(&ctx.db, ctx.config.courier_speed_kmph);
    let assignment = service.assign_order_and_partner(customer, products).await?;
    print_json(&assignment)
}

/// List products of `segment` stocked near the customer.
///
/// # Errors
///
/// Returns an error if the customer does not exist or the query fails.
pub async fn fresh(
    ctx: &Context,
    customer: &CustomerId,
    max_distance_m: f64,
    segment: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let listings = DiscoveryService::new(&ctx.db)
        .find_fresh_products(customer, max_distance_m, segment)
        .await?;
    print_json(&listings)
}

/// Place an order with quantities.
///
/// # Errors
///
/// Returns an error if no product exists or a database operation fails.
pub async fn place(
    ctx: &Context,
    customer: &CustomerId,
    items: &[OrderLine],
) -> Result<(), Box<dyn std::error::Error>> {
    let service = FulfillmentService::new(&ctx.db, ctx.config.courier_speed_kmph);
    let placed = service.place_order(customer, items).await?;
    print_json(&placed)
}
