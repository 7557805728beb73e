//! Rating refresh and archiving.

use quickdrop_core::{CustomerId, PartnerId};
use quickdrop_ops::models::PartnerSelector;
use quickdrop_ops::services::MaintenanceService;

use super::{Context, print_json};

/// Recompute average ratings.
///
/// # Errors
///
/// Returns an error if a database operation fails.
pub async fn refresh_ratings(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let refresh = MaintenanceService::new(&ctx.db).update_product_ratings().await?;
    print_json(&refresh)
}

/// Archive a customer's closed orders.
///
/// # Errors
///
/// Returns an error if the customer does not exist or a write fails.
pub async fn archive_orders(ctx: &Context, customer: &CustomerId) -> Result<(), Box<dyn std::error::Error>> {
    let outcome = MaintenanceService::new(&ctx.db)
        .archive_closed_orders(customer)
        .await?;
    print_json(&outcome)
}

/// Archive a partner's settled delivery tasks. The id wins when both the id
/// and the name are given.
///
/// # Errors
///
/// Returns an error if neither is given, the partner does not exist, or a
/// write fails.
pub async fn archive_tasks(
    ctx: &Context,
    partner_id: Option<PartnerId>,
    partner_name: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let selector = PartnerSelector::from_parts(partner_id, partner_name)
        .ok_or("Please provide partner details!")?;
    let outcome = MaintenanceService::new(&ctx.db)
        .archive_settled_delivery_tasks(&selector)
        .await?;
    print_json(&outcome)
}
