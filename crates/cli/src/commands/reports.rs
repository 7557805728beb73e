//! Reports. Chart paths are part of the printed result.

use quickdrop_core::{CustomerId, ProductId};
use quickdrop_ops::charts::ChartWriter;
use quickdrop_ops::services::ReportService;

use super::{Context, print_json};

fn chart_writer(ctx: &Context) -> ChartWriter {
    ChartWriter::new(ctx.config.chart_dir.clone())
}

/// Inventory by date and warehouse for one product.
///
/// # Errors
///
/// Returns an error if the product or its inventory data is missing, or the
/// chart cannot be written.
pub async fn inventory(ctx: &Context, product: &ProductId) -> Result<(), Box<dyn std::error::Error>> {
    let charts = chart_writer(ctx);
    let report = ReportService::new(&ctx.db, &charts)
        .inventory_by_date(product)
        .await?;
    print_json(&report)
}

/// Sales per item for one customer.
///
/// # Errors
///
/// Returns an error if there is no sales data or the chart cannot be written.
pub async fn sales_per_customer(
    ctx: &Context,
    customer: &CustomerId,
) -> Result<(), Box<dyn std::error::Error>> {
    let charts = chart_writer(ctx);
    let report = ReportService::new(&ctx.db, &charts)
        .sales_per_customer(customer)
        .await?;
    print_json(&report)
}

/// Sales per product across all customers.
///
/// # Errors
///
/// Returns an error if there is no sales data or the chart cannot be written.
pub async fn sales_per_product(
    ctx: &Context,
    products: &[ProductId],
) -> Result<(), Box<dyn std::error::Error>> {
    let charts = chart_writer(ctx);
    let report = ReportService::new(&ctx.db, &charts)
        .sales_per_product(products)
        .await?;
    print_json(&report)
}

/// Lowest-rated and least-ordered products.
///
/// # Errors
///
/// Returns an error if the queries fail or a chart cannot be written.
pub async fn product_stats(ctx: &Context, limit: u32) -> Result<(), Box<dyn std::error::Error>> {
    let charts = chart_writer(ctx);
    let report = ReportService::new(&ctx.db, &charts).product_stats(limit).await?;
    print_json(&report)
}

/// Items with the lowest availability.
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn low_inventory(ctx: &Context, limit: u32) -> Result<(), Box<dyn std::error::Error>> {
    let charts = chart_writer(ctx);
    let items = ReportService::new(&ctx.db, &charts)
        .lowest_inventory_items(limit)
        .await?;
    print_json(&items)
}
