//! Reporting over inventory, sales and products, with charts.

use std::path::PathBuf;

use mongodb::Database;
use serde::Serialize;
use tracing::{info, instrument};

use quickdrop_core::{CustomerId, ProductId};

use crate::charts::{BarChart, ChartWriter, Layout, Series};
use crate::db::{InventoryLogRepository, PastOrderRepository, ProductRepository, StoreRepository};
use crate::error::OpsError;
use crate::models::{
    FrequencyStat, InventoryPivot, LowInventoryItem, ProductStats, RatedProduct, SalesLine,
};

/// Inventory levels of one product and the chart drawn from them.
#[derive(Debug, Clone, Serialize)]
pub struct InventoryReport {
    pub product_id: ProductId,
    pub pivot: InventoryPivot,
    pub chart: PathBuf,
}

/// Sales lines and their stacked cost/profit chart.
#[derive(Debug, Clone, Serialize)]
pub struct SalesReport {
    pub lines: Vec<SalesLine>,
    pub chart: PathBuf,
}

/// Product statistics and their two charts.
#[derive(Debug, Clone, Serialize)]
pub struct ProductStatsReport {
    #[serde(flatten)]
    pub stats: ProductStats,
    pub charts: Vec<PathBuf>,
}

/// Read-only reports. Charted reports write SVGs through the given writer.
pub struct ReportService<'a> {
    products: ProductRepository<'a>,
    inventory_logs: InventoryLogRepository<'a>,
    past_orders: PastOrderRepository<'a>,
    stores: StoreRepository<'a>,
    charts: &'a ChartWriter,
}

impl<'a> ReportService<'a> {
    #[must_use]
    pub const fn new(db: &'a Database, charts: &'a ChartWriter) -> Self {
        Self {
            products: ProductRepository::new(db),
            inventory_logs: InventoryLogRepository::new(db),
            past_orders: PastOrderRepository::new(db),
            stores: StoreRepository::new(db),
            charts,
        }
    }

    // =========================================================================
    // Inventory
    // =========================================================================

    /// Stock of a product per warehouse and date, pivoted and charted as
    /// grouped bars.
    ///
    /// # Errors
    ///
    /// Returns `OpsError::ProductNotFound` if the product does not exist.
    /// Returns `OpsError::NoInventoryData` if it has no inventory logs.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn inventory_by_date(&self, product_id: &ProductId) -> Result<InventoryReport, OpsError> {
        let name = self
            .products
            .get_name(product_id)
            .await?
            .ok_or_else(|| OpsError::ProductNotFound(product_id.clone()))?;

        let points = self
            .inventory_logs
            .totals_by_warehouse_and_date(product_id)
            .await?;
        if points.is_empty() {
            return Err(OpsError::NoInventoryData(product_id.clone()));
        }

        let pivot = InventoryPivot::from_points(name, &points);
        let chart = self
            .charts
            .write(
                &inventory_chart(product_id, &pivot),
                &format!("inventory_{product_id}"),
            )
            .await?;
        info!(chart = %chart.display(), dates = pivot.dates.len(), "Inventory chart written");

        Ok(InventoryReport {
            product_id: product_id.clone(),
            pivot,
            chart,
        })
    }

    // =========================================================================
    // Sales
    // =========================================================================

    /// Cost and profit per item a customer has bought.
    ///
    /// # Errors
    ///
    /// Returns `OpsError::NoSalesData` if the customer has no past orders.
    #[instrument(skip(self), fields(customer_id = %customer_id))]
    pub async fn sales_per_customer(&self, customer_id: &CustomerId) -> Result<SalesReport, OpsError> {
        let lines = self.past_orders.sales_for_customer(customer_id).await?;
        if lines.is_empty() {
            return Err(OpsError::NoSalesData);
        }

        let title = format!("Total Cost and Profit per Item for User ID: {customer_id}");
        let chart = self
            .charts
            .write(&sales_chart(title, &lines), &format!("sales_customer_{customer_id}"))
            .await?;
        info!(chart = %chart.display(), items = lines.len(), "Sales chart written");

        Ok(SalesReport { lines, chart })
    }

    /// Cost, profit and revenue per product across all past orders.
    ///
    /// # Errors
    ///
    /// Returns `OpsError::InvalidInput` if `product_ids` is empty.
    /// Returns `OpsError::NoSalesData` if none of the products was ever sold.
    #[instrument(skip(self, product_ids), fields(products = product_ids.len()))]
    pub async fn sales_per_product(&self, product_ids: &[ProductId]) -> Result<SalesReport, OpsError> {
        if product_ids.is_empty() {
            return Err(OpsError::InvalidInput(
                "at least one product is required".to_string(),
            ));
        }

        let lines = self.past_orders.sales_for_products(product_ids).await?;
        if lines.is_empty() {
            return Err(OpsError::NoSalesData);
        }

        let title = "Total Cost, Revenue, and Profit per Product";
        let chart = self
            .charts
            .write(&sales_chart(title, &lines), "sales_products")
            .await?;
        info!(chart = %chart.display(), items = lines.len(), "Sales chart written");

        Ok(SalesReport { lines, chart })
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// The `limit` lowest-rated and least-ordered products, each charted.
    ///
    /// # Errors
    ///
    /// Returns `OpsError::InvalidInput` if `limit` is zero.
    #[instrument(skip(self))]
    pub async fn product_stats(&self, limit: u32) -> Result<ProductStatsReport, OpsError> {
        require_limit(limit)?;

        let lowest_rated = self.products.lowest_rated(limit).await?;
        let least_frequent = self.past_orders.least_frequent(limit).await?;

        let rated = self
            .charts
            .write(&rating_chart(limit, &lowest_rated), "lowest_rated_products")
            .await?;
        let frequent = self
            .charts
            .write(&frequency_chart(limit, &least_frequent), "least_frequent_products")
            .await?;
        info!(rated = %rated.display(), frequent = %frequent.display(), "Product charts written");

        Ok(ProductStatsReport {
            stats: ProductStats {
                lowest_rated,
                least_frequent,
            },
            charts: vec![rated, frequent],
        })
    }

    /// The `limit` inventory items with the lowest availability and the
    /// stores holding them at that level.
    ///
    /// # Errors
    ///
    /// Returns `OpsError::InvalidInput` if `limit` is zero.
    #[instrument(skip(self))]
    pub async fn lowest_inventory_items(&self, limit: u32) -> Result<Vec<LowInventoryItem>, OpsError> {
        require_limit(limit)?;
        Ok(self.stores.lowest_inventory_items(limit).await?)
    }
}

fn require_limit(limit: u32) -> Result<(), OpsError> {
    if limit == 0 {
        return Err(OpsError::InvalidInput("limit must be at least 1".to_string()));
    }
    Ok(())
}

// =============================================================================
// Charts
// =============================================================================

#[allow(clippy::cast_precision_loss)]
fn as_f64(value: i64) -> f64 {
    value as f64
}

pub(crate) fn inventory_chart(product_id: &ProductId, pivot: &InventoryPivot) -> BarChart {
    let title = format!(
        "Inventory Levels for \"{}\" (Product ID: {product_id}) by Date and Warehouse",
        pivot.product_name
    );
    pivot.warehouses.iter().enumerate().fold(
        BarChart::new(title, "Date", "Total Inventory")
            .categories(pivot.dates.clone())
            .layout(Layout::Grouped),
        |chart, (i, warehouse)| {
            let values = pivot.series_for(i).into_iter().map(as_f64).collect();
            chart.series(Series::new(warehouse.clone(), palette(i), values))
        },
    )
}

pub(crate) fn sales_chart(title: impl Into<String>, lines: &[SalesLine]) -> BarChart {
    BarChart::new(title, "Product Name", "Total in Cents")
        .categories(lines.iter().map(SalesLine::display_label).collect())
        .series(Series::new(
            "Cost",
            "red",
            lines.iter().map(|l| as_f64(l.total_cost)).collect(),
        ))
        .series(Series::new(
            "Profit",
            "green",
            lines.iter().map(|l| as_f64(l.total_profit)).collect(),
        ))
        .layout(Layout::Stacked)
}

pub(crate) fn rating_chart(limit: u32, products: &[RatedProduct]) -> BarChart {
    BarChart::new(
        format!("Top {limit} Lowest Rated Products"),
        "Products",
        "Average Rating Score",
    )
    .categories(products.iter().map(|p| p.name.clone()).collect())
    .series(Series::new(
        "Average rating",
        "blue",
        products
            .iter()
            .map(|p| p.avg_rating_score.unwrap_or(0.0))
            .collect(),
    ))
}

pub(crate) fn frequency_chart(limit: u32, stats: &[FrequencyStat]) -> BarChart {
    BarChart::new(
        format!("Top {limit} Least Frequent Products"),
        "Products",
        "Frequency in Past Orders",
    )
    .categories(
        stats
            .iter()
            .map(|s| s.product_name.clone().unwrap_or_else(|| "Unknown".to_string()))
            .collect(),
    )
    .series(Series::new(
        "Orders",
        "red",
        stats.iter().map(|s| as_f64(s.count)).collect(),
    ))
}

/// Fill colour for the `index`th series of a grouped chart.
fn palette(index: usize) -> &'static str {
    const COLORS: [&str; 8] = [
        "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    ];
    COLORS.get(index % COLORS.len()).copied().unwrap_or("#1f77b4")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::models::InventoryPoint;

    #[test]
    fn test_inventory_chart_one_series_per_warehouse() {
        let points = vec![
            InventoryPoint {
                warehouse: "North".into(),
                date: "2023-12-01".into(),
                total_inventory: 10,
            },
            InventoryPoint {
                warehouse: "East".into(),
                date: "2023-12-02".into(),
                total_inventory: 4,
            },
        ];
        let pivot = InventoryPivot::from_points("Mea Culpa", &points);
        let chart = inventory_chart(&ProductId::new("0b9923f0"), &pivot);

        assert_eq!(
            chart.title,
            "Inventory Levels for \"Mea Culpa\" (Product ID: 0b9923f0) by Date and Warehouse"
        );
        assert_eq!(chart.layout, Layout::Grouped);
        assert_eq!(chart.categories, vec!["2023-12-01", "2023-12-02"]);
        let names: Vec<&str> = chart.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["East", "North"]);
        assert_eq!(chart.series[0].values, vec![0.0, 4.0]);
        assert_eq!(chart.series[1].values, vec![10.0, 0.0]);
    }

    #[test]
    fn test_sales_chart_stacks_cost_under_profit() {
        let lines = vec![SalesLine {
            label: Some("Mea Culpa".into()),
            total_cost: 6000,
            total_profit: 2000,
            total_revenue: 8000,
        }];
        let chart = sales_chart("t", &lines);

        assert_eq!(chart.layout, Layout::Stacked);
        assert_eq!(chart.y_label, "Total in Cents");
        assert_eq!(chart.series[0].name, "Cost");
        assert_eq!(chart.series[0].color, "red");
        assert_eq!(chart.series[1].values, vec![2000.0]);
    }

    #[test]
    fn test_stats_charts() {
        let rated = rating_chart(
            10,
            &[RatedProduct {
                name: "Chocolate Milk".into(),
                avg_rating_score: None,
            }],
        );
        assert_eq!(rated.title, "Top 10 Lowest Rated Products");
        assert_eq!(rated.series[0].values, vec![0.0]);

        let frequent = frequency_chart(
            3,
            &[FrequencyStat {
                product_name: None,
                count: 2,
            }],
        );
        assert_eq!(frequent.categories, vec!["Unknown"]);
        assert_eq!(frequent.series[0].color, "red");
    }

    #[test]
    fn test_require_limit() {
        assert!(require_limit(1).is_ok());
        assert!(matches!(require_limit(0), Err(OpsError::InvalidInput(_))));
    }

    #[test]
    fn test_palette_wraps() {
        assert_eq!(palette(0), palette(8));
        assert_ne!(palette(0), palette(1));
    }
}
