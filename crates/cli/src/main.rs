//! QuickDrop CLI - fixture seeding, order operations, reports and maintenance.
//!
//! # Usage
//!
//! ```bash
//! # Check the database is reachable
//! qd-cli ping
//!
//! # Reload every collection from fixtures/
//! qd-cli seed
//!
//! # Assign an order to the nearest store and partner
//! qd-cli assign --customer 0d4a13c3-c9ef-40f2-8516-58de00809364 \
//!     --product 345d1a0e-a274-44fe-875c-901a5d01bedc
//!
//! # Place an order with quantities
//! qd-cli order --customer 0d4a13c3-c9ef-40f2-8516-58de00809364 \
//!     --item 0b9923f0-6f51-4cfa-ac52-3367409a57a4=3
//!
//! # Chart sales of a few products
//! qd-cli sales products --product 0b9923f0-6f51-4cfa-ac52-3367409a57a4
//! ```
//!
//! Results go to stdout as JSON; logs go to stderr. Set
//! `QUICKDROP_LOG_FORMAT=json` for JSON logs.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quickdrop_core::{CustomerId, PartnerId, ProductId};
use quickdrop_ops::models::OrderLine;

mod commands;

#[derive(Parser)]
#[command(name = "qd-cli")]
#[command(author, version, about = "QuickDrop delivery platform tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the database is reachable
    Ping,
    /// Drop and reload collections from fixture files
    Seed {
        /// YAML manifest mapping collections to files (default: all nine collections)
        #[arg(long)]
        manifest: Option<PathBuf>,

        /// Directory holding the fixture files (overrides `QUICKDROP_FIXTURES_DIR`)
        #[arg(long)]
        fixtures_dir: Option<PathBuf>,
    },
    /// Assign an order to the nearest stocking store and delivery partner
    Assign {
        #[arg(long)]
        customer: CustomerId,

        /// Product to order (repeatable, quantity 1 each)
        #[arg(long = "product", required = true)]
        products: Vec<ProductId>,
    },
    /// Find products of a segment in stores near a customer
    Fresh {
        #[arg(long)]
        customer: CustomerId,

        /// Search radius in metres
        #[arg(long, default_value_t = 5_000_000.0)]
        max_distance: f64,

        #[arg(long, default_value = quickdrop_ops::services::DEFAULT_SEGMENT)]
        segment: String,
    },
    /// Place an order with quantities
    Order {
        #[arg(long)]
        customer: CustomerId,

        /// Line item as `PRODUCT_ID=QUANTITY` (repeatable)
        #[arg(long = "item", required = true, value_parser = parse_order_line)]
        items: Vec<OrderLine>,
    },
    /// Chart a product's inventory by date and warehouse
    Inventory {
        #[arg(long)]
        product: ProductId,
    },
    /// Sales reports
    Sales {
        #[command(subcommand)]
        report: SalesReport,
    },
    /// Average product ratings
    Ratings {
        #[command(subcommand)]
        action: RatingsAction,
    },
    /// Move finished records into their archive collections
    Archive {
        #[command(subcommand)]
        target: ArchiveTarget,
    },
    /// Product and inventory statistics
    Stats {
        #[command(subcommand)]
        report: StatsReport,
    },
}

#[derive(Subcommand)]
enum SalesReport {
    /// Cost and profit per item bought by one customer
    Customer {
        #[arg(long)]
        customer: CustomerId,
    },
    /// Cost, profit and revenue per product
    Products {
        #[arg(long = "product", required = true)]
        products: Vec<ProductId>,
    },
}

#[derive(Subcommand)]
enum RatingsAction {
    /// Recompute `avgRatingScore` for every rated product
    Refresh,
}

#[derive(Subcommand)]
enum ArchiveTarget {
    /// Move a customer's closed orders into past orders
    Orders {
        #[arg(long)]
        customer: CustomerId,
    },
    /// Move a partner's settled delivery tasks into the task archive
    Tasks(PartnerArgs),
}

#[derive(Args)]
#[group(required = true, multiple = true)]
struct PartnerArgs {
    /// Partner id (takes precedence over the name)
    #[arg(long)]
    partner_id: Option<PartnerId>,

    #[arg(long)]
    partner_name: Option<String>,
}

#[derive(Subcommand)]
enum StatsReport {
    /// Lowest-rated and least-ordered products
    Products {
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// Items with the lowest availability and the stores holding them
    LowInventory {
        #[arg(long, default_value_t = 5)]
        limit: u32,
    },
}

/// Parse `PRODUCT_ID=QUANTITY`.
fn parse_order_line(raw: &str) -> Result<OrderLine, String> {
    let (id, quantity) = raw
        .rsplit_once('=')
        .ok_or_else(|| format!("expected PRODUCT_ID=QUANTITY, got {raw:?}"))?;
    if id.is_empty() {
        return Err(format!("missing product id in {raw:?}"));
    }
    let quantity = quantity
        .parse::<i64>()
        .map_err(|e| format!("invalid quantity in {raw:?}: {e}"))?;
    Ok(OrderLine {
        product_id: ProductId::new(id),
        quantity,
    })
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    // Logs go to stderr so stdout stays parseable
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "quickdrop_ops=info,quickdrop_cli=info".into());

    let json_logs = std::env::var("QUICKDROP_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let json_layer = json_logs.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer =
        (!json_logs).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = commands::Context::connect().await?;

    match cli.command {
        Commands::Ping => commands::seed::ping(&ctx).await?,
        Commands::Seed {
            manifest,
            fixtures_dir,
        } => commands::seed::seed(&ctx, manifest.as_deref(), fixtures_dir).await?,
        Commands::Assign { customer, products } => {
            commands::orders::assign(&ctx, &customer, &products).await?;
        }
        Commands::Fresh {
            customer,
            max_distance,
            segment,
        } => commands::orders::fresh(&ctx, &customer, max_distance, &segment).await?,
        Commands::Order { customer, items } => {
            commands::orders::place(&ctx, &customer, &items).await?;
        }
        Commands::Inventory { product } => commands::reports::inventory(&ctx, &product).await?,
        Commands::Sales { report } => match report {
            SalesReport::Customer { customer } => {
                commands::reports::sales_per_customer(&ctx, &customer).await?;
            }
            SalesReport::Products { products } => {
                commands::reports::sales_per_product(&ctx, &products).await?;
            }
        },
        Commands::Ratings { action } => match action {
            RatingsAction::Refresh => commands::maintenance::refresh_ratings(&ctx).await?,
        },
        Commands::Archive { target } => match target {
            ArchiveTarget::Orders { customer } => {
                commands::maintenance::archive_orders(&ctx, &customer).await?;
            }
            ArchiveTarget::Tasks(PartnerArgs {
                partner_id,
                partner_name,
            }) => commands::maintenance::archive_tasks(&ctx, partner_id, partner_name).await?,
        },
        Commands::Stats { report } => match report {
            StatsReport::Products { limit } => commands::reports::product_stats(&ctx, limit).await?,
            StatsReport::LowInventory { limit } => {
                commands::reports::low_inventory(&ctx, limit).await?;
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_order_line() {
        let line = parse_order_line("0b9923f0=3").unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(line.product_id.as_str(), "0b9923f0");
        assert_eq!(line.quantity, 3);

        assert!(parse_order_line("0b9923f0").is_err());
        assert!(parse_order_line("=3").is_err());
        assert!(parse_order_line("0b9923f0=many").is_err());
    }

    #[test]
    fn test_partner_id_and_name_both_accepted() {
        let cli = Cli::try_parse_from([
            "qd-cli",
            "archive",
            "tasks",
            "--partner-id",
            "74426dcf",
            "--partner-name",
            "Joseph Jones",
        ]);
        assert!(cli.is_ok());

        let missing = Cli::try_parse_from(["qd-cli", "archive", "tasks"]);
        assert!(missing.is_err());
    }

    #[test]
    fn test_order_requires_items() {
        let cli = Cli::try_parse_from(["qd-cli", "order", "--customer", "c1"]);
        assert!(cli.is_err());
    }
}
