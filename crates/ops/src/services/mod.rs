//! Query operations over the QuickDrop collections.
//!
//! # Services
//!
//! - `fulfillment` - Order assignment and placement
//! - `discovery` - Fresh products near a customer
//! - `reports` - Inventory, sales and product reports with charts
//! - `maintenance` - Rating recompute and archiving
//!
//! Services borrow a `mongodb::Database` and are cheap to construct per call.

pub mod discovery;
pub mod fulfillment;
pub mod maintenance;
pub mod reports;

pub use discovery::{DEFAULT_SEGMENT, DiscoveryService};
pub use fulfillment::{FulfillmentService, merge_lines};
pub use maintenance::{ArchiveOutcome, MaintenanceService};
pub use reports::{InventoryReport, ProductStatsReport, ReportService, SalesReport};
