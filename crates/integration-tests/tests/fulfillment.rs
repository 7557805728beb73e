//! Order assignment, order placement and product discovery against seeded
//! fixtures.
//!
//! These tests require a running MongoDB (`MONGODB_URI`, default
//! `mongodb://localhost:27017`).

use bson::doc;
use quickdrop_core::{CustomerId, ProductId};
use quickdrop_integration_tests::{TestContext, ids};
use quickdrop_ops::OpsError;
use quickdrop_ops::db::CustomerRepository;
use quickdrop_ops::models::OrderLine;
use quickdrop_ops::services::{DEFAULT_SEGMENT, DiscoveryService, FulfillmentService};

fn line(id: &str, quantity: i64) -> OrderLine {
    OrderLine {
        product_id: ProductId::new(id),
        quantity,
    }
}

// ============================================================================
// Assignment
// ============================================================================

#[tokio::test]
#[ignore = "Requires running MongoDB"]
async fn test_assign_picks_nearest_stocking_store_and_partner() {
    let ctx = TestContext::seeded("assign_nearest").await;
    let service = FulfillmentService::new(&ctx.db, ctx.config.courier_speed_kmph);

    let assignment = service
        .assign_order_and_partner(
            &CustomerId::new(ids::ADA),
            &[ProductId::new(ids::APPLES), ProductId::new(ids::MUSHROOMS)],
        )
        .await
        .expect("assignment should succeed");

    assert_eq!(assignment.store_details.name, "Jones-Baxter");
    assert_eq!(assignment.partner_details.name, "Joseph Jones");
    assert_eq!(assignment.order_details.total_order_cost, 900);
    assert_eq!(assignment.order_details.order_items.len(), 2);
    assert!(assignment.order_details.eta.is_finite());
    assert!(assignment.order_details.eta > 0.0);
    assert_eq!(assignment.customer_address, "7, Helen Parkways, Salford, M5 4WT");

    // Written to both the customer and the partner
    let orders = CustomerRepository::new(&ctx.db)
        .get_current_orders(&CustomerId::new(ids::ADA))
        .await
        .expect("query should succeed")
        .expect("customer exists");
    assert_eq!(orders.len(), 3);

    let partner = ctx
        .db
        .collection::<bson::Document>("partners")
        .find_one(doc! { "_id": ids::JOSEPH_JONES })
        .await
        .expect("query should succeed")
        .expect("partner exists");
    let tasks = partner.get_array("deliveryTasks").expect("tasks array");
    assert_eq!(tasks.len(), 4);

    ctx.cleanup().await;
}

#[tokio::test]
#[ignore = "Requires running MongoDB"]
async fn test_assign_without_stocking_store_writes_nothing() {
    let ctx = TestContext::seeded("assign_no_store").await;
    let service = FulfillmentService::new(&ctx.db, ctx.config.courier_speed_kmph);

    let result = service
        .assign_order_and_partner(
            &CustomerId::new(ids::ADA),
            &[ProductId::new(ids::KETTLE), ProductId::new(ids::RICE)],
        )
        .await;
    assert!(matches!(result, Err(OpsError::NoStoreWithItems)));

    let orders = CustomerRepository::new(&ctx.db)
        .get_current_orders(&CustomerId::new(ids::ADA))
        .await
        .expect("query should succeed")
        .expect("customer exists");
    assert_eq!(orders.len(), 2);

    ctx.cleanup().await;
}

#[tokio::test]
#[ignore = "Requires running MongoDB"]
async fn test_assign_unknown_customer() {
    let ctx = TestContext::seeded("assign_unknown_customer").await;
    let service = FulfillmentService::new(&ctx.db, ctx.config.courier_speed_kmph);

    let result = service
        .assign_order_and_partner(&CustomerId::new("nobody"), &[ProductId::new(ids::APPLES)])
        .await;
    assert!(matches!(result, Err(OpsError::CustomerNotFound(_))));

    ctx.cleanup().await;
}

// ============================================================================
// Placing orders
// ============================================================================

#[tokio::test]
#[ignore = "Requires running MongoDB"]
async fn test_place_order_drops_unknown_products() {
    let ctx = TestContext::seeded("place_unknown").await;
    let service = FulfillmentService::new(&ctx.db, ctx.config.courier_speed_kmph);

    let placed = service
        .place_order(
            &CustomerId::new(ids::SAM),
            &[line(ids::APPLES, 1), line("does-not-exist", 2), line(ids::APPLES, 2)],
        )
        .await
        .expect("order should be placed");

    assert_eq!(placed.total_cost, 750);
    assert_eq!(placed.items.len(), 1);
    assert_eq!(placed.items[0].name, "Braeburn Apples");
    assert_eq!(placed.items[0].quantity, 3);

    let orders = CustomerRepository::new(&ctx.db)
        .get_current_orders(&CustomerId::new(ids::SAM))
        .await
        .expect("query should succeed")
        .expect("customer exists");
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].get_str("status"), Ok("Pending"));

    ctx.cleanup().await;
}

#[tokio::test]
#[ignore = "Requires running MongoDB"]
async fn test_place_order_with_only_unknown_products() {
    let ctx = TestContext::seeded("place_all_unknown").await;
    let service = FulfillmentService::new(&ctx.db, ctx.config.courier_speed_kmph);

    let result = service
        .place_order(&CustomerId::new(ids::SAM), &[line("ghost", 1)])
        .await;
    assert!(matches!(result, Err(OpsError::NoProductsFound)));

    ctx.cleanup().await;
}

// ============================================================================
// Discovery
// ============================================================================

#[tokio::test]
#[ignore = "Requires running MongoDB"]
async fn test_fresh_products_within_radius() {
    let ctx = TestContext::seeded("fresh_radius").await;
    let service = DiscoveryService::new(&ctx.db);

    let listings = service
        .find_fresh_products(&CustomerId::new(ids::ADA), 20_000.0, DEFAULT_SEGMENT)
        .await
        .expect("query should succeed");

    let mut names: Vec<&str> = listings.iter().map(|l| l.name.as_str()).collect();
    names.sort_unstable();
    assert_eq!(names, vec!["Braeburn Apples", "Megumi Mushrooms", "Whole Milk"]);
    assert!(listings.iter().all(|l| l.distance_m.is_some_and(|d| d <= 20_000.0)));

    let apples = listings
        .iter()
        .find(|l| l.name == "Braeburn Apples")
        .expect("apples listed");
    assert_eq!(apples.category.as_deref(), Some("Fruit"));
    assert_eq!(apples.price, 250);

    ctx.cleanup().await;
}

#[tokio::test]
#[ignore = "Requires running MongoDB"]
async fn test_fresh_products_zero_radius_is_empty() {
    let ctx = TestContext::seeded("fresh_zero").await;
    let service = DiscoveryService::new(&ctx.db);

    let listings = service
        .find_fresh_products(&CustomerId::new(ids::ADA), 0.0, DEFAULT_SEGMENT)
        .await
        .expect("query should succeed");
    assert!(listings.is_empty());

    ctx.cleanup().await;
}
