//! Rating refresh and archiving against seeded fixtures.
//!
//! These tests require a running MongoDB (`MONGODB_URI`, default
//! `mongodb://localhost:27017`).

use bson::{Document, doc};
use quickdrop_core::{CustomerId, PartnerId, ProductId};
use quickdrop_integration_tests::{TestContext, ids};
use quickdrop_ops::OpsError;
use quickdrop_ops::db::{CustomerRepository, ProductRepository};
use quickdrop_ops::models::PartnerSelector;
use quickdrop_ops::services::{ArchiveOutcome, MaintenanceService};

// ============================================================================
// Ratings
// ============================================================================

#[tokio::test]
#[ignore = "Requires running MongoDB"]
async fn test_update_product_ratings() {
    let ctx = TestContext::seeded("ratings_refresh").await;

    let refresh = MaintenanceService::new(&ctx.db)
        .update_product_ratings()
        .await
        .expect("refresh should succeed");

    // Four rated ids, one of which is not in the catalogue
    assert_eq!(refresh.averaged, 4);
    assert_eq!(refresh.updated, 3);

    let products = ProductRepository::new(&ctx.db);
    let apples = products
        .get_by_id(&ProductId::new(ids::APPLES))
        .await
        .expect("query should succeed")
        .expect("product exists");
    assert!(apples.avg_rating_score.is_some_and(|r| (r - 4.0).abs() < 1e-9));

    let mushrooms = products
        .get_by_id(&ProductId::new(ids::MUSHROOMS))
        .await
        .expect("query should succeed")
        .expect("product exists");
    assert!(mushrooms.avg_rating_score.is_some_and(|r| (r - 4.5).abs() < 1e-9));

    // Unrated products keep their score
    let rice = products
        .get_by_id(&ProductId::new(ids::RICE))
        .await
        .expect("query should succeed")
        .expect("product exists");
    assert!(rice.avg_rating_score.is_some_and(|r| (r - 4.0).abs() < 1e-9));

    let scratch = ctx
        .db
        .list_collection_names()
        .await
        .expect("listing should succeed");
    assert!(!scratch.iter().any(|name| name == "tempAvgRatings"));

    ctx.cleanup().await;
}

// ============================================================================
// Closed orders
// ============================================================================

#[tokio::test]
#[ignore = "Requires running MongoDB"]
async fn test_archive_closed_orders() {
    let ctx = TestContext::seeded("archive_orders").await;
    let service = MaintenanceService::new(&ctx.db);
    let ada = CustomerId::new(ids::ADA);

    let outcome = service
        .archive_closed_orders(&ada)
        .await
        .expect("archive should succeed");
    let ArchiveOutcome::Archived { ids: archived } = outcome else {
        panic!("expected an archived order, got {outcome:?}");
    };
    assert_eq!(archived.len(), 1);

    let remaining = CustomerRepository::new(&ctx.db)
        .get_current_orders(&ada)
        .await
        .expect("query should succeed")
        .expect("customer exists");
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].get_str("status"), Ok("Pending"));

    let customer = ctx
        .db
        .collection::<Document>("customers")
        .find_one(doc! { "_id": ids::ADA })
        .await
        .expect("query should succeed")
        .expect("customer exists");
    assert_eq!(customer.get_array("pastOrders").map(Vec::len), Ok(1));

    let past = ctx
        .db
        .collection::<Document>("past_orders")
        .count_documents(doc! { "customerID": ids::ADA })
        .await
        .expect("count should succeed");
    assert_eq!(past, 3);

    // A second run finds nothing
    let again = service
        .archive_closed_orders(&ada)
        .await
        .expect("archive should succeed");
    assert_eq!(again, ArchiveOutcome::NothingToArchive);

    ctx.cleanup().await;
}

#[tokio::test]
#[ignore = "Requires running MongoDB"]
async fn test_archive_closed_orders_unknown_customer() {
    let ctx = TestContext::seeded("archive_orders_unknown").await;

    let result = MaintenanceService::new(&ctx.db)
        .archive_closed_orders(&CustomerId::new("nobody"))
        .await;
    assert!(matches!(result, Err(OpsError::CustomerNotFound(_))));

    ctx.cleanup().await;
}

// ============================================================================
// Delivery tasks
// ============================================================================

#[tokio::test]
#[ignore = "Requires running MongoDB"]
async fn test_archive_settled_tasks_by_name() {
    let ctx = TestContext::seeded("archive_tasks_name").await;
    let service = MaintenanceService::new(&ctx.db);
    let selector = PartnerSelector::Name("Joseph Jones".to_string());

    let outcome = service
        .archive_settled_delivery_tasks(&selector)
        .await
        .expect("archive should succeed");
    assert_eq!(
        outcome,
        ArchiveOutcome::Archived {
            ids: vec![
                "657c2b6c4621857590f24f30".to_string(),
                "657c2b6c4621857590f24f32".to_string(),
            ],
        }
    );

    let archived = ctx
        .db
        .collection::<Document>("delivery_tasks")
        .count_documents(doc! { "partner": ids::JOSEPH_JONES })
        .await
        .expect("count should succeed");
    assert_eq!(archived, 2);

    let partner = ctx
        .db
        .collection::<Document>("partners")
        .find_one(doc! { "_id": ids::JOSEPH_JONES })
        .await
        .expect("query should succeed")
        .expect("partner exists");
    let tasks = partner.get_array("deliveryTasks").expect("tasks array");
    assert_eq!(tasks.len(), 1);

    ctx.cleanup().await;
}

#[tokio::test]
#[ignore = "Requires running MongoDB"]
async fn test_archive_settled_tasks_nothing_to_do() {
    let ctx = TestContext::seeded("archive_tasks_empty").await;

    let outcome = MaintenanceService::new(&ctx.db)
        .archive_settled_delivery_tasks(&PartnerSelector::Id(PartnerId::new(ids::PRIYA_SHAH)))
        .await
        .expect("archive should succeed");
    assert_eq!(outcome, ArchiveOutcome::NothingToArchive);

    ctx.cleanup().await;
}

#[tokio::test]
#[ignore = "Requires running MongoDB"]
async fn test_archive_settled_tasks_unknown_partner() {
    let ctx = TestContext::seeded("archive_tasks_unknown").await;

    let result = MaintenanceService::new(&ctx.db)
        .archive_settled_delivery_tasks(&PartnerSelector::Name("Nobody".to_string()))
        .await;
    assert!(matches!(result, Err(OpsError::PartnerNotFound(_))));

    ctx.cleanup().await;
}
