//! Orders, delivery tasks, and the results returned to callers when they are
//! created.

use bson::DateTime;
use bson::oid::ObjectId;
use bson::serde_helpers::serialize_object_id_as_hex_string;
use serde::{Deserialize, Serialize};

use quickdrop_core::{DeliveryStatus, GeoPoint, OrderStatus, ProductId, StoreId};

use super::lenient;

// =============================================================================
// Stored documents
// =============================================================================

/// A product and quantity on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    #[serde(rename = "productID")]
    pub product_id: ProductId,
    pub quantity: i64,
}

/// An order pushed onto a customer's `currentOrders`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub total_order_cost: i64,
    pub status: OrderStatus,
    pub order_items: Vec<OrderLine>,
}

impl NewOrder {
    /// A fresh pending order with a newly generated id.
    #[must_use]
    pub fn pending(total_order_cost: i64, order_items: Vec<OrderLine>) -> Self {
        Self {
            id: ObjectId::new(),
            total_order_cost,
            status: OrderStatus::Pending,
            order_items,
        }
    }
}

/// Store summary embedded in a delivery task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreRef {
    #[serde(rename = "_id")]
    pub id: StoreId,
    pub name: String,
    pub address: String,
}

/// Order item embedded in a delivery task, denormalized from the catalogue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskItem {
    #[serde(rename = "productID")]
    pub product_id: ProductId,
    pub quantity: i64,
    pub name: String,
    pub short_description: Option<String>,
    pub std_price: i64,
}

/// A delivery task pushed onto a partner's `deliveryTasks`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDeliveryTask {
    /// Same id as the order being delivered.
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub delivery_address: String,
    pub total_order_cost: i64,
    pub date_of_delivery: DateTime,
    pub delivery_status: DeliveryStatus,
    pub store: StoreRef,
    pub order_items: Vec<TaskItem>,
}

// =============================================================================
// Results
// =============================================================================

/// Name and location of the matched store or partner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartyDetails {
    pub name: String,
    pub location: GeoPoint,
}

/// An assigned order item, with catalogue details and rating.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedItem {
    #[serde(rename = "productID")]
    pub product_id: ProductId,
    pub quantity: i64,
    pub name: String,
    pub short_description: Option<String>,
    pub std_price: i64,
    pub avg_rating: f64,
}

/// The order as reported back to the caller of an assignment.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedOrder {
    #[serde(rename = "_id", serialize_with = "serialize_object_id_as_hex_string")]
    pub id: ObjectId,
    pub total_order_cost: i64,
    pub status: OrderStatus,
    pub order_items: Vec<AssignedItem>,
    /// Minutes from store to customer at courier speed.
    pub eta: f64,
}

/// Outcome of assigning an order to a store and delivery partner.
#[derive(Debug, Clone, Serialize)]
pub struct Assignment {
    pub order_details: AssignedOrder,
    pub customer_address: String,
    pub partner_details: PartyDetails,
    pub store_details: PartyDetails,
}

/// Line of a placed order as shown to the customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedOrderItem {
    pub name: String,
    pub quantity: i64,
}

/// Outcome of placing a multi-item order.
#[derive(Debug, Clone, Serialize)]
pub struct PlacedOrder {
    #[serde(serialize_with = "serialize_object_id_as_hex_string")]
    pub order_id: ObjectId,
    pub total_cost: i64,
    pub items: Vec<PlacedOrderItem>,
}

/// The single `$group` row produced by the order-placement pipeline.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct OrderTotals {
    #[serde(rename = "totalCost", deserialize_with = "lenient::whole_number")]
    pub total_cost: i64,
    #[serde(rename = "orderItems")]
    pub order_items: Vec<OrderLine>,
    #[serde(rename = "orderItemNames")]
    pub order_item_names: Vec<PlacedOrderItem>,
}
