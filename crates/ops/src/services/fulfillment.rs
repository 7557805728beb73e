//! Order fulfillment: assigning orders to stores and partners, and placing
//! multi-item orders.

use std::collections::BTreeMap;

use bson::DateTime;
use mongodb::Database;
use tracing::{info, instrument};

use quickdrop_core::{CurrencyCode, CustomerId, DeliveryStatus, Price, ProductId};

use crate::db::{self, CustomerRepository, PartnerRepository, ProductRepository, StoreRepository};
use crate::error::OpsError;
use crate::models::{
    AssignedItem, AssignedOrder, Assignment, NewDeliveryTask, NewOrder, OrderLine, PartyDetails,
    PlacedOrder, Product, StoreRef, TaskItem,
};

/// Creates orders and routes them to stores and delivery partners.
pub struct FulfillmentService<'a> {
    db: &'a Database,
    customers: CustomerRepository<'a>,
    stores: StoreRepository<'a>,
    partners: PartnerRepository<'a>,
    products: ProductRepository<'a>,
    courier_speed_kmph: f64,
}

impl<'a> FulfillmentService<'a> {
    /// Create a new fulfillment service. `courier_speed_kmph` drives the ETA.
    #[must_use]
    pub const fn new(db: &'a Database, courier_speed_kmph: f64) -> Self {
        Self {
            db,
            customers: CustomerRepository::new(db),
            stores: StoreRepository::new(db),
            partners: PartnerRepository::new(db),
            products: ProductRepository::new(db),
            courier_speed_kmph,
        }
    }

    /// Assign a one-of-each order to the nearest store stocking every product
    /// and the partner nearest to that store.
    ///
    /// The order is pushed onto the customer's `currentOrders` and a delivery
    /// task onto the partner's `deliveryTasks`. All lookups happen before the
    /// first write.
    ///
    /// # Errors
    ///
    /// Returns `OpsError::InvalidInput` if `product_ids` is empty.
    /// Returns `OpsError::CustomerNotFound` if the customer does not exist.
    /// Returns `OpsError::NoStoreWithItems` if no store stocks every product.
    /// Returns `OpsError::NoAvailableStore` if the matched store's inventory is short.
    /// Returns `OpsError::NoPartnerAvailable` if there are no partners.
    /// Returns `OpsError::ProductNotFound` if a product is missing from the catalogue.
    #[instrument(skip(self, product_ids), fields(customer_id = %customer_id, products = product_ids.len()))]
    pub async fn assign_order_and_partner(
        &self,
        customer_id: &CustomerId,
        product_ids: &[ProductId],
    ) -> Result<Assignment, OpsError> {
        if product_ids.is_empty() {
            return Err(OpsError::InvalidInput(
                "at least one product is required".to_string(),
            ));
        }

        db::ensure_indexes(self.db).await?;

        let customer = self
            .customers
            .get_by_id(customer_id)
            .await?
            .ok_or_else(|| OpsError::CustomerNotFound(customer_id.clone()))?;

        let store = self
            .stores
            .nearest_stocking(&customer.location, product_ids)
            .await?
            .ok_or(OpsError::NoStoreWithItems)?;
        if !store.stocks_all(product_ids) {
            return Err(OpsError::NoAvailableStore);
        }

        let partner = self
            .partners
            .nearest(&store.location)
            .await?
            .ok_or(OpsError::NoPartnerAvailable)?;

        let mut catalogue = Vec::with_capacity(product_ids.len());
        for id in product_ids {
            let product = self
                .products
                .get_by_id(id)
                .await?
                .ok_or_else(|| OpsError::ProductNotFound(id.clone()))?;
            catalogue.push(product);
        }

        let lines = product_ids
            .iter()
            .map(|id| OrderLine {
                product_id: id.clone(),
                quantity: 1,
            })
            .collect();
        let order = NewOrder::pending(store.price_of(product_ids), lines);

        if !self.customers.push_current_order(customer_id, &order).await? {
            return Err(OpsError::CustomerNotFound(customer_id.clone()));
        }

        let customer_address = customer.shipping_address();
        let task = NewDeliveryTask {
            id: order.id,
            delivery_address: customer_address.clone(),
            total_order_cost: order.total_order_cost,
            date_of_delivery: DateTime::now(),
            delivery_status: DeliveryStatus::Pending,
            store: StoreRef {
                id: store.id.clone(),
                name: store.name.clone(),
                address: store.address.clone(),
            },
            order_items: catalogue.iter().map(task_item).collect(),
        };
        self.partners.push_delivery_task(&partner.id, &task).await?;

        let eta = store
            .location
            .eta_minutes(&customer.location, self.courier_speed_kmph);

        info!(
            order_id = %order.id,
            store = %store.name,
            partner = %partner.name,
            total = %Price::from_minor_units(order.total_order_cost, CurrencyCode::GBP),
            eta_minutes = eta,
            "Order assigned"
        );

        Ok(Assignment {
            order_details: AssignedOrder {
                id: order.id,
                total_order_cost: order.total_order_cost,
                status: order.status,
                order_items: catalogue.iter().map(assigned_item).collect(),
                eta,
            },
            customer_address,
            partner_details: PartyDetails {
                name: partner.name,
                location: partner.location,
            },
            store_details: PartyDetails {
                name: store.name,
                location: store.location,
            },
        })
    }

    /// Place an order with quantities, priced from the catalogue.
    ///
    /// Duplicate products are merged by summing quantities. Products that do
    /// not exist are dropped from the order.
    ///
    /// # Errors
    ///
    /// Returns `OpsError::InvalidInput` if `lines` is empty or a quantity is not positive.
    /// Returns `OpsError::NoProductsFound` if none of the products exist.
    /// Returns `OpsError::CustomerNotFound` if the customer does not exist.
    #[instrument(skip(self, lines), fields(customer_id = %customer_id, lines = lines.len()))]
    pub async fn place_order(
        &self,
        customer_id: &CustomerId,
        lines: &[OrderLine],
    ) -> Result<PlacedOrder, OpsError> {
        let lines = merge_lines(lines)?;

        let totals = self
            .products
            .order_totals(&lines)
            .await?
            .ok_or(OpsError::NoProductsFound)?;

        let dropped = lines.len().saturating_sub(totals.order_items.len());
        if dropped > 0 {
            info!(dropped, "Unknown products dropped from order");
        }

        let order = NewOrder::pending(totals.total_cost, totals.order_items);
        if !self.customers.push_current_order(customer_id, &order).await? {
            return Err(OpsError::CustomerNotFound(customer_id.clone()));
        }

        info!(
            order_id = %order.id,
            total = %Price::from_minor_units(totals.total_cost, CurrencyCode::GBP),
            "Order placed"
        );

        Ok(PlacedOrder {
            order_id: order.id,
            total_cost: totals.total_cost,
            items: totals.order_item_names,
        })
    }
}

/// Validate order lines and merge duplicates, keeping first-seen order.
///
/// # Errors
///
/// Returns `OpsError::InvalidInput` if there are no lines or a quantity is
/// not positive.
pub fn merge_lines(lines: &[OrderLine]) -> Result<Vec<OrderLine>, OpsError> {
    if lines.is_empty() {
        return Err(OpsError::InvalidInput(
            "at least one order line is required".to_string(),
        ));
    }

    let mut merged: Vec<OrderLine> = Vec::with_capacity(lines.len());
    let mut index: BTreeMap<&ProductId, usize> = BTreeMap::new();
    for line in lines {
        if line.quantity <= 0 {
            return Err(OpsError::InvalidInput(format!(
                "quantity for {} must be positive, got {}",
                line.product_id, line.quantity
            )));
        }
        if let Some(existing) = index
            .get(&line.product_id)
            .and_then(|&i| merged.get_mut(i))
        {
            existing.quantity += line.quantity;
        } else {
            index.insert(&line.product_id, merged.len());
            merged.push(line.clone());
        }
    }
    Ok(merged)
}

fn task_item(product: &Product) -> TaskItem {
    TaskItem {
        product_id: product.id.clone(),
        quantity: 1,
        name: product.name.clone(),
        short_description: product.short_description.clone(),
        std_price: product.std_price,
    }
}

fn assigned_item(product: &Product) -> AssignedItem {
    AssignedItem {
        product_id: product.id.clone(),
        quantity: 1,
        name: product.name.clone(),
        short_description: product.short_description.clone(),
        std_price: product.std_price,
        avg_rating: product.avg_rating_score.unwrap_or(0.0),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(id: &str, quantity: i64) -> OrderLine {
        OrderLine {
            product_id: ProductId::new(id),
            quantity,
        }
    }

    #[test]
    fn test_merge_lines_sums_duplicates_in_order() {
        let merged = merge_lines(&[line("b", 1), line("a", 2), line("b", 3)]).unwrap();
        assert_eq!(merged, vec![line("b", 4), line("a", 2)]);
    }

    #[test]
    fn test_merge_lines_rejects_empty() {
        assert!(matches!(merge_lines(&[]), Err(OpsError::InvalidInput(_))));
    }

    #[test]
    fn test_merge_lines_rejects_non_positive() {
        assert!(matches!(
            merge_lines(&[line("a", 1), line("b", 0)]),
            Err(OpsError::InvalidInput(_))
        ));
        assert!(matches!(
            merge_lines(&[line("a", -2)]),
            Err(OpsError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_assigned_item_defaults_rating() {
        let product = Product {
            id: ProductId::new("345d1a0e"),
            name: "Megumi Mushrooms".to_string(),
            short_description: Some("Indigenous Korean funghi.".to_string()),
            std_price: 650,
            avg_rating_score: None,
        };
        let item = assigned_item(&product);
        assert_eq!(item.quantity, 1);
        assert!(item.avg_rating.abs() < f64::EPSILON);

        let task = task_item(&product);
        assert_eq!(task.std_price, 650);
        assert_eq!(task.name, "Megumi Mushrooms");
    }
}
