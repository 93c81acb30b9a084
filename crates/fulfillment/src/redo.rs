//! Redo-order: rebuild a cart from a past order against live stock.

use clients::{InventoryClient, ProductDetail};
use common::{OrderId, UserId};
use domain::{Order, OrderItem};
use order_store::OrderStore;

use crate::error::{FulfillmentError, Result};

const MSG_ALL_ADDED: &str = "All items were added to your cart.";
const MSG_SOME_ADDED: &str = "Some items could not be added to your cart.";
const MSG_NONE_ADDED: &str = "None of the items could be added to your cart.";

/// Result of a redo-order request.
#[derive(Debug, Clone)]
pub struct RedoOutcome {
    /// The destination cart, or `None` when no item could be added (in
    /// which case nothing was persisted).
    pub cart: Option<Order>,

    /// Summary message selected by outcome class.
    pub message: String,

    /// One notice per line that was added with a reduced quantity.
    pub partially_filled: Vec<String>,

    /// One notice per line that could not be added at all.
    pub out_of_stock: Vec<String>,
}

/// Rebuilds a cart from a historical order.
///
/// Each line is checked against live inventory: fully available lines are
/// carried over unchanged, partially available lines are reduced to the
/// available count, and unavailable or unverifiable lines are dropped with
/// a notice. A lookup failure downgrades that single line, never the whole
/// request.
pub struct RedoService<S, I> {
    store: S,
    inventory: I,
}

impl<S: OrderStore, I: InventoryClient> RedoService<S, I> {
    /// Creates a redo service over the given store and inventory client.
    pub fn new(store: S, inventory: I) -> Self {
        Self { store, inventory }
    }

    /// Reconstructs a cart from the given past order of the user.
    ///
    /// The destination is the user's existing pending cart when there is
    /// one (quantities merge per product), otherwise a new pending order.
    #[tracing::instrument(skip(self))]
    pub async fn redo(&self, user_id: UserId, order_id: OrderId) -> Result<RedoOutcome> {
        metrics::counter!("redo_attempts_total").increment(1);

        let source = self
            .store
            .get(order_id)
            .await?
            .ok_or(FulfillmentError::OrderNotFound(order_id))?;
        if source.user_id() != user_id {
            // Another user's order is indistinguishable from a missing one.
            return Err(FulfillmentError::OrderNotFound(order_id));
        }

        let mut additions: Vec<OrderItem> = Vec::new();
        let mut partially_filled = Vec::new();
        let mut out_of_stock = Vec::new();

        for item in source.items() {
            match self.inventory.product_detail(&item.product_id).await {
                Ok(detail) if detail.available >= item.quantity => {
                    additions.push(restocked_item(item, &detail, item.quantity));
                }
                Ok(detail) if detail.available > 0 => {
                    partially_filled.push(format!(
                        "{}: only {} of {} available",
                        item.product_name, detail.available, item.quantity
                    ));
                    additions.push(restocked_item(item, &detail, detail.available));
                }
                Ok(_) => {
                    out_of_stock.push(unavailable_notice(item));
                }
                Err(err) => {
                    tracing::warn!(
                        product_id = %item.product_id,
                        error = %err,
                        "redo availability check failed"
                    );
                    out_of_stock.push(unavailable_notice(item));
                }
            }
        }

        if additions.is_empty() {
            return Ok(RedoOutcome {
                cart: None,
                message: MSG_NONE_ADDED.to_string(),
                partially_filled,
                out_of_stock,
            });
        }

        let existing = self.store.latest_pending_for_user(user_id).await?;
        let is_new_cart = existing.is_none();
        let mut cart = existing.unwrap_or_else(|| Order::new(user_id));
        for item in additions {
            cart.add_item(item)?;
        }
        cart.refresh_order_date();

        let cart = if is_new_cart {
            self.store.insert(cart).await?
        } else {
            self.store.save(cart).await?
        };

        let message = if partially_filled.is_empty() && out_of_stock.is_empty() {
            MSG_ALL_ADDED
        } else {
            MSG_SOME_ADDED
        };

        Ok(RedoOutcome {
            cart: Some(cart),
            message: message.to_string(),
            partially_filled,
            out_of_stock,
        })
    }
}

/// Builds the cart line for a redone item: original product, live name,
/// price and seller, capped quantity.
fn restocked_item(original: &OrderItem, detail: &ProductDetail, quantity: u32) -> OrderItem {
    OrderItem {
        product_id: original.product_id.clone(),
        product_name: detail.name.clone(),
        quantity,
        unit_price: detail.price,
        seller_id: detail.seller_id,
    }
}

fn unavailable_notice(item: &OrderItem) -> String {
    format!(
        "{}: out of stock or could not be verified",
        item.product_name
    )
}
