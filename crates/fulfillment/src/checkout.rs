//! Checkout protocol and compensating cancel.

use clients::{InventoryClient, StockAdjustment};
use common::{OrderId, UserId};
use domain::{Order, OrderItem};
use order_store::OrderStore;

use crate::error::{FulfillmentError, Result};
use crate::scheduler::{DeliveryScheduler, DeliveryWindow};

/// Input to the checkout protocol.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub shipping_address: String,
    pub payment_method: String,
}

/// Result of a successful checkout.
#[derive(Debug, Clone)]
pub struct CheckoutOutcome {
    /// The placed order, now `Shipping`.
    pub order: Order,

    /// The user's next working cart — reused if one already existed, fresh
    /// otherwise.
    pub next_cart: Order,
}

/// Drives the cross-service checkout workflow and its compensating
/// cancel.
///
/// There is no transaction spanning the order store and the product
/// service. The protocol orders its steps so that each failure mode needs
/// no compensation: validation happens before the stock decrement, and the
/// decrement happens before anything is persisted. Once the `Shipping`
/// state is saved — the durability point — later steps never roll it
/// back.
pub struct CheckoutCoordinator<S, I> {
    store: S,
    inventory: I,
    scheduler: DeliveryScheduler<S>,
}

impl<S, I> CheckoutCoordinator<S, I>
where
    S: OrderStore + Clone + 'static,
    I: InventoryClient,
{
    /// Creates a coordinator with its own delivery scheduler.
    pub fn new(store: S, inventory: I, window: DeliveryWindow) -> Self {
        let scheduler = DeliveryScheduler::new(store.clone(), window);
        Self {
            store,
            inventory,
            scheduler,
        }
    }

    /// Returns the delivery scheduler.
    pub fn scheduler(&self) -> &DeliveryScheduler<S> {
        &self.scheduler
    }

    /// Checks out a pending order.
    ///
    /// Steps: validate → batched stock decrement → persist `Shipping` →
    /// arm the delivery task → ensure the user has a fresh pending cart.
    /// Stock is decremented at most once per call; a retry against the
    /// already-placed order fails the precondition check and never reaches
    /// the inventory service.
    #[tracing::instrument(skip(self, request))]
    pub async fn checkout(
        &self,
        order_id: OrderId,
        request: CheckoutRequest,
    ) -> Result<CheckoutOutcome> {
        metrics::counter!("checkout_attempts_total").increment(1);

        if request.shipping_address.trim().is_empty() {
            return Err(FulfillmentError::Validation(
                "shipping address is required".to_string(),
            ));
        }
        if request.payment_method.trim().is_empty() {
            return Err(FulfillmentError::Validation(
                "payment method is required".to_string(),
            ));
        }

        let mut order = self
            .store
            .get(order_id)
            .await?
            .ok_or(FulfillmentError::OrderNotFound(order_id))?;

        // Validates the pending/non-empty preconditions and captures the
        // shipping details in memory; nothing is persisted yet.
        order.checkout(request.shipping_address, request.payment_method)?;

        // Single batched decrement. A failure aborts the checkout before
        // the durability point, so there is nothing to compensate.
        self.inventory
            .decrease_stock(&stock_adjustments(order.items()))
            .await?;

        let order = self.store.save(order).await?;

        self.scheduler.schedule(order.id());

        let next_cart = self.ensure_cart(order.user_id()).await?;

        metrics::counter!("checkout_completed_total").increment(1);
        tracing::info!(
            %order_id,
            user_id = %order.user_id(),
            total_cents = order.total().cents(),
            "order placed"
        );

        Ok(CheckoutOutcome { order, next_cart })
    }

    /// Cancels an order from any non-terminal status.
    ///
    /// For orders whose stock was already decremented, the compensating
    /// stock increase is issued after the cancellation is durable. The
    /// increase is not retried; a failure leaves inventory diverged and is
    /// logged for operator reconciliation.
    #[tracing::instrument(skip(self))]
    pub async fn cancel(&self, order_id: OrderId) -> Result<Order> {
        let mut order = self
            .store
            .get(order_id)
            .await?
            .ok_or(FulfillmentError::OrderNotFound(order_id))?;

        let committed = order.status().inventory_committed();
        order.cancel()?;
        let order = self.store.save(order).await?;
        metrics::counter!("orders_cancelled_total").increment(1);

        if committed {
            if let Err(err) = self
                .inventory
                .increase_stock(&stock_adjustments(order.items()))
                .await
            {
                metrics::counter!("stock_compensation_failures_total").increment(1);
                tracing::error!(
                    %order_id,
                    error = %err,
                    "stock compensation failed after cancellation, inventory diverged"
                );
            }
        }

        Ok(order)
    }

    async fn ensure_cart(&self, user_id: UserId) -> Result<Order> {
        if let Some(cart) = self.store.latest_pending_for_user(user_id).await? {
            return Ok(cart);
        }
        Ok(self.store.insert(Order::new(user_id)).await?)
    }
}

fn stock_adjustments(items: &[OrderItem]) -> Vec<StockAdjustment> {
    items
        .iter()
        .map(|item| StockAdjustment::new(item.product_id.clone(), item.quantity))
        .collect()
}
