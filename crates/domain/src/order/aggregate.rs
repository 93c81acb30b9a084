//! Order aggregate implementation.

use chrono::{DateTime, Utc};
use common::{OrderId, UserId};
use serde::{Deserialize, Serialize};

use super::{Money, OrderError, OrderItem, OrderStatus, ProductId};

/// Order aggregate root.
///
/// While `Pending` the order is the user's working cart: items, shipping
/// address and payment method are mutable. Checkout freezes the item
/// snapshot and moves the order into the fulfillment chain.
///
/// `order_date` is the business timestamp — rewritten on creation, when a
/// redo reuses the cart, and on the scheduled delivery advance. The
/// `created_at`/`updated_at` pair belongs to the store and is overwritten
/// by repository implementations on every persist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    user_id: UserId,
    status: OrderStatus,
    items: Vec<OrderItem>,
    shipping_address: Option<String>,
    payment_method: Option<String>,
    order_date: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    is_removed: bool,
}

// Query methods
impl Order {
    /// Creates a new empty pending order (cart) for a user.
    pub fn new(user_id: UserId) -> Self {
        let now = Utc::now();
        Self {
            id: OrderId::new(),
            user_id,
            status: OrderStatus::Pending,
            items: Vec::new(),
            shipping_address: None,
            payment_method: None,
            order_date: now,
            created_at: now,
            updated_at: now,
            is_removed: false,
        }
    }

    /// Returns the order ID.
    pub fn id(&self) -> OrderId {
        self.id
    }

    /// Returns the owning buyer.
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the current status.
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Returns the line items in insertion order.
    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    /// Returns an item by product ID.
    pub fn item(&self, product_id: &ProductId) -> Option<&OrderItem> {
        self.items.iter().find(|i| &i.product_id == product_id)
    }

    /// Returns the number of line items.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the order has at least one item.
    pub fn has_items(&self) -> bool {
        !self.items.is_empty()
    }

    /// Returns the order total across all line items.
    pub fn total(&self) -> Money {
        self.items.iter().map(OrderItem::subtotal).sum()
    }

    /// Returns the shipping address, if set.
    pub fn shipping_address(&self) -> Option<&str> {
        self.shipping_address.as_deref()
    }

    /// Returns the payment method, if set.
    pub fn payment_method(&self) -> Option<&str> {
        self.payment_method.as_deref()
    }

    /// Returns the business timestamp.
    pub fn order_date(&self) -> DateTime<Utc> {
        self.order_date
    }

    /// Returns the store-owned creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the store-owned last-modified timestamp.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns true if the order was soft-deleted.
    pub fn is_removed(&self) -> bool {
        self.is_removed
    }

    /// Returns true if the order is in a terminal status.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

// Command methods
impl Order {
    /// Adds an item to the cart.
    ///
    /// If the product is already present, quantities are merged onto the
    /// existing line instead of creating a duplicate entry.
    pub fn add_item(&mut self, item: OrderItem) -> Result<(), OrderError> {
        self.ensure_mutable("add item")?;

        if item.quantity == 0 {
            return Err(OrderError::InvalidQuantity {
                quantity: item.quantity,
            });
        }

        if !item.unit_price.is_positive() {
            return Err(OrderError::InvalidPrice {
                cents: item.unit_price.cents(),
            });
        }

        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|i| i.product_id == item.product_id)
        {
            existing.quantity += item.quantity;
        } else {
            self.items.push(item);
        }
        Ok(())
    }

    /// Updates the quantity of an existing line; zero removes the line.
    pub fn update_item_quantity(
        &mut self,
        product_id: &ProductId,
        new_quantity: u32,
    ) -> Result<(), OrderError> {
        self.ensure_mutable("update item quantity")?;

        let position = self
            .items
            .iter()
            .position(|i| &i.product_id == product_id)
            .ok_or_else(|| OrderError::ItemNotFound {
                product_id: product_id.to_string(),
            })?;

        if new_quantity == 0 {
            self.items.remove(position);
        } else {
            self.items[position].quantity = new_quantity;
        }
        Ok(())
    }

    /// Removes a line item from the cart.
    pub fn remove_item(&mut self, product_id: &ProductId) -> Result<(), OrderError> {
        self.ensure_mutable("remove item")?;

        let position = self
            .items
            .iter()
            .position(|i| &i.product_id == product_id)
            .ok_or_else(|| OrderError::ItemNotFound {
                product_id: product_id.to_string(),
            })?;

        self.items.remove(position);
        Ok(())
    }

    /// Removes every line item from the cart.
    pub fn clear_items(&mut self) -> Result<(), OrderError> {
        self.ensure_mutable("clear items")?;
        self.items.clear();
        Ok(())
    }

    /// Updates the shipping address on a pending order.
    pub fn set_shipping_address(&mut self, address: impl Into<String>) -> Result<(), OrderError> {
        self.ensure_mutable("update shipping address")?;
        self.shipping_address = Some(address.into());
        Ok(())
    }

    /// Checks the cart out: captures address and payment method and moves
    /// the order to `Shipping`.
    ///
    /// Only valid on a pending order with at least one item. Mutates the
    /// aggregate in memory only; the caller decides when (and whether) the
    /// transition is persisted.
    pub fn checkout(
        &mut self,
        shipping_address: impl Into<String>,
        payment_method: impl Into<String>,
    ) -> Result<(), OrderError> {
        if !self.status.can_checkout() {
            return Err(OrderError::InvalidStateTransition {
                status: self.status,
                action: "checkout",
            });
        }
        if !self.has_items() {
            return Err(OrderError::NoItems);
        }

        self.shipping_address = Some(shipping_address.into());
        self.payment_method = Some(payment_method.into());
        self.status = OrderStatus::Shipping;
        Ok(())
    }

    /// Marks a shipping order as delivered and refreshes the business
    /// timestamp. Used by the delivery scheduler.
    pub fn mark_delivered(&mut self) -> Result<(), OrderError> {
        if self.status != OrderStatus::Shipping {
            return Err(OrderError::InvalidStateTransition {
                status: self.status,
                action: "mark delivered",
            });
        }
        self.status = OrderStatus::Delivered;
        self.order_date = Utc::now();
        Ok(())
    }

    /// Cancels the order from any non-terminal status.
    pub fn cancel(&mut self) -> Result<(), OrderError> {
        if !self.status.can_cancel() {
            return Err(OrderError::InvalidStateTransition {
                status: self.status,
                action: "cancel",
            });
        }
        self.status = OrderStatus::Cancelled;
        Ok(())
    }

    /// Applies a generic forward status update (operator/payment signals).
    pub fn advance_status(&mut self, next: OrderStatus) -> Result<(), OrderError> {
        if !self.status.can_advance_to(next) {
            return Err(OrderError::InvalidStateTransition {
                status: self.status,
                action: "update status",
            });
        }
        self.status = next;
        Ok(())
    }

    /// Soft-deletes the order, hiding it from user-facing searches.
    pub fn mark_removed(&mut self) {
        self.is_removed = true;
    }

    /// Rewrites the business timestamp to now. Called when a redo reuses
    /// this order as the destination cart.
    pub fn refresh_order_date(&mut self) {
        self.order_date = Utc::now();
    }

    /// Overwrites the store-owned timestamps. Called by repository
    /// implementations only.
    pub fn set_timestamps(&mut self, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) {
        self.created_at = created_at;
        self.updated_at = updated_at;
    }

    fn ensure_mutable(&self, action: &'static str) -> Result<(), OrderError> {
        if !self.status.can_modify_items() {
            return Err(OrderError::InvalidStateTransition {
                status: self.status,
                action,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cart_with_widget() -> Order {
        let mut order = Order::new(UserId::new());
        order
            .add_item(OrderItem::new(
                "SKU-001",
                "Widget",
                2,
                Money::from_cents(1000),
            ))
            .unwrap();
        order
    }

    #[test]
    fn test_new_order_is_empty_pending_cart() {
        let user_id = UserId::new();
        let order = Order::new(user_id);
        assert_eq!(order.user_id(), user_id);
        assert_eq!(order.status(), OrderStatus::Pending);
        assert!(!order.has_items());
        assert!(!order.is_removed());
        assert_eq!(order.total(), Money::zero());
    }

    #[test]
    fn test_add_item() {
        let order = cart_with_widget();
        assert_eq!(order.item_count(), 1);
        assert_eq!(order.total().cents(), 2000);
    }

    #[test]
    fn test_add_same_product_merges_quantity() {
        let mut order = cart_with_widget();
        order
            .add_item(OrderItem::new(
                "SKU-001",
                "Widget",
                3,
                Money::from_cents(1000),
            ))
            .unwrap();

        assert_eq!(order.item_count(), 1);
        assert_eq!(order.item(&ProductId::new("SKU-001")).unwrap().quantity, 5);
        assert_eq!(order.total().cents(), 5000);
    }

    #[test]
    fn test_add_item_zero_quantity_fails() {
        let mut order = Order::new(UserId::new());
        let result = order.add_item(OrderItem::new("SKU-001", "Widget", 0, Money::from_cents(1000)));
        assert!(matches!(result, Err(OrderError::InvalidQuantity { .. })));
    }

    #[test]
    fn test_add_item_zero_price_fails() {
        let mut order = Order::new(UserId::new());
        let result = order.add_item(OrderItem::new("SKU-001", "Widget", 1, Money::zero()));
        assert!(matches!(result, Err(OrderError::InvalidPrice { .. })));
    }

    #[test]
    fn test_update_item_quantity() {
        let mut order = cart_with_widget();
        order
            .update_item_quantity(&ProductId::new("SKU-001"), 5)
            .unwrap();
        assert_eq!(order.item(&ProductId::new("SKU-001")).unwrap().quantity, 5);
    }

    #[test]
    fn test_update_item_quantity_to_zero_removes_line() {
        let mut order = cart_with_widget();
        order
            .update_item_quantity(&ProductId::new("SKU-001"), 0)
            .unwrap();
        assert_eq!(order.item_count(), 0);
    }

    #[test]
    fn test_update_missing_item_fails() {
        let mut order = cart_with_widget();
        let result = order.update_item_quantity(&ProductId::new("SKU-999"), 1);
        assert!(matches!(result, Err(OrderError::ItemNotFound { .. })));
    }

    #[test]
    fn test_remove_item() {
        let mut order = cart_with_widget();
        order.remove_item(&ProductId::new("SKU-001")).unwrap();
        assert!(!order.has_items());
    }

    #[test]
    fn test_clear_items() {
        let mut order = cart_with_widget();
        order
            .add_item(OrderItem::new(
                "SKU-002",
                "Gadget",
                1,
                Money::from_cents(500),
            ))
            .unwrap();
        order.clear_items().unwrap();
        assert!(!order.has_items());
    }

    #[test]
    fn test_checkout_moves_to_shipping_and_captures_details() {
        let mut order = cart_with_widget();
        order.checkout("12 Main St", "card").unwrap();

        assert_eq!(order.status(), OrderStatus::Shipping);
        assert_eq!(order.shipping_address(), Some("12 Main St"));
        assert_eq!(order.payment_method(), Some("card"));
    }

    #[test]
    fn test_checkout_empty_cart_fails() {
        let mut order = Order::new(UserId::new());
        let result = order.checkout("12 Main St", "card");
        assert!(matches!(result, Err(OrderError::NoItems)));
        assert_eq!(order.status(), OrderStatus::Pending);
    }

    #[test]
    fn test_checkout_twice_fails() {
        let mut order = cart_with_widget();
        order.checkout("12 Main St", "card").unwrap();
        let result = order.checkout("12 Main St", "card");
        assert!(matches!(
            result,
            Err(OrderError::InvalidStateTransition { .. })
        ));
        assert_eq!(order.status(), OrderStatus::Shipping);
    }

    #[test]
    fn test_items_frozen_after_checkout() {
        let mut order = cart_with_widget();
        order.checkout("12 Main St", "card").unwrap();

        let before: Vec<_> = order.items().to_vec();
        let add = order.add_item(OrderItem::new("SKU-002", "Gadget", 1, Money::from_cents(500)));
        let update = order.update_item_quantity(&ProductId::new("SKU-001"), 9);
        let remove = order.remove_item(&ProductId::new("SKU-001"));
        let clear = order.clear_items();
        let address = order.set_shipping_address("elsewhere");

        for result in [add, update, remove, clear, address] {
            assert!(matches!(
                result,
                Err(OrderError::InvalidStateTransition { .. })
            ));
        }
        assert_eq!(order.items(), before.as_slice());
    }

    #[test]
    fn test_mark_delivered_refreshes_order_date() {
        let mut order = cart_with_widget();
        order.checkout("12 Main St", "card").unwrap();
        let placed_date = order.order_date();

        order.mark_delivered().unwrap();
        assert_eq!(order.status(), OrderStatus::Delivered);
        assert!(order.order_date() >= placed_date);
    }

    #[test]
    fn test_mark_delivered_requires_shipping() {
        let mut order = cart_with_widget();
        let result = order.mark_delivered();
        assert!(matches!(
            result,
            Err(OrderError::InvalidStateTransition { .. })
        ));
    }

    #[test]
    fn test_cancel_from_shipping() {
        let mut order = cart_with_widget();
        order.checkout("12 Main St", "card").unwrap();
        order.cancel().unwrap();
        assert_eq!(order.status(), OrderStatus::Cancelled);
    }

    #[test]
    fn test_cancel_delivered_fails() {
        let mut order = cart_with_widget();
        order.checkout("12 Main St", "card").unwrap();
        order.mark_delivered().unwrap();
        let result = order.cancel();
        assert!(matches!(
            result,
            Err(OrderError::InvalidStateTransition { .. })
        ));
    }

    #[test]
    fn test_advance_status_forward() {
        let mut order = cart_with_widget();
        order.advance_status(OrderStatus::Processing).unwrap();
        assert_eq!(order.status(), OrderStatus::Processing);

        let back = order.advance_status(OrderStatus::Pending);
        assert!(matches!(back, Err(OrderError::InvalidStateTransition { .. })));
    }

    #[test]
    fn test_serialization_roundtrip() {
        let mut order = cart_with_widget();
        order.checkout("12 Main St", "card").unwrap();

        let json = serde_json::to_string(&order).unwrap();
        let deserialized: Order = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.id(), order.id());
        assert_eq!(deserialized.status(), OrderStatus::Shipping);
        assert_eq!(deserialized.items(), order.items());
        assert_eq!(deserialized.total(), order.total());
    }
}
