//! Order state machine.

use serde::{Deserialize, Serialize};

/// The status of an order in its lifecycle.
///
/// Status transitions:
/// ```text
/// Pending ──► Processing ──► Shipping ──► Shipped ──► Delivered
///    │             │             │            │
///    └─────────────┴─────────────┴────────────┴──► Cancelled
/// ```
///
/// While `Pending`, the order doubles as the user's cart. Checkout moves it
/// straight to `Shipping`; the delivery scheduler later advances `Shipping`
/// to `Delivered`. Forward skips are legal for operator-driven updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    /// Order is being assembled; items and address can still change.
    #[default]
    Pending,

    /// Payment confirmed by an external signal.
    Processing,

    /// Checkout completed, inventory committed, shipment underway.
    Shipping,

    /// Handed over to the carrier.
    Shipped,

    /// Order arrived (terminal state).
    Delivered,

    /// Order was cancelled (terminal state).
    Cancelled,
}

impl OrderStatus {
    /// Returns true if items and shipping address can be modified.
    pub fn can_modify_items(&self) -> bool {
        matches!(self, OrderStatus::Pending)
    }

    /// Returns true if the order can be checked out in this status.
    pub fn can_checkout(&self) -> bool {
        matches!(self, OrderStatus::Pending)
    }

    /// Returns true if the order can be cancelled in this status.
    pub fn can_cancel(&self) -> bool {
        !self.is_terminal()
    }

    /// Returns true if this is a terminal status (no further transitions).
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Returns true if inventory has been committed for this status.
    ///
    /// Orders in these states had their stock decremented at checkout, so a
    /// cancellation must issue the compensating stock increase.
    pub fn inventory_committed(&self) -> bool {
        matches!(
            self,
            OrderStatus::Processing | OrderStatus::Shipping | OrderStatus::Shipped
        )
    }

    /// Returns true if a generic status update may move an order from this
    /// status to `next`.
    ///
    /// Only strictly forward moves along the fulfillment chain are legal;
    /// `Cancelled` is reachable solely through the cancel operation.
    pub fn can_advance_to(&self, next: OrderStatus) -> bool {
        match (self.rank(), next.rank()) {
            (Some(from), Some(to)) => to > from,
            _ => false,
        }
    }

    fn rank(&self) -> Option<u8> {
        match self {
            OrderStatus::Pending => Some(0),
            OrderStatus::Processing => Some(1),
            OrderStatus::Shipping => Some(2),
            OrderStatus::Shipped => Some(3),
            OrderStatus::Delivered => Some(4),
            OrderStatus::Cancelled => None,
        }
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipping => "Shipping",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_status_is_pending() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }

    #[test]
    fn test_only_pending_can_modify_items() {
        assert!(OrderStatus::Pending.can_modify_items());
        assert!(!OrderStatus::Processing.can_modify_items());
        assert!(!OrderStatus::Shipping.can_modify_items());
        assert!(!OrderStatus::Shipped.can_modify_items());
        assert!(!OrderStatus::Delivered.can_modify_items());
        assert!(!OrderStatus::Cancelled.can_modify_items());
    }

    #[test]
    fn test_only_pending_can_checkout() {
        assert!(OrderStatus::Pending.can_checkout());
        assert!(!OrderStatus::Shipping.can_checkout());
        assert!(!OrderStatus::Delivered.can_checkout());
        assert!(!OrderStatus::Cancelled.can_checkout());
    }

    #[test]
    fn test_can_cancel_from_non_terminal_states() {
        assert!(OrderStatus::Pending.can_cancel());
        assert!(OrderStatus::Processing.can_cancel());
        assert!(OrderStatus::Shipping.can_cancel());
        assert!(OrderStatus::Shipped.can_cancel());
        assert!(!OrderStatus::Delivered.can_cancel());
        assert!(!OrderStatus::Cancelled.can_cancel());
    }

    #[test]
    fn test_terminal_states() {
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(!OrderStatus::Shipped.is_terminal());
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_inventory_committed_states() {
        assert!(!OrderStatus::Pending.inventory_committed());
        assert!(OrderStatus::Processing.inventory_committed());
        assert!(OrderStatus::Shipping.inventory_committed());
        assert!(OrderStatus::Shipped.inventory_committed());
        assert!(!OrderStatus::Delivered.inventory_committed());
        assert!(!OrderStatus::Cancelled.inventory_committed());
    }

    #[test]
    fn test_advance_is_forward_only() {
        assert!(OrderStatus::Pending.can_advance_to(OrderStatus::Processing));
        assert!(OrderStatus::Processing.can_advance_to(OrderStatus::Shipping));
        assert!(OrderStatus::Shipping.can_advance_to(OrderStatus::Shipped));
        assert!(OrderStatus::Shipped.can_advance_to(OrderStatus::Delivered));

        assert!(!OrderStatus::Shipping.can_advance_to(OrderStatus::Pending));
        assert!(!OrderStatus::Delivered.can_advance_to(OrderStatus::Shipping));
        assert!(!OrderStatus::Shipping.can_advance_to(OrderStatus::Shipping));
    }

    #[test]
    fn test_advance_allows_forward_skips() {
        assert!(OrderStatus::Shipping.can_advance_to(OrderStatus::Delivered));
        assert!(OrderStatus::Pending.can_advance_to(OrderStatus::Shipped));
    }

    #[test]
    fn test_cancelled_is_not_an_advance_target() {
        assert!(!OrderStatus::Pending.can_advance_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Shipping.can_advance_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Cancelled.can_advance_to(OrderStatus::Delivered));
    }

    #[test]
    fn test_display() {
        assert_eq!(OrderStatus::Pending.to_string(), "Pending");
        assert_eq!(OrderStatus::Shipping.to_string(), "Shipping");
        assert_eq!(OrderStatus::Delivered.to_string(), "Delivered");
    }

    #[test]
    fn test_serialization() {
        let status = OrderStatus::Shipping;
        let json = serde_json::to_string(&status).unwrap();
        let deserialized: OrderStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(status, deserialized);
    }
}
