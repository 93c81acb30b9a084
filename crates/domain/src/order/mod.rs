//! Order aggregate and related types.

mod aggregate;
mod state;
mod value_objects;

pub use aggregate::Order;
pub use state::OrderStatus;
pub use value_objects::{Money, OrderItem, ProductId};

use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Order is not in the expected state.
    #[error("invalid state transition: cannot {action} from {status} state")]
    InvalidStateTransition {
        status: OrderStatus,
        action: &'static str,
    },

    /// Item not found in order.
    #[error("item not found: {product_id}")]
    ItemNotFound { product_id: String },

    /// Invalid quantity.
    #[error("invalid quantity: {quantity} (must be greater than 0)")]
    InvalidQuantity { quantity: u32 },

    /// Invalid unit price.
    #[error("invalid price: {cents} (must be greater than 0)")]
    InvalidPrice { cents: i64 },

    /// Order has no items.
    #[error("order has no items")]
    NoItems,
}
