//! Fulfillment error types.

use clients::ClientError;
use common::OrderId;
use domain::OrderError;
use order_store::OrderStoreError;
use thiserror::Error;

/// Errors that can occur while driving the order lifecycle.
#[derive(Debug, Error)]
pub enum FulfillmentError {
    /// Unknown order id.
    #[error("order not found: {0}")]
    OrderNotFound(OrderId),

    /// The aggregate rejected the operation (state conflict or invalid
    /// item data).
    #[error("{0}")]
    Order(#[from] OrderError),

    /// Malformed or missing request input, rejected before any side
    /// effect.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The order store failed.
    #[error("order store error: {0}")]
    Store(#[from] OrderStoreError),

    /// A collaborator service failed.
    #[error("inventory service error: {0}")]
    Inventory(#[from] ClientError),
}

/// Result type for fulfillment operations.
pub type Result<T> = std::result::Result<T, FulfillmentError>;
