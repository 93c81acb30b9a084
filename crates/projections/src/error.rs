//! View error types.

use thiserror::Error;

/// Errors that can occur while computing a view.
///
/// Collaborator failures never abort a view: an item whose ownership
/// cannot be resolved is simply excluded from that seller's results.
#[derive(Debug, Error)]
pub enum ViewError {
    /// An error occurred in the order store.
    #[error("order store error: {0}")]
    Store(#[from] order_store::OrderStoreError),
}

/// Result type for view computations.
pub type Result<T> = std::result::Result<T, ViewError>;
