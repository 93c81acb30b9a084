//! Clients for the collaborator services the order engine depends on.
//!
//! All collaborators are consumed through traits so the engine and its
//! tests can swap the HTTP implementations for in-memory twins:
//! - [`InventoryClient`] — stock adjustment and product-detail lookup
//!   against the product service. Fail-fast: errors propagate and the
//!   caller decides compensation.
//! - [`MediaClient`] — display-only image lookup; callers swallow errors.
//! - [`ProductDetailResolver`] — lazy product-detail resolution with the
//!   process-lifetime cache used by the seller view and statistics.

pub mod error;
pub mod inventory;
pub mod media;
pub mod resolver;

pub use error::ClientError;
pub use inventory::{
    HttpInventoryClient, InMemoryInventoryClient, InventoryClient, ProductDetail, StockAdjustment,
};
pub use media::{HttpMediaClient, InMemoryMediaClient, MediaClient};
pub use resolver::{CachingResolver, ProductDetailResolver};
