//! Read-side views over the order store.
//!
//! These views are recomputed on every query — nothing here is persisted:
//! - [`SellerOrdersView`] — per-seller projection of orders, exposing only
//!   that seller's line items
//! - [`BuyerStatsView`] — single-pass statistics over a buyer's delivered
//!   orders
//! - [`SellerStatsView`] — single-pass statistics over all orders for one
//!   seller, with catalog-verified ownership
//!
//! Item ownership that is missing from historical records is resolved
//! through [`clients::ProductDetailResolver`], whose caching decorator
//! makes repeated lookups free for the lifetime of the process.

pub mod error;
pub mod views;

pub use error::{Result, ViewError};
pub use views::{
    BuyerStats, BuyerStatsView, MostPurchased, SellerOrder, SellerOrderSearch, SellerOrdersView,
    SellerStats, SellerStatsView,
};
