use std::pin::Pin;

use async_trait::async_trait;
use common::{OrderId, Page, PageRequest, UserId};
use domain::Order;
use futures_core::Stream;

use crate::{OrderFilter, Result};

/// A stream of orders, used by full scans such as the seller statistics
/// aggregation.
pub type OrderStream = Pin<Box<dyn Stream<Item = Result<Order>> + Send>>;

/// Core trait for order repository implementations.
///
/// All implementations must be thread-safe (`Send + Sync`). Writes are
/// last-writer-wins: concurrent read-modify-write cycles against the same
/// order are not serialised by the store.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists a new order, stamping both store-owned timestamps.
    ///
    /// Returns the order as stored.
    async fn insert(&self, order: Order) -> Result<Order>;

    /// Persists the new state of an existing order, refreshing
    /// `updated_at` while keeping the original `created_at`.
    ///
    /// Fails with [`crate::OrderStoreError::NotFound`] if the order was
    /// never inserted.
    async fn save(&self, order: Order) -> Result<Order>;

    /// Retrieves an order by ID.
    async fn get(&self, id: OrderId) -> Result<Option<Order>>;

    /// Returns the user's most recently touched pending order — the
    /// working cart.
    ///
    /// "Most recently touched" means highest `updated_at`, with
    /// `created_at` as the tie-breaker. Duplicate pending orders are a
    /// tolerated anomaly; this lookup is what makes the newest one win.
    async fn latest_pending_for_user(&self, user_id: UserId) -> Result<Option<Order>>;

    /// Returns one page of a user's orders, newest first, excluding
    /// soft-deleted records.
    async fn list_for_user(&self, user_id: UserId, page: PageRequest) -> Result<Page<Order>>;

    /// Returns one page of orders matching a dynamic filter, newest first.
    async fn search(&self, filter: &OrderFilter, page: PageRequest) -> Result<Page<Order>>;

    /// Returns every order matching a filter, newest first.
    ///
    /// Used where the caller must post-process before paging (the seller
    /// view's per-item extraction and price-range step).
    async fn find_all(&self, filter: &OrderFilter) -> Result<Vec<Order>>;

    /// Streams every order in the store.
    async fn stream_all(&self) -> Result<OrderStream>;
}
