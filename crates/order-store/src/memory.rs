use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::{OrderId, Page, PageRequest, UserId};
use domain::{Order, OrderStatus};
use tokio::sync::RwLock;

use crate::{
    OrderFilter, OrderStoreError, Result,
    store::{OrderStore, OrderStream},
};

/// In-memory order store used by the test suites and the default binary.
///
/// Provides the same interface and last-writer-wins semantics as the
/// PostgreSQL implementation.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
}

impl InMemoryOrderStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.orders.read().await.len()
    }

    /// Removes every order.
    pub async fn clear(&self) {
        self.orders.write().await.clear();
    }

    fn sorted_newest_first(mut orders: Vec<Order>) -> Vec<Order> {
        orders.sort_by(|a, b| {
            b.updated_at()
                .cmp(&a.updated_at())
                .then(b.created_at().cmp(&a.created_at()))
        });
        orders
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, mut order: Order) -> Result<Order> {
        let now = Utc::now();
        order.set_timestamps(now, now);
        self.orders.write().await.insert(order.id(), order.clone());
        Ok(order)
    }

    async fn save(&self, mut order: Order) -> Result<Order> {
        let mut orders = self.orders.write().await;
        let existing = orders
            .get(&order.id())
            .ok_or(OrderStoreError::NotFound(order.id()))?;
        order.set_timestamps(existing.created_at(), Utc::now());
        orders.insert(order.id(), order.clone());
        Ok(order)
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>> {
        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn latest_pending_for_user(&self, user_id: UserId) -> Result<Option<Order>> {
        let orders = self.orders.read().await;
        let latest = orders
            .values()
            .filter(|o| {
                o.user_id() == user_id && o.status() == OrderStatus::Pending && !o.is_removed()
            })
            .max_by_key(|o| (o.updated_at(), o.created_at()))
            .cloned();
        Ok(latest)
    }

    async fn list_for_user(&self, user_id: UserId, page: PageRequest) -> Result<Page<Order>> {
        let orders = self.orders.read().await;
        let matching: Vec<Order> = orders
            .values()
            .filter(|o| o.user_id() == user_id && !o.is_removed())
            .cloned()
            .collect();
        Ok(Page::from_unpaged(
            Self::sorted_newest_first(matching),
            page,
        ))
    }

    async fn search(&self, filter: &OrderFilter, page: PageRequest) -> Result<Page<Order>> {
        Ok(Page::from_unpaged(self.find_all(filter).await?, page))
    }

    async fn find_all(&self, filter: &OrderFilter) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        let matching: Vec<Order> = orders
            .values()
            .filter(|o| filter.matches(o))
            .cloned()
            .collect();
        Ok(Self::sorted_newest_first(matching))
    }

    async fn stream_all(&self) -> Result<OrderStream> {
        let snapshot: Vec<Order> = self.orders.read().await.values().cloned().collect();
        Ok(Box::pin(futures_util::stream::iter(
            snapshot.into_iter().map(Ok),
        )))
    }
}
