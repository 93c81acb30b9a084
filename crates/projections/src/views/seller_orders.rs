//! Seller orders view — per-seller projection of the order collection.

use chrono::{DateTime, Utc};
use clients::ProductDetailResolver;
use common::{OrderId, Page, PageRequest, SellerId};
use domain::{Money, Order, OrderItem, OrderStatus};
use order_store::{OrderFilter, OrderStore};
use serde::Serialize;

use crate::Result;

/// A single order as one seller sees it: only that seller's line items,
/// priced by the seller's subtotal. Derived on every query, never
/// persisted.
#[derive(Debug, Clone, Serialize)]
pub struct SellerOrder {
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub order_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
    pub subtotal: Money,
}

/// Optional filters for the seller order search.
///
/// Keyword, status and date range are pushed down to the store; the
/// subtotal range is applied in memory because it sums only the seller's
/// item subset, which storage cannot compute.
#[derive(Debug, Clone, Default)]
pub struct SellerOrderSearch {
    pub keyword: Option<String>,
    pub statuses: Option<Vec<OrderStatus>>,
    pub placed_after: Option<DateTime<Utc>>,
    pub placed_before: Option<DateTime<Utc>>,
    pub min_subtotal: Option<Money>,
    pub max_subtotal: Option<Money>,
}

/// Answers "which orders contain my items, with only my items visible".
///
/// Ownership per item: the captured `seller_id` wins when present;
/// otherwise the catalog is consulted through the resolver cache. An order
/// contributes only when at least one resolved item belongs to the seller.
pub struct SellerOrdersView<S, R> {
    store: S,
    resolver: R,
}

impl<S: OrderStore, R: ProductDetailResolver> SellerOrdersView<S, R> {
    /// Creates a view over the given store and resolver.
    pub fn new(store: S, resolver: R) -> Self {
        Self { store, resolver }
    }

    /// Returns one page of the seller's orders, newest first.
    pub async fn orders_for_seller(
        &self,
        seller_id: SellerId,
        page: PageRequest,
    ) -> Result<Page<SellerOrder>> {
        self.search_for_seller(seller_id, SellerOrderSearch::default(), page)
            .await
    }

    /// Searches the seller's orders.
    ///
    /// Pagination happens after the in-memory extraction so page totals
    /// reflect the post-filter result set.
    #[tracing::instrument(skip(self, search))]
    pub async fn search_for_seller(
        &self,
        seller_id: SellerId,
        search: SellerOrderSearch,
        page: PageRequest,
    ) -> Result<Page<SellerOrder>> {
        metrics::counter!("seller_view_queries_total").increment(1);

        // Store-pushed part of the filter; carts are never seller-visible.
        let mut filter = OrderFilter::new().exclude_pending();
        if let Some(keyword) = search.keyword {
            filter = filter.keyword(keyword);
        }
        if let Some(statuses) = search.statuses {
            filter = filter.statuses(statuses);
        }
        if let Some(after) = search.placed_after {
            filter = filter.placed_after(after);
        }
        if let Some(before) = search.placed_before {
            filter = filter.placed_before(before);
        }

        let orders = self.store.find_all(&filter).await?;

        let mut projected = Vec::new();
        for order in &orders {
            let Some(view) = self.project(order, seller_id).await else {
                continue;
            };
            if let Some(min) = search.min_subtotal
                && view.subtotal < min
            {
                continue;
            }
            if let Some(max) = search.max_subtotal
                && view.subtotal > max
            {
                continue;
            }
            projected.push(view);
        }

        Ok(Page::from_unpaged(projected, page))
    }

    async fn project(&self, order: &Order, seller_id: SellerId) -> Option<SellerOrder> {
        let mut items = Vec::new();
        for item in order.items() {
            if self.owner_of(item).await == Some(seller_id) {
                items.push(item.clone());
            }
        }
        if items.is_empty() {
            return None;
        }

        let subtotal = items.iter().map(OrderItem::subtotal).sum();
        Some(SellerOrder {
            order_id: order.id(),
            status: order.status(),
            order_date: order.order_date(),
            created_at: order.created_at(),
            items,
            subtotal,
        })
    }

    async fn owner_of(&self, item: &OrderItem) -> Option<SellerId> {
        if let Some(seller_id) = item.seller_id {
            return Some(seller_id);
        }
        match self.resolver.resolve(&item.product_id).await {
            Ok(detail) => detail.seller_id,
            Err(err) => {
                tracing::warn!(
                    product_id = %item.product_id,
                    error = %err,
                    "item ownership unresolved, excluded from seller view"
                );
                None
            }
        }
    }
}
