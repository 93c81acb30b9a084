//! Seller statistics — single pass over the whole order collection.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use clients::ProductDetailResolver;
use common::{SellerId, UserId};
use domain::{Money, OrderItem, OrderStatus};
use futures_util::StreamExt;
use order_store::OrderStore;
use serde::Serialize;

use crate::Result;

/// Sales statistics for one seller.
///
/// Delivered orders feed revenue, items sold, the customer set and the
/// last sale date; cancelled orders feed only the cancellation counter.
/// With no qualifying orders every field is zero.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SellerStats {
    pub total_revenue: Money,
    pub items_sold: u64,
    pub delivered_orders: u64,
    pub cancelled_orders: u64,
    pub unique_customers: u64,
    pub last_sale_date: Option<DateTime<Utc>>,
    pub delivery_rating: f64,
    pub cancellation_rate: f64,
}

/// Computes [`SellerStats`] on demand by streaming every order.
///
/// Ownership is re-verified through the product-detail cache even when an
/// item carries a captured `seller_id` — the catalog is the source of
/// truth here. Items whose ownership cannot be resolved count for nobody.
pub struct SellerStatsView<S, R> {
    store: S,
    resolver: R,
}

impl<S: OrderStore, R: ProductDetailResolver> SellerStatsView<S, R> {
    /// Creates a view over the given store and resolver.
    pub fn new(store: S, resolver: R) -> Self {
        Self { store, resolver }
    }

    /// Aggregates the seller's statistics in a single pass.
    #[tracing::instrument(skip(self))]
    pub async fn stats_for_seller(&self, seller_id: SellerId) -> Result<SellerStats> {
        metrics::counter!("seller_stats_queries_total").increment(1);

        let mut stats = SellerStats::default();
        let mut customers: HashSet<UserId> = HashSet::new();

        let mut stream = self.store.stream_all().await?;
        while let Some(order) = stream.next().await {
            let order = order?;
            let status = order.status();
            if status != OrderStatus::Delivered && status != OrderStatus::Cancelled {
                continue;
            }

            let mut owned: Vec<&OrderItem> = Vec::new();
            for item in order.items() {
                if self.catalog_owner(item).await == Some(seller_id) {
                    owned.push(item);
                }
            }
            if owned.is_empty() {
                continue;
            }

            if status == OrderStatus::Delivered {
                stats.delivered_orders += 1;
                for item in &owned {
                    stats.total_revenue += item.subtotal();
                    stats.items_sold += u64::from(item.quantity);
                }
                customers.insert(order.user_id());
                if stats.last_sale_date.is_none_or(|d| order.order_date() > d) {
                    stats.last_sale_date = Some(order.order_date());
                }
            } else {
                stats.cancelled_orders += 1;
            }
        }

        stats.unique_customers = customers.len() as u64;

        let finished = stats.delivered_orders + stats.cancelled_orders;
        if finished > 0 {
            let delivered = stats.delivered_orders as f64;
            let cancelled = stats.cancelled_orders as f64;
            stats.delivery_rating = (5.0 * delivered / finished as f64).max(1.0);
            stats.cancellation_rate = 100.0 * cancelled / finished as f64;
        }

        Ok(stats)
    }

    async fn catalog_owner(&self, item: &OrderItem) -> Option<SellerId> {
        match self.resolver.resolve(&item.product_id).await {
            Ok(detail) => detail.seller_id,
            Err(err) => {
                tracing::warn!(
                    product_id = %item.product_id,
                    error = %err,
                    "item ownership unresolved, excluded from seller stats"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clients::{CachingResolver, InMemoryInventoryClient, ProductDetail};
    use domain::{Order, ProductId};
    use order_store::InMemoryOrderStore;

    type View = SellerStatsView<InMemoryOrderStore, CachingResolver<InMemoryInventoryClient>>;

    fn setup() -> (View, InMemoryOrderStore, InMemoryInventoryClient) {
        let store = InMemoryOrderStore::new();
        let inventory = InMemoryInventoryClient::new();
        let view = SellerStatsView::new(store.clone(), CachingResolver::new(inventory.clone()));
        (view, store, inventory)
    }

    fn catalog_product(inventory: &InMemoryInventoryClient, sku: &str, seller_id: SellerId) {
        inventory.insert_product(ProductDetail {
            product_id: ProductId::new(sku),
            name: sku.to_string(),
            price: Money::from_cents(1000),
            available: 100,
            seller_id: Some(seller_id),
        });
    }

    async fn insert_order(
        store: &InMemoryOrderStore,
        user_id: UserId,
        items: Vec<(&str, u32, i64)>,
        status: OrderStatus,
    ) {
        let mut order = Order::new(user_id);
        for (sku, qty, cents) in items {
            order
                .add_item(OrderItem::new(sku, sku, qty, Money::from_cents(cents)))
                .unwrap();
        }
        match status {
            OrderStatus::Delivered => {
                order.checkout("12 Main St", "card").unwrap();
                order.mark_delivered().unwrap();
            }
            OrderStatus::Cancelled => order.cancel().unwrap(),
            OrderStatus::Pending => {}
            other => order.advance_status(other).unwrap(),
        }
        store.insert(order).await.unwrap();
    }

    #[tokio::test]
    async fn test_three_delivered_one_cancelled() {
        let (view, store, inventory) = setup();
        let seller_id = SellerId::new();
        catalog_product(&inventory, "SKU-001", seller_id);

        for _ in 0..3 {
            insert_order(
                &store,
                UserId::new(),
                vec![("SKU-001", 2, 1000)],
                OrderStatus::Delivered,
            )
            .await;
        }
        insert_order(
            &store,
            UserId::new(),
            vec![("SKU-001", 1, 1000)],
            OrderStatus::Cancelled,
        )
        .await;

        let stats = view.stats_for_seller(seller_id).await.unwrap();
        assert_eq!(stats.delivered_orders, 3);
        assert_eq!(stats.cancelled_orders, 1);
        assert_eq!(stats.cancellation_rate, 25.0);
        assert_eq!(stats.delivery_rating, 3.75);
        assert_eq!(stats.total_revenue.cents(), 6000);
        assert_eq!(stats.items_sold, 6);
        assert_eq!(stats.unique_customers, 3);
        assert!(stats.last_sale_date.is_some());
    }

    #[tokio::test]
    async fn test_no_qualifying_orders_is_all_zero() {
        let (view, store, inventory) = setup();
        let seller_id = SellerId::new();
        catalog_product(&inventory, "SKU-001", seller_id);

        insert_order(
            &store,
            UserId::new(),
            vec![("SKU-001", 1, 1000)],
            OrderStatus::Shipping,
        )
        .await;

        let stats = view.stats_for_seller(seller_id).await.unwrap();
        assert_eq!(stats.delivered_orders, 0);
        assert_eq!(stats.cancelled_orders, 0);
        assert_eq!(stats.total_revenue, Money::zero());
        assert_eq!(stats.delivery_rating, 0.0);
        assert_eq!(stats.cancellation_rate, 0.0);
        assert!(stats.last_sale_date.is_none());
    }

    #[tokio::test]
    async fn test_delivery_rating_is_clamped_to_one() {
        let (view, store, inventory) = setup();
        let seller_id = SellerId::new();
        catalog_product(&inventory, "SKU-001", seller_id);

        for _ in 0..4 {
            insert_order(
                &store,
                UserId::new(),
                vec![("SKU-001", 1, 1000)],
                OrderStatus::Cancelled,
            )
            .await;
        }

        let stats = view.stats_for_seller(seller_id).await.unwrap();
        assert_eq!(stats.delivery_rating, 1.0);
        assert_eq!(stats.cancellation_rate, 100.0);
    }

    #[tokio::test]
    async fn test_catalog_overrides_captured_seller() {
        let (view, store, inventory) = setup();
        let catalog_seller = SellerId::new();
        let captured_seller = SellerId::new();
        catalog_product(&inventory, "SKU-001", catalog_seller);

        // The historical record claims another seller; the catalog wins.
        let mut order = Order::new(UserId::new());
        order
            .add_item(OrderItem::with_seller(
                "SKU-001",
                "Widget",
                1,
                Money::from_cents(1000),
                captured_seller,
            ))
            .unwrap();
        order.checkout("12 Main St", "card").unwrap();
        order.mark_delivered().unwrap();
        store.insert(order).await.unwrap();

        let for_catalog = view.stats_for_seller(catalog_seller).await.unwrap();
        assert_eq!(for_catalog.delivered_orders, 1);

        let for_captured = view.stats_for_seller(captured_seller).await.unwrap();
        assert_eq!(for_captured.delivered_orders, 0);
    }

    #[tokio::test]
    async fn test_unresolved_items_count_for_nobody() {
        let (view, store, inventory) = setup();
        let seller_id = SellerId::new();
        inventory.set_fail_detail("SKU-001");

        insert_order(
            &store,
            UserId::new(),
            vec![("SKU-001", 1, 1000)],
            OrderStatus::Delivered,
        )
        .await;

        let stats = view.stats_for_seller(seller_id).await.unwrap();
        assert_eq!(stats.delivered_orders, 0);
        assert_eq!(stats.total_revenue, Money::zero());
    }

    #[tokio::test]
    async fn test_revenue_counts_only_the_sellers_subset() {
        let (view, store, inventory) = setup();
        let seller_id = SellerId::new();
        catalog_product(&inventory, "SKU-MINE", seller_id);
        catalog_product(&inventory, "SKU-OTHER", SellerId::new());

        insert_order(
            &store,
            UserId::new(),
            vec![("SKU-MINE", 2, 1500), ("SKU-OTHER", 10, 9000)],
            OrderStatus::Delivered,
        )
        .await;

        let stats = view.stats_for_seller(seller_id).await.unwrap();
        assert_eq!(stats.total_revenue.cents(), 3000);
        assert_eq!(stats.items_sold, 2);
    }

    #[tokio::test]
    async fn test_repeat_customers_counted_once() {
        let (view, store, inventory) = setup();
        let seller_id = SellerId::new();
        catalog_product(&inventory, "SKU-001", seller_id);

        let regular = UserId::new();
        for _ in 0..3 {
            insert_order(
                &store,
                regular,
                vec![("SKU-001", 1, 1000)],
                OrderStatus::Delivered,
            )
            .await;
        }

        let stats = view.stats_for_seller(seller_id).await.unwrap();
        assert_eq!(stats.delivered_orders, 3);
        assert_eq!(stats.unique_customers, 1);
    }

    #[tokio::test]
    async fn test_cancelled_orders_add_nothing_but_the_counter() {
        let (view, store, inventory) = setup();
        let seller_id = SellerId::new();
        catalog_product(&inventory, "SKU-001", seller_id);

        insert_order(
            &store,
            UserId::new(),
            vec![("SKU-001", 5, 2000)],
            OrderStatus::Cancelled,
        )
        .await;

        let stats = view.stats_for_seller(seller_id).await.unwrap();
        assert_eq!(stats.cancelled_orders, 1);
        assert_eq!(stats.total_revenue, Money::zero());
        assert_eq!(stats.items_sold, 0);
        assert_eq!(stats.unique_customers, 0);
        assert!(stats.last_sale_date.is_none());
    }
}
