//! Buyer statistics — single pass over one user's delivered orders.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use common::UserId;
use domain::{Money, OrderStatus, ProductId};
use order_store::{OrderFilter, OrderStore};
use serde::Serialize;

use crate::Result;

/// The buyer's most purchased product by cumulative quantity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MostPurchased {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u64,
}

/// Purchase statistics for one buyer.
///
/// Only delivered orders count. With no delivered orders every counter is
/// zero and both optional fields are `None`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuyerStats {
    pub total_orders: u64,
    pub total_spent: Money,
    pub last_order_date: Option<DateTime<Utc>>,
    pub most_purchased: Option<MostPurchased>,
}

/// Computes [`BuyerStats`] on demand.
pub struct BuyerStatsView<S> {
    store: S,
}

impl<S: OrderStore> BuyerStatsView<S> {
    /// Creates a view over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Aggregates the user's delivered orders in a single pass.
    ///
    /// The most-purchased title moves only on a strictly greater
    /// cumulative quantity, so the first product to reach a count keeps it
    /// on ties.
    #[tracing::instrument(skip(self))]
    pub async fn stats_for_user(&self, user_id: UserId) -> Result<BuyerStats> {
        let filter = OrderFilter::new()
            .user_id(user_id)
            .status(OrderStatus::Delivered)
            .include_removed();
        let orders = self.store.find_all(&filter).await?;

        let mut stats = BuyerStats::default();
        let mut quantities: HashMap<ProductId, u64> = HashMap::new();

        for order in &orders {
            stats.total_orders += 1;
            stats.total_spent += order.total();
            if stats.last_order_date.is_none_or(|d| order.order_date() > d) {
                stats.last_order_date = Some(order.order_date());
            }

            for item in order.items() {
                let count = quantities.entry(item.product_id.clone()).or_insert(0);
                *count += u64::from(item.quantity);

                let best = stats.most_purchased.as_ref().map_or(0, |m| m.quantity);
                if *count > best {
                    stats.most_purchased = Some(MostPurchased {
                        product_id: item.product_id.clone(),
                        product_name: item.product_name.clone(),
                        quantity: *count,
                    });
                }
            }
        }

        Ok(stats)
    }
}
