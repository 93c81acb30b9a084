use chrono::{DateTime, Utc};
use common::UserId;
use domain::{Money, Order, OrderStatus};

/// Builder for constructing dynamic order queries.
///
/// Every field is optional; backends translate the populated fields into
/// their native filter syntax once per query (predicate chain in memory,
/// parameterised SQL in PostgreSQL). The total-price range is a flat
/// predicate on the order total — per-seller subtotals cannot be expressed
/// here and stay an in-memory step in the seller view.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    /// Filter by owning buyer.
    pub user_id: Option<UserId>,

    /// Case-insensitive substring match against line-item product names.
    pub keyword: Option<String>,

    /// Filter by status (any of these).
    pub statuses: Option<Vec<OrderStatus>>,

    /// Filter by orders placed at or after this business timestamp.
    pub placed_after: Option<DateTime<Utc>>,

    /// Filter by orders placed at or before this business timestamp.
    pub placed_before: Option<DateTime<Utc>>,

    /// Minimum order total (inclusive).
    pub min_total: Option<Money>,

    /// Maximum order total (inclusive).
    pub max_total: Option<Money>,

    /// Drops pending carts from the results (seller-facing queries).
    pub exclude_pending: bool,

    /// Includes soft-deleted orders. Off for user-facing search.
    pub include_removed: bool,
}

impl OrderFilter {
    /// Creates a new empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters by owning buyer.
    pub fn user_id(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Filters by a product-name keyword.
    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        let keyword = keyword.into();
        if !keyword.is_empty() {
            self.keyword = Some(keyword);
        }
        self
    }

    /// Filters by a single status.
    pub fn status(mut self, status: OrderStatus) -> Self {
        self.statuses = Some(vec![status]);
        self
    }

    /// Filters by multiple statuses (any of these).
    pub fn statuses(mut self, statuses: Vec<OrderStatus>) -> Self {
        if !statuses.is_empty() {
            self.statuses = Some(statuses);
        }
        self
    }

    /// Filters to orders placed at or after this timestamp.
    pub fn placed_after(mut self, timestamp: DateTime<Utc>) -> Self {
        self.placed_after = Some(timestamp);
        self
    }

    /// Filters to orders placed at or before this timestamp.
    pub fn placed_before(mut self, timestamp: DateTime<Utc>) -> Self {
        self.placed_before = Some(timestamp);
        self
    }

    /// Filters by minimum order total.
    pub fn min_total(mut self, total: Money) -> Self {
        self.min_total = Some(total);
        self
    }

    /// Filters by maximum order total.
    pub fn max_total(mut self, total: Money) -> Self {
        self.max_total = Some(total);
        self
    }

    /// Excludes pending carts.
    pub fn exclude_pending(mut self) -> Self {
        self.exclude_pending = true;
        self
    }

    /// Includes soft-deleted orders.
    pub fn include_removed(mut self) -> Self {
        self.include_removed = true;
        self
    }

    /// Evaluates the filter against a single order.
    ///
    /// The in-memory backend applies this directly; it is also the
    /// reference semantics the SQL translation must match.
    pub fn matches(&self, order: &Order) -> bool {
        if !self.include_removed && order.is_removed() {
            return false;
        }
        if self.exclude_pending && order.status() == OrderStatus::Pending {
            return false;
        }
        if let Some(user_id) = self.user_id
            && order.user_id() != user_id
        {
            return false;
        }
        if let Some(statuses) = &self.statuses
            && !statuses.contains(&order.status())
        {
            return false;
        }
        if let Some(after) = self.placed_after
            && order.order_date() < after
        {
            return false;
        }
        if let Some(before) = self.placed_before
            && order.order_date() > before
        {
            return false;
        }
        if let Some(min) = self.min_total
            && order.total() < min
        {
            return false;
        }
        if let Some(max) = self.max_total
            && order.total() > max
        {
            return false;
        }
        if let Some(keyword) = &self.keyword {
            let needle = keyword.to_lowercase();
            if !order
                .items()
                .iter()
                .any(|item| item.product_name.to_lowercase().contains(&needle))
            {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::OrderItem;

    fn order_with_items(names: &[(&str, &str, u32, i64)]) -> Order {
        let mut order = Order::new(UserId::new());
        for (sku, name, qty, cents) in names {
            order
                .add_item(OrderItem::new(*sku, *name, *qty, Money::from_cents(*cents)))
                .unwrap();
        }
        order
    }

    #[test]
    fn empty_filter_matches_everything_not_removed() {
        let order = order_with_items(&[("SKU-001", "Widget", 1, 100)]);
        assert!(OrderFilter::new().matches(&order));

        let mut removed = order_with_items(&[("SKU-001", "Widget", 1, 100)]);
        removed.mark_removed();
        assert!(!OrderFilter::new().matches(&removed));
        assert!(OrderFilter::new().include_removed().matches(&removed));
    }

    #[test]
    fn keyword_matches_any_item_case_insensitively() {
        let order = order_with_items(&[
            ("SKU-001", "Mechanical Keyboard", 1, 100),
            ("SKU-002", "Mouse Pad", 1, 100),
        ]);
        assert!(OrderFilter::new().keyword("keyboard").matches(&order));
        assert!(OrderFilter::new().keyword("PAD").matches(&order));
        assert!(!OrderFilter::new().keyword("monitor").matches(&order));
    }

    #[test]
    fn status_list_matches_any_of() {
        let mut order = order_with_items(&[("SKU-001", "Widget", 1, 100)]);
        order.checkout("12 Main St", "card").unwrap();

        let filter = OrderFilter::new().statuses(vec![OrderStatus::Shipping, OrderStatus::Shipped]);
        assert!(filter.matches(&order));

        let filter = OrderFilter::new().status(OrderStatus::Delivered);
        assert!(!filter.matches(&order));
    }

    #[test]
    fn total_range_is_inclusive() {
        let order = order_with_items(&[("SKU-001", "Widget", 2, 1000)]);

        assert!(
            OrderFilter::new()
                .min_total(Money::from_cents(2000))
                .max_total(Money::from_cents(2000))
                .matches(&order)
        );
        assert!(
            !OrderFilter::new()
                .min_total(Money::from_cents(2001))
                .matches(&order)
        );
        assert!(
            !OrderFilter::new()
                .max_total(Money::from_cents(1999))
                .matches(&order)
        );
    }

    #[test]
    fn exclude_pending_drops_carts() {
        let order = order_with_items(&[("SKU-001", "Widget", 1, 100)]);
        assert!(!OrderFilter::new().exclude_pending().matches(&order));
    }

    #[test]
    fn date_range_uses_order_date() {
        let order = order_with_items(&[("SKU-001", "Widget", 1, 100)]);
        let placed = order.order_date();

        assert!(
            OrderFilter::new()
                .placed_after(placed - chrono::Duration::hours(1))
                .placed_before(placed + chrono::Duration::hours(1))
                .matches(&order)
        );
        assert!(
            !OrderFilter::new()
                .placed_after(placed + chrono::Duration::hours(1))
                .matches(&order)
        );
    }

    #[test]
    fn empty_keyword_and_status_list_are_ignored() {
        let order = order_with_items(&[("SKU-001", "Widget", 1, 100)]);
        let filter = OrderFilter::new().keyword("").statuses(vec![]);
        assert!(filter.matches(&order));
    }
}
