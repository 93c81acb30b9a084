//! Order service: cart CRUD, queries and status updates.

use common::{OrderId, Page, PageRequest, UserId};
use domain::{Order, OrderItem, OrderStatus, ProductId};
use order_store::{OrderFilter, OrderStore};

use crate::error::{FulfillmentError, Result};

/// High-level API over the order store for everything that does not touch
/// a collaborator service.
///
/// Mutations follow the same read-modify-write cycle the rest of the
/// engine uses: load, apply the aggregate command, persist. Aggregate
/// rejections propagate before anything is written.
pub struct OrderService<S> {
    store: S,
}

impl<S: OrderStore> OrderService<S> {
    /// Creates a new order service with the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Creates a new pending order, optionally pre-filled with items.
    #[tracing::instrument(skip(self, items))]
    pub async fn create_order(&self, user_id: UserId, items: Vec<OrderItem>) -> Result<Order> {
        let mut order = Order::new(user_id);
        for item in items {
            order.add_item(item)?;
        }
        Ok(self.store.insert(order).await?)
    }

    /// Loads an order by ID.
    pub async fn get_order(&self, order_id: OrderId) -> Result<Order> {
        self.load(order_id).await
    }

    /// Returns one page of the user's orders, newest first.
    pub async fn list_orders(&self, user_id: UserId, page: PageRequest) -> Result<Page<Order>> {
        Ok(self.store.list_for_user(user_id, page).await?)
    }

    /// Searches the user's orders with a dynamic filter.
    ///
    /// The buyer scope is forced onto the filter; soft-deleted orders are
    /// always excluded from user-facing search.
    pub async fn search_orders(
        &self,
        user_id: UserId,
        mut filter: OrderFilter,
        page: PageRequest,
    ) -> Result<Page<Order>> {
        filter.user_id = Some(user_id);
        filter.include_removed = false;
        Ok(self.store.search(&filter, page).await?)
    }

    /// Adds an item to a pending order, merging quantities per product.
    #[tracing::instrument(skip(self, item))]
    pub async fn add_item(&self, order_id: OrderId, item: OrderItem) -> Result<Order> {
        let mut order = self.load(order_id).await?;
        order.add_item(item)?;
        Ok(self.store.save(order).await?)
    }

    /// Updates the quantity of a line item; zero removes the line.
    #[tracing::instrument(skip(self))]
    pub async fn update_item_quantity(
        &self,
        order_id: OrderId,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<Order> {
        let mut order = self.load(order_id).await?;
        order.update_item_quantity(product_id, quantity)?;
        Ok(self.store.save(order).await?)
    }

    /// Removes a line item from a pending order.
    #[tracing::instrument(skip(self))]
    pub async fn remove_item(&self, order_id: OrderId, product_id: &ProductId) -> Result<Order> {
        let mut order = self.load(order_id).await?;
        order.remove_item(product_id)?;
        Ok(self.store.save(order).await?)
    }

    /// Empties a pending order.
    #[tracing::instrument(skip(self))]
    pub async fn clear_items(&self, order_id: OrderId) -> Result<Order> {
        let mut order = self.load(order_id).await?;
        order.clear_items()?;
        Ok(self.store.save(order).await?)
    }

    /// Applies a forward status update (payment signal, operator action).
    #[tracing::instrument(skip(self))]
    pub async fn update_status(&self, order_id: OrderId, status: OrderStatus) -> Result<Order> {
        let mut order = self.load(order_id).await?;
        order.advance_status(status)?;
        Ok(self.store.save(order).await?)
    }

    /// Soft-deletes an order, hiding it from user-facing queries.
    #[tracing::instrument(skip(self))]
    pub async fn remove_order(&self, order_id: OrderId) -> Result<Order> {
        let mut order = self.load(order_id).await?;
        order.mark_removed();
        Ok(self.store.save(order).await?)
    }

    async fn load(&self, order_id: OrderId) -> Result<Order> {
        self.store
            .get(order_id)
            .await?
            .ok_or(FulfillmentError::OrderNotFound(order_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{Money, OrderError};
    use order_store::InMemoryOrderStore;

    fn widget(quantity: u32) -> OrderItem {
        OrderItem::new("SKU-001", "Widget", quantity, Money::from_cents(1000))
    }

    fn setup() -> (OrderService<InMemoryOrderStore>, InMemoryOrderStore) {
        let store = InMemoryOrderStore::new();
        (OrderService::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_create_order_with_items() {
        let (service, _) = setup();
        let order = service
            .create_order(UserId::new(), vec![widget(2), widget(3)])
            .await
            .unwrap();

        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.item_count(), 1);
        assert_eq!(order.total().cents(), 5000);
    }

    #[tokio::test]
    async fn test_create_order_rejects_invalid_item() {
        let (service, store) = setup();
        let result = service.create_order(UserId::new(), vec![widget(0)]).await;

        assert!(matches!(
            result,
            Err(FulfillmentError::Order(OrderError::InvalidQuantity { .. }))
        ));
        assert_eq!(store.order_count().await, 0);
    }

    #[tokio::test]
    async fn test_get_order_not_found() {
        let (service, _) = setup();
        let result = service.get_order(OrderId::new()).await;
        assert!(matches!(result, Err(FulfillmentError::OrderNotFound(_))));
    }

    #[tokio::test]
    async fn test_item_mutations_only_while_pending() {
        let (service, store) = setup();
        let order = service
            .create_order(UserId::new(), vec![widget(2)])
            .await
            .unwrap();

        // Freeze the order by checking it out directly.
        let mut placed = order.clone();
        placed.checkout("12 Main St", "card").unwrap();
        store.save(placed).await.unwrap();

        let add = service.add_item(order.id(), widget(1)).await;
        let update = service
            .update_item_quantity(order.id(), &ProductId::new("SKU-001"), 9)
            .await;
        let remove = service
            .remove_item(order.id(), &ProductId::new("SKU-001"))
            .await;
        let clear = service.clear_items(order.id()).await;

        for result in [add, update, remove, clear] {
            assert!(matches!(
                result,
                Err(FulfillmentError::Order(
                    OrderError::InvalidStateTransition { .. }
                ))
            ));
        }

        // The stored order is untouched.
        let reloaded = store.get(order.id()).await.unwrap().unwrap();
        assert_eq!(reloaded.item(&ProductId::new("SKU-001")).unwrap().quantity, 2);
    }

    #[tokio::test]
    async fn test_update_item_quantity_and_removal() {
        let (service, _) = setup();
        let order = service
            .create_order(UserId::new(), vec![widget(2)])
            .await
            .unwrap();

        let updated = service
            .update_item_quantity(order.id(), &ProductId::new("SKU-001"), 7)
            .await
            .unwrap();
        assert_eq!(updated.item(&ProductId::new("SKU-001")).unwrap().quantity, 7);

        let emptied = service
            .update_item_quantity(order.id(), &ProductId::new("SKU-001"), 0)
            .await
            .unwrap();
        assert!(!emptied.has_items());
    }

    #[tokio::test]
    async fn test_update_status_forward_only() {
        let (service, _) = setup();
        let order = service
            .create_order(UserId::new(), vec![widget(1)])
            .await
            .unwrap();

        let processing = service
            .update_status(order.id(), OrderStatus::Processing)
            .await
            .unwrap();
        assert_eq!(processing.status(), OrderStatus::Processing);

        let back = service.update_status(order.id(), OrderStatus::Pending).await;
        assert!(matches!(
            back,
            Err(FulfillmentError::Order(
                OrderError::InvalidStateTransition { .. }
            ))
        ));
    }

    #[tokio::test]
    async fn test_remove_order_hides_it_from_listing() {
        let (service, _) = setup();
        let user_id = UserId::new();
        let order = service.create_order(user_id, vec![widget(1)]).await.unwrap();

        service.remove_order(order.id()).await.unwrap();

        let page = service
            .list_orders(user_id, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total, 0);

        // Point lookups still find the removed order.
        assert!(service.get_order(order.id()).await.is_ok());
    }

    #[tokio::test]
    async fn test_search_orders_scope_cannot_be_widened() {
        let (service, _) = setup();
        let user_a = UserId::new();
        let user_b = UserId::new();
        service.create_order(user_a, vec![widget(1)]).await.unwrap();
        service.create_order(user_b, vec![widget(1)]).await.unwrap();

        // A filter pointed at another user is overridden by the caller
        // scope.
        let filter = OrderFilter::new().user_id(user_b).include_removed();
        let page = service
            .search_orders(user_a, filter, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert!(page.items.iter().all(|o| o.user_id() == user_a));
    }

    #[tokio::test]
    async fn test_search_orders_by_keyword_and_total() {
        let (service, _) = setup();
        let user_id = UserId::new();
        service.create_order(user_id, vec![widget(2)]).await.unwrap();
        service
            .create_order(
                user_id,
                vec![OrderItem::new(
                    "SKU-002",
                    "Gadget",
                    1,
                    Money::from_cents(99),
                )],
            )
            .await
            .unwrap();

        let filter = OrderFilter::new()
            .keyword("widget")
            .min_total(Money::from_cents(2000));
        let page = service
            .search_orders(user_id, filter, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].items()[0].product_name, "Widget");
    }
}
