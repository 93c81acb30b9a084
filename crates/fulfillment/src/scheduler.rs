//! Jittered one-shot delivery scheduler.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use common::OrderId;
use order_store::OrderStore;
use rand::Rng;
use tokio::task::JoinHandle;

/// Delay window for the scheduled delivery advance.
///
/// The delay is drawn uniformly from `[min, max]`. The jitter spreads the
/// status updates of orders checked out together so they do not land on
/// the store as one burst.
#[derive(Debug, Clone, Copy)]
pub struct DeliveryWindow {
    pub min: Duration,
    pub max: Duration,
}

impl DeliveryWindow {
    /// Creates a window; `max` is raised to `min` if the bounds are
    /// inverted.
    pub fn new(min: Duration, max: Duration) -> Self {
        Self {
            min,
            max: max.max(min),
        }
    }

    /// Creates a window from millisecond bounds.
    pub fn from_millis(min_ms: u64, max_ms: u64) -> Self {
        Self::new(
            Duration::from_millis(min_ms),
            Duration::from_millis(max_ms),
        )
    }

    fn sample(&self) -> Duration {
        let min = self.min.as_millis() as u64;
        let max = self.max.as_millis() as u64;
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }
}

impl Default for DeliveryWindow {
    fn default() -> Self {
        Self::from_millis(30_000, 120_000)
    }
}

/// Schedules one delayed, fire-once delivery advance per checked-out
/// order.
///
/// Each task re-fetches its order when it fires and is a no-op unless the
/// order is still `Shipping` — that recheck is the cooperative substitute
/// for a cancellation hook. Tasks are not re-armed and carry no retry: a
/// failed persist leaves the order in `Shipping` for manual
/// reconciliation. The registry is keyed by order id so a cancellation
/// hook can be added later without redesign.
pub struct DeliveryScheduler<S> {
    store: S,
    window: DeliveryWindow,
    tasks: Arc<Mutex<HashMap<OrderId, JoinHandle<()>>>>,
}

impl<S: Clone> Clone for DeliveryScheduler<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            window: self.window,
            tasks: Arc::clone(&self.tasks),
        }
    }
}

impl<S: OrderStore + Clone + 'static> DeliveryScheduler<S> {
    /// Creates a scheduler over the given store.
    pub fn new(store: S, window: DeliveryWindow) -> Self {
        Self {
            store,
            window,
            tasks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Arms the one-shot delivery task for an order.
    pub fn schedule(&self, order_id: OrderId) {
        let delay = self.window.sample();
        tracing::debug!(%order_id, delay_ms = delay.as_millis() as u64, "delivery advance scheduled");

        let store = self.store.clone();
        let tasks = Arc::clone(&self.tasks);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            Self::fire(&store, order_id).await;
            tasks.lock().unwrap().remove(&order_id);
        });

        if let Some(previous) = self.tasks.lock().unwrap().insert(order_id, handle) {
            previous.abort();
        }
    }

    /// Number of armed tasks that have not fired yet.
    pub fn pending_task_count(&self) -> usize {
        self.tasks.lock().unwrap().len()
    }

    async fn fire(store: &S, order_id: OrderId) {
        let mut order = match store.get(order_id).await {
            Ok(Some(order)) => order,
            Ok(None) => {
                tracing::warn!(%order_id, "delivery advance fired for unknown order");
                return;
            }
            Err(err) => {
                tracing::error!(%order_id, error = %err, "delivery advance could not load order");
                return;
            }
        };

        // Recheck-on-fire: a cancel or operator update that raced the
        // timer wins, and the task becomes a no-op.
        if order.mark_delivered().is_err() {
            tracing::debug!(%order_id, status = %order.status(), "order no longer shipping, delivery advance skipped");
            return;
        }

        match store.save(order).await {
            Ok(_) => {
                metrics::counter!("orders_auto_delivered_total").increment(1);
                tracing::info!(%order_id, "order auto-delivered");
            }
            Err(err) => {
                metrics::counter!("delivery_advance_failures_total").increment(1);
                tracing::error!(%order_id, error = %err, "failed to persist delivery advance, order left in shipping");
            }
        }
    }
}
