//! HTTP API server for the order lifecycle system.
//!
//! Exposes the order engine over REST with structured logging (tracing)
//! and Prometheus metrics. Authentication, gateway routing and header
//! injection live outside this service; handlers take the acting user id
//! from the path or body where an operation is user-scoped.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post, put};
use clients::{
    CachingResolver, InMemoryInventoryClient, InMemoryMediaClient, InventoryClient, MediaClient,
};
use fulfillment::{CheckoutCoordinator, DeliveryWindow, OrderService, RedoService};
use metrics_exporter_prometheus::PrometheusHandle;
use order_store::OrderStore;
use projections::{BuyerStatsView, SellerOrdersView, SellerStatsView};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state accessible from all handlers.
pub struct AppState<S, I> {
    pub orders: OrderService<S>,
    pub checkout: CheckoutCoordinator<S, I>,
    pub redo: RedoService<S, I>,
    pub seller_orders: SellerOrdersView<S, CachingResolver<I>>,
    pub buyer_stats: BuyerStatsView<S>,
    pub seller_stats: SellerStatsView<S, CachingResolver<I>>,
    pub media: Arc<dyn MediaClient>,
}

/// Wires the application state from a store and collaborator clients.
///
/// The two seller-facing views share one caching resolver, so a product
/// resolved for either is cached for both.
pub fn create_state<S, I>(
    store: S,
    inventory: I,
    media: Arc<dyn MediaClient>,
    window: DeliveryWindow,
) -> Arc<AppState<S, I>>
where
    S: OrderStore + Clone + 'static,
    I: InventoryClient + Clone + 'static,
{
    let resolver = CachingResolver::new(inventory.clone());

    Arc::new(AppState {
        orders: OrderService::new(store.clone()),
        checkout: CheckoutCoordinator::new(store.clone(), inventory.clone(), window),
        redo: RedoService::new(store.clone(), inventory),
        seller_orders: SellerOrdersView::new(store.clone(), resolver.clone()),
        buyer_stats: BuyerStatsView::new(store.clone()),
        seller_stats: SellerStatsView::new(store, resolver),
        media,
    })
}

/// Creates application state backed by in-memory collaborator clients.
///
/// Returns the client handles so tests can seed the catalog and flip
/// failure switches.
pub fn create_default_state<S>(
    store: S,
) -> (
    Arc<AppState<S, InMemoryInventoryClient>>,
    InMemoryInventoryClient,
    InMemoryMediaClient,
)
where
    S: OrderStore + Clone + 'static,
{
    let inventory = InMemoryInventoryClient::new();
    let media = InMemoryMediaClient::new();
    let state = create_state(
        store,
        inventory.clone(),
        Arc::new(media.clone()),
        DeliveryWindow::default(),
    );
    (state, inventory, media)
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S, I>(state: Arc<AppState<S, I>>, metrics_handle: PrometheusHandle) -> Router
where
    S: OrderStore + Clone + 'static,
    I: InventoryClient + Clone + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/orders", post(routes::orders::create::<S, I>))
        .route("/orders/{id}", get(routes::orders::get::<S, I>))
        .route("/orders/{id}", delete(routes::orders::remove::<S, I>))
        .route(
            "/orders/{id}/checkout",
            post(routes::orders::checkout::<S, I>),
        )
        .route("/orders/{id}/cancel", post(routes::orders::cancel::<S, I>))
        .route("/orders/{id}/redo", post(routes::orders::redo::<S, I>))
        .route(
            "/orders/{id}/status",
            put(routes::orders::update_status::<S, I>),
        )
        .route("/orders/{id}/items", post(routes::orders::add_item::<S, I>))
        .route(
            "/orders/{id}/items",
            delete(routes::orders::clear_items::<S, I>),
        )
        .route(
            "/orders/{id}/items/{product_id}",
            put(routes::orders::update_item::<S, I>),
        )
        .route(
            "/orders/{id}/items/{product_id}",
            delete(routes::orders::remove_item::<S, I>),
        )
        .route(
            "/users/{user_id}/orders",
            get(routes::users::list_orders::<S, I>),
        )
        .route(
            "/users/{user_id}/orders/search",
            post(routes::users::search_orders::<S, I>),
        )
        .route("/users/{user_id}/stats", get(routes::users::stats::<S, I>))
        .route(
            "/sellers/{seller_id}/orders",
            get(routes::sellers::list_orders::<S, I>),
        )
        .route(
            "/sellers/{seller_id}/orders/search",
            post(routes::sellers::search_orders::<S, I>),
        )
        .route(
            "/sellers/{seller_id}/stats",
            get(routes::sellers::stats::<S, I>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
