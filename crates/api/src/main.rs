//! API server entry point.

use std::sync::Arc;

use api::config::Config;
use axum::Router;
use clients::{
    HttpInventoryClient, HttpMediaClient, InMemoryInventoryClient, InMemoryMediaClient, MediaClient,
};
use metrics_exporter_prometheus::PrometheusHandle;
use order_store::{InMemoryOrderStore, OrderStore, PostgresOrderStore};
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

fn build_app<S>(
    store: S,
    config: &Config,
    media: Arc<dyn MediaClient>,
    metrics_handle: PrometheusHandle,
) -> Router
where
    S: OrderStore + Clone + 'static,
{
    let window = config.delivery_window();

    match &config.inventory_url {
        Some(url) => {
            let inventory = HttpInventoryClient::new(url.clone());
            api::create_app(api::create_state(store, inventory, media, window), metrics_handle)
        }
        None => {
            tracing::warn!("INVENTORY_SERVICE_URL not set, using in-memory inventory");
            let inventory = InMemoryInventoryClient::new();
            api::create_app(api::create_state(store, inventory, media, window), metrics_handle)
        }
    }
}

#[tokio::main]
async fn main() {
    let config = Config::from_env();

    // 1. Initialize tracing
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. Install Prometheus metrics recorder
    let prometheus_builder = metrics_exporter_prometheus::PrometheusBuilder::new();
    let metrics_handle = prometheus_builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // 3. Wire collaborator clients
    let media: Arc<dyn MediaClient> = match &config.media_url {
        Some(url) => Arc::new(HttpMediaClient::new(url.clone())),
        None => {
            tracing::warn!("MEDIA_SERVICE_URL not set, using in-memory media client");
            Arc::new(InMemoryMediaClient::new())
        }
    };

    // 4. Pick the order store and build the application
    let app = match &config.database_url {
        Some(url) => {
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(10)
                .connect(url)
                .await
                .expect("failed to connect to database");
            let store = PostgresOrderStore::new(pool);
            store.run_migrations().await.expect("migrations failed");
            build_app(store, &config, media, metrics_handle)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory order store");
            build_app(InMemoryOrderStore::new(), &config, media, metrics_handle)
        }
    };

    // 5. Start server
    let addr = config.addr();
    tracing::info!(%addr, "starting API server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("server shut down gracefully");
}
