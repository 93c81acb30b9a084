//! Application configuration loaded from environment variables.

use fulfillment::DeliveryWindow;

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `3000`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `DELIVERY_MIN_DELAY_MS` / `DELIVERY_MAX_DELAY_MS` — delivery
///   scheduler jitter window (default: 30000–120000)
/// - `DATABASE_URL` — PostgreSQL order store; in-memory when unset
/// - `INVENTORY_SERVICE_URL` — product service base URL; in-memory when
///   unset
/// - `MEDIA_SERVICE_URL` — media service base URL; in-memory when unset
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub delivery_min_delay_ms: u64,
    pub delivery_max_delay_ms: u64,
    pub database_url: Option<String>,
    pub inventory_url: Option<String>,
    pub media_url: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            delivery_min_delay_ms: std::env::var("DELIVERY_MIN_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30_000),
            delivery_max_delay_ms: std::env::var("DELIVERY_MAX_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(120_000),
            database_url: std::env::var("DATABASE_URL").ok(),
            inventory_url: std::env::var("INVENTORY_SERVICE_URL").ok(),
            media_url: std::env::var("MEDIA_SERVICE_URL").ok(),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the delivery scheduler jitter window.
    pub fn delivery_window(&self) -> DeliveryWindow {
        DeliveryWindow::from_millis(self.delivery_min_delay_ms, self.delivery_max_delay_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            delivery_min_delay_ms: 30_000,
            delivery_max_delay_ms: 120_000,
            database_url: None,
            inventory_url: None,
            media_url: None,
        }
    }
}
