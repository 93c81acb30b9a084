//! Inventory client trait with in-memory and HTTP implementations.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::SellerId;
use domain::{Money, ProductId};
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};

/// A live product record as served by the product service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDetail {
    /// The product identifier.
    pub product_id: ProductId,

    /// Current catalog name.
    pub name: String,

    /// Current catalog price per unit.
    pub price: Money,

    /// Units currently available.
    pub available: u32,

    /// Owning seller according to the catalog.
    pub seller_id: Option<SellerId>,
}

/// One line of a batched stock adjustment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAdjustment {
    /// The product to adjust.
    pub product_id: ProductId,

    /// Units to add or remove.
    pub quantity: u32,
}

impl StockAdjustment {
    /// Creates a new stock adjustment line.
    pub fn new(product_id: impl Into<ProductId>, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }
}

/// Trait for product-service inventory operations.
///
/// Adjustments are batched and all-or-nothing at the transport level; an
/// error means nothing was adjusted. There are no retries here — callers
/// own the compensation decision.
#[async_trait]
pub trait InventoryClient: Send + Sync {
    /// Decreases stock for every line in one batched call.
    async fn decrease_stock(&self, items: &[StockAdjustment]) -> Result<()>;

    /// Increases stock for every line in one batched call.
    async fn increase_stock(&self, items: &[StockAdjustment]) -> Result<()>;

    /// Fetches the live detail record for a single product.
    async fn product_detail(&self, product_id: &ProductId) -> Result<ProductDetail>;
}

#[derive(Debug, Default)]
struct InMemoryInventoryState {
    products: HashMap<ProductId, ProductDetail>,
    decrease_calls: Vec<Vec<StockAdjustment>>,
    increase_calls: Vec<Vec<StockAdjustment>>,
    detail_calls: u32,
    fail_on_decrease: bool,
    fail_on_increase: bool,
    fail_details: HashSet<ProductId>,
}

/// In-memory inventory client for tests and local runs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryInventoryClient {
    state: Arc<RwLock<InMemoryInventoryState>>,
}

impl InMemoryInventoryClient {
    /// Creates a new in-memory inventory client with an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a catalog record.
    pub fn insert_product(&self, detail: ProductDetail) {
        self.state
            .write()
            .unwrap()
            .products
            .insert(detail.product_id.clone(), detail);
    }

    /// Configures the client to fail stock decreases.
    pub fn set_fail_on_decrease(&self, fail: bool) {
        self.state.write().unwrap().fail_on_decrease = fail;
    }

    /// Configures the client to fail stock increases.
    pub fn set_fail_on_increase(&self, fail: bool) {
        self.state.write().unwrap().fail_on_increase = fail;
    }

    /// Configures detail lookups for one product to fail.
    pub fn set_fail_detail(&self, product_id: impl Into<ProductId>) {
        self.state
            .write()
            .unwrap()
            .fail_details
            .insert(product_id.into());
    }

    /// Number of decrease calls attempted (including rejected ones).
    pub fn decrease_call_count(&self) -> usize {
        self.state.read().unwrap().decrease_calls.len()
    }

    /// The recorded decrease batches, oldest first.
    pub fn decrease_calls(&self) -> Vec<Vec<StockAdjustment>> {
        self.state.read().unwrap().decrease_calls.clone()
    }

    /// Number of increase calls attempted.
    pub fn increase_call_count(&self) -> usize {
        self.state.read().unwrap().increase_calls.len()
    }

    /// The recorded increase batches, oldest first.
    pub fn increase_calls(&self) -> Vec<Vec<StockAdjustment>> {
        self.state.read().unwrap().increase_calls.clone()
    }

    /// Number of detail lookups served or failed.
    pub fn detail_call_count(&self) -> u32 {
        self.state.read().unwrap().detail_calls
    }

    /// Current available units for a product.
    pub fn stock_of(&self, product_id: &ProductId) -> Option<u32> {
        self.state
            .read()
            .unwrap()
            .products
            .get(product_id)
            .map(|p| p.available)
    }
}

#[async_trait]
impl InventoryClient for InMemoryInventoryClient {
    async fn decrease_stock(&self, items: &[StockAdjustment]) -> Result<()> {
        let mut state = self.state.write().unwrap();
        state.decrease_calls.push(items.to_vec());

        if state.fail_on_decrease {
            return Err(ClientError::Rejected(
                "inventory service unavailable".to_string(),
            ));
        }

        // All-or-nothing: validate the whole batch before touching stock.
        for item in items {
            let available = state
                .products
                .get(&item.product_id)
                .map(|p| p.available)
                .ok_or_else(|| ClientError::ProductNotFound(item.product_id.to_string()))?;
            if available < item.quantity {
                return Err(ClientError::Rejected(format!(
                    "insufficient stock for {}",
                    item.product_id
                )));
            }
        }

        for item in items {
            if let Some(product) = state.products.get_mut(&item.product_id) {
                product.available -= item.quantity;
            }
        }
        Ok(())
    }

    async fn increase_stock(&self, items: &[StockAdjustment]) -> Result<()> {
        let mut state = self.state.write().unwrap();
        state.increase_calls.push(items.to_vec());

        if state.fail_on_increase {
            return Err(ClientError::Rejected(
                "inventory service unavailable".to_string(),
            ));
        }

        for item in items {
            if let Some(product) = state.products.get_mut(&item.product_id) {
                product.available += item.quantity;
            }
        }
        Ok(())
    }

    async fn product_detail(&self, product_id: &ProductId) -> Result<ProductDetail> {
        let mut state = self.state.write().unwrap();
        state.detail_calls += 1;

        if state.fail_details.contains(product_id) {
            return Err(ClientError::Rejected(
                "product service unavailable".to_string(),
            ));
        }

        state
            .products
            .get(product_id)
            .cloned()
            .ok_or_else(|| ClientError::ProductNotFound(product_id.to_string()))
    }
}

/// HTTP inventory client against the product service REST API.
#[derive(Debug, Clone)]
pub struct HttpInventoryClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpInventoryClient {
    /// Creates a client for the product service at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn adjust(&self, action: &str, items: &[StockAdjustment]) -> Result<()> {
        let response = self
            .http
            .post(format!("{}/stock/{}", self.base_url, action))
            .json(items)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClientError::UnexpectedStatus {
                service: "inventory",
                status: response.status().as_u16(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl InventoryClient for HttpInventoryClient {
    async fn decrease_stock(&self, items: &[StockAdjustment]) -> Result<()> {
        self.adjust("decrease", items).await
    }

    async fn increase_stock(&self, items: &[StockAdjustment]) -> Result<()> {
        self.adjust("increase", items).await
    }

    async fn product_detail(&self, product_id: &ProductId) -> Result<ProductDetail> {
        let response = self
            .http
            .get(format!("{}/products/{}", self.base_url, product_id))
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ClientError::ProductNotFound(product_id.to_string()));
        }
        if !response.status().is_success() {
            return Err(ClientError::UnexpectedStatus {
                service: "inventory",
                status: response.status().as_u16(),
            });
        }

        Ok(response.json().await?)
    }
}
