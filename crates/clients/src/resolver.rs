//! Product-detail resolution with a process-lifetime cache.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use domain::ProductId;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::inventory::{InventoryClient, ProductDetail};

/// Resolves a product's live detail record.
///
/// The seller view and the statistics aggregators depend on this trait
/// rather than on [`InventoryClient`] directly, so tests can substitute a
/// deterministic stub and production code can layer caching underneath.
#[async_trait]
pub trait ProductDetailResolver: Send + Sync {
    /// Resolves the detail record for a product.
    async fn resolve(&self, product_id: &ProductId) -> Result<ProductDetail>;
}

/// Caching decorator over an [`InventoryClient`].
///
/// The cache is an unbounded per-process map with no eviction or TTL: a
/// record, once fetched, is served for the lifetime of the process.
/// Concurrent misses for the same product may fetch twice; both fetches
/// return identical records and the last write wins. Errors are never
/// cached.
#[derive(Clone)]
pub struct CachingResolver<C> {
    client: C,
    cache: Arc<RwLock<HashMap<ProductId, ProductDetail>>>,
}

impl<C> CachingResolver<C> {
    /// Wraps an inventory client with the detail cache.
    pub fn new(client: C) -> Self {
        Self {
            client,
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of cached product records.
    pub async fn cached_len(&self) -> usize {
        self.cache.read().await.len()
    }
}

#[async_trait]
impl<C: InventoryClient> ProductDetailResolver for CachingResolver<C> {
    async fn resolve(&self, product_id: &ProductId) -> Result<ProductDetail> {
        if let Some(detail) = self.cache.read().await.get(product_id) {
            return Ok(detail.clone());
        }

        let detail = self.client.product_detail(product_id).await?;
        self.cache
            .write()
            .await
            .insert(product_id.clone(), detail.clone());
        Ok(detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::InMemoryInventoryClient;
    use common::SellerId;
    use domain::Money;

    fn widget() -> ProductDetail {
        ProductDetail {
            product_id: ProductId::new("SKU-001"),
            name: "Widget".to_string(),
            price: Money::from_cents(1000),
            available: 5,
            seller_id: Some(SellerId::new()),
        }
    }

    #[tokio::test]
    async fn test_second_lookup_is_served_from_cache() {
        let client = InMemoryInventoryClient::new();
        client.insert_product(widget());
        let resolver = CachingResolver::new(client.clone());

        let first = resolver.resolve(&ProductId::new("SKU-001")).await.unwrap();
        let second = resolver.resolve(&ProductId::new("SKU-001")).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(client.detail_call_count(), 1);
        assert_eq!(resolver.cached_len().await, 1);
    }

    #[tokio::test]
    async fn test_cached_record_survives_catalog_changes() {
        let client = InMemoryInventoryClient::new();
        client.insert_product(widget());
        let resolver = CachingResolver::new(client.clone());

        resolver.resolve(&ProductId::new("SKU-001")).await.unwrap();

        let mut renamed = widget();
        renamed.name = "Widget v2".to_string();
        client.insert_product(renamed);

        // Accepted staleness: the cache has no TTL.
        let detail = resolver.resolve(&ProductId::new("SKU-001")).await.unwrap();
        assert_eq!(detail.name, "Widget");
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let client = InMemoryInventoryClient::new();
        let resolver = CachingResolver::new(client.clone());

        let missing = resolver.resolve(&ProductId::new("SKU-001")).await;
        assert!(missing.is_err());
        assert_eq!(resolver.cached_len().await, 0);

        client.insert_product(widget());
        let found = resolver.resolve(&ProductId::new("SKU-001")).await;
        assert!(found.is_ok());
    }
}
