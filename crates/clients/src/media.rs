//! Media client trait with in-memory and HTTP implementations.
//!
//! Image lookups are display enrichment only — callers treat any failure
//! as "no image" and never let it block order logic.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use domain::ProductId;

use crate::error::{ClientError, Result};

/// Trait for media-service lookups.
#[async_trait]
pub trait MediaClient: Send + Sync {
    /// Returns the first image URL registered for a product, if any.
    async fn first_image_url(&self, product_id: &ProductId) -> Result<Option<String>>;
}

#[derive(Debug, Default)]
struct InMemoryMediaState {
    images: HashMap<ProductId, String>,
    fail: bool,
}

/// In-memory media client for tests and local runs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMediaClient {
    state: Arc<RwLock<InMemoryMediaState>>,
}

impl InMemoryMediaClient {
    /// Creates a new in-memory media client without images.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an image for a product.
    pub fn insert_image(&self, product_id: impl Into<ProductId>, url: impl Into<String>) {
        self.state
            .write()
            .unwrap()
            .images
            .insert(product_id.into(), url.into());
    }

    /// Configures all lookups to fail.
    pub fn set_fail(&self, fail: bool) {
        self.state.write().unwrap().fail = fail;
    }
}

#[async_trait]
impl MediaClient for InMemoryMediaClient {
    async fn first_image_url(&self, product_id: &ProductId) -> Result<Option<String>> {
        let state = self.state.read().unwrap();
        if state.fail {
            return Err(ClientError::Rejected(
                "media service unavailable".to_string(),
            ));
        }
        Ok(state.images.get(product_id).cloned())
    }
}

/// HTTP media client against the media service REST API.
#[derive(Debug, Clone)]
pub struct HttpMediaClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpMediaClient {
    /// Creates a client for the media service at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl MediaClient for HttpMediaClient {
    async fn first_image_url(&self, product_id: &ProductId) -> Result<Option<String>> {
        let response = self
            .http
            .get(format!(
                "{}/media/{}/images?limit=1",
                self.base_url, product_id
            ))
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(ClientError::UnexpectedStatus {
                service: "media",
                status: response.status().as_u16(),
            });
        }

        let urls: Vec<String> = response.json().await?;
        Ok(urls.into_iter().next())
    }
}
