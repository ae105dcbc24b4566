//! HTTP client for the catalog and stock API.
//!
//! Uses `reqwest` for HTTP and caches product metadata using `moka`.

use std::sync::Arc;

use moka::future::Cache;
use rocketshoes_core::{ProductId, ProductRecord, StockRecord};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::{ApiError, ProductCatalog, StockService};
use crate::config::ApiConfig;

const MAX_CACHED_PRODUCTS: u64 = 1000;

/// Client for the storefront's REST API.
///
/// Cheap to clone; clones share the connection pool and the product cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    products: Option<Cache<ProductId, ProductRecord>>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("rocketshoes-cart/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let products = config.product_cache_ttl.map(|ttl| {
            Cache::builder()
                .max_capacity(MAX_CACHED_PRODUCTS)
                .time_to_live(ttl)
                .build()
        });

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.clone(),
                products,
            }),
        })
    }

    /// Resolve `{base}/{resource}/{id}`.
    fn endpoint(&self, resource: &str, id: ProductId) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidBaseUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .push(resource)
            .push(&id.to_string());
        Ok(url)
    }

    /// GET a JSON resource.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let response = self.inner.client.get(url.clone()).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(url.path().to_string()));
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }

    /// Drop a cached product so the next lookup goes to the catalog.
    pub async fn invalidate_product(&self, id: ProductId) {
        if let Some(cache) = &self.inner.products {
            cache.invalidate(&id).await;
        }
    }
}

impl ProductCatalog for ApiClient {
    #[instrument(skip(self))]
    async fn product(&self, id: ProductId) -> Result<ProductRecord, ApiError> {
        if let Some(cache) = &self.inner.products
            && let Some(product) = cache.get(&id).await
        {
            debug!("Cache hit for product");
            return Ok(product);
        }

        let product: ProductRecord = self.get_json(self.endpoint("products", id)?).await?;

        if product.id != id {
            return Err(ApiError::Parse(format!(
                "requested product {id}, catalog returned product {}",
                product.id
            )));
        }

        if let Some(cache) = &self.inner.products {
            cache.insert(id, product.clone()).await;
        }

        Ok(product)
    }
}

impl StockService for ApiClient {
    #[instrument(skip(self))]
    async fn stock(&self, id: ProductId) -> Result<StockRecord, ApiError> {
        self.get_json(self.endpoint("stock", id)?).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(&ApiConfig::uncached(base).unwrap()).unwrap()
    }

    #[test]
    fn test_endpoint_at_root() {
        let url = client("http://localhost:3333")
            .endpoint("products", ProductId::new(4))
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:3333/products/4");
    }

    #[test]
    fn test_endpoint_below_prefix() {
        let api = client("https://api.example.com/v1/");
        assert_eq!(
            api.endpoint("stock", ProductId::new(2)).unwrap().as_str(),
            "https://api.example.com/v1/stock/2"
        );

        let api = client("https://api.example.com/v1");
        assert_eq!(
            api.endpoint("stock", ProductId::new(2)).unwrap().as_str(),
            "https://api.example.com/v1/stock/2"
        );
    }
}
