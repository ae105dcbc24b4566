//! Catalog and stock collaborators.
//!
//! # Architecture
//!
//! - [`ProductCatalog`] resolves product metadata (`GET /products/{id}`)
//! - [`StockService`] reports purchasable quantity (`GET /stock/{id}`)
//! - [`ApiClient`] implements both over HTTP with `reqwest`
//!
//! Product metadata may be cached by the client (`moka`, configurable TTL).
//! Stock is never cached: every quantity increase consults the service.

mod client;

pub use client::ApiClient;

use rocketshoes_core::{ProductId, ProductRecord, StockRecord};
use thiserror::Error;

/// Errors that can occur when talking to the catalog or stock service.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// API returned an unexpected status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The configured base URL cannot carry resource paths.
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

impl ApiError {
    /// Whether the service reported that the resource does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Read access to catalog metadata.
pub trait ProductCatalog {
    /// Fetch a product by id.
    ///
    /// Returns `ApiError::NotFound` when the catalog has no such product.
    fn product(&self, id: ProductId) -> impl Future<Output = Result<ProductRecord, ApiError>> + Send;
}

/// Read access to current stock levels.
pub trait StockService {
    /// Fetch the current stock record for a product.
    fn stock(&self, id: ProductId) -> impl Future<Output = Result<StockRecord, ApiError>> + Send;
}
