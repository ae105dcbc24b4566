//! Records owned by the remote catalog and stock services.
//!
//! These are read-only from the cart's point of view: the cart copies product
//! metadata into its entries and consults stock records on every increase.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ProductId;

/// Catalog metadata for a product (`GET /products/{id}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: ProductId,
    pub title: String,
    /// Unit price, a bare JSON number on the wire.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Image URL.
    pub image: String,
}

/// Purchasable quantity for a product (`GET /stock/{id}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRecord {
    #[serde(alias = "productId")]
    pub id: ProductId,
    /// Maximum quantity currently purchasable.
    pub amount: u32,
}

impl StockRecord {
    /// Whether `requested` units can be held in a cart.
    #[must_use]
    pub const fn covers(&self, requested: u32) -> bool {
        self.amount >= requested
    }
}
