//! Cart operation errors.
//!
//! Every failed operation maps to exactly one [`CartError`], which the store
//! logs and hands to its notifier as a short user-facing message. Internal
//! details (HTTP status, parse errors) stay in the logs.

use std::fmt;

use rocketshoes_core::{CartInvariantError, ProductId};
use thiserror::Error;

use crate::api::ApiError;

/// The cart operation during which a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    AddProduct,
    RemoveProduct,
    UpdateAmount,
}

impl Operation {
    /// Generic user-facing message for a failure of this operation.
    #[must_use]
    pub const fn failure_message(self) -> &'static str {
        match self {
            Self::AddProduct => "Product addition failed",
            Self::RemoveProduct => "Product removal failed",
            Self::UpdateAmount => "Quantity update failed",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AddProduct => "add product",
            Self::RemoveProduct => "remove product",
            Self::UpdateAmount => "update amount",
        })
    }
}

/// Reasons a cart operation had no effect.
#[derive(Debug, Error)]
pub enum CartError {
    /// The catalog has no product with this id.
    #[error("Product {0} not found in catalog")]
    ProductNotFound(ProductId),

    /// The requested amount exceeds what the stock service reports.
    #[error("Requested {requested} of product {product_id}, only {available} in stock")]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    /// The product to remove is not in the cart.
    #[error("Product {0} is not in the cart")]
    EntryNotFound(ProductId),

    /// Any other failure while talking to the catalog or stock service.
    #[error("Failed to {operation}: {source}")]
    Transient {
        operation: Operation,
        #[source]
        source: ApiError,
    },

    /// The new cart value would break an invariant.
    #[error("Failed to {operation}: {source}")]
    Invariant {
        operation: Operation,
        #[source]
        source: CartInvariantError,
    },
}

impl CartError {
    /// Short message suitable for showing to the shopper.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::ProductNotFound(_) => Operation::AddProduct.failure_message(),
            Self::InsufficientStock { .. } => "Requested quantity exceeds stock",
            Self::EntryNotFound(_) => Operation::RemoveProduct.failure_message(),
            Self::Transient { operation, .. } | Self::Invariant { operation, .. } => {
                operation.failure_message()
            }
        }
    }
}
