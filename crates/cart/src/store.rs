//! The cart state container.
//!
//! [`CartStore`] owns the shopper's cart. Callers read it through
//! [`CartStore::cart`] and change it only through `add_product`,
//! `remove_product` and `update_product_amount`, so every quantity increase
//! goes through the stock check.
//!
//! # Persistence
//!
//! Every successful mutation writes the whole cart exactly once; loading a
//! snapshot never writes. The store also keeps the last value known to be
//! in durable storage. A failed write is logged and not rolled back, and the
//! next commit overwrites the stale value with the full current cart.
//!
//! # Concurrency
//!
//! Mutations take `&mut self`, so one store can never interleave two
//! read-modify-write cycles. [`SharedCartStore`] wraps a store in an async
//! mutex for callers that share it between tasks.

use std::num::NonZeroU32;
use std::sync::Arc;

use rocketshoes_core::{Cart, CartEntry, CartSummary, CurrencyCode, ProductId};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::api::{ApiError, ProductCatalog, StockService};
use crate::error::{CartError, Operation};
use crate::notify::Notifier;
use crate::storage::KeyValueStore;

/// Arguments of [`CartStore::update_product_amount`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateProductAmount {
    pub product_id: ProductId,
    /// Requested quantity. Values below one are ignored.
    pub amount: i64,
}

/// Shopping cart with stock validation and durable persistence.
pub struct CartStore<C, S, K, N> {
    catalog: C,
    stock: S,
    storage: K,
    notifier: N,
    key: String,
    cart: Cart,
    persisted: Cart,
}

impl<C, S, K, N> CartStore<C, S, K, N>
where
    C: ProductCatalog,
    S: StockService,
    K: KeyValueStore,
    N: Notifier,
{
    /// Create a store, restoring the cart persisted under `key`.
    ///
    /// A missing, unreadable or invalid snapshot yields an empty cart. Loading
    /// never writes to storage.
    pub fn load(catalog: C, stock: S, storage: K, notifier: N, key: impl Into<String>) -> Self {
        let key = key.into();
        let cart = match storage.get(&key) {
            Ok(Some(snapshot)) => Cart::from_json(&snapshot).unwrap_or_else(|e| {
                warn!(key = %key, error = %e, "Discarding invalid cart snapshot");
                Cart::new()
            }),
            Ok(None) => Cart::new(),
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to read cart snapshot");
                Cart::new()
            }
        };

        debug!(key = %key, entries = cart.len(), "Cart loaded");

        Self {
            catalog,
            stock,
            storage,
            notifier,
            key,
            persisted: cart.clone(),
            cart,
        }
    }

    /// Current cart.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Totals of the current cart in `currency_code`.
    #[must_use]
    pub fn summary(&self, currency_code: CurrencyCode) -> CartSummary {
        CartSummary::of(&self.cart, currency_code)
    }

    /// Add one unit of a product.
    ///
    /// A product already in the cart goes through
    /// [`update_product_amount`](Self::update_product_amount) with its amount
    /// plus one. A new product is looked up in the catalog, checked against
    /// stock and appended with an amount of one.
    ///
    /// # Errors
    ///
    /// Returns the reason the cart was left unchanged. The error has already
    /// been delivered to the notifier.
    #[instrument(skip(self))]
    pub async fn add_product(&mut self, product_id: ProductId) -> Result<(), CartError> {
        if let Some(entry) = self.cart.get(product_id) {
            let amount = entry.amount.saturating_add(1);
            let result = self.try_update_amount(product_id, amount).await;
            return self.report(result);
        }

        let result = self.try_add_new(product_id).await;
        self.report(result)
    }

    /// Remove a product from the cart.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound` (already notified) if the product is not in the cart.
    #[instrument(skip(self))]
    pub fn remove_product(&mut self, product_id: ProductId) -> Result<(), CartError> {
        let result = match self.cart.without(product_id) {
            Some(next) => {
                self.commit(next);
                Ok(())
            }
            None => Err(CartError::EntryNotFound(product_id)),
        };
        self.report(result)
    }

    /// Set the amount of a product already in the cart.
    ///
    /// Amounts below one are ignored without notification.
    ///
    /// # Errors
    ///
    /// Returns the reason the cart was left unchanged. The error has already
    /// been delivered to the notifier.
    #[instrument(skip(self))]
    pub async fn update_product_amount(
        &mut self,
        update: UpdateProductAmount,
    ) -> Result<(), CartError> {
        let Some(amount) = requested_amount(update.amount) else {
            debug!("Ignoring non-positive amount");
            return Ok(());
        };

        let result = self.try_update_amount(update.product_id, amount).await;
        self.report(result)
    }

    async fn try_add_new(&mut self, product_id: ProductId) -> Result<(), CartError> {
        let product = self
            .catalog
            .product(product_id)
            .await
            .map_err(|source| match source {
                ApiError::NotFound(_) => CartError::ProductNotFound(product_id),
                source => CartError::Transient {
                    operation: Operation::AddProduct,
                    source,
                },
            })?;

        self.have_stock(product_id, NonZeroU32::MIN, Operation::AddProduct)
            .await?;

        let next = self
            .cart
            .with_entry(CartEntry::from_product(product))
            .map_err(|source| CartError::Invariant {
                operation: Operation::AddProduct,
                source,
            })?;

        self.commit(next);
        info!(%product_id, "Product added to cart");
        Ok(())
    }

    async fn try_update_amount(
        &mut self,
        product_id: ProductId,
        amount: NonZeroU32,
    ) -> Result<(), CartError> {
        // Stock is checked before the entry lookup, also for products not in the cart.
        self.have_stock(product_id, amount, Operation::UpdateAmount)
            .await?;

        match self.cart.with_amount(product_id, amount) {
            Some(next) => {
                self.commit(next);
                info!(%product_id, amount = amount.get(), "Cart amount updated");
            }
            None => debug!(%product_id, "Product not in cart, nothing to update"),
        }
        Ok(())
    }

    /// Check `requested` against a fresh stock record.
    async fn have_stock(
        &self,
        product_id: ProductId,
        requested: NonZeroU32,
        operation: Operation,
    ) -> Result<(), CartError> {
        let stock = self
            .stock
            .stock(product_id)
            .await
            .map_err(|source| CartError::Transient { operation, source })?;

        if stock.covers(requested.get()) {
            Ok(())
        } else {
            Err(CartError::InsufficientStock {
                product_id,
                requested: requested.get(),
                available: stock.amount,
            })
        }
    }

    /// Replace the cart and write it to storage.
    ///
    /// Every commit writes, even when `next` equals the stored value.
    fn commit(&mut self, next: Cart) {
        if self.cart != self.persisted {
            debug!(key = %self.key, "Storage is behind the cart, rewriting it");
        }
        self.cart = next;

        let snapshot = match self.cart.to_json() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "Failed to serialize cart");
                return;
            }
        };

        match self.storage.set(&self.key, &snapshot) {
            Ok(()) => self.persisted = self.cart.clone(),
            Err(e) => warn!(key = %self.key, error = %e, "Failed to persist cart"),
        }
    }

    /// Deliver a failure to the notifier, passing the result through.
    fn report(&self, result: Result<(), CartError>) -> Result<(), CartError> {
        if let Err(e) = &result {
            warn!(error = %e, "Cart operation had no effect");
            self.notifier.notify_error(e.user_message());
        }
        result
    }
}

/// Clamp a caller-supplied amount into the stock-check domain.
///
/// `None` for amounts below one; amounts beyond `u32::MAX` saturate so that
/// they still fail the stock check instead of wrapping.
fn requested_amount(amount: i64) -> Option<NonZeroU32> {
    if amount < 1 {
        return None;
    }
    NonZeroU32::new(u32::try_from(amount).unwrap_or(u32::MAX))
}

// =============================================================================
// SharedCartStore
// =============================================================================

/// A [`CartStore`] shared between tasks.
///
/// Each operation holds the lock from its stock check to its commit, so
/// concurrent calls are serialized and cannot lose each other's updates.
pub struct SharedCartStore<C, S, K, N> {
    inner: Arc<Mutex<CartStore<C, S, K, N>>>,
}

impl<C, S, K, N> Clone for SharedCartStore<C, S, K, N> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C, S, K, N> SharedCartStore<C, S, K, N>
where
    C: ProductCatalog,
    S: StockService,
    K: KeyValueStore,
    N: Notifier,
{
    #[must_use]
    pub fn new(store: CartStore<C, S, K, N>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// A copy of the current cart.
    pub async fn snapshot(&self) -> Cart {
        self.inner.lock().await.cart().clone()
    }

    /// See [`CartStore::add_product`].
    ///
    /// # Errors
    ///
    /// Returns the reason the cart was left unchanged (already notified).
    pub async fn add_product(&self, product_id: ProductId) -> Result<(), CartError> {
        self.inner.lock().await.add_product(product_id).await
    }

    /// See [`CartStore::remove_product`].
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound` (already notified) if the product is not in the cart.
    pub async fn remove_product(&self, product_id: ProductId) -> Result<(), CartError> {
        self.inner.lock().await.remove_product(product_id)
    }

    /// See [`CartStore::update_product_amount`].
    ///
    /// # Errors
    ///
    /// Returns the reason the cart was left unchanged (already notified).
    pub async fn update_product_amount(
        &self,
        update: UpdateProductAmount,
    ) -> Result<(), CartError> {
        self.inner.lock().await.update_product_amount(update).await
    }
}
