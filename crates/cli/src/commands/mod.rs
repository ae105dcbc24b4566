//! Cart commands.
//!
//! A [`CartSession`] wires a [`CartStore`] to the HTTP API and the
//! file-backed storage slot, applies one operation, then prints any
//! notifications to stderr and the resulting cart to stdout.

use std::io::{self, Write};

use rocketshoes_cart::{
    ApiClient, ApiError, CartConfig, CartError, CartStore, CollectingNotifier, ConfigError,
    FileStore, UpdateProductAmount,
};
use rocketshoes_core::{CartSummary, ProductId};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while running a cart command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The HTTP client could not be built.
    #[error("API client error: {0}")]
    Api(#[from] ApiError),

    /// The operation left the cart unchanged.
    #[error("{0}")]
    Cart(#[from] CartError),

    /// Writing output failed.
    #[error("Output error: {0}")]
    Output(#[from] io::Error),

    /// Serializing output failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

type Store = CartStore<ApiClient, ApiClient, FileStore, CollectingNotifier>;

/// A cart restored from disk for the duration of one command.
pub struct CartSession {
    config: CartConfig,
    store: Store,
    notifier: CollectingNotifier,
}

impl CartSession {
    /// Load configuration and restore the persisted cart.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid or the HTTP client fails to build.
    pub fn open() -> Result<Self, CommandError> {
        let config = CartConfig::from_env()?;
        let api = ApiClient::new(&config.api)?;
        let storage = FileStore::new(&config.storage_path);
        let notifier = CollectingNotifier::new();

        debug!(
            api = %config.api.base_url,
            storage = %config.storage_path.display(),
            "Opening cart"
        );

        let store = CartStore::load(
            api.clone(),
            api,
            storage,
            notifier.clone(),
            config.storage_key.clone(),
        );

        Ok(Self {
            config,
            store,
            notifier,
        })
    }

    /// Print the cart, as a table or as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to stdout fails.
    pub fn show(&self, json: bool) -> Result<(), CommandError> {
        let summary = self.store.summary(self.config.currency);
        let mut stdout = io::stdout().lock();
        if json {
            writeln!(stdout, "{}", serde_json::to_string_pretty(&summary)?)?;
        } else {
            write!(stdout, "{}", render(&summary))?;
        }
        Ok(())
    }

    /// Add one unit of a product.
    ///
    /// # Errors
    ///
    /// Returns the cart error if the operation had no effect.
    pub async fn add(&mut self, product_id: ProductId) -> Result<(), CommandError> {
        let result = self.store.add_product(product_id).await;
        self.finish(result)
    }

    /// Remove a product.
    ///
    /// # Errors
    ///
    /// Returns the cart error if the operation had no effect.
    pub fn remove(&mut self, product_id: ProductId) -> Result<(), CommandError> {
        let result = self.store.remove_product(product_id);
        self.finish(result)
    }

    /// Set the amount of a product.
    ///
    /// # Errors
    ///
    /// Returns the cart error if the operation had no effect.
    pub async fn update(&mut self, product_id: ProductId, amount: i64) -> Result<(), CommandError> {
        let result = self
            .store
            .update_product_amount(UpdateProductAmount { product_id, amount })
            .await;
        self.finish(result)
    }

    /// Flush notifications, print the cart, then surface the operation result.
    fn finish(&self, result: Result<(), CartError>) -> Result<(), CommandError> {
        {
            let mut stderr = io::stderr().lock();
            for message in self.notifier.drain() {
                writeln!(stderr, "error: {message}")?;
            }
        }
        self.show(false)?;
        result.map_err(CommandError::from)
    }
}

/// Format a summary as a plain-text table.
fn render(summary: &CartSummary) -> String {
    if summary.lines.is_empty() {
        return "Cart is empty\n".to_string();
    }

    let title_width = summary
        .lines
        .iter()
        .map(|line| line.title.chars().count())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for line in &summary.lines {
        out.push_str(&format!(
            "#{:<4} {:<title_width$}  {:>3} x {:>12} = {:>12}\n",
            line.id.to_string(),
            line.title,
            line.amount,
            line.unit_price.to_string(),
            line.subtotal.to_string(),
        ));
    }

    let products = if summary.item_count == 1 {
        "product"
    } else {
        "products"
    };
    out.push_str(&format!(
        "{} {products}, {} units, total {}\n",
        summary.item_count, summary.total_quantity, summary.total
    ));
    out
}
