//! RocketShoes cart library.
//!
//! This crate owns the shopper's cart: it validates every quantity increase
//! against the remote stock service, copies catalog metadata into new
//! entries, and writes the cart to a durable key-value slot after every
//! committed change.
//!
//! # Architecture
//!
//! - [`store::CartStore`] - The cart state container (add / remove / update)
//! - [`api`] - Catalog and stock collaborators, with a `reqwest` client
//! - [`storage`] - Durable key-value slot (file-backed or in-memory)
//! - [`notify`] - User-visible error surface
//! - [`config`] - Environment configuration

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod notify;
pub mod storage;
pub mod store;

pub use api::{ApiClient, ApiError, ProductCatalog, StockService};
pub use config::{CartConfig, ConfigError};
pub use error::{CartError, Operation};
pub use notify::{CollectingNotifier, LogNotifier, Notifier};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use store::{CartStore, SharedCartStore, UpdateProductAmount};
