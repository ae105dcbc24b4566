//! RocketShoes Core - Shared types library.
//!
//! This crate provides the types shared by all RocketShoes components:
//! - `cart` - The cart store and its collaborators (catalog, stock, storage)
//! - `cli` - Command-line front end driving the cart store
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no storage. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Product ids, prices, catalog records, cart entries and summaries

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
