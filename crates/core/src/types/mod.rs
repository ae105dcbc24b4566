//! Core types for RocketShoes.
//!
//! This module provides type-safe wrappers for the cart domain.

pub mod cart;
pub mod catalog;
pub mod id;
pub mod price;
pub mod summary;

pub use cart::{Cart, CartEntry, CartInvariantError};
pub use catalog::{ProductRecord, StockRecord};
pub use id::*;
pub use price::{CurrencyCode, Price};
pub use summary::{CartSummary, LineSummary};
