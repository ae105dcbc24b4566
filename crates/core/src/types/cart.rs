//! Cart entries and the cart value.
//!
//! A [`Cart`] is an immutable-by-convention value: every operation returns a
//! new cart rather than editing in place, so the store can compare the value
//! it holds with the value it last persisted.
//!
//! Invariants (enforced on construction and on deserialization):
//! - at most one entry per product id
//! - every entry has an amount of at least one (`NonZeroU32`)

use std::collections::HashMap;
use std::num::NonZeroU32;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{ProductId, ProductRecord};

/// Violations of the cart invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartInvariantError {
    /// Two entries share a product id.
    #[error("duplicate cart entry for product {0}")]
    DuplicateEntry(ProductId),
}

/// A product held in the cart together with the selected quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    pub id: ProductId,
    pub title: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub image: String,
    pub amount: NonZeroU32,
}

impl CartEntry {
    /// Create a single-unit entry from catalog metadata.
    #[must_use]
    pub fn from_product(product: ProductRecord) -> Self {
        Self {
            id: product.id,
            title: product.title,
            price: product.price,
            image: product.image,
            amount: NonZeroU32::MIN,
        }
    }

    /// Unit price multiplied by amount.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.price * Decimal::from(self.amount.get())
    }
}

/// Ordered list of cart entries, in first-add order.
///
/// Serializes as a plain JSON array of entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CartEntry>", into = "Vec<CartEntry>")]
pub struct Cart {
    entries: Vec<CartEntry>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Build a cart from entries, checking the invariants.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateEntry` if two entries share an id.
    pub fn from_entries(entries: Vec<CartEntry>) -> Result<Self, CartInvariantError> {
        for (i, entry) in entries.iter().enumerate() {
            if entries.iter().skip(i + 1).any(|other| other.id == entry.id) {
                return Err(CartInvariantError::DuplicateEntry(entry.id));
            }
        }
        Ok(Self { entries })
    }

    /// Entries in display order.
    #[must_use]
    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &CartEntry> {
        self.entries.iter()
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the entry for a product.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&CartEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.get(id).is_some()
    }

    /// Quantity held per product, for listing badges.
    #[must_use]
    pub fn amounts(&self) -> HashMap<ProductId, u32> {
        self.entries
            .iter()
            .map(|entry| (entry.id, entry.amount.get()))
            .collect()
    }

    /// A new cart with `entry` appended.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateEntry` if the cart already holds the product.
    pub fn with_entry(&self, entry: CartEntry) -> Result<Self, CartInvariantError> {
        if self.contains(entry.id) {
            return Err(CartInvariantError::DuplicateEntry(entry.id));
        }
        let mut entries = self.entries.clone();
        entries.push(entry);
        Ok(Self { entries })
    }

    /// A new cart without the entry for `id`, or `None` if there is no such entry.
    ///
    /// All remaining entries keep their relative order.
    #[must_use]
    pub fn without(&self, id: ProductId) -> Option<Self> {
        if !self.contains(id) {
            return None;
        }
        let entries = self
            .entries
            .iter()
            .filter(|entry| entry.id != id)
            .cloned()
            .collect();
        Some(Self { entries })
    }

    /// A new cart where only the amount of the entry for `id` is replaced.
    ///
    /// Returns `None` if there is no such entry.
    #[must_use]
    pub fn with_amount(&self, id: ProductId, amount: NonZeroU32) -> Option<Self> {
        if !self.contains(id) {
            return None;
        }
        let entries = self
            .entries
            .iter()
            .map(|entry| {
                if entry.id == id {
                    CartEntry {
                        amount,
                        ..entry.clone()
                    }
                } else {
                    entry.clone()
                }
            })
            .collect();
        Some(Self { entries })
    }

    /// Serialize to the persisted JSON form.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse the persisted JSON form, checking the invariants.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed JSON, a zero amount or a duplicate id.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl TryFrom<Vec<CartEntry>> for Cart {
    type Error = CartInvariantError;

    fn try_from(entries: Vec<CartEntry>) -> Result<Self, Self::Error> {
        Self::from_entries(entries)
    }
}

impl From<Cart> for Vec<CartEntry> {
    fn from(cart: Cart) -> Self {
        cart.entries
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartEntry;
    type IntoIter = std::slice::Iter<'a, CartEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
