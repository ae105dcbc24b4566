//! Totals derived from a cart for display.

use rust_decimal::Decimal;
use serde::Serialize;

use super::{Cart, CurrencyCode, Price, ProductId};

/// Per-entry totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineSummary {
    pub id: ProductId,
    pub title: String,
    pub amount: u32,
    pub unit_price: Price,
    pub subtotal: Price,
}

/// Totals for the whole cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartSummary {
    pub lines: Vec<LineSummary>,
    /// Distinct products (the header badge count).
    pub item_count: usize,
    /// Sum of all amounts.
    pub total_quantity: u64,
    pub total: Price,
}

impl CartSummary {
    /// Summarize a cart in the given currency.
    #[must_use]
    pub fn of(cart: &Cart, currency_code: CurrencyCode) -> Self {
        let lines: Vec<LineSummary> = cart
            .iter()
            .map(|entry| LineSummary {
                id: entry.id,
                title: entry.title.clone(),
                amount: entry.amount.get(),
                unit_price: Price::new(entry.price, currency_code),
                subtotal: Price::new(entry.subtotal(), currency_code),
            })
            .collect();

        let total = lines
            .iter()
            .map(|line| line.subtotal.amount)
            .sum::<Decimal>();
        let total_quantity = lines.iter().map(|line| u64::from(line.amount)).sum();

        Self {
            item_count: lines.len(),
            total_quantity,
            total: Price::new(total, currency_code),
            lines,
        }
    }
}
