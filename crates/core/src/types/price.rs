//! Price representation and display formatting using decimal arithmetic.

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A price with currency information.
///
/// Catalog prices arrive as bare JSON numbers; the currency is a property of
/// the storefront, not of each record, so it is attached at display time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., reais, not centavos).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }
}

impl fmt::Display for Price {
    /// Formats as symbol, grouped integer part and two decimals,
    /// e.g. `$1,234.50` or `R$ 1.234,50`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = self.currency_code;
        let rounded = self
            .amount
            .abs()
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let plain = format!("{rounded:.2}");
        let (integer, fraction) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

        let sign = if self.amount.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };

        write!(
            f,
            "{sign}{}{}{}{fraction}",
            code.symbol(),
            group_thousands(integer, code.group_separator()),
            code.decimal_separator()
        )
    }
}

/// Insert a separator every three digits from the right.
fn group_thousands(digits: &str, separator: char) -> String {
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(c);
    }
    grouped
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    BRL,
    USD,
    EUR,
    GBP,
}

impl CurrencyCode {
    /// Display prefix, including any trailing space.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::BRL => "R$ ",
            Self::USD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }

    #[must_use]
    pub const fn decimal_separator(self) -> char {
        match self {
            Self::BRL | Self::EUR => ',',
            Self::USD | Self::GBP => '.',
        }
    }

    #[must_use]
    pub const fn group_separator(self) -> char {
        match self {
            Self::BRL | Self::EUR => '.',
            Self::USD | Self::GBP => ',',
        }
    }
}

impl core::str::FromStr for CurrencyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BRL" => Ok(Self::BRL),
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            "GBP" => Ok(Self::GBP),
            other => Err(format!("unsupported currency code '{other}'")),
        }
    }
}
