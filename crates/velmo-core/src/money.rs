//! # Money Module
//!
//! Provides the `Money` type for handling storefront amounts safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  The hosted backend returns prices as JSON numbers:                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer units                                            │
//! │    Prices are converted ONCE, at the JSON boundary, into i64 units.     │
//! │    Every cart total and order total after that is integer math.         │
//! │                                                                         │
//! │  The Guinean franc (GNF) has no minor unit: 1 unit = 1 franc.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use velmo_core::money::Money;
//!
//! let price = Money::from_units(2_500);
//! let total = price * 3 + Money::from_units(1_000);
//! assert_eq!(total.units(), 8_500);
//! assert_eq!(total.format_amount("GNF"), "8 500 GNF");
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

/// Label shown in the catalog for products without a usable price.
pub const PRICE_ON_REQUEST: &str = "Prix sur demande";

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest unit of the shop currency.
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Product.price_sale ──┬──► CartItem line total ──► Cart.total_amount    │
/// │                       │                                                 │
/// │                       └──► "12 500 GNF" in catalog and receipts         │
/// │                                                                         │
/// │  Cart.total_amount ──► NewCustomerOrder.total_amount ──► backend row    │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
///
/// Deserialization is lenient: anything the backend sends that is not a
/// usable non-negative number becomes zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from currency units.
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Money(units)
    }

    /// Returns the value in currency units.
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Converts a price as the backend stores it.
    ///
    /// ## Rules
    /// ```text
    /// 12500          → 12500
    /// 12500.6        → 12501   (rounded)
    /// "12500"        → 12500   (numeric strings are accepted)
    /// null / absent  → 0
    /// "abc", NaN     → 0
    /// -300           → 0       (a price is never negative)
    /// ```
    pub fn from_backend_value(value: &serde_json::Value) -> Self {
        let raw = match value {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };

        match raw {
            Some(v) if v.is_finite() && v > 0.0 && v < i64::MAX as f64 => Money(v.round() as i64),
            _ => Money::zero(),
        }
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use velmo_core::money::Money;
    ///
    /// let unit_price = Money::from_units(4_000);
    /// assert_eq!(unit_price.multiply_quantity(3).units(), 12_000);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Formats the amount with French digit grouping and a currency code.
    ///
    /// ## Example
    /// ```rust
    /// use velmo_core::money::Money;
    ///
    /// assert_eq!(Money::from_units(1_250_000).format_amount("GNF"), "1 250 000 GNF");
    /// assert_eq!(Money::zero().format_amount("GNF"), "0 GNF");
    /// ```
    pub fn format_amount(&self, currency: &str) -> String {
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(' ');
            }
            grouped.push(c);
        }

        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{sign}{grouped} {currency}")
    }

    /// Formats a catalog price, where zero means the merchant quotes on request.
    pub fn price_label(&self, currency: &str) -> String {
        if self.is_zero() {
            PRICE_ON_REQUEST.to_string()
        } else {
            self.format_amount(currency)
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows the bare grouped amount without currency.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let formatted = self.format_amount("");
        f.write_str(formatted.trim_end())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(Money::from_backend_value(&value))
    }
}

// Backend prices are only bounded by i64, so sums clamp instead of wrapping.

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
