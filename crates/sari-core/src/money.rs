//! # Money Module
//!
//! Provides the `Money` type for handling peso amounts safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Splitting a ₱10.00 discount across 3 cart lines:                      │
//! │    10.00 / 3 = 3.333... per line → totals drift from the grand total  │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Centavos                                        │
//! │    1000 / 3 = 333 rem 1 → [334, 333, 333]                              │
//! │    The leftover centavo is assigned explicitly, never lost            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use sari_core::money::Money;
//!
//! let price = Money::from_centavos(1250); // ₱12.50
//! let line = price * 4;                   // ₱50.00
//! assert_eq!(line.centavos(), 5000);
//!
//! let typed: Money = "12.5".parse().unwrap();
//! assert_eq!(typed, price);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in centavos (the smallest peso unit).
///
/// ## Design Decisions
/// - **i64 (signed)**: profit can be negative when an item sells below cost
/// - **Single field tuple struct**: zero-cost abstraction over i64
///
/// ## Where Money Flows
/// ```text
/// InventoryItem.price ──► CartLine.subtotal ──► Cart.grand_total(discount)
///        │                        │
///        │                        └──► SaleRecord.total / profit
///        │
///        └──► Ledger revenue, gross profit, net profit
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from centavos.
    ///
    /// ## Example
    /// ```rust
    /// use sari_core::money::Money;
    ///
    /// let price = Money::from_centavos(1099); // ₱10.99
    /// assert_eq!(price.centavos(), 1099);
    /// ```
    #[inline]
    pub const fn from_centavos(centavos: i64) -> Self {
        Money(centavos)
    }

    /// Creates a Money value from whole pesos.
    #[inline]
    pub const fn from_pesos(pesos: i64) -> Self {
        Money(pesos * 100)
    }

    /// Returns the value in centavos.
    #[inline]
    pub const fn centavos(&self) -> i64 {
        self.0
    }

    /// Returns the whole-peso portion.
    #[inline]
    pub const fn pesos(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the centavo portion (always 0-99).
    #[inline]
    pub const fn centavos_part(&self) -> i64 {
        (self.0 % 100).abs()
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

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Adds two amounts, or `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    /// Multiplies by a quantity, or `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use sari_core::money::Money;
    ///
    /// let unit_price = Money::from_centavos(1500); // ₱15.00
    /// assert_eq!(unit_price.checked_mul(3), Some(Money::from_centavos(4500)));
    /// assert_eq!(unit_price.checked_mul(i64::MAX), None);
    /// ```
    #[inline]
    pub const fn checked_mul(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    /// Splits this amount into `parts` shares that differ by at most one
    /// centavo and always sum back to the original amount.
    ///
    /// The leftover centavos go to the earliest shares.
    ///
    /// ## Example
    /// ```rust
    /// use sari_core::money::Money;
    ///
    /// let shares = Money::from_centavos(1000).split_evenly(3);
    /// let centavos: Vec<i64> = shares.iter().map(|m| m.centavos()).collect();
    /// assert_eq!(centavos, vec![334, 333, 333]);
    /// ```
    pub fn split_evenly(&self, parts: usize) -> Vec<Money> {
        if parts == 0 {
            return Vec::new();
        }

        let n = parts as i64;
        let base = self.0 / n;
        let remainder = self.0 % n;

        (0..n)
            .map(|i| {
                if i < remainder.abs() {
                    Money(base + remainder.signum())
                } else {
                    Money(base)
                }
            })
            .collect()
    }

    /// Returns `(self - base) / base` as a whole percentage, or `None` when
    /// `base` is zero.
    ///
    /// Used for the markup column of sales reports.
    pub fn markup_over(&self, base: Money) -> Option<i64> {
        if base.is_zero() {
            return None;
        }
        let diff = (self.0 as i128 - base.0 as i128) * 100;
        let base = base.0 as i128;
        // round half away from zero
        let rounded = if (diff >= 0) == (base > 0) {
            (diff + base / 2) / base
        } else {
            (diff - base / 2) / base
        };
        Some(rounded as i64)
    }

    /// Plain decimal text without the currency symbol, e.g. `"12.50"`.
    ///
    /// This is the form a value is pre-filled with in an editable field, and
    /// it parses back to the same amount.
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}.{:02}", sign, self.pesos().abs(), self.centavos_part())
    }
}

// =============================================================================
// Parsing
// =============================================================================

/// Parses operator input such as `"12"`, `"12.5"`, `"12.50"`, `"₱12.50"`.
///
/// At most two decimal places are accepted. Negative amounts are rejected;
/// nothing typed into a price, cost, discount or expense field is negative.
impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: reason.to_string(),
        };

        let s = s.trim().trim_start_matches('₱').replace(',', "");
        if s.is_empty() {
            return Err(ValidationError::Required {
                field: "amount".to_string(),
            });
        }

        let (whole, frac) = match s.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (s.as_str(), ""),
        };

        if frac.len() > 2 {
            return Err(invalid("at most two decimal places"));
        }
        if whole.is_empty() && frac.is_empty() {
            return Err(invalid("expected digits"));
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("expected a non-negative number like 12.50"));
        }

        let pesos: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid("amount is too large"))?
        };
        let centavos: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|_| invalid("bad centavos"))? * 10,
            _ => frac.parse().map_err(|_| invalid("bad centavos"))?,
        };

        pesos
            .checked_mul(100)
            .and_then(|p| p.checked_add(centavos))
            .map(Money)
            .ok_or_else(|| invalid("amount is too large"))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================
//
// The arithmetic operators saturate at the i64 bounds. Typed amounts and stock
// levels are capped by `validation`, so only ledger sums over an implausible
// history can reach the bounds; use `checked_add` / `checked_mul` where an
// overflow must be reported instead.

/// Display shows pesos, e.g. `₱1,234.50` is rendered as `₱1234.50`.
///
/// ## Note
/// Grouping separators are left to the document renderer.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}₱{}.{:02}",
            sign,
            self.pesos().abs(),
            self.centavos_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

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

/// Multiplication by a quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_centavos() {
        let money = Money::from_centavos(1099);
        assert_eq!(money.centavos(), 1099);
        assert_eq!(money.pesos(), 10);
        assert_eq!(money.centavos_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_centavos(1099).to_string(), "₱10.99");
        assert_eq!(Money::from_pesos(5).to_string(), "₱5.00");
        assert_eq!(Money::from_centavos(-550).to_string(), "-₱5.50");
        assert_eq!(Money::zero().to_string(), "₱0.00");
        assert_eq!(Money::from_centavos(1250).to_decimal_string(), "12.50");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_centavos(1000);
        let b = Money::from_centavos(500);

        assert_eq!((a + b).centavos(), 1500);
        assert_eq!((a - b).centavos(), 500);
        assert_eq!((a * 3).centavos(), 3000);

        let total: Money = [a, b, b].iter().sum();
        assert_eq!(total.centavos(), 2000);
    }

    #[test]
    fn test_arithmetic_at_the_bounds() {
        let max = Money::from_centavos(i64::MAX);
        assert_eq!(max.checked_add(Money::from_centavos(1)), None);
        assert_eq!(max.checked_mul(2), None);
        assert_eq!(Money::from_pesos(15).checked_mul(4), Some(Money::from_pesos(60)));

        assert_eq!(max + Money::from_centavos(1), max);
        assert_eq!(max * 2, max);
        assert_eq!(Money::from_centavos(i64::MIN) - Money::from_centavos(1), Money::from_centavos(i64::MIN));
        assert_eq!([max, max].iter().sum::<Money>(), max);
        assert!(max.markup_over(Money::from_centavos(-1)).is_some());
    }

    #[test]
    fn test_parse_operator_input() {
        assert_eq!("12".parse::<Money>().unwrap().centavos(), 1200);
        assert_eq!("12.5".parse::<Money>().unwrap().centavos(), 1250);
        assert_eq!("12.05".parse::<Money>().unwrap().centavos(), 1205);
        assert_eq!(" ₱1,250.00 ".parse::<Money>().unwrap().centavos(), 125000);
        assert_eq!(".5".parse::<Money>().unwrap().centavos(), 50);

        assert!("".parse::<Money>().is_err());
        assert!("abc".parse::<Money>().is_err());
        assert!("-5".parse::<Money>().is_err());
        assert!("1.234".parse::<Money>().is_err());
        assert!(".".parse::<Money>().is_err());
    }

    #[test]
    fn test_split_evenly_keeps_every_centavo() {
        let shares = Money::from_centavos(1000).split_evenly(3);
        assert_eq!(
            shares,
            vec![
                Money::from_centavos(334),
                Money::from_centavos(333),
                Money::from_centavos(333)
            ]
        );
        assert_eq!(shares.iter().sum::<Money>(), Money::from_centavos(1000));

        assert_eq!(Money::from_pesos(20).split_evenly(1), vec![Money::from_pesos(20)]);
        assert_eq!(Money::zero().split_evenly(2), vec![Money::zero(), Money::zero()]);
        assert!(Money::from_pesos(1).split_evenly(0).is_empty());
    }

    #[test]
    fn test_markup_over() {
        // sold at 50, bought at 30 → 67%
        assert_eq!(Money::from_pesos(50).markup_over(Money::from_pesos(30)), Some(67));
        assert_eq!(Money::from_pesos(30).markup_over(Money::from_pesos(30)), Some(0));
        assert_eq!(Money::from_pesos(20).markup_over(Money::from_pesos(40)), Some(-50));
        assert_eq!(Money::from_pesos(20).markup_over(Money::zero()), None);
    }
}
