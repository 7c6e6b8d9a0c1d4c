//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units                                      │
//! │    price × quantity is exact, totals reconcile with line subtotals      │
//! │                                                                         │
//! │  AND: checked arithmetic                                                │
//! │    A subtotal that overflows i64 fails the checkout instead of          │
//! │    wrapping into a negative total.                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use kasir_core::money::Money;
//!
//! let price = Money::from_minor(12_500);
//! let subtotal = price.checked_mul_quantity(3).unwrap();
//! assert_eq!(subtotal.minor(), 37_500);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// Serializes transparently as an integer so that ledger amounts appear as
/// plain numbers on the wire.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor(&self) -> i64 {
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

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies a unit price by a quantity, returning `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use kasir_core::money::Money;
    ///
    /// assert_eq!(Money::from_minor(100).checked_mul_quantity(3), Some(Money::from_minor(300)));
    /// assert_eq!(Money::from_minor(i64::MAX).checked_mul_quantity(2), None);
    /// ```
    #[inline]
    pub const fn checked_mul_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    /// Adds two amounts, returning `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Money {
    fn from(minor: i64) -> Self {
        Money(minor)
    }
}

/// Addition of two Money values.
///
/// Unchecked: panics on overflow in debug builds and wraps in release.
/// Use [`Money::checked_add`] where inputs are untrusted.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Same overflow behaviour as [`Add`].
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Saturates at `i64::MIN` / `i64::MAX` instead of overflowing.
impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| Money(acc.0.saturating_add(m.0)))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_minor() {
        let money = Money::from_minor(12_500);
        assert_eq!(money.minor(), 12_500);
        assert!(!money.is_zero());
        assert!(!money.is_negative());
    }

    #[test]
    fn test_checked_mul_quantity() {
        let price = Money::from_minor(299);
        assert_eq!(price.checked_mul_quantity(3), Some(Money::from_minor(897)));
        assert_eq!(price.checked_mul_quantity(0), Some(Money::zero()));
        assert_eq!(Money::from_minor(i64::MAX / 2 + 1).checked_mul_quantity(2), None);
    }

    #[test]
    fn test_checked_add() {
        let a = Money::from_minor(1000);
        assert_eq!(a.checked_add(Money::from_minor(500)), Some(Money::from_minor(1500)));
        assert_eq!(Money::from_minor(i64::MAX).checked_add(Money::from_minor(1)), None);
    }

    #[test]
    fn test_sum() {
        let total: Money = [300, 100].into_iter().map(Money::from_minor).sum();
        assert_eq!(total.minor(), 400);

        let empty: Money = std::iter::empty::<Money>().sum();
        assert!(empty.is_zero());
    }

    #[test]
    fn test_sum_saturates() {
        let total: Money = [i64::MAX, 1, 5].into_iter().map(Money::from_minor).sum();
        assert_eq!(total.minor(), i64::MAX);

        let total: Money = [i64::MIN, -1].into_iter().map(Money::from_minor).sum();
        assert_eq!(total.minor(), i64::MIN);
    }

    #[test]
    fn test_serializes_as_plain_integer() {
        let json = serde_json::to_string(&Money::from_minor(400)).unwrap();
        assert_eq!(json, "400");
    }
}
