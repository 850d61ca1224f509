//! # Money Module
//!
//! Provides the `Money` type for capital raised, valuations and exit payouts.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  A scenario document is saved, shared and re-loaded many times.        │
//! │  Storing $1,000,000.10 as a float invites drift on every round trip.   │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Every amount that is entered or paid out is an i64 of cents.        │
//! │    Only derived ratios (share price, percent) are floating point.      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use captable_core::money::Money;
//!
//! let raise = Money::from_major(1_000_000);      // $1,000,000.00
//! let pre_money = Money::from_major(4_000_000);
//! let post_money = pre_money + raise;
//! assert_eq!(post_money, Money::from_major(5_000_000));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents for USD).
///
/// ## Design Decisions
/// - **i64 (signed)**: Lets validation see (and reject) negative input
/// - **Single field tuple struct**: Serializes as a bare integer of cents
/// - **Derives**: Full serde support so documents round-trip exactly
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Event.capital_raised ──► share price ──► Investor.investment_amount   │
/// │                                                                         │
/// │  PricedRound.pre_money ──► RoundOutcome.post_money_valuation           │
/// │                                                                         │
/// │  exit valuation ──► ExitResult payouts ──► multiples                   │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use captable_core::money::Money;
    ///
    /// let amount = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(amount.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole currency units.
    ///
    /// ## Example
    /// ```rust
    /// use captable_core::money::Money;
    ///
    /// let cap = Money::from_major(5_000_000);
    /// assert_eq!(cap.cents(), 500_000_000);
    /// ```
    #[inline]
    pub const fn from_major(major: i64) -> Self {
        Money(major * 100)
    }

    /// Creates a Money value from a fractional amount of currency units,
    /// rounded to the nearest cent.
    ///
    /// Only used for values that are *derived* from floating point ratios
    /// (sale proceeds, exit payouts). Entered amounts use `from_cents`.
    pub fn from_major_f64(major: f64) -> Self {
        Money((major * 100.0).round() as i64)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the value in currency units as a float (for pricing math).
    ///
    /// ## Example
    /// ```rust
    /// use captable_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(150).as_major(), 1.5);
    /// ```
    #[inline]
    pub fn as_major(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns the whole-unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
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

    /// Returns `percent`% of this amount, rounded to the nearest cent.
    ///
    /// ## Example
    /// ```rust
    /// use captable_core::money::Money;
    ///
    /// let exit = Money::from_major(50_000_000);
    /// assert_eq!(exit.percent_of(20.0), Money::from_major(10_000_000));
    /// ```
    pub fn percent_of(&self, percent: f64) -> Money {
        Money((self.0 as f64 * percent / 100.0).round() as i64)
    }

    /// Value of `shares` shares at `price_per_share` currency units each,
    /// rounded to the nearest cent.
    ///
    /// ## Example
    /// ```rust
    /// use captable_core::money::Money;
    ///
    /// let proceeds = Money::for_shares(100_000, 0.35);
    /// assert_eq!(proceeds, Money::from_major(35_000));
    /// ```
    pub fn for_shares(shares: u64, price_per_share: f64) -> Money {
        Money::from_major_f64(shares as f64 * price_per_share)
    }

    /// Ratio of this amount to `other`; zero when `other` is zero.
    ///
    /// Used for investor multiples: a zero basis reports 0, never inf/NaN.
    pub fn ratio_to(&self, other: Money) -> f64 {
        if other.is_zero() {
            0.0
        } else {
            self.0 as f64 / other.0 as f64
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money with thousands separators.
///
/// ## Note
/// This is for logs and the CLI table. Rich clients format on their side.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let digits = self.dollars().unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        write!(f, "{}${}.{:02}", sign, grouped, self.cents_part())
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
