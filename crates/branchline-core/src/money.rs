//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  The ERP backend speaks JSON decimals:                                  │
//! │    { "price": 19.99, "quantity": 3 }                                    │
//! │    19.99 * 3 = 59.97000000000001  ❌ in f64                             │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    wire 19.99 ──► 1999 cents ──► × 3 = 5997 cents ──► wire 59.97        │
//! │    Decimals only exist at the serde boundary (`as_decimal`)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use branchline_core::money::Money;
//!
//! let price = Money::from_cents(1999); // $19.99
//! let line = price * 3;                // $59.97
//! assert_eq!(line.cents(), 5997);
//! assert_eq!(line.to_decimal(), 59.97);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// The operators saturate at the `i64` bounds. Use the `checked_*` methods
/// where an overflow must be rejected instead (draft lines and totals).
///
/// ## Where Money is Used
/// ```text
/// Product.price ──► SaleLineItem.unit_price ──► line_total ──► DraftSale.total
///                                                                   │
///                                  NewSalePayload.total_amount ◄────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ```rust
    /// use branchline_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from a decimal amount as it arrives on the wire.
    ///
    /// Rounds half away from zero to the nearest cent, so `0.1 + 0.2` style
    /// representation noise never leaks into the cents value.
    ///
    /// ```rust
    /// use branchline_core::money::Money;
    ///
    /// assert_eq!(Money::from_decimal(10.99).cents(), 1099);
    /// assert_eq!(Money::from_decimal(0.1 + 0.2).cents(), 30);
    /// assert_eq!(Money::from_decimal(2.005).cents(), 201);
    /// ```
    ///
    /// Amounts outside the representable range saturate; use
    /// [`try_from_decimal`](Self::try_from_decimal) for untrusted input.
    pub fn from_decimal(amount: f64) -> Self {
        Money(round_cents(amount) as i64)
    }

    /// Like [`from_decimal`](Self::from_decimal), but `None` for NaN,
    /// infinities, and amounts whose cents do not fit in an `i64`.
    ///
    /// ```rust
    /// use branchline_core::money::Money;
    ///
    /// assert_eq!(Money::try_from_decimal(12.5), Some(Money::from_cents(1250)));
    /// assert_eq!(Money::try_from_decimal(1e17), None);
    /// ```
    pub fn try_from_decimal(amount: f64) -> Option<Self> {
        let cents = round_cents(amount);
        // i64::MIN and 2^63 are exact in f64; NaN fails both comparisons.
        if cents >= i64::MIN as f64 && cents < i64::MAX as f64 {
            Some(Money(cents as i64))
        } else {
            None
        }
    }

    /// Returns the value as a decimal amount in major units (for the wire).
    #[inline]
    pub fn to_decimal(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
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

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity, saturating at the `i64` bounds.
    ///
    /// ```rust
    /// use branchline_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299); // $2.99
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// `self × qty`, or `None` on overflow.
    ///
    /// ```rust
    /// use branchline_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(250).checked_mul(4), Some(Money::from_cents(1000)));
    /// assert_eq!(Money::from_cents(i64::MAX / 2).checked_mul(3), None);
    /// ```
    #[inline]
    pub const fn checked_mul(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// `self + other`, or `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Sum of `amounts`, or `None` as soon as the running total overflows.
    pub fn checked_sum<I>(amounts: I) -> Option<Self>
    where
        I: IntoIterator<Item = Money>,
    {
        amounts
            .into_iter()
            .try_fold(Money::zero(), |acc, m| acc.checked_add(m))
    }

    /// Share of `self` in `whole`, in basis points (10000 = 100%).
    ///
    /// Returns 0 when `whole` is zero.
    pub fn share_bps_of(&self, whole: Money) -> u32 {
        if whole.0 == 0 {
            return 0;
        }
        ((self.0 as i128 * 10_000 + whole.0 as i128 / 2) / whole.0 as i128) as u32
    }
}

/// Decimal amount → cents, rounded half away from zero.
fn round_cents(amount: f64) -> f64 {
    // Nudge by a sub-cent epsilon so values like 2.005 (stored as 2.00499..)
    // round the way a person reading the JSON would expect.
    let scaled = amount * 100.0;
    (scaled + scaled.signum() * 1e-6).round()
}

// =============================================================================
// Decimal Wire Adapter
// =============================================================================

/// Serde adapter for fields the backend sends and expects as JSON decimals.
///
/// ```rust,ignore
/// #[serde(with = "branchline_core::money::as_decimal")]
/// pub price: Money,
/// ```
pub mod as_decimal {
    use super::Money;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(money: &Money, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(money.to_decimal())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Money, D::Error>
    where
        D: Deserializer<'de>,
    {
        let amount = f64::deserialize(deserializer)?;
        Money::try_from_decimal(amount).ok_or_else(|| {
            serde::de::Error::custom(format!("amount {} is out of range", amount))
        })
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
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

/// Multiplication by i64 (for quantity calculations).
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
