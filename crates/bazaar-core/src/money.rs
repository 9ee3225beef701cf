//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely, and the
//! commission split applied to delivered sales.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004                                      │
//! │                                                                         │
//! │  Integer cents:                                                         │
//! │    order total  = Σ unit_price_cents × quantity   (exact)              │
//! │    refund       = order total                     (exact)              │
//! │    commission   = round(total × 20%)                                   │
//! │    seller share = total - commission              (never loses a cent) │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bazaar_core::money::Money;
//!
//! let price = Money::from_cents(1000); // $10.00
//! let line = price.multiply_quantity(2)?;
//! let total = line.checked_add(Money::from_cents(500))?;
//! assert_eq!(total.cents(), 2500);
//! # Ok::<(), bazaar_core::CoreError>(())
//! ```
//!
//! Every operation that can leave the `i64` range returns
//! `CoreError::AmountOverflow` instead of wrapping.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::ADMIN_COMMISSION_BPS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Where Money is Used
/// ```text
/// Product.price_cents ──► CartLine subtotal ──► CartSummary.total
///                    │
///                    └──► OrderItem.unit_price_cents (snapshot)
///                                  │
///                                  ▼
///                         Order.total_cents ──► ReturnOrder.refund_amount
///                                                       │
///                                                       ▼
///                                          User.wallet_balance_cents
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use bazaar_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
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

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use bazaar_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299);
    /// assert_eq!(unit_price.multiply_quantity(3).unwrap().cents(), 897);
    /// assert!(Money::from_cents(i64::MAX).multiply_quantity(2).is_err());
    /// ```
    #[inline]
    pub fn multiply_quantity(&self, qty: i64) -> CoreResult<Money> {
        self.0
            .checked_mul(qty)
            .map(Money)
            .ok_or(CoreError::AmountOverflow)
    }

    #[inline]
    pub fn checked_add(self, other: Money) -> CoreResult<Money> {
        self.0
            .checked_add(other.0)
            .map(Money)
            .ok_or(CoreError::AmountOverflow)
    }

    #[inline]
    pub fn checked_sub(self, other: Money) -> CoreResult<Money> {
        self.0
            .checked_sub(other.0)
            .map(Money)
            .ok_or(CoreError::AmountOverflow)
    }

    /// Sums amounts, failing on the first overflow.
    ///
    /// ## Example
    /// ```rust
    /// use bazaar_core::money::Money;
    ///
    /// let lines = [Money::from_cents(2000), Money::from_cents(500)];
    /// assert_eq!(Money::try_sum(lines).unwrap().cents(), 2500);
    /// ```
    pub fn try_sum<I: IntoIterator<Item = Money>>(amounts: I) -> CoreResult<Money> {
        amounts
            .into_iter()
            .try_fold(Money::zero(), |acc, amount| acc.checked_add(amount))
    }

    /// Returns the share of this amount given in basis points, rounded half up.
    ///
    /// ## Implementation
    /// `(amount * bps + 5000) / 10000`, computed in i128 so large totals
    /// cannot overflow.
    ///
    /// ## Example
    /// ```rust
    /// use bazaar_core::money::Money;
    ///
    /// let total = Money::from_cents(2500);
    /// assert_eq!(total.portion_bps(2000).cents(), 500); // 20%
    /// ```
    pub fn portion_bps(&self, bps: u32) -> Money {
        let share = (self.0 as i128 * bps as i128 + 5000) / 10000;
        Money::from_cents(share as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Human-readable rendering, e.g. `$25.00` or `-$5.50`.
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

// =============================================================================
// Earnings Split
// =============================================================================

/// Division of a seller's delivered sales between the platform and the seller.
///
/// ```text
/// total_sales ──┬──► admin_commission  = round(total × 20%)
///               └──► seller_earnings   = total - admin_commission
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EarningsSplit {
    pub total_sales_cents: i64,
    pub admin_commission_cents: i64,
    pub seller_earnings_cents: i64,
}

impl EarningsSplit {
    /// Splits a sales total using [`ADMIN_COMMISSION_BPS`].
    pub fn from_sales(total: Money) -> Self {
        let commission = total.portion_bps(ADMIN_COMMISSION_BPS);
        EarningsSplit {
            total_sales_cents: total.cents(),
            admin_commission_cents: commission.cents(),
            // |commission| <= |total|, so this cannot leave the i64 range
            seller_earnings_cents: total.cents() - commission.cents(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.dollars(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(2500).to_string(), "$25.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-$5.50");
        assert_eq!(Money::zero().to_string(), "$0.00");
    }

    #[test]
    fn test_order_total_example() {
        // 2 units of a $10 product and 1 unit of a $5 product
        let lines = [(Money::from_cents(1000), 2), (Money::from_cents(500), 1)];
        let total = Money::try_sum(lines.iter().map(|(p, q)| p.multiply_quantity(*q).unwrap()))
            .unwrap();
        assert_eq!(total.cents(), 2500);
        assert_eq!(total.to_string(), "$25.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!(a.checked_add(b).unwrap().cents(), 1500);
        assert_eq!(a.checked_sub(b).unwrap().cents(), 500);
        assert_eq!(a.multiply_quantity(3).unwrap().cents(), 3000);
    }

    #[test]
    fn test_overflow_is_an_error() {
        let huge = Money::from_cents((1 << 62) + 1);
        assert!(matches!(huge.multiply_quantity(4), Err(CoreError::AmountOverflow)));
        assert!(matches!(
            Money::from_cents(i64::MAX).checked_add(Money::from_cents(1)),
            Err(CoreError::AmountOverflow)
        ));
        assert!(matches!(
            Money::from_cents(i64::MIN).checked_sub(Money::from_cents(1)),
            Err(CoreError::AmountOverflow)
        ));

        let quarter = Money::from_cents(1 << 61);
        assert!(Money::try_sum([quarter; 3]).is_ok());
        assert!(Money::try_sum([quarter; 4]).is_err());
    }

    #[test]
    fn test_zero_and_checks() {
        assert!(Money::zero().is_zero());
        assert!(Money::from_cents(1).is_positive());
        assert!(Money::from_cents(-1).is_negative());
    }

    #[test]
    fn test_portion_rounds_half_up() {
        // 20% of $0.03 = 0.6 cents → 1 cent
        assert_eq!(Money::from_cents(3).portion_bps(2000).cents(), 1);
        // 20% of $0.02 = 0.4 cents → 0 cents
        assert_eq!(Money::from_cents(2).portion_bps(2000).cents(), 0);
    }

    #[test]
    fn test_earnings_split_is_exact() {
        let split = EarningsSplit::from_sales(Money::from_cents(12_345));
        assert_eq!(split.admin_commission_cents, 2469);
        assert_eq!(split.seller_earnings_cents, 9876);
        assert_eq!(
            split.admin_commission_cents + split.seller_earnings_cents,
            split.total_sales_cents
        );
    }
}
