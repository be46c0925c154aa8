//! # Money
//!
//! Prices travel as decimals on the ERP wire (`BASEPLPRICE: 9.99`,
//! `PRICE: 80.5`) and as integer minor units everywhere else.
//!
//! ```text
//! ERP JSON 9.99 ──from_decimal──► Money(999) ──► SQLite INTEGER column
//!                                    │
//!                                    ├── line totals, order totals (Add, Mul, Sum)
//!                                    ├── price range min/max (Ord)
//!                                    │
//! ERP payload  ◄──to_decimal─────────┤
//! storefront "9.99" ◄──Display───────┘
//! ```
//!
//! ```rust
//! use ledgerlink_core::money::Money;
//!
//! let price = Money::from_decimal(9.99);
//! assert_eq!(price.cents(), 999);
//! assert_eq!(price.to_string(), "9.99");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul};

/// Amount in minor units. The currency lives next to it (price list
/// `CODE`, store default), never inside.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
pub struct Money(i64);

impl Money {
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Converts an ERP decimal, rounding half away from zero.
    ///
    /// NaN and infinities (a corrupt feed) become zero.
    ///
    /// ```rust
    /// use ledgerlink_core::money::Money;
    ///
    /// assert_eq!(Money::from_decimal(19.999).cents(), 2000);
    /// assert_eq!(Money::from_decimal(-5.5).cents(), -550);
    /// ```
    pub fn from_decimal(value: f64) -> Self {
        if value.is_finite() {
            Money((value * 100.0).round() as i64)
        } else {
            Money::zero()
        }
    }

    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Decimal form for ERP payloads.
    pub fn to_decimal(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub const fn zero() -> Self {
        Money(0)
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

/// Two decimals, no symbol: `10.99`, `-5.50`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let minor = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, minor / 100, minor % 100)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

/// Unit price times quantity.
impl Mul<i64> for Money {
    type Output = Money;

    fn mul(self, quantity: i64) -> Money {
        Money(self.0 * quantity)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::zero(), Add::add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_erp_decimals_round_to_minor_units() {
        assert_eq!(Money::from_decimal(9.99).cents(), 999);
        assert_eq!(Money::from_decimal(0.1 + 0.2).cents(), 30);
        assert_eq!(Money::from_decimal(80.5).cents(), 8050);
        assert!(Money::from_decimal(f64::NAN).is_zero());
    }

    #[test]
    fn test_payload_decimal() {
        assert_eq!(Money::from_cents(4498).to_decimal(), 44.98);
        assert_eq!(Money::from_cents(-550).to_decimal(), -5.5);
    }

    #[test]
    fn test_storefront_display() {
        assert_eq!(Money::from_cents(4000).to_string(), "40.00");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
    }

    #[test]
    fn test_order_total() {
        let lines = [Money::from_cents(999) * 2, Money::from_cents(2500)];
        assert_eq!(lines.into_iter().sum::<Money>(), Money::from_cents(4498));
    }
}
