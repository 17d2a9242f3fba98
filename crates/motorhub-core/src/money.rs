//! Prices in centavos.
//!
//! Every amount in the marketplace is an `i64` count of centavos. A sale
//! total and its pending payment are both copied from the vehicle's asking
//! price, so they always agree to the centavo.
//!
//! ```rust
//! use motorhub_core::money::Money;
//!
//! let price = Money::from_reais(52_000);
//! assert_eq!(price.cents(), 5_200_000);
//! assert_eq!(price.to_string(), "R$ 52000.00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;
use ts_rs::TS;

/// An amount in centavos.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(transparent)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Whole reais, no centavos.
    #[inline]
    pub const fn from_reais(reais: i64) -> Self {
        Money(reais * 100)
    }

    #[inline]
    pub const fn cents(self) -> i64 {
        self.0
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}R$ {}.{:02}", abs / 100, abs % 100)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, other: Money) -> Money {
        Money(self.0 + other.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_in_reais() {
        assert_eq!(Money::from_cents(5_200_000).to_string(), "R$ 52000.00");
        assert_eq!(Money::from_cents(1099).to_string(), "R$ 10.99");
        assert_eq!(Money::from_cents(-5).to_string(), "-R$ 0.05");
        assert_eq!(Money::ZERO.to_string(), "R$ 0.00");
    }

    #[test]
    fn test_sum_of_payments() {
        let total: Money = [Money::from_reais(45_000), Money::from_cents(700_000)]
            .into_iter()
            .sum();
        assert_eq!(total, Money::from_reais(52_000));
        assert_eq!(Money::from_cents(i64::MAX).checked_add(Money::from_cents(1)), None);
    }

    #[test]
    fn test_serializes_as_plain_integer() {
        let json = serde_json::to_string(&Money::from_cents(1099)).unwrap();
        assert_eq!(json, "1099");
    }
}
