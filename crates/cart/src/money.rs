//! Money value object.

use serde::{Deserialize, Serialize};

/// Money amount represented in paise to avoid floating point issues.
///
/// Arithmetic saturates at the bounds of `i64` instead of overflowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money {
    /// Amount in paise (e.g., 1000 = ₹10.00)
    paise: i64,
}

impl Money {
    /// The largest representable amount.
    pub const MAX: Money = Money { paise: i64::MAX };

    /// Creates a new Money amount from paise.
    pub fn from_paise(paise: i64) -> Self {
        Self { paise }
    }

    /// Creates a new Money amount from a whole rupee value.
    pub fn from_rupees(rupees: i64) -> Self {
        Self {
            paise: rupees.saturating_mul(100),
        }
    }

    /// Converts a rupee amount as sent by the storefront backend.
    ///
    /// Returns `None` for negative or non-finite inputs; prices are never negative.
    /// Amounts beyond [`Money::MAX`] are clamped to it.
    pub fn from_rupee_amount(rupees: f64) -> Option<Self> {
        if !rupees.is_finite() || rupees < 0.0 {
            return None;
        }
        let paise = (rupees * 100.0).round();
        if paise >= Self::MAX.paise as f64 {
            return Some(Self::MAX);
        }
        Some(Self {
            paise: paise as i64,
        })
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self { paise: 0 }
    }

    /// Returns the amount in paise.
    pub fn paise(&self) -> i64 {
        self.paise
    }

    /// Returns the rupee portion (whole number).
    pub fn rupees(&self) -> i64 {
        self.paise / 100
    }

    /// Returns true if the amount is positive.
    pub fn is_positive(&self) -> bool {
        self.paise > 0
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.paise == 0
    }

    /// Multiplies by a quantity.
    pub fn multiply(&self, quantity: u32) -> Money {
        Money {
            paise: self.paise.saturating_mul(i64::from(quantity)),
        }
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&crate::format::format_inr(*self))
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money {
            paise: self.paise.saturating_add(rhs.paise),
        }
    }
}

impl std::ops::Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Self) -> Self::Output {
        Money {
            paise: self.paise.saturating_sub(rhs.paise),
        }
    }
}

impl std::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.paise = self.paise.saturating_add(rhs.paise);
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_from_paise() {
        let money = Money::from_paise(1234);
        assert_eq!(money.paise(), 1234);
        assert_eq!(money.rupees(), 12);
    }

    #[test]
    fn test_money_from_rupees() {
        let money = Money::from_rupees(5000);
        assert_eq!(money.paise(), 500_000);
        assert_eq!(money.rupees(), 5000);
    }

    #[test]
    fn test_from_rupee_amount_rounds_to_paise() {
        assert_eq!(Money::from_rupee_amount(499.99), Some(Money::from_paise(49_999)));
        assert_eq!(Money::from_rupee_amount(0.0), Some(Money::zero()));
        assert_eq!(Money::from_rupee_amount(-1.0), None);
        assert_eq!(Money::from_rupee_amount(f64::NAN), None);
    }

    #[test]
    fn test_money_arithmetic() {
        let a = Money::from_paise(1000);
        let b = Money::from_paise(500);

        assert_eq!((a + b).paise(), 1500);
        assert_eq!((a - b).paise(), 500);
        assert_eq!(a.multiply(3).paise(), 3000);
    }

    #[test]
    fn test_arithmetic_saturates_instead_of_overflowing() {
        let huge = Money::from_rupee_amount(1e17).unwrap();
        assert_eq!(huge, Money::MAX);
        assert_eq!(huge.multiply(2), Money::MAX);
        assert_eq!(huge + Money::from_rupees(1), Money::MAX);
        assert_eq!(Money::from_rupees(i64::MAX), Money::MAX);

        let mut total = Money::MAX;
        total += Money::from_paise(1);
        assert_eq!(total, Money::MAX);
    }

    #[test]
    fn test_money_sum() {
        let total: Money = [Money::from_rupees(1), Money::from_rupees(2)].into_iter().sum();
        assert_eq!(total, Money::from_rupees(3));
    }

    #[test]
    fn test_money_comparison() {
        assert!(Money::from_paise(100).is_positive());
        assert!(Money::from_paise(0).is_zero());
        assert!(!Money::from_paise(-100).is_positive());
        assert!(Money::from_rupees(5001) > Money::from_rupees(5000));
    }

    #[test]
    fn test_money_display_uses_rupee_format() {
        assert_eq!(Money::from_paise(123_456_78).to_string(), "₹1,23,456.78");
    }
}
