//! Checkout settings.

use std::time::Duration;

use cart::Money;

/// Default Cash on Delivery limit in rupees.
pub const DEFAULT_COD_LIMIT_RUPEES: i64 = 5000;

/// Default simulated payment delay.
pub const DEFAULT_PAYMENT_DELAY: Duration = Duration::from_millis(2000);

/// Default days between confirmation and estimated delivery.
pub const DEFAULT_DELIVERY_DAYS: u32 = 5;

/// Offset of the storefront's calendar (IST, UTC+05:30), in seconds.
pub const STOREFRONT_UTC_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

/// Tunables for the checkout flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutSettings {
    /// Largest order total (inclusive) that may be paid on delivery.
    pub cod_limit: Money,
    /// How long the simulated payment takes.
    pub payment_delay: Duration,
    pub delivery_days: u32,
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        Self {
            cod_limit: Money::from_rupees(DEFAULT_COD_LIMIT_RUPEES),
            payment_delay: DEFAULT_PAYMENT_DELAY,
            delivery_days: DEFAULT_DELIVERY_DAYS,
        }
    }
}

impl CheckoutSettings {
    /// Returns true if an order of `total` may be paid on delivery.
    pub fn cod_available(&self, total: Money) -> bool {
        total <= self.cod_limit
    }

    pub fn with_cod_limit(mut self, cod_limit: Money) -> Self {
        self.cod_limit = cod_limit;
        self
    }

    pub fn with_payment_delay(mut self, payment_delay: Duration) -> Self {
        self.payment_delay = payment_delay;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cod_limit_is_inclusive() {
        let settings = CheckoutSettings::default();
        assert!(settings.cod_available(Money::from_rupees(5000)));
        assert!(!settings.cod_available(Money::from_rupees(5001)));
        assert!(!settings.cod_available(Money::from_paise(500_001)));
    }

    #[test]
    fn test_defaults() {
        let settings = CheckoutSettings::default();
        assert_eq!(settings.payment_delay, Duration::from_millis(2000));
        assert_eq!(settings.delivery_days, 5);
    }
}
