//! Payment methods offered at checkout.

use serde::{Deserialize, Serialize};

/// How the shopper pays for the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Pay the courier on delivery. Only offered up to the COD limit.
    CashOnDelivery,
    /// Pay now by card.
    Online,
}

impl PaymentMethod {
    /// Returns true if this method goes through card entry and payment processing.
    pub fn requires_payment(&self) -> bool {
        matches!(self, PaymentMethod::Online)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CashOnDelivery => "cash_on_delivery",
            PaymentMethod::Online => "online",
        }
    }

    /// Human readable label.
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::CashOnDelivery => "Cash on Delivery",
            PaymentMethod::Online => "Online Payment",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
