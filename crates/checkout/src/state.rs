//! Checkout state machine.

use cart::{CartLineItem, CartState, Money};
use chrono::{DateTime, Utc};
use common::SessionId;
use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::card::CardDetails;
use crate::confirmation::OrderConfirmation;
use crate::method::PaymentMethod;

/// The phase of a checkout attempt.
///
/// Phase transitions:
/// ```text
/// Idle ──► ChoosingMethod ──► EnteringAddress ──┬──► Confirmed              (cash on delivery)
///                                               └──► EnteringCard ──► EnteringPin ──► Processing ──► Confirmed
/// ```
/// Every phase from `ChoosingMethod` through `EnteringPin` can be cancelled back to `Idle`.
/// `Confirmed` is dismissed back to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CheckoutPhase {
    /// No checkout attempt is open.
    #[default]
    Idle,

    /// Waiting for the shopper to pick a payment method.
    ChoosingMethod,

    /// Waiting for a delivery address.
    EnteringAddress,

    /// Waiting for card details (online payment only).
    EnteringCard,

    /// Waiting for the payment PIN (online payment only).
    EnteringPin,

    /// Payment is being processed. Nothing can interrupt it.
    Processing,

    /// The order is placed (terminal for the attempt).
    Confirmed,
}

impl CheckoutPhase {
    /// Returns true if a new checkout attempt may start.
    pub fn can_initiate(&self) -> bool {
        matches!(self, CheckoutPhase::Idle | CheckoutPhase::Confirmed)
    }

    /// Returns true if the attempt can be abandoned.
    pub fn can_cancel(&self) -> bool {
        matches!(
            self,
            CheckoutPhase::ChoosingMethod
                | CheckoutPhase::EnteringAddress
                | CheckoutPhase::EnteringCard
                | CheckoutPhase::EnteringPin
        )
    }

    /// Returns true once payment has started and the outcome is only awaited.
    pub fn is_committed(&self) -> bool {
        matches!(self, CheckoutPhase::Processing)
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, CheckoutPhase::Confirmed)
    }

    /// Returns the phase name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutPhase::Idle => "Idle",
            CheckoutPhase::ChoosingMethod => "ChoosingMethod",
            CheckoutPhase::EnteringAddress => "EnteringAddress",
            CheckoutPhase::EnteringCard => "EnteringCard",
            CheckoutPhase::EnteringPin => "EnteringPin",
            CheckoutPhase::Processing => "Processing",
            CheckoutPhase::Confirmed => "Confirmed",
        }
    }
}

impl std::fmt::Display for CheckoutPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One line of the order as it stood when checkout started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuoteLine {
    pub product_name: String,
    pub quantity: u32,
    pub line_total: Money,
}

impl From<&CartLineItem> for QuoteLine {
    fn from(item: &CartLineItem) -> Self {
        Self {
            product_name: item.product_name.clone(),
            quantity: item.quantity,
            line_total: item.line_total(),
        }
    }
}

/// The cart total and lines captured when a checkout attempt starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub session_id: SessionId,
    pub total: Money,
    pub lines: Vec<QuoteLine>,
    /// Whether Cash on Delivery may be chosen for this total.
    pub cod_available: bool,
}

impl Quote {
    pub(crate) fn from_cart(cart: &CartState, cod_available: bool) -> Self {
        Self {
            session_id: SessionId::new(),
            total: cart.total_price(),
            lines: cart.items().iter().map(QuoteLine::from).collect(),
            cod_available,
        }
    }
}

/// The checkout session: one variant per phase, carrying exactly what has
/// been collected so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(tag = "phase", content = "data")]
pub enum CheckoutState {
    #[default]
    Idle,

    ChoosingMethod { quote: Quote },

    EnteringAddress {
        quote: Quote,
        method: PaymentMethod,
    },

    EnteringCard { quote: Quote, address: Address },

    EnteringPin {
        quote: Quote,
        address: Address,
        card: CardDetails,
    },

    Processing {
        quote: Quote,
        address: Address,
        card: CardDetails,
        started_at: DateTime<Utc>,
    },

    Confirmed { confirmation: OrderConfirmation },
}

impl CheckoutState {
    pub fn phase(&self) -> CheckoutPhase {
        match self {
            CheckoutState::Idle => CheckoutPhase::Idle,
            CheckoutState::ChoosingMethod { .. } => CheckoutPhase::ChoosingMethod,
            CheckoutState::EnteringAddress { .. } => CheckoutPhase::EnteringAddress,
            CheckoutState::EnteringCard { .. } => CheckoutPhase::EnteringCard,
            CheckoutState::EnteringPin { .. } => CheckoutPhase::EnteringPin,
            CheckoutState::Processing { .. } => CheckoutPhase::Processing,
            CheckoutState::Confirmed { .. } => CheckoutPhase::Confirmed,
        }
    }

    /// The quote of the open attempt, if any.
    pub fn quote(&self) -> Option<&Quote> {
        match self {
            CheckoutState::Idle | CheckoutState::Confirmed { .. } => None,
            CheckoutState::ChoosingMethod { quote }
            | CheckoutState::EnteringAddress { quote, .. }
            | CheckoutState::EnteringCard { quote, .. }
            | CheckoutState::EnteringPin { quote, .. }
            | CheckoutState::Processing { quote, .. } => Some(quote),
        }
    }

    /// Whether Cash on Delivery may be chosen. Only answered while choosing a method.
    pub fn is_cod_available(&self) -> Option<bool> {
        match self {
            CheckoutState::ChoosingMethod { quote } => Some(quote.cod_available),
            _ => None,
        }
    }

    /// The chosen payment method, once known.
    pub fn method(&self) -> Option<PaymentMethod> {
        match self {
            CheckoutState::EnteringAddress { method, .. } => Some(*method),
            CheckoutState::EnteringCard { .. }
            | CheckoutState::EnteringPin { .. }
            | CheckoutState::Processing { .. } => Some(PaymentMethod::Online),
            CheckoutState::Confirmed { confirmation } => Some(confirmation.method),
            CheckoutState::Idle | CheckoutState::ChoosingMethod { .. } => None,
        }
    }

    pub fn address(&self) -> Option<&Address> {
        match self {
            CheckoutState::EnteringCard { address, .. }
            | CheckoutState::EnteringPin { address, .. }
            | CheckoutState::Processing { address, .. } => Some(address),
            CheckoutState::Confirmed { confirmation } => Some(&confirmation.address),
            _ => None,
        }
    }

    pub fn card(&self) -> Option<&CardDetails> {
        match self {
            CheckoutState::EnteringPin { card, .. } | CheckoutState::Processing { card, .. } => {
                Some(card)
            }
            _ => None,
        }
    }

    pub fn confirmation(&self) -> Option<&OrderConfirmation> {
        match self {
            CheckoutState::Confirmed { confirmation } => Some(confirmation),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [CheckoutPhase; 7] = [
        CheckoutPhase::Idle,
        CheckoutPhase::ChoosingMethod,
        CheckoutPhase::EnteringAddress,
        CheckoutPhase::EnteringCard,
        CheckoutPhase::EnteringPin,
        CheckoutPhase::Processing,
        CheckoutPhase::Confirmed,
    ];

    #[test]
    fn test_default_phase_is_idle() {
        assert_eq!(CheckoutPhase::default(), CheckoutPhase::Idle);
        assert_eq!(CheckoutState::default().phase(), CheckoutPhase::Idle);
    }

    #[test]
    fn test_can_initiate() {
        let allowed: Vec<_> = ALL.into_iter().filter(|p| p.can_initiate()).collect();
        assert_eq!(allowed, vec![CheckoutPhase::Idle, CheckoutPhase::Confirmed]);
    }

    #[test]
    fn test_can_cancel() {
        assert!(!CheckoutPhase::Idle.can_cancel());
        assert!(CheckoutPhase::ChoosingMethod.can_cancel());
        assert!(CheckoutPhase::EnteringAddress.can_cancel());
        assert!(CheckoutPhase::EnteringCard.can_cancel());
        assert!(CheckoutPhase::EnteringPin.can_cancel());
        assert!(!CheckoutPhase::Processing.can_cancel());
        assert!(!CheckoutPhase::Confirmed.can_cancel());
    }

    #[test]
    fn test_only_processing_is_committed() {
        for phase in ALL {
            assert_eq!(phase.is_committed(), phase == CheckoutPhase::Processing);
            assert_eq!(phase.is_terminal(), phase == CheckoutPhase::Confirmed);
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(CheckoutPhase::EnteringPin.to_string(), "EnteringPin");
        assert_eq!(CheckoutPhase::Processing.to_string(), "Processing");
    }

    #[test]
    fn test_quote_from_cart() {
        let cart = CartState::new(vec![
            CartLineItem::new("l1", "p1", "Kurta", 2, Money::from_rupees(750)),
            CartLineItem::new("l2", "p2", "Dupatta", 1, Money::from_rupees(500)),
        ]);
        let quote = Quote::from_cart(&cart, true);

        assert_eq!(quote.total, Money::from_rupees(2000));
        assert_eq!(quote.lines.len(), 2);
        assert_eq!(quote.lines[0].line_total, Money::from_rupees(1500));
    }

    #[test]
    fn test_idle_state_serializes_with_phase_tag() {
        let json = serde_json::to_value(CheckoutState::Idle).unwrap();
        assert_eq!(json, serde_json::json!({ "phase": "Idle" }));
    }
}
